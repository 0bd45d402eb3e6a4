//! # Core Data Types
//!
//! The data model shared by the normalizer, the dispatcher and the engine
//! providers.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// The kind of media a subscription is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    /// Maps the request manager's `media_type` hint onto a kind.
    ///
    /// Only the exact string `"movie"` is a movie. Everything else, including an
    /// absent hint, is treated as TV.
    pub fn from_hint(hint: Option<&str>) -> Self {
        match hint {
            Some("movie") => MediaKind::Movie,
            _ => MediaKind::Tv,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a stored subscription, as used by the engine's search pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubscriptionState {
    #[serde(rename = "N")]
    New,
    #[serde(rename = "R")]
    Running,
    #[serde(rename = "P")]
    Pending,
}

impl SubscriptionState {
    pub fn code(&self) -> &'static str {
        match self {
            SubscriptionState::New => "N",
            SubscriptionState::Running => "R",
            SubscriptionState::Pending => "P",
        }
    }
}

impl fmt::Display for SubscriptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SubscriptionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "N" => Ok(SubscriptionState::New),
            "R" => Ok(SubscriptionState::Running),
            "P" => Ok(SubscriptionState::Pending),
            other => Err(format!("unknown subscription state '{other}'")),
        }
    }
}

/// One unit of subscription work: a single title, or a single season of a show.
///
/// Movies always carry `season == 0`; TV intents always carry `season > 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionIntent {
    pub title: String,
    pub media_kind: MediaKind,
    /// The external catalog (TMDB) identifier.
    pub external_id: String,
    pub season: u32,
    pub requested_by: Option<String>,
}

impl SubscriptionIntent {
    pub fn movie(title: &str, external_id: &str, requested_by: Option<&str>) -> Self {
        Self {
            title: title.to_string(),
            media_kind: MediaKind::Movie,
            external_id: external_id.to_string(),
            season: 0,
            requested_by: requested_by.map(str::to_string),
        }
    }

    pub fn tv_season(
        title: &str,
        external_id: &str,
        season: u32,
        requested_by: Option<&str>,
    ) -> Self {
        Self {
            title: title.to_string(),
            media_kind: MediaKind::Tv,
            external_id: external_id.to_string(),
            season,
            requested_by: requested_by.map(str::to_string),
        }
    }
}

/// A stored subscription record, as listed by the subscription store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub media_kind: MediaKind,
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub tmdb_id: String,
    #[serde(default)]
    pub season: Option<u32>,
    pub state: SubscriptionState,
    #[serde(default)]
    pub username: Option<String>,
}

/// Catalog ids arrive as JSON numbers from some senders and strings from others.
fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number id, got {other}"
        ))),
    }
}
