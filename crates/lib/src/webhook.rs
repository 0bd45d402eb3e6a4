//! # Notification Normalizer
//!
//! Turns a raw Jellyseerr / Overseerr webhook body into zero or more
//! [`SubscriptionIntent`]s.
//!
//! The sender is a third party that emits many event types and does not always
//! fill every field, so only a structurally broken body is an error
//! ([`PayloadError`]). Everything else ends up as a [`Normalization`]:
//!
//! 1. Unsupported notification types are acknowledged and ignored.
//! 2. A missing title or catalog id is acknowledged and ignored.
//! 3. A movie yields exactly one intent with season `0`.
//! 4. A show yields one intent per season listed in the first
//!    `"Requested Seasons"` extra field, in listed order, duplicates included.

use crate::{
    errors::PayloadError,
    types::{MediaKind, SubscriptionIntent},
};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use tracing::{debug, info};

pub const MEDIA_APPROVED: &str = "MEDIA_APPROVED";
pub const MEDIA_AUTO_APPROVED: &str = "MEDIA_AUTO_APPROVED";
pub const REQUESTED_SEASONS_FIELD: &str = "Requested Seasons";
pub const SEASON_DELIMITER: &str = ", ";

// --- Wire format ---

/// The raw inbound webhook payload. Consumed once per request.
///
/// Every field is optional, and a field carrying an unexpected JSON type is
/// read as absent rather than failing the whole body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookEnvelope {
    #[serde(default, deserialize_with = "lenient")]
    pub notification_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub media: Option<MediaPayload>,
    #[serde(default, deserialize_with = "lenient")]
    pub request: Option<RequestPayload>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub extra: Option<Vec<ExtraField>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaPayload {
    #[serde(default, deserialize_with = "lenient")]
    pub media_type: Option<String>,
    /// Sent as a number by Jellyseerr, as a templated string by some setups.
    #[serde(default, rename = "tmdbId")]
    pub tmdb_id: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestPayload {
    #[serde(default, rename = "requestedBy_username", deserialize_with = "lenient")]
    pub requested_by_username: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtraField {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
}

/// Reads a field as `T`, or `None` when it is null or of another shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Reads an array, keeping the elements that have the shape of `T`.
///
/// Anything other than an array is `None`.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        )),
        _ => Ok(None),
    }
}

/// Parses a raw request body into an envelope.
///
/// Empty bodies and JSON "nothing" values (`null`, `{}`, `""`, `[]`, `0`, `false`)
/// are [`PayloadError::EmptyBody`].
pub fn parse_envelope(body: &[u8]) -> Result<WebhookEnvelope, PayloadError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(PayloadError::EmptyBody);
    }

    let value: Value = serde_json::from_slice(body)?;
    match &value {
        Value::Object(map) if map.is_empty() => Err(PayloadError::EmptyBody),
        Value::Object(_) => Ok(serde_json::from_value(value)?),
        Value::Null | Value::Bool(false) => Err(PayloadError::EmptyBody),
        Value::String(s) if s.is_empty() => Err(PayloadError::EmptyBody),
        Value::Array(items) if items.is_empty() => Err(PayloadError::EmptyBody),
        Value::Number(n) if n.as_f64() == Some(0.0) => Err(PayloadError::EmptyBody),
        _ => Err(PayloadError::NotAnObject),
    }
}

// --- Normalization ---

/// Why a well-formed notification produced no work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    UnsupportedNotification(Option<String>),
    InvalidParameters,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::UnsupportedNotification(_) => f.write_str("unsupported notification type"),
            IgnoreReason::InvalidParameters => f.write_str("invalid request parameters"),
        }
    }
}

/// The outcome of normalizing one envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalization {
    /// The notification is actionable. The list may still be empty, e.g. a show
    /// whose season list did not parse.
    Accepted(Vec<SubscriptionIntent>),
    Ignored(IgnoreReason),
}

impl Normalization {
    pub fn intents(&self) -> &[SubscriptionIntent] {
        match self {
            Normalization::Accepted(intents) => intents,
            Normalization::Ignored(_) => &[],
        }
    }
}

pub fn is_actionable(notification_type: Option<&str>) -> bool {
    matches!(
        notification_type,
        Some(MEDIA_APPROVED) | Some(MEDIA_AUTO_APPROVED)
    )
}

/// Decomposes an envelope into subscription intents.
pub fn normalize(envelope: &WebhookEnvelope) -> Normalization {
    let notification_type = envelope.notification_type.as_deref();
    if !is_actionable(notification_type) {
        info!(?notification_type, "Ignoring unsupported notification type.");
        return Normalization::Ignored(IgnoreReason::UnsupportedNotification(
            envelope.notification_type.clone(),
        ));
    }

    let media = envelope.media.as_ref();
    let media_kind = MediaKind::from_hint(media.and_then(|m| m.media_type.as_deref()));
    let external_id = media.and_then(|m| m.tmdb_id.as_ref()).and_then(external_id_from);
    let title = envelope
        .subject
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let (Some(title), Some(external_id)) = (title, external_id) else {
        info!("Ignoring notification with missing subject or tmdbId.");
        return Normalization::Ignored(IgnoreReason::InvalidParameters);
    };

    let requested_by = envelope
        .request
        .as_ref()
        .and_then(|r| r.requested_by_username.as_deref())
        .filter(|s| !s.is_empty());

    let intents = match media_kind {
        MediaKind::Movie => vec![SubscriptionIntent::movie(title, &external_id, requested_by)],
        MediaKind::Tv => requested_seasons(envelope.extra.as_deref().unwrap_or_default())
            .into_iter()
            .map(|season| SubscriptionIntent::tv_season(title, &external_id, season, requested_by))
            .collect(),
    };

    debug!(
        title,
        %media_kind,
        external_id = %external_id,
        count = intents.len(),
        "Normalized notification."
    );
    Normalization::Accepted(intents)
}

/// Reads the season list from the first `"Requested Seasons"` field.
///
/// Later fields with the same name are ignored even when the first one is empty.
pub fn requested_seasons(extra: &[ExtraField]) -> Vec<u32> {
    let Some(field) = extra
        .iter()
        .find(|f| f.name.as_deref() == Some(REQUESTED_SEASONS_FIELD))
    else {
        return Vec::new();
    };

    match &field.value {
        Some(Value::String(list)) => parse_season_list(list),
        Some(Value::Number(n)) => parse_season_list(&n.to_string()),
        _ => Vec::new(),
    }
}

/// Splits a `"1, 2, 3"` list, keeping only all-digit tokens that name a real season.
pub fn parse_season_list(list: &str) -> Vec<u32> {
    list.split(SEASON_DELIMITER)
        .filter(|token| !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|token| token.parse::<u32>().ok())
        .filter(|season| *season > 0)
        .collect()
}

fn external_id_from(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => (n.as_f64() != Some(0.0)).then(|| n.to_string()),
        _ => None,
    }
}
