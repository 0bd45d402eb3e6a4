use serde::{Deserialize, Serialize};
use subhook::SubscriptionState;

/// The body returned by the webhook, refresh and search endpoints.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn declined(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

/// Query parameters accepted by `GET /search`.
#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
    pub state: Option<SubscriptionState>,
}
