use thiserror::Error;

/// A structurally unusable webhook body.
///
/// Semantically incomplete notifications are not errors; see
/// [`crate::webhook::Normalization::Ignored`].
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("Request body is empty")]
    EmptyBody,
    #[error("Request body is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Request body must be a JSON object")]
    NotAnObject,
}

/// Failures reported by a subscription engine or store.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to build Reqwest client: {0}")]
    ClientBuild(reqwest::Error),
    #[error("Failed to send request to the subscription engine: {0}")]
    Request(reqwest::Error),
    #[error("Subscription engine returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Failed to deserialize subscription engine response: {0}")]
    Deserialization(reqwest::Error),
    #[error("Subscription engine error: {0}")]
    Internal(String),
}
