//! # Webhook Route Handlers
//!
//! The Jellyseerr / Overseerr notification endpoint.

use crate::{
    auth::WebhookToken,
    errors::AppError,
    state::AppState,
    types::SuccessResponse,
};
use axum::{body::Bytes, extract::State, Json};
use subhook::{normalize, parse_envelope, Normalization};
use tracing::info;

/// Handler for `POST /seerr`.
///
/// Responds as soon as the derived intents are handed to the dispatcher:
/// - 400 if the shared secret is wrong or missing.
/// - 500 if the body is empty or not a JSON object.
/// - 200 `success: false` with a message for notifications that carry no work.
/// - 200 `success: true` otherwise, even when zero intents were derived.
pub async fn seerr_webhook_handler(
    State(app_state): State<AppState>,
    token: WebhookToken,
    body: Bytes,
) -> Result<Json<SuccessResponse>, AppError> {
    app_state.webhook_gate.authorize_header(token.as_deref())?;

    let envelope = parse_envelope(&body)?;
    match normalize(&envelope) {
        Normalization::Ignored(reason) => {
            info!(%reason, "Webhook acknowledged without scheduling work.");
            Ok(Json(SuccessResponse::declined(reason.to_string())))
        }
        Normalization::Accepted(intents) => {
            let receipt = app_state.dispatcher.dispatch(intents);
            info!(
                accepted = receipt.accepted(),
                subject = envelope.subject.as_deref().unwrap_or_default(),
                "Webhook accepted."
            );
            Ok(Json(SuccessResponse::ok()))
        }
    }
}
