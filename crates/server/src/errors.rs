use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use core_access::AccessError;
use serde_json::json;
use subhook::{AdminError, EngineError, PayloadError};
use tracing::{error, warn};

/// A custom error type for the server application.
///
/// This enum encapsulates different kinds of errors that can occur within the server,
/// allowing them to be converted into appropriate HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// The caller failed the credential gate.
    Access(AccessError),
    /// The webhook body was empty or unparseable.
    Payload(PayloadError),
    /// The subscription engine rejected or failed a request.
    Engine(EngineError),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        AppError::Access(err)
    }
}

impl From<PayloadError> for AppError {
    fn from(err: PayloadError) -> Self {
        AppError::Payload(err)
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        AppError::Engine(err)
    }
}

impl From<AdminError> for AppError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::Access(e) => AppError::Access(e),
            AdminError::Engine(e) => AppError::Engine(e),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Access(_) => StatusCode::BAD_REQUEST,
            AppError::Payload(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Engine(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let error_message = match self {
            AppError::Access(err) => {
                warn!("Access denied: {}", err);
                match err {
                    AccessError::MissingPrincipal
                    | AccessError::NotAdmin(_) => "Authorization required.".to_string(),
                    _ => "Authorization failed.".to_string(),
                }
            }
            AppError::Payload(err) => {
                warn!("Rejected webhook body: {}", err);
                match err {
                    PayloadError::EmptyBody => "Request body is empty.".to_string(),
                    other => other.to_string(),
                }
            }
            AppError::Engine(err) => {
                error!("EngineError: {:?}", err);
                format!("Subscription engine error: {err}")
            }
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                "An internal server error occurred.".to_string()
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}
