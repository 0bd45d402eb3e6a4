//! # Authentication Extractors
//!
//! Axum extractors that pull caller credentials out of the request. They never
//! reject on their own; the credential gate decides in the handler, so that every
//! auth failure maps to the same response.
//!
//! - [`WebhookToken`]: the raw shared secret from the `Authorization` header.
//! - [`AdminPrincipal`]: the admin resolved from an `Authorization: Bearer` JWT.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use core_access::Principal;
use std::convert::Infallible;
use tracing::{debug, warn};

use crate::state::AppState;

/// The raw `Authorization` header a webhook sender presented, if any.
///
/// Request managers send the configured header value verbatim. The gate
/// accepts it as sent or in `Bearer <secret>` form.
#[derive(Debug, Clone)]
pub struct WebhookToken(pub Option<String>);

impl WebhookToken {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for WebhookToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| match value.to_str() {
                Ok(s) => Some(s),
                Err(_) => {
                    warn!("Authorization header is not valid ASCII.");
                    None
                }
            })
            .map(str::to_string);

        Ok(WebhookToken(token))
    }
}

/// The active administrator behind the request, or `None`.
///
/// A missing, malformed, invalid or expired token, as well as a valid token for
/// a non-admin, all resolve to `None`.
#[derive(Debug, Clone)]
pub struct AdminPrincipal(pub Option<Principal>);

impl AdminPrincipal {
    pub fn principal(&self) -> Option<&Principal> {
        self.0.as_ref()
    }
}

impl FromRequestParts<AppState> for AdminPrincipal {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer_header =
            Option::<TypedHeader<Authorization<Bearer>>>::from_request_parts(parts, state)
                .await
                .unwrap_or_else(|e| {
                    warn!("Unexpected error during header extraction: {}", e);
                    None
                });

        let token = bearer_header.as_ref().map(|TypedHeader(Authorization(bearer))| bearer.token());
        if token.is_none() {
            debug!("No bearer token on admin request.");
        }

        Ok(AdminPrincipal(
            state.auth_provider.current_admin_principal(token),
        ))
    }
}
