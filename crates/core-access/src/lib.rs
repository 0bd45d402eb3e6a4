//! # Core Access Crate
//!
//! This crate is the central authority for all caller verification in `subhook`.
//! It provides the two halves of the credential gate:
//!
//! - [`WebhookGate`]: checks the shared secret presented by a third-party
//!   request manager (Jellyseerr / Overseerr) against the configured token.
//! - [`authorize_admin`]: checks that an already-resolved [`Principal`] is an
//!   active administrator.
//!
//! Resolving a principal from a bearer token is the job of an [`AuthProvider`];
//! [`JwtAuthProvider`] is the HS256 implementation used by the server.

pub const ADMIN_ROLE: &str = "admin";

use chrono::{Duration, Utc};
use constant_time_eq::constant_time_eq;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Every way a caller can fail the credential gate.
///
/// All variants are surfaced to HTTP callers as a client error and are never retried.
#[derive(Error, Debug)]
pub enum AccessError {
    #[error("Authorization token is missing")]
    MissingToken,
    #[error("Authorization token is invalid")]
    InvalidToken,
    #[error("No secret is configured on the server")]
    SecretNotConfigured,
    #[error("Authorization required")]
    MissingPrincipal,
    #[error("Principal '{0}' is not an active administrator")]
    NotAdmin(String),
    #[error("Token error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

// --- Webhook shared secret ---

/// Validates webhook callers against a shared secret injected at construction.
#[derive(Clone)]
pub struct WebhookGate {
    secret: String,
}

impl std::fmt::Debug for WebhookGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookGate")
            .field("secret_configured", &!self.secret.is_empty())
            .finish()
    }
}

impl WebhookGate {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Checks the token presented by the caller.
    ///
    /// The token must be non-empty and byte-for-byte equal to the configured secret.
    /// An empty configured secret rejects everything.
    pub fn authorize(&self, presented: Option<&str>) -> Result<(), AccessError> {
        let presented = match presented {
            Some(token) if !token.is_empty() => token,
            _ => {
                warn!("Webhook request rejected: no token presented.");
                return Err(AccessError::MissingToken);
            }
        };

        if self.secret.is_empty() {
            warn!("Webhook request rejected: api_token is not configured.");
            return Err(AccessError::SecretNotConfigured);
        }

        if constant_time_eq(presented.as_bytes(), self.secret.as_bytes()) {
            Ok(())
        } else {
            warn!("Webhook request rejected: token mismatch.");
            Err(AccessError::InvalidToken)
        }
    }

    /// Checks a raw `Authorization` header value.
    ///
    /// The value is compared as sent first. Only if that fails is a leading
    /// `Bearer ` removed and the remainder compared.
    pub fn authorize_header(&self, header: Option<&str>) -> Result<(), AccessError> {
        let stripped = header.and_then(|h| h.strip_prefix("Bearer "));
        match (self.authorize(header), stripped) {
            (Err(AccessError::InvalidToken), Some(token)) => self.authorize(Some(token)),
            (result, _) => result,
        }
    }

    /// Predicate form of [`WebhookGate::authorize`].
    pub fn is_authorized(&self, presented: Option<&str>) -> bool {
        self.authorize(presented).is_ok()
    }
}

// --- Administrative principals ---

/// An authenticated identity, as resolved by an [`AuthProvider`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub subject: String,
    pub role: String,
    pub active: bool,
}

impl Principal {
    pub fn admin(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            role: ADMIN_ROLE.to_string(),
            active: true,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.active && self.role == ADMIN_ROLE
    }
}

/// Requires an active administrator.
///
/// Absent principals and principals without the admin role both fail.
pub fn authorize_admin(principal: Option<&Principal>) -> Result<&Principal, AccessError> {
    match principal {
        Some(p) if p.is_admin() => Ok(p),
        Some(p) => {
            warn!(subject = %p.subject, role = %p.role, "Admin access denied.");
            Err(AccessError::NotAdmin(p.subject.clone()))
        }
        None => {
            warn!("Admin access denied: no authenticated principal.");
            Err(AccessError::MissingPrincipal)
        }
    }
}

/// Resolves the caller behind a bearer token.
pub trait AuthProvider: Send + Sync {
    fn resolve(&self, token: &str) -> Result<Principal, AccessError>;

    /// Returns the principal only if it is an active administrator.
    fn current_admin_principal(&self, token: Option<&str>) -> Option<Principal> {
        let principal = match token {
            Some(token) => self
                .resolve(token)
                .map_err(|e| warn!("Bearer token could not be resolved: {}", e))
                .ok()?,
            None => return None,
        };
        principal.is_admin().then_some(principal)
    }
}

/// Represents the claims we expect to find in the JWT.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The subject of the token, the admin's user name.
    pub sub: String,
    /// The expiration timestamp.
    pub exp: usize,
    #[serde(default)]
    pub role: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// HS256 bearer-token provider backed by a shared `jwt_secret`.
#[derive(Clone)]
pub struct JwtAuthProvider {
    decoding_key: DecodingKey,
    validation: Validation,
    secret_configured: bool,
}

impl std::fmt::Debug for JwtAuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtAuthProvider").finish_non_exhaustive()
    }
}

impl JwtAuthProvider {
    /// An empty secret rejects every token.
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
            secret_configured: !secret.is_empty(),
        }
    }
}

impl AuthProvider for JwtAuthProvider {
    fn resolve(&self, token: &str) -> Result<Principal, AccessError> {
        if !self.secret_configured {
            warn!("Bearer token rejected: jwt_secret is not configured.");
            return Err(AccessError::SecretNotConfigured);
        }
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(Principal {
            subject: data.claims.sub,
            role: data.claims.role,
            active: data.claims.active,
        })
    }
}

/// Mints a token that [`JwtAuthProvider`] will accept.
pub fn issue_token(
    secret: &str,
    subject: &str,
    role: &str,
    ttl: Duration,
) -> Result<String, AccessError> {
    if secret.is_empty() {
        return Err(AccessError::SecretNotConfigured);
    }
    let exp = (Utc::now() + ttl).timestamp().max(0) as usize;
    let claims = Claims {
        sub: subject.to_string(),
        exp,
        role: role.to_string(),
        active: true,
    };
    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "s3cr3t-jwt";

    #[test]
    fn test_webhook_gate_accepts_exact_secret() {
        let gate = WebhookGate::new("hook-token");
        assert!(gate.authorize(Some("hook-token")).is_ok());
    }

    #[test]
    fn test_webhook_gate_rejects_mismatch_and_absence() {
        let gate = WebhookGate::new("hook-token");

        assert!(matches!(
            gate.authorize(Some("hook-token2")),
            Err(AccessError::InvalidToken)
        ));
        assert!(matches!(
            gate.authorize(Some("")),
            Err(AccessError::MissingToken)
        ));
        assert!(matches!(gate.authorize(None), Err(AccessError::MissingToken)));
    }

    #[test]
    fn test_webhook_gate_with_empty_secret_rejects_everything() {
        let gate = WebhookGate::new("");
        assert!(!gate.is_authorized(Some("anything")));
        assert!(!gate.is_authorized(Some("")));
    }

    #[test]
    fn test_authorize_admin() {
        let admin = Principal::admin("root");
        let user = Principal {
            subject: "bob".to_string(),
            role: "user".to_string(),
            active: true,
        };
        let disabled = Principal {
            active: false,
            ..Principal::admin("old-admin")
        };

        assert_eq!(authorize_admin(Some(&admin)).unwrap().subject, "root");
        assert!(matches!(
            authorize_admin(Some(&user)),
            Err(AccessError::NotAdmin(s)) if s == "bob"
        ));
        assert!(authorize_admin(Some(&disabled)).is_err());
        assert!(matches!(
            authorize_admin(None),
            Err(AccessError::MissingPrincipal)
        ));
    }

    #[test]
    fn test_jwt_round_trip_resolves_admin() {
        let token = issue_token(SECRET, "alice", ADMIN_ROLE, Duration::hours(1)).unwrap();
        let provider = JwtAuthProvider::new(SECRET);

        let principal = provider.current_admin_principal(Some(&token));
        assert_eq!(principal, Some(Principal::admin("alice")));
    }

    #[test]
    fn test_jwt_rejects_wrong_secret_expired_and_non_admin() {
        let provider = JwtAuthProvider::new(SECRET);

        let forged = issue_token("other-secret", "mallory", ADMIN_ROLE, Duration::hours(1)).unwrap();
        assert!(provider.resolve(&forged).is_err());
        assert!(provider.current_admin_principal(Some(&forged)).is_none());

        // Well beyond the default 60 second leeway.
        let expired = issue_token(SECRET, "alice", ADMIN_ROLE, Duration::hours(-2)).unwrap();
        assert!(provider.current_admin_principal(Some(&expired)).is_none());

        let user = issue_token(SECRET, "bob", "user", Duration::hours(1)).unwrap();
        assert_eq!(provider.resolve(&user).unwrap().role, "user");
        assert!(provider.current_admin_principal(Some(&user)).is_none());

        assert!(provider.current_admin_principal(Some("not-a-jwt")).is_none());
        assert!(provider.current_admin_principal(None).is_none());
    }

    #[test]
    fn test_empty_jwt_secret_rejects_every_token() {
        let provider = JwtAuthProvider::new("");

        let forged = encode(
            &Header::default(),
            &Claims {
                sub: "mallory".to_string(),
                exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
                role: ADMIN_ROLE.to_string(),
                active: true,
            },
            &EncodingKey::from_secret(b""),
        )
        .unwrap();

        assert!(matches!(
            provider.resolve(&forged),
            Err(AccessError::SecretNotConfigured)
        ));
        assert!(provider.current_admin_principal(Some(&forged)).is_none());
        assert!(matches!(
            issue_token("", "mallory", ADMIN_ROLE, Duration::hours(1)),
            Err(AccessError::SecretNotConfigured)
        ));
    }

    #[test]
    fn test_webhook_header_matches_raw_value_before_bearer_form() {
        let gate = WebhookGate::new("hook-token");
        assert!(gate.authorize_header(Some("hook-token")).is_ok());
        assert!(gate.authorize_header(Some("Bearer hook-token")).is_ok());
        assert!(gate.authorize_header(Some("Bearer wrong")).is_err());

        // A secret that itself starts with "Bearer " still matches exactly.
        let gate = WebhookGate::new("Bearer abc");
        assert!(gate.authorize_header(Some("Bearer abc")).is_ok());
        assert!(gate.authorize_header(Some("Bearer Bearer abc")).is_ok());
        assert!(matches!(
            gate.authorize_header(Some("abc")),
            Err(AccessError::InvalidToken)
        ));
        assert!(matches!(
            gate.authorize_header(None),
            Err(AccessError::MissingToken)
        ));
    }
}
