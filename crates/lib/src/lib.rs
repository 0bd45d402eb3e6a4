//! # subhook
//!
//! Ingests media-request notifications from Jellyseerr / Overseerr and turns
//! each approved request into independent subscription jobs for a subscription
//! engine, one per title or per requested season.
//!
//! - [`webhook`]: parses and normalizes webhook bodies into intents.
//! - [`dispatch`]: runs each intent as a fire-and-forget background job.
//! - [`admin`]: admin-gated list, refresh and search pass-throughs.
//! - [`engine`]: the contracts a subscription engine implements.

pub mod admin;
pub mod dispatch;
pub mod engine;
pub mod errors;
pub mod providers;
pub mod types;
pub mod webhook;

pub use admin::{AdminError, AdminOperations};
pub use dispatch::{DispatchReceipt, JobDispatcher};
pub use engine::{SubscriptionEngine, SubscriptionStore};
pub use errors::{EngineError, PayloadError};
pub use types::{MediaKind, Subscription, SubscriptionIntent, SubscriptionState};
pub use webhook::{normalize, parse_envelope, IgnoreReason, Normalization, WebhookEnvelope};
