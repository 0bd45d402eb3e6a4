//! # Authentication
//!
//! Request-level credential extraction. The checks themselves live in `core-access`.

pub mod middleware;

pub use middleware::{AdminPrincipal, WebhookToken};
