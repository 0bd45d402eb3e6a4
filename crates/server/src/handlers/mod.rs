//! # API Route Handlers
//!
//! This module organizes all the Axum route handlers for the `subhook-server`.
//! The handlers are split into logical sub-modules based on who may call them.

pub mod admin_handlers;
pub mod general;
pub mod subscribe_handlers;

// Re-export all handlers from the sub-modules to make them easily accessible
// to the router under a single `handlers::` path.
pub use admin_handlers::*;
pub use general::*;
pub use subscribe_handlers::*;
