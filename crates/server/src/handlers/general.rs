//! # General Route Handlers

pub async fn health_check() -> &'static str {
    "OK"
}
