use super::{handlers, state::AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Creates the Axum router with all the application routes.
///
/// The subscription endpoints are mounted under `route_prefix`.
pub fn create_router(app_state: AppState) -> Router {
    let prefix = app_state.config.route_prefix.trim_end_matches('/').to_string();

    let subscribe_routes = Router::new()
        .route("/", get(handlers::list_subscriptions_handler))
        .route("/seerr", post(handlers::seerr_webhook_handler))
        .route("/refresh", get(handlers::refresh_subscriptions_handler))
        .route("/search", get(handlers::search_subscriptions_handler));

    let router = Router::new().route("/health", get(handlers::health_check));
    let router = if prefix.is_empty() {
        router.merge(subscribe_routes)
    } else {
        router.nest(&prefix, subscribe_routes)
    };

    router.with_state(app_state).layer(TraceLayer::new_for_http())
}
