//! # Admin Route Handlers
//!
//! This module contains handlers for endpoints that require an administrator.
//! Each one reports whether the engine call was triggered and returned, not what
//! it went on to do.

use crate::{
    auth::AdminPrincipal,
    errors::AppError,
    state::AppState,
    types::{SearchParams, SuccessResponse},
};
use axum::{
    extract::{Query, State},
    Json,
};
use subhook::Subscription;
use tracing::info;

/// Handler for `GET /`: every stored subscription, as the store returns them.
pub async fn list_subscriptions_handler(
    State(app_state): State<AppState>,
    admin: AdminPrincipal,
) -> Result<Json<Vec<Subscription>>, AppError> {
    let subscriptions = app_state.admin.list(admin.principal()).await?;
    info!(count = subscriptions.len(), "Returning subscription list.");
    Ok(Json(subscriptions))
}

/// Handler for `GET /refresh`.
pub async fn refresh_subscriptions_handler(
    State(app_state): State<AppState>,
    admin: AdminPrincipal,
) -> Result<Json<SuccessResponse>, AppError> {
    app_state.admin.refresh_all(admin.principal()).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Handler for `GET /search`, optionally scoped with `?state=N|R|P`.
pub async fn search_subscriptions_handler(
    State(app_state): State<AppState>,
    admin: AdminPrincipal,
    Query(params): Query<SearchParams>,
) -> Result<Json<SuccessResponse>, AppError> {
    let state = params
        .state
        .unwrap_or(app_state.config.search.default_state);
    app_state.admin.search_all(admin.principal(), state).await?;
    Ok(Json(SuccessResponse::ok()))
}
