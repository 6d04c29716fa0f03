//! API routes module

pub mod health;
pub mod products;

use axum::Router;

use crate::state::AppState;

/// API routes without the `/api` prefix, which `create_router` adds.
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/products", products::router(state))
        .merge(health::ready_router(state.clone()))
}
