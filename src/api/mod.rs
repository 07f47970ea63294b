//! API module
//!
//! HTTP API endpoints and middleware.

pub mod extract;
pub mod middleware;
pub mod routes;
mod state;

use axum::{middleware as axum_middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

pub use routes::create_router;
pub use state::AppState;

/// Build the application router with middleware and state attached
pub fn build_router(state: AppState) -> Router {
    // Axum layers are applied in reverse order (last added = first executed)
    // Order: context -> logging -> handler
    let api_router = create_router()
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(axum_middleware::from_fn(middleware::context_middleware));

    Router::new()
        // Health check (no request context)
        .route("/health", get(health_check))
        .merge(api_router)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
