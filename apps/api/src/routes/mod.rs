pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::scout::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/api/v1/scout", post(handlers::handle_scout))
        .route(
            "/api/v1/scout/markdown",
            post(handlers::handle_scout_markdown),
        )
        .with_state(state)
}
