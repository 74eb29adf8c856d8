pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::evaluation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/evaluations",
            post(handlers::handle_evaluate).get(handlers::handle_list_history),
        )
        .with_state(state)
}
