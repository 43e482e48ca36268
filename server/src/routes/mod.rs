use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{health_check, list_messages, run_command};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/channels/:channel/commands", post(run_command))
        .route("/channels/:channel/messages", get(list_messages))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
