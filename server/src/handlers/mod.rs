use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::controller::Outcome;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "huddle-server",
    };

    success(payload, "Health check successful")
}

/// A slash command delivered by the chat platform.
#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub author: String,
    pub text: String,
}

#[derive(Serialize)]
struct DeletedPayload {
    id: String,
}

/// POST /channels/:channel/commands
pub async fn run_command(
    State(state): State<AppState>,
    Path(channel): Path<String>,
    Json(request): Json<CommandRequest>,
) -> Response {
    tracing::debug!(channel = %channel, author = %request.author, "Command received");

    match state
        .controller
        .handle(&channel, &request.author, &request.text)
        .await
    {
        Outcome::Created(event) => created(event, "Event created"),
        Outcome::Listed(events) => {
            let message = format!("{} upcoming event(s)", events.len());
            success(events, message)
        }
        Outcome::Deleted(id) => success(DeletedPayload { id }, "Event deleted"),
        Outcome::Failed(err) => err.into_response(),
    }
}

/// GET /channels/:channel/messages
pub async fn list_messages(
    State(state): State<AppState>,
    Path(channel): Path<String>,
) -> Response {
    match state.surface.messages(&channel).await {
        Ok(messages) => success(messages, "Channel messages"),
        Err(e) => AppError::from(e).into_response(),
    }
}
