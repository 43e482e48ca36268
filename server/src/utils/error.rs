use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::presentation::PresentationError;
use crate::repository::RepositoryError;
use crate::store::StoreError;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {}", .0.join("; "))]
    ValidationError(Vec<String>),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    #[error("Chat surface error: {0}")]
    PresentationError(#[from] PresentationError),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => {
                AppError::NotFound(format!("No event with id '{}' exists in this channel", id))
            }
            RepositoryError::Malformed(e) => AppError::MalformedRecord(e.to_string()),
            RepositoryError::Store(e) => AppError::StoreError(e),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MalformedRecord(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::StoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::PresentationError(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::MalformedRecord(_) => "MALFORMED_RECORD",
            AppError::StoreError(_) => "STORE_ERROR",
            AppError::PresentationError(_) => "PRESENTATION_ERROR",
        }
    }

    /// Text shown to chat users. Store failures include their cause; malformed
    /// records do not leak attribute details.
    pub fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(errors) => errors.join("\n"),
            AppError::NotFound(msg) => msg.clone(),
            AppError::MalformedRecord(_) => {
                "A stored event could not be read. Please report this to an administrator."
                    .to_string()
            }
            AppError::StoreError(e) => format!("The event store is unavailable: {}", e),
            AppError::PresentationError(e) => format!("Could not update the channel: {}", e),
        }
    }

    pub fn log(&self) {
        match self {
            AppError::ValidationError(errors) => {
                warn!(errors = ?errors, "Command rejected");
            }
            AppError::NotFound(msg) => {
                warn!(message = %msg, "Resource not found");
            }
            AppError::MalformedRecord(msg) => {
                error!(message = %msg, "Malformed record in store");
            }
            AppError::StoreError(e) => {
                error!(error = ?e, "Store error");
            }
            AppError::PresentationError(e) => {
                error!(error = ?e, "Chat surface error");
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        self.log();

        let details = match &self {
            AppError::ValidationError(errors) => Some(json!({ "errors": errors })),
            _ => None,
        };

        error_response(code, self.public_message(), details, status)
    }
}
