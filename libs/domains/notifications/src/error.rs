use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Notification not found: {0}")]
    NotFound(Uuid),

    #[error("userId is required")]
    MissingUserId,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type NotificationResult<T> = Result<T, NotificationError>;

/// `{success: false, message}` body used for every failed request
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl IntoResponse for NotificationError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            NotificationError::NotFound(_) => (StatusCode::OK, "Notification not found".to_string()),
            NotificationError::MissingUserId | NotificationError::Validation(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            NotificationError::Database(details) => {
                tracing::error!(error = %details, "Notification request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                message,
            }),
        )
            .into_response()
    }
}

impl From<mongodb::error::Error> for NotificationError {
    fn from(err: mongodb::error::Error) -> Self {
        NotificationError::Database(err.to_string())
    }
}
