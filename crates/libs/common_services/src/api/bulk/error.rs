use crate::database::DbError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum BulkIndexError {
    #[error("Could not load the working set: {0}")]
    Database(#[from] DbError),

    #[error("Another bulk job is already indexing {overlapping} of these photos")]
    AlreadyRunning { overlapping: usize },

    #[error("Bulk job {0} not found")]
    JobNotFound(String),
}

fn log_error(error: &BulkIndexError) {
    match error {
        BulkIndexError::AlreadyRunning { .. } | BulkIndexError::JobNotFound(_) => {
            warn!("Bulk index request refused: {}", error);
        }
        BulkIndexError::Database(_) => error!("Bulk index failed: {}", error),
    }
}

impl IntoResponse for BulkIndexError {
    fn into_response(self) -> Response {
        log_error(&self);

        let (status, error_message) = match self {
            Self::Database(DbError::Timeout { .. }) => {
                (StatusCode::GATEWAY_TIMEOUT, self.to_string())
            }
            Self::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred while starting the bulk job.".to_string(),
            ),
            Self::AlreadyRunning { .. } => (StatusCode::CONFLICT, self.to_string()),
            Self::JobNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
