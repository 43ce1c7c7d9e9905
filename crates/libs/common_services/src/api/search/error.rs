use crate::database::DbError;
use crate::extractor::ExtractionError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use common_types::DescriptorError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("No face detected in the query image")]
    NoFaceDetected,

    #[error("{0} faces detected in the query image, expected one")]
    AmbiguousFaceCount(usize),

    #[error("Query descriptor has {actual} dimensions, the active model uses {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Query descriptor comes from model {actual}, the active model is {expected}")]
    ModelVersionMismatch { expected: String, actual: String },

    #[error("Invalid search parameters: {0}")]
    InvalidParameters(String),

    #[error("Invalid query descriptor: {0}")]
    InvalidDescriptor(DescriptorError),

    #[error("Face extraction failed: {0}")]
    ExtractionFailure(#[from] ExtractionError),

    #[error("Search query failed: {0}")]
    PersistenceError(#[from] DbError),

    #[error("Could not read the uploaded image: {0}")]
    UnreadableImage(#[from] image::ImageError),

    #[error("Image decoding task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),
}

impl From<DescriptorError> for SearchError {
    fn from(err: DescriptorError) -> Self {
        match err {
            DescriptorError::DimensionMismatch {
                expected, actual, ..
            } => Self::DimensionMismatch { expected, actual },
            DescriptorError::ModelVersionMismatch { expected, actual } => {
                Self::ModelVersionMismatch { expected, actual }
            }
            other @ (DescriptorError::NonFinite { .. } | DescriptorError::ZeroNorm) => {
                Self::InvalidDescriptor(other)
            }
        }
    }
}

fn log_error(error: &SearchError) {
    match error {
        SearchError::ExtractionFailure(_)
        | SearchError::PersistenceError(_)
        | SearchError::TaskError(_) => {
            error!("Search failed: {}", error);
        }
        _ => warn!("Search rejected: {}", error),
    }
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        log_error(&self);

        let (status, error_message) = match self {
            Self::ExtractionFailure(ExtractionError::Timeout(_))
            | Self::PersistenceError(DbError::Timeout { .. }) => {
                (StatusCode::GATEWAY_TIMEOUT, self.to_string())
            }
            Self::NoFaceDetected
            | Self::AmbiguousFaceCount(_)
            | Self::DimensionMismatch { .. }
            | Self::ModelVersionMismatch { .. }
            | Self::InvalidDescriptor(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            Self::InvalidParameters(_) | Self::UnreadableImage(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            Self::ExtractionFailure(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            Self::PersistenceError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "A database error occurred.".to_string(),
            ),
            Self::TaskError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected internal error occurred.".to_string(),
            ),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
