use crate::database::DbError;
use crate::extractor::ExtractionError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use color_eyre::eyre;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Photo {0} not found")]
    PhotoNotFound(String),

    #[error("No face detected")]
    NoFaceDetected,

    #[error("{0} faces detected, cannot pick one")]
    AmbiguousFaceCount(usize),

    #[error("Face extraction failed: {0}")]
    ExtractionFailure(#[from] ExtractionError),

    #[error("Could not load photo image: {0}")]
    ImageUnavailable(eyre::Report),

    #[error("Could not store face records: {0}")]
    PersistenceError(#[from] DbError),

    /// Records were written, but the photo is still marked unindexed. Retrying replaces the
    /// records instead of duplicating them.
    #[error("{records} face records stored but marking the photo indexed failed: {source}")]
    FlagUpdateFailed { records: usize, source: DbError },
}

impl IndexError {
    /// Whether the same call may succeed when repeated later.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::PhotoNotFound(_) | Self::NoFaceDetected | Self::AmbiguousFaceCount(_) => false,
            Self::ExtractionFailure(_)
            | Self::ImageUnavailable(_)
            | Self::PersistenceError(_)
            | Self::FlagUpdateFailed { .. } => true,
        }
    }

    const fn is_timeout(&self) -> bool {
        match self {
            Self::ExtractionFailure(ExtractionError::Timeout(_)) => true,
            Self::PersistenceError(e) | Self::FlagUpdateFailed { source: e, .. } => e.is_timeout(),
            _ => false,
        }
    }
}

fn log_error(error: &IndexError) {
    match error {
        IndexError::NoFaceDetected | IndexError::AmbiguousFaceCount(_) => {
            warn!("Photo not indexed: {}", error);
        }
        IndexError::PhotoNotFound(id) => warn!("Photo {} not found", id),
        _ => error!("Indexing failed: {}", error),
    }
}

impl IntoResponse for IndexError {
    fn into_response(self) -> Response {
        log_error(&self);

        let status = match &self {
            _ if self.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            Self::PhotoNotFound(_) => StatusCode::NOT_FOUND,
            Self::NoFaceDetected | Self::AmbiguousFaceCount(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ExtractionFailure(_) => StatusCode::BAD_GATEWAY,
            Self::ImageUnavailable(_) | Self::PersistenceError(_) | Self::FlagUpdateFailed { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let error_message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "An internal error occurred while indexing.".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "error": error_message,
            "retryable": self.is_retryable(),
        }));
        (status, body).into_response()
    }
}
