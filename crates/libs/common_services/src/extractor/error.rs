use common_types::DescriptorError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Face analysis service returned {status}: {message}")]
    ServiceError { status: u16, message: String },

    #[error("Could not encode image for extraction: {0}")]
    EncodeError(#[from] image::ImageError),

    #[error("Extractor runs model {actual}, expected {expected}")]
    ModelMismatch { expected: String, actual: String },

    #[error("Extractor returned an unusable descriptor: {0}")]
    InvalidDescriptor(#[from] DescriptorError),

    #[error("Extraction timed out after {0:?}")]
    Timeout(Duration),

    #[error("Extraction task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),
}
