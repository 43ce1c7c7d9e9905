mod error;
mod http;

pub use error::*;
pub use http::*;

use async_trait::async_trait;
use common_types::DetectedFace;
use image::DynamicImage;

/// The face detection + description capability.
///
/// An empty result means no face was found. Anything that prevents a verdict (model
/// unavailable, unreadable image) is an error instead.
#[async_trait]
pub trait DescriptorExtractor: Send + Sync {
    async fn extract(&self, image: &DynamicImage) -> Result<Vec<DetectedFace>, ExtractionError>;
}
