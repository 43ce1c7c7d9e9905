use crate::Descriptor;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Face location, relative to the image size (all values in `0..=1`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BoundingRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// One face as reported by the descriptor extractor.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedFace {
    pub descriptor: Descriptor,
    pub confidence: f32,
    pub region: BoundingRegion,
}

/// What to do when a photo contains more than one usable face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MultiFacePolicy {
    /// Store a record for every usable face.
    #[default]
    IndexAll,
    /// Store only the face the extractor is most confident about.
    HighestConfidence,
    /// Refuse the photo.
    Reject,
}
