use crate::database::face_encoding::FaceEncodingRecord;
use chrono::{DateTime, Utc};
use common_types::BoundingRegion;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, PartialEq)]
pub enum IndexOutcome {
    /// New records were stored and the photo is marked indexed.
    Indexed(Vec<FaceEncodingRecord>),
    /// The photo was indexed before and `force` was not set, nothing happened.
    AlreadyIndexed,
}

impl IndexOutcome {
    #[must_use]
    pub fn face_count(&self) -> usize {
        match self {
            Self::Indexed(records) => records.len(),
            Self::AlreadyIndexed => 0,
        }
    }
}

#[derive(Deserialize, IntoParams, ToSchema, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct IndexPhotoParams {
    /// Re-index even if the photo is already indexed, superseding its records.
    #[serde(default)]
    pub force: bool,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum IndexStatus {
    Indexed,
    AlreadyIndexed,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct IndexedFace {
    pub record_id: i64,
    pub confidence: f32,
    pub region: BoundingRegion,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct IndexPhotoResponse {
    pub photo_id: String,
    pub status: IndexStatus,
    pub faces: Vec<IndexedFace>,
}

impl IndexPhotoResponse {
    #[must_use]
    pub fn new(photo_id: &str, outcome: IndexOutcome) -> Self {
        let (status, faces) = match outcome {
            IndexOutcome::Indexed(records) => (
                IndexStatus::Indexed,
                records
                    .into_iter()
                    .map(|r| IndexedFace {
                        record_id: r.id,
                        confidence: r.confidence,
                        region: r.region,
                        created_at: r.created_at,
                    })
                    .collect(),
            ),
            IndexOutcome::AlreadyIndexed => (IndexStatus::AlreadyIndexed, Vec::new()),
        };
        Self {
            photo_id: photo_id.to_owned(),
            status,
            faces,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFacesResponse {
    pub photo_id: String,
    pub removed: u64,
}
