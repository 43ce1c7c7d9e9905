use crate::database::DbError;
use chrono::{DateTime, Utc};
use common_types::{BoundingRegion, Descriptor, Distance, ModelVersion};
use pgvector::Vector;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// One indexed face. Never updated after insertion, re-indexing replaces the whole set
/// of records of a photo.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceEncodingRecord {
    pub id: i64,
    pub photo_id: String,
    pub descriptor: Descriptor,
    pub confidence: f32,
    pub region: BoundingRegion,
    pub created_at: DateTime<Utc>,
}

/// Corresponds to the 'face_encoding' table.
#[derive(Debug, FromRow, Clone)]
pub struct FaceEncodingRow {
    pub id: i64,
    pub photo_id: String,
    pub model_version: String,
    pub descriptor: Vector,
    pub confidence: f32,
    pub region_x: f32,
    pub region_y: f32,
    pub region_width: f32,
    pub region_height: f32,
    pub created_at: DateTime<Utc>,
}

impl FaceEncodingRow {
    /// Validates the stored vector against the active model before it leaves the database layer.
    pub fn into_record(self, model_version: &ModelVersion) -> Result<FaceEncodingRecord, DbError> {
        let record_id = self.id;
        let corrupt = |source| DbError::CorruptDescriptor { record_id, source };
        if self.model_version != model_version.name {
            return Err(corrupt(common_types::DescriptorError::ModelVersionMismatch {
                expected: model_version.name.clone(),
                actual: self.model_version,
            }));
        }
        let descriptor = Descriptor::new(model_version, self.descriptor.to_vec()).map_err(corrupt)?;

        Ok(FaceEncodingRecord {
            id: self.id,
            photo_id: self.photo_id,
            descriptor,
            confidence: self.confidence,
            region: BoundingRegion {
                x: self.region_x,
                y: self.region_y,
                width: self.region_width,
                height: self.region_height,
            },
            created_at: self.created_at,
        })
    }
}

/// A single face that lies within the requested distance of a query.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FaceMatch {
    pub record_id: i64,
    pub photo_id: String,
    pub distance: Distance,
}
