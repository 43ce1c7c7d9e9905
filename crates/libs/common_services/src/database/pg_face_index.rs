use crate::database::face_encoding::{FaceEncodingRecord, FaceMatch};
use crate::database::photo::Photo;
use crate::database::{DbError, FaceEncodingStore, PhotoStore};
use crate::interfaces::{DescriptorStore, PhotoCatalog, in_requested_order};
use async_trait::async_trait;
use common_types::{
    DescriptorError, DetectedFace, Descriptor, Distance, ModelVersion, WorkingSet,
};
use sqlx::PgPool;

/// Postgres + pgvector backed descriptor store and photo catalog.
#[derive(Clone)]
pub struct PgFaceIndex {
    pool: PgPool,
    model_version: ModelVersion,
}

impl PgFaceIndex {
    #[must_use]
    pub const fn new(pool: PgPool, model_version: ModelVersion) -> Self {
        Self {
            pool,
            model_version,
        }
    }
}

#[async_trait]
impl DescriptorStore for PgFaceIndex {
    async fn replace_for_photo(
        &self,
        photo_id: &str,
        faces: &[DetectedFace],
    ) -> Result<Vec<FaceEncodingRecord>, DbError> {
        for face in faces {
            check_descriptor_model(&self.model_version, &face.descriptor)?;
        }

        let mut tx = self.pool.begin().await?;
        FaceEncodingStore::delete_by_photo_id(&mut *tx, photo_id).await?;
        let rows = FaceEncodingStore::create_many(&mut tx, photo_id, faces).await?;
        tx.commit().await?;

        rows.into_iter()
            .map(|row| row.into_record(&self.model_version))
            .collect()
    }

    async fn delete_for_photo(&self, photo_id: &str) -> Result<u64, DbError> {
        FaceEncodingStore::delete_by_photo_id(&self.pool, photo_id).await
    }

    async fn nearest(
        &self,
        query: &Descriptor,
        threshold: Distance,
        limit: usize,
    ) -> Result<Vec<FaceMatch>, DbError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        FaceEncodingStore::nearest(&self.pool, query, threshold, limit).await
    }
}

#[async_trait]
impl PhotoCatalog for PgFaceIndex {
    async fn find_photo(&self, photo_id: &str) -> Result<Option<Photo>, DbError> {
        PhotoStore::find_by_id(&self.pool, photo_id).await
    }

    async fn unindexed_photos(&self, working_set: &WorkingSet) -> Result<Vec<Photo>, DbError> {
        match working_set {
            WorkingSet::Photographer { photographer_id } => {
                PhotoStore::list_unindexed_by_photographer(&self.pool, photographer_id).await
            }
            WorkingSet::Event { event_id } => {
                PhotoStore::list_unindexed_by_event(&self.pool, event_id).await
            }
            WorkingSet::Photos { photo_ids } => {
                let photos = PhotoStore::list_unindexed_by_ids(&self.pool, photo_ids).await?;
                Ok(in_requested_order(photos, photo_ids))
            }
        }
    }

    async fn set_face_indexed(&self, photo_id: &str, indexed: bool) -> Result<(), DbError> {
        PhotoStore::set_face_indexed(&self.pool, photo_id, indexed).await
    }
}

/// Write-boundary check: every stored descriptor belongs to the active model.
pub fn check_descriptor_model(
    model_version: &ModelVersion,
    descriptor: &Descriptor,
) -> Result<(), DbError> {
    if descriptor.model_version().name != model_version.name {
        return Err(DbError::InvalidDescriptor(
            DescriptorError::ModelVersionMismatch {
                expected: model_version.name.clone(),
                actual: descriptor.model_version().name.clone(),
            },
        ));
    }
    model_version
        .check_len(descriptor.len())
        .map_err(DbError::InvalidDescriptor)
}
