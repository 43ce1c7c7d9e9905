//! Seams between the face index and the systems it does not own: the descriptor store,
//! the photo catalog, the image storage and the descriptor extractor
//! (see [`crate::extractor::DescriptorExtractor`]).

use crate::database::DbError;
use crate::database::face_encoding::{FaceEncodingRecord, FaceMatch};
use crate::database::photo::Photo;
use async_trait::async_trait;
use common_types::{DetectedFace, Descriptor, Distance, WorkingSet};
use image::DynamicImage;
use std::collections::HashMap;

#[async_trait]
pub trait DescriptorStore: Send + Sync {
    /// Atomically replaces all records of `photo_id` with one record per face.
    ///
    /// Readers never observe a partially written set.
    async fn replace_for_photo(
        &self,
        photo_id: &str,
        faces: &[DetectedFace],
    ) -> Result<Vec<FaceEncodingRecord>, DbError>;

    async fn delete_for_photo(&self, photo_id: &str) -> Result<u64, DbError>;

    /// The closest face of every photo within `threshold` of `query`, closest first, at
    /// most `limit` photos. Ties are ordered by photo id.
    async fn nearest(
        &self,
        query: &Descriptor,
        threshold: Distance,
        limit: usize,
    ) -> Result<Vec<FaceMatch>, DbError>;
}

#[async_trait]
pub trait PhotoCatalog: Send + Sync {
    async fn find_photo(&self, photo_id: &str) -> Result<Option<Photo>, DbError>;

    /// Photos of `working_set` that are not face-indexed yet, in catalog order, or in the
    /// caller's order for an explicit list.
    async fn unindexed_photos(&self, working_set: &WorkingSet) -> Result<Vec<Photo>, DbError>;

    async fn set_face_indexed(&self, photo_id: &str, indexed: bool) -> Result<(), DbError>;
}

#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn load(&self, photo: &Photo) -> color_eyre::Result<DynamicImage>;
}

/// Orders `photos` by the position of their id in `requested`, dropping duplicates.
#[must_use]
pub fn in_requested_order(photos: Vec<Photo>, requested: &[String]) -> Vec<Photo> {
    let mut by_id: HashMap<String, Photo> =
        photos.into_iter().map(|p| (p.id.clone(), p)).collect();
    requested.iter().filter_map(|id| by_id.remove(id)).collect()
}
