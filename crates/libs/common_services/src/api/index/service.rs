use super::error::IndexError;
use super::interfaces::IndexOutcome;
use super::selection::{SelectionError, select_faces};
use crate::alert;
use crate::context::FaceIndexContext;
use crate::database::photo::Photo;
use crate::database::with_store_timeout;
use crate::extractor::ExtractionError;
use common_types::DetectedFace;
use image::DynamicImage;
use tracing::{debug, info, instrument};

impl From<SelectionError> for IndexError {
    fn from(err: SelectionError) -> Self {
        match err {
            SelectionError::NoUsableFace => Self::NoFaceDetected,
            SelectionError::Ambiguous(count) => Self::AmbiguousFaceCount(count),
        }
    }
}

async fn find_photo(context: &FaceIndexContext, photo_id: &str) -> Result<Photo, IndexError> {
    let timeout = context.settings.store_timeout;
    with_store_timeout(timeout, "find_photo", context.catalog.find_photo(photo_id))
        .await?
        .ok_or_else(|| IndexError::PhotoNotFound(photo_id.to_owned()))
}

/// Runs the extractor under the configured timeout.
pub(crate) async fn extract_faces(
    context: &FaceIndexContext,
    image: &DynamicImage,
) -> Result<Vec<DetectedFace>, ExtractionError> {
    let after = context.settings.extractor_timeout;
    tokio::time::timeout(after, context.extractor.extract(image))
        .await
        .map_err(|_| ExtractionError::Timeout(after))?
}

/// Indexes the faces in `image` for an already-known photo.
///
/// An indexed photo is left alone unless `force` is set, then its records are replaced.
/// Any failure before the store write leaves existing records and the flag untouched.
#[instrument(skip(context, image), err(Debug))]
pub async fn index_photo(
    context: &FaceIndexContext,
    photo_id: &str,
    image: &DynamicImage,
    force: bool,
) -> Result<IndexOutcome, IndexError> {
    let photo = find_photo(context, photo_id).await?;
    if photo.is_face_indexed && !force {
        debug!("Photo {} is already indexed, skipping", photo_id);
        return Ok(IndexOutcome::AlreadyIndexed);
    }
    index_loaded_photo(context, &photo, image).await
}

async fn index_loaded_photo(
    context: &FaceIndexContext,
    photo: &Photo,
    image: &DynamicImage,
) -> Result<IndexOutcome, IndexError> {
    let settings = &context.settings;
    let detected = extract_faces(context, image).await?;
    let detected_count = detected.len();
    let faces = select_faces(detected, settings.min_confidence, settings.multi_face_policy)?;

    let records = with_store_timeout(
        settings.store_timeout,
        "replace_for_photo",
        context.store.replace_for_photo(&photo.id, &faces),
    )
    .await?;

    if let Err(source) = with_store_timeout(
        settings.store_timeout,
        "set_face_indexed",
        context.catalog.set_face_indexed(&photo.id, true),
    )
    .await
    {
        alert!(
            "Stored {} face records for photo {} but could not mark it indexed: {}",
            records.len(),
            photo.id,
            source
        );
        return Err(IndexError::FlagUpdateFailed {
            records: records.len(),
            source,
        });
    }

    info!(
        "Indexed photo {} with {} of {} detected faces",
        photo.id,
        records.len(),
        detected_count
    );
    Ok(IndexOutcome::Indexed(records))
}

/// Loads the photo's image through the configured image source, then indexes it.
#[instrument(skip(context), err(Debug))]
pub async fn index_photo_from_source(
    context: &FaceIndexContext,
    photo_id: &str,
    force: bool,
) -> Result<IndexOutcome, IndexError> {
    let photo = find_photo(context, photo_id).await?;
    if photo.is_face_indexed && !force {
        debug!("Photo {} is already indexed, skipping", photo_id);
        return Ok(IndexOutcome::AlreadyIndexed);
    }
    let image = context
        .images
        .load(&photo)
        .await
        .map_err(IndexError::ImageUnavailable)?;
    index_loaded_photo(context, &photo, &image).await
}

/// Deletes all face records of a photo and marks it unindexed. Returns the number of
/// records removed.
#[instrument(skip(context), err(Debug))]
pub async fn remove_photo_faces(
    context: &FaceIndexContext,
    photo_id: &str,
) -> Result<u64, IndexError> {
    let timeout = context.settings.store_timeout;
    find_photo(context, photo_id).await?;
    // Flag first: a photo flagged as indexed must never be left without records.
    with_store_timeout(
        timeout,
        "set_face_indexed",
        context.catalog.set_face_indexed(photo_id, false),
    )
    .await?;
    let removed = with_store_timeout(
        timeout,
        "delete_for_photo",
        context.store.delete_for_photo(photo_id),
    )
    .await?;
    info!("Removed {} face records of photo {}", removed, photo_id);
    Ok(removed)
}
