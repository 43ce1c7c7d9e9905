use super::error::SearchError;
use super::interfaces::PhotoMatch;
use crate::api::index::selection::{SelectionError, select_query_face};
use crate::api::index::service::extract_faces;
use crate::context::FaceIndexContext;
use crate::database::face_encoding::FaceMatch;
use crate::database::with_store_timeout;
use app_state::SearchSettings;
use common_types::{Descriptor, DescriptorError, Distance};
use image::DynamicImage;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Validated search bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchBounds {
    pub threshold: Distance,
    pub max_results: usize,
}

/// Fills in defaults and checks the caller's bounds. `max_results` above the configured
/// cap is lowered to the cap.
pub fn resolve_bounds(
    settings: &SearchSettings,
    threshold: Option<Distance>,
    max_results: Option<usize>,
) -> Result<SearchBounds, SearchError> {
    let threshold = threshold.unwrap_or(settings.default_threshold);
    if !threshold.is_finite() || !(0.0..=2.0).contains(&threshold) {
        return Err(SearchError::InvalidParameters(format!(
            "threshold must be within 0..=2, got {threshold}"
        )));
    }
    let max_results = max_results.unwrap_or(settings.default_max_results);
    if max_results == 0 {
        return Err(SearchError::InvalidParameters(
            "limit must be at least 1".to_string(),
        ));
    }
    Ok(SearchBounds {
        threshold,
        max_results: max_results.min(settings.max_results_cap),
    })
}

/// Reduces face candidates to one entry per photo with its best distance, keeps only
/// those within `threshold`, closest first, ties by photo id, at most `max_results`.
#[must_use]
pub fn collapse_matches(
    candidates: Vec<FaceMatch>,
    threshold: Distance,
    max_results: usize,
) -> Vec<PhotoMatch> {
    let mut best: HashMap<String, Distance> = HashMap::new();
    for candidate in candidates {
        if candidate.distance.is_nan() || candidate.distance > threshold {
            continue;
        }
        best.entry(candidate.photo_id)
            .and_modify(|d| *d = d.min(candidate.distance))
            .or_insert(candidate.distance);
    }

    let mut matches: Vec<PhotoMatch> = best
        .into_iter()
        .map(|(photo_id, distance)| PhotoMatch { photo_id, distance })
        .collect();
    matches.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.photo_id.cmp(&b.photo_id))
    });
    matches.truncate(max_results);
    matches
}

fn check_query(context: &FaceIndexContext, query: &Descriptor) -> Result<(), SearchError> {
    let active = &context.settings.model_version;
    active.check_len(query.len())?;
    if query.model_version().name != active.name {
        return Err(SearchError::ModelVersionMismatch {
            expected: active.name.clone(),
            actual: query.model_version().name.clone(),
        });
    }
    Ok(())
}

/// Photos with a face within `threshold` cosine distance of `query`.
///
/// An empty result is a valid answer. The query must come from the active model and is
/// never truncated or padded to fit.
#[instrument(skip(context, query), err(Debug))]
pub async fn search_faces(
    context: &FaceIndexContext,
    query: &Descriptor,
    threshold: Option<Distance>,
    max_results: Option<usize>,
) -> Result<Vec<PhotoMatch>, SearchError> {
    check_query(context, query)?;
    let settings = &context.settings;
    let bounds = resolve_bounds(&settings.search, threshold, max_results)?;

    let candidates = with_store_timeout(
        settings.store_timeout,
        "nearest",
        context
            .store
            .nearest(query, bounds.threshold, bounds.max_results),
    )
    .await?;
    debug!("Store returned {} matching photos", candidates.len());

    Ok(collapse_matches(
        candidates,
        bounds.threshold,
        bounds.max_results,
    ))
}

/// Searches with a raw descriptor supplied by the caller.
#[instrument(skip(context, values), err(Debug))]
pub async fn search_by_values(
    context: &FaceIndexContext,
    values: Vec<f32>,
    model_version: Option<&str>,
    threshold: Option<Distance>,
    max_results: Option<usize>,
) -> Result<Vec<PhotoMatch>, SearchError> {
    let active = &context.settings.model_version;
    active.check_len(values.len())?;
    if let Some(name) = model_version
        && name != active.name
    {
        return Err(DescriptorError::ModelVersionMismatch {
            expected: active.name.clone(),
            actual: name.to_owned(),
        }
        .into());
    }
    let query = Descriptor::new(active, values)?;
    search_faces(context, &query, threshold, max_results).await
}

/// Decodes an uploaded query image off the async workers.
pub async fn decode_query_image(bytes: Vec<u8>) -> Result<DynamicImage, SearchError> {
    let image = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes)).await??;
    Ok(image)
}

/// Searches with the face in a buyer's selfie.
#[instrument(skip(context, image), err(Debug))]
pub async fn search_by_selfie(
    context: &FaceIndexContext,
    image: &DynamicImage,
    threshold: Option<Distance>,
    max_results: Option<usize>,
) -> Result<Vec<PhotoMatch>, SearchError> {
    resolve_bounds(&context.settings.search, threshold, max_results)?;
    let faces = extract_faces(context, image).await?;
    let face = select_query_face(
        faces,
        context.settings.min_confidence,
        context.settings.multi_face_policy,
    )
    .map_err(|e| match e {
        SelectionError::NoUsableFace => SearchError::NoFaceDetected,
        SelectionError::Ambiguous(count) => SearchError::AmbiguousFaceCount(count),
    })?;
    search_faces(context, &face.descriptor, threshold, max_results).await
}
