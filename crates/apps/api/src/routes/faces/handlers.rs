use crate::api_state::ApiContext;
use axum::Json;
use axum::extract::{Path, Query, State};
use common_services::api::index::error::IndexError;
use common_services::api::index::interfaces::{
    IndexPhotoParams, IndexPhotoResponse, RemoveFacesResponse,
};
use common_services::api::index::service::{index_photo_from_source, remove_photo_faces};
use tracing::instrument;

/// Detect and index the faces of a photo from the catalog.
///
/// # Errors
///
/// Returns an `IndexError` if the photo is unknown, has no usable face, or extraction or
/// persistence fails.
#[utoipa::path(
    post,
    path = "/photos/{photo_id}/faces",
    tag = "Faces",
    params(
        ("photo_id" = String, Path, description = "Catalog id of the photo"),
        IndexPhotoParams
    ),
    responses(
        (status = 200, description = "Photo indexed, or already indexed.", body = IndexPhotoResponse),
        (status = 404, description = "Photo not found."),
        (status = 422, description = "No usable face, or more faces than the policy allows."),
        (status = 502, description = "The face analysis service failed."),
        (status = 504, description = "The face analysis service or the database timed out."),
        (status = 500, description = "A database or internal error occurred."),
    )
)]
#[instrument(skip(context), err(Debug))]
pub async fn index_photo_handler(
    State(context): State<ApiContext>,
    Path(photo_id): Path<String>,
    Query(params): Query<IndexPhotoParams>,
) -> Result<Json<IndexPhotoResponse>, IndexError> {
    let outcome = index_photo_from_source(&context.face_index, &photo_id, params.force).await?;
    Ok(Json(IndexPhotoResponse::new(&photo_id, outcome)))
}

/// Remove all face records of a photo and mark it unindexed.
///
/// # Errors
///
/// Returns an `IndexError` if the photo is unknown or the database fails.
#[utoipa::path(
    delete,
    path = "/photos/{photo_id}/faces",
    tag = "Faces",
    params(
        ("photo_id" = String, Path, description = "Catalog id of the photo"),
    ),
    responses(
        (status = 200, description = "Face records removed.", body = RemoveFacesResponse),
        (status = 404, description = "Photo not found."),
        (status = 500, description = "A database error occurred."),
    )
)]
#[instrument(skip(context), err(Debug))]
pub async fn remove_faces_handler(
    State(context): State<ApiContext>,
    Path(photo_id): Path<String>,
) -> Result<Json<RemoveFacesResponse>, IndexError> {
    let removed = remove_photo_faces(&context.face_index, &photo_id).await?;
    Ok(Json(RemoveFacesResponse { photo_id, removed }))
}
