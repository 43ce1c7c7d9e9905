use crate::api_state::ApiContext;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use common_services::api::search::error::SearchError;
use common_services::api::search::interfaces::{
    DescriptorSearchRequest, PhotoMatch, SearchResponse, SelfieSearchParams,
};
use common_services::api::search::service::{
    decode_query_image, resolve_bounds, search_by_selfie, search_by_values,
};
use common_types::Distance;
use tracing::instrument;

fn search_response(
    context: &ApiContext,
    threshold: Option<Distance>,
    matches: Vec<PhotoMatch>,
) -> SearchResponse {
    let settings = &context.settings.face_index;
    SearchResponse {
        model_version: settings.model_version.name.clone(),
        threshold: threshold.unwrap_or(settings.search.default_threshold),
        matches,
    }
}

/// Find photos containing a face close to the given descriptor.
///
/// # Errors
///
/// Returns a `SearchError` if the descriptor does not fit the active model, the
/// parameters are invalid, or the database fails.
#[utoipa::path(
    post,
    path = "/search/descriptor",
    tag = "Search",
    request_body = DescriptorSearchRequest,
    responses(
        (status = 200, description = "Matching photos, closest first. May be empty.", body = SearchResponse),
        (status = 400, description = "Invalid threshold or limit."),
        (status = 422, description = "Descriptor length or model version does not match the active model."),
        (status = 500, description = "A database error occurred."),
    )
)]
#[instrument(skip(context, request), err(Debug))]
pub async fn search_descriptor_handler(
    State(context): State<ApiContext>,
    Json(request): Json<DescriptorSearchRequest>,
) -> Result<Json<SearchResponse>, SearchError> {
    let matches = search_by_values(
        &context.face_index,
        request.values,
        request.model_version.as_deref(),
        request.threshold,
        request.limit,
    )
    .await?;
    Ok(Json(search_response(&context, request.threshold, matches)))
}

/// Find photos containing the person in an uploaded selfie.
///
/// # Errors
///
/// Returns a `SearchError` if the image is unreadable, holds no usable face, or
/// extraction or the database fails.
#[utoipa::path(
    post,
    path = "/search/selfie",
    tag = "Search",
    params(SelfieSearchParams),
    request_body(content = Vec<u8>, content_type = "image/jpeg", description = "Selfie image (JPEG or PNG)"),
    responses(
        (status = 200, description = "Matching photos, closest first. May be empty.", body = SearchResponse),
        (status = 400, description = "Unreadable image, or invalid threshold or limit."),
        (status = 422, description = "No usable face in the image."),
        (status = 502, description = "The face analysis service failed."),
        (status = 504, description = "The face analysis service or the database timed out."),
    )
)]
#[instrument(skip(context, body), err(Debug))]
pub async fn search_selfie_handler(
    State(context): State<ApiContext>,
    Query(params): Query<SelfieSearchParams>,
    body: Bytes,
) -> Result<Json<SearchResponse>, SearchError> {
    resolve_bounds(
        &context.settings.face_index.search,
        params.threshold,
        params.limit,
    )?;
    let image = decode_query_image(body.to_vec()).await?;
    let matches =
        search_by_selfie(&context.face_index, &image, params.threshold, params.limit).await?;
    Ok(Json(search_response(&context, params.threshold, matches)))
}
