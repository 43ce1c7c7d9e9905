use crate::api_state::ApiContext;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common_services::api::bulk::error::BulkIndexError;
use common_services::api::bulk::interfaces::{
    BulkJobResponse, BulkJobStatus, StartBulkIndexRequest,
};
use common_services::api::bulk::service::spawn_bulk_index;
use tracing::instrument;

/// Start indexing every unindexed photo of a working set in the background.
///
/// # Errors
///
/// Returns a `BulkIndexError` if the working set cannot be loaded, or overlaps a job
/// that is still running.
#[utoipa::path(
    post,
    path = "/bulk-index",
    tag = "Bulk",
    request_body = StartBulkIndexRequest,
    responses(
        (status = 202, description = "Job started.", body = BulkJobResponse),
        (status = 409, description = "Another job is indexing some of these photos."),
        (status = 500, description = "A database error occurred."),
    )
)]
#[instrument(skip(context), err(Debug))]
pub async fn start_bulk_index_handler(
    State(context): State<ApiContext>,
    Json(request): Json<StartBulkIndexRequest>,
) -> Result<(StatusCode, Json<BulkJobResponse>), BulkIndexError> {
    let handle = spawn_bulk_index(context.face_index.clone(), request.working_set).await?;
    let response = context.bulk_jobs.track(handle).await;
    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// Get the progress of a bulk job.
///
/// # Errors
///
/// Returns `BulkIndexError::JobNotFound` for an unknown job id.
#[utoipa::path(
    get,
    path = "/bulk-index/{job_id}",
    tag = "Bulk",
    params(("job_id" = String, Path, description = "Id returned when the job started")),
    responses(
        (status = 200, description = "Job status.", body = BulkJobStatus),
        (status = 404, description = "Job not found."),
    )
)]
#[instrument(skip(context), err(Debug))]
pub async fn get_bulk_index_handler(
    State(context): State<ApiContext>,
    Path(job_id): Path<String>,
) -> Result<Json<BulkJobStatus>, BulkIndexError> {
    context
        .bulk_jobs
        .status(&job_id)
        .await
        .map(Json)
        .ok_or(BulkIndexError::JobNotFound(job_id))
}

/// Cancel a bulk job. The photo being indexed finishes, the rest stay unindexed.
///
/// # Errors
///
/// Returns `BulkIndexError::JobNotFound` for an unknown job id.
#[utoipa::path(
    delete,
    path = "/bulk-index/{job_id}",
    tag = "Bulk",
    params(("job_id" = String, Path, description = "Id returned when the job started")),
    responses(
        (status = 202, description = "Cancellation requested.", body = BulkJobStatus),
        (status = 404, description = "Job not found."),
    )
)]
#[instrument(skip(context), err(Debug))]
pub async fn cancel_bulk_index_handler(
    State(context): State<ApiContext>,
    Path(job_id): Path<String>,
) -> Result<(StatusCode, Json<BulkJobStatus>), BulkIndexError> {
    let status = context
        .bulk_jobs
        .cancel(&job_id)
        .await
        .ok_or(BulkIndexError::JobNotFound(job_id))?;
    Ok((StatusCode::ACCEPTED, Json(status)))
}
