use crate::runner::context::TestContext;
use crate::test_constants::PHOTOGRAPHER;
use crate::test_helpers::{FaceScript, query_values};
use api::api_state::ApiContext;
use api::bulk_jobs::BulkJobs;
use api::create_router;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use color_eyre::eyre::Result;
use common_services::api::bulk::interfaces::{BulkJobResponse, BulkJobState, BulkJobStatus};
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tower::ServiceExt;

/// The full router over in-memory collaborators. The pool never connects, so only
/// `/health` would touch it.
fn router(context: &TestContext) -> Result<Router> {
    let pool = PgPoolOptions::new().connect_lazy(&context.settings.secrets.database_url)?;
    Ok(create_router(ApiContext {
        pool,
        face_index: context.face_index.clone(),
        settings: context.settings.clone(),
        bulk_jobs: BulkJobs::new(Duration::from_secs(
            context.settings.api.bulk_job_retention_secs,
        )),
    }))
}

async fn call(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => request
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json)?))?,
        None => request.body(Body::empty())?,
    };
    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}

#[tokio::test]
async fn test_index_endpoint() -> Result<()> {
    // ARRANGE
    let context = TestContext::new()?;
    context.add_photo("p1", PHOTOGRAPHER, None, FaceScript::one_face(0.1));
    context.add_photo("p2", PHOTOGRAPHER, None, FaceScript::no_face());
    let router = router(&context)?;

    // ACT
    let (indexed_status, indexed) = call(&router, Method::POST, "/photos/p1/faces", None).await?;
    let (again_status, again) = call(&router, Method::POST, "/photos/p1/faces", None).await?;
    let (no_face_status, no_face) = call(&router, Method::POST, "/photos/p2/faces", None).await?;
    let (missing_status, _) = call(&router, Method::POST, "/photos/nope/faces", None).await?;

    // ASSERT
    assert_eq!(indexed_status, StatusCode::OK);
    assert_eq!(indexed["status"], "indexed");
    assert_eq!(indexed["faces"].as_array().map(Vec::len), Some(1));
    assert_eq!(again_status, StatusCode::OK);
    assert_eq!(again["status"], "alreadyIndexed");
    assert_eq!(no_face_status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(no_face["retryable"], false);
    assert_eq!(missing_status, StatusCode::NOT_FOUND);

    // ACT
    let (removed_status, removed) = call(&router, Method::DELETE, "/photos/p1/faces", None).await?;

    // ASSERT
    assert_eq!(removed_status, StatusCode::OK);
    assert_eq!(removed["removed"], 1);
    assert!(!context.index.is_indexed("p1"));

    Ok(())
}

#[tokio::test]
async fn test_descriptor_search_endpoint() -> Result<()> {
    // ARRANGE
    let context = TestContext::new()?;
    context.add_photo("p1", PHOTOGRAPHER, None, FaceScript::one_face(0.2));
    let router = router(&context)?;
    call(&router, Method::POST, "/photos/p1/faces", None).await?;

    // ACT
    let (status, found) = call(
        &router,
        Method::POST,
        "/search/descriptor",
        Some(json!({ "values": query_values(), "threshold": 0.4 })),
    )
    .await?;
    let (short_status, short) = call(
        &router,
        Method::POST,
        "/search/descriptor",
        Some(json!({ "values": vec![0.5_f32; 64] })),
    )
    .await?;

    // ASSERT
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["matches"][0]["photoId"], "p1");
    assert_eq!(found["modelVersion"], "facenet-128-v1");
    assert_eq!(short_status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(short["error"].as_str().is_some_and(|e| e.contains("64")));

    Ok(())
}

#[tokio::test]
async fn test_bulk_endpoints() -> Result<()> {
    // ARRANGE
    let context = TestContext::new()?;
    context.add_photo("p1", PHOTOGRAPHER, None, FaceScript::one_face(0.1));
    context.add_photo("p2", PHOTOGRAPHER, None, FaceScript::one_face(0.2));
    let router = router(&context)?;
    let body = json!({ "workingSet": { "kind": "photographer", "photographerId": PHOTOGRAPHER } });

    // ACT
    let (status, started) = call(&router, Method::POST, "/bulk-index", Some(body)).await?;

    // ASSERT
    assert_eq!(status, StatusCode::ACCEPTED);
    let started: BulkJobResponse = serde_json::from_value(started)?;
    assert_eq!(started.total, 2);

    // ACT
    let uri = format!("/bulk-index/{}", started.job_id);
    let mut job: BulkJobStatus;
    let mut polls = 0;
    loop {
        let (status, value) = call(&router, Method::GET, &uri, None).await?;
        assert_eq!(status, StatusCode::OK);
        job = serde_json::from_value(value)?;
        if job.state != BulkJobState::Running || polls > 100 {
            break;
        }
        polls += 1;
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let (missing_status, _) = call(&router, Method::GET, "/bulk-index/unknown", None).await?;
    let (cancel_missing, _) = call(&router, Method::DELETE, "/bulk-index/unknown", None).await?;

    // ASSERT
    assert_eq!(job.state, BulkJobState::Finished);
    assert_eq!((job.successes, job.failures), (2, 0));
    assert!(context.index.is_indexed("p1") && context.index.is_indexed("p2"));
    assert_eq!(missing_status, StatusCode::NOT_FOUND);
    assert_eq!(cancel_missing, StatusCode::NOT_FOUND);

    Ok(())
}
