use crate::api_state::ApiContext;
use crate::search::handlers::{search_descriptor_handler, search_selfie_handler};
use axum::extract::DefaultBodyLimit;
use axum::{Router, routing::post};

const SELFIE_BODY_LIMIT: usize = 20 * 1024 * 1024;

pub fn search_router() -> Router<ApiContext> {
    Router::new()
        .route("/search/descriptor", post(search_descriptor_handler))
        .route(
            "/search/selfie",
            post(search_selfie_handler).layer(DefaultBodyLimit::max(SELFIE_BODY_LIMIT)),
        )
}
