use crate::api_state::ApiContext;
use crate::faces::handlers::{index_photo_handler, remove_faces_handler};
use axum::{Router, routing::post};

pub fn faces_router() -> Router<ApiContext> {
    Router::new().route(
        "/photos/{photo_id}/faces",
        post(index_photo_handler).delete(remove_faces_handler),
    )
}
