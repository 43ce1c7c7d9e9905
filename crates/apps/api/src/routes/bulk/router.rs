use crate::api_state::ApiContext;
use crate::bulk::handlers::{
    cancel_bulk_index_handler, get_bulk_index_handler, start_bulk_index_handler,
};
use axum::{
    Router,
    routing::{get, post},
};

pub fn bulk_router() -> Router<ApiContext> {
    Router::new()
        .route("/bulk-index", post(start_bulk_index_handler))
        .route(
            "/bulk-index/{job_id}",
            get(get_bulk_index_handler).delete(cancel_bulk_index_handler),
        )
}
