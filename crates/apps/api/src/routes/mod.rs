mod api_doc;
pub mod bulk;
pub mod faces;
pub mod root;
pub mod search;

use crate::api_state::ApiContext;
use crate::bulk::router::bulk_router;
use crate::faces::router::faces_router;
use crate::root::router::root_public_router;
use crate::routes::api_doc::ApiDoc;
use crate::search::router::search_router;
use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// --- Router Construction ---
pub fn create_router(api_state: ApiContext) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .merge(root_public_router())
        .merge(face_index_routes())
        .with_state(api_state)
}

fn face_index_routes() -> Router<ApiContext> {
    Router::new()
        .merge(faces_router())
        .merge(search_router())
        .merge(bulk_router())
}
