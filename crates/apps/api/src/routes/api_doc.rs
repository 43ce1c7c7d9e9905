use crate::routes::{bulk, faces, root, search};
use common_services::api::bulk::interfaces::{
    BulkJobResponse, BulkJobState, BulkJobStatus, StartBulkIndexRequest,
};
use common_services::api::index::interfaces::{
    IndexPhotoResponse, IndexStatus, IndexedFace, RemoveFacesResponse,
};
use common_services::api::search::interfaces::{
    DescriptorSearchRequest, PhotoMatch, SearchResponse,
};
use common_types::{BoundingRegion, IndexFailure, WorkingSet};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        root::handlers::root,
        root::handlers::health_check,
        // Face handlers
        faces::handlers::index_photo_handler,
        faces::handlers::remove_faces_handler,
        // Search handlers
        search::handlers::search_descriptor_handler,
        search::handlers::search_selfie_handler,
        // Bulk handlers
        bulk::handlers::start_bulk_index_handler,
        bulk::handlers::get_bulk_index_handler,
        bulk::handlers::cancel_bulk_index_handler,
    ),
    components(
        schemas(
            BoundingRegion,
            IndexedFace,
            IndexStatus,
            IndexPhotoResponse,
            RemoveFacesResponse,
            DescriptorSearchRequest,
            PhotoMatch,
            SearchResponse,
            WorkingSet,
            IndexFailure,
            StartBulkIndexRequest,
            BulkJobResponse,
            BulkJobState,
            BulkJobStatus,
        ),
    ),
    tags(
        (name = "Faces", description = "Indexing the faces of single photos"),
        (name = "Search", description = "Finding photos by face similarity"),
        (name = "Bulk", description = "Background indexing of many photos"),
        (name = "System", description = "Health check"),
    )
)]
pub struct ApiDoc;
