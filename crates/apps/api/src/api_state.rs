use crate::bulk_jobs::BulkJobs;
use app_state::AppSettings;
use axum::extract::FromRef;
use common_services::context::FaceIndexContext;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct ApiContext {
    pub pool: PgPool,
    pub face_index: Arc<FaceIndexContext>,
    pub settings: AppSettings,
    pub bulk_jobs: BulkJobs,
}

impl FromRef<ApiContext> for PgPool {
    fn from_ref(state: &ApiContext) -> Self {
        state.pool.clone()
    }
}

impl FromRef<ApiContext> for Arc<FaceIndexContext> {
    fn from_ref(state: &ApiContext) -> Self {
        state.face_index.clone()
    }
}

impl FromRef<ApiContext> for AppSettings {
    fn from_ref(state: &ApiContext) -> Self {
        state.settings.clone()
    }
}

impl FromRef<ApiContext> for BulkJobs {
    fn from_ref(state: &ApiContext) -> Self {
        state.bulk_jobs.clone()
    }
}
