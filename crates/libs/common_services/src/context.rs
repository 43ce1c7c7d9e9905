use crate::api::bulk::registry::BulkIndexRegistry;
use crate::database::PgFaceIndex;
use crate::extractor::{DescriptorExtractor, HttpFaceExtractor};
use crate::image_source::FsImageSource;
use crate::interfaces::{DescriptorStore, ImageSource, PhotoCatalog};
use app_state::{AppSettings, FaceIndexSettings};
use bon::Builder;
use reqwest::Client;
use sqlx::PgPool;
use std::sync::Arc;

/// Everything the indexing and search operations need, shared by the API and the worker.
#[derive(Clone, Builder)]
pub struct FaceIndexContext {
    pub store: Arc<dyn DescriptorStore>,
    pub catalog: Arc<dyn PhotoCatalog>,
    pub extractor: Arc<dyn DescriptorExtractor>,
    pub images: Arc<dyn ImageSource>,
    pub settings: FaceIndexSettings,
    #[builder(default)]
    pub registry: BulkIndexRegistry,
}

impl FaceIndexContext {
    /// Wires the Postgres store and catalog, the HTTP extractor and the filesystem image source.
    #[must_use]
    pub fn from_settings(pool: PgPool, settings: &AppSettings) -> Self {
        let model_version = settings.face_index.model_version.clone();
        let face_index = Arc::new(PgFaceIndex::new(pool, model_version.clone()));
        let extractor =
            HttpFaceExtractor::new(Client::new(), settings.extractor.url.clone(), model_version);

        Self::builder()
            .store(face_index.clone())
            .catalog(face_index)
            .extractor(Arc::new(extractor))
            .images(Arc::new(FsImageSource::new(settings.ingest.clone())))
            .settings(settings.face_index.clone())
            .build()
    }
}
