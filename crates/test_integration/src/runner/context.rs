use crate::runner::orchestration_utils::setup_tracing;
use crate::test_constants::SETTINGS_YAML;
use crate::test_helpers::{FaceScript, FakeExtractor, FakeImageSource, InMemoryFaceIndex, model};
use app_state::{AppSettings, FaceIndexSettings, parse_app_settings};
use color_eyre::Result;
use common_services::context::FaceIndexContext;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// A face index wired to in-memory collaborators the test can inspect and steer.
pub struct TestContext {
    pub settings: AppSettings,
    pub index: Arc<InMemoryFaceIndex>,
    pub extractor: Arc<FakeExtractor>,
    pub images: Arc<FakeImageSource>,
    pub face_index: Arc<FaceIndexContext>,
    next_width: AtomicU32,
}

impl TestContext {
    pub fn new() -> Result<Self> {
        Self::with_settings(|_| {})
    }

    /// Builds a context after letting the test adjust the face index settings.
    pub fn with_settings(adjust: impl FnOnce(&mut FaceIndexSettings)) -> Result<Self> {
        setup_tracing();
        let mut settings = parse_app_settings(SETTINGS_YAML)?;
        adjust(&mut settings.face_index);

        let index = Arc::new(InMemoryFaceIndex::new(model()));
        let extractor = Arc::new(FakeExtractor::default());
        let images = Arc::new(FakeImageSource::default());
        let face_index = FaceIndexContext::builder()
            .store(index.clone())
            .catalog(index.clone())
            .extractor(extractor.clone())
            .images(images.clone())
            .settings(settings.face_index.clone())
            .build();

        Ok(Self {
            settings,
            index,
            extractor,
            images,
            face_index: Arc::new(face_index),
            next_width: AtomicU32::new(1),
        })
    }

    fn next_width(&self) -> u32 {
        self.next_width.fetch_add(1, Ordering::SeqCst)
    }

    /// Adds a catalog photo whose image makes the extractor answer `script`.
    pub fn add_photo(
        &self,
        photo_id: &str,
        photographer_id: &str,
        event_id: Option<&str>,
        script: FaceScript,
    ) {
        let width = self.next_width();
        self.index.add_photo(photo_id, photographer_id, event_id);
        self.images.insert(photo_id, width);
        self.extractor.script(width, script);
    }

    /// An image that is not in the catalog, e.g. a buyer's selfie.
    pub fn image(&self, script: FaceScript) -> image::DynamicImage {
        let width = self.next_width();
        self.extractor.script(width, script);
        image::DynamicImage::new_rgb8(width, 1)
    }
}
