use crate::database::photo::Photo;
use crate::interfaces::ImageSource;
use app_state::IngestSettings;
use async_trait::async_trait;
use image::DynamicImage;

/// Loads photos from the media folder, using the catalog's relative path.
#[derive(Debug, Clone)]
pub struct FsImageSource {
    ingest: IngestSettings,
}

impl FsImageSource {
    #[must_use]
    pub const fn new(ingest: IngestSettings) -> Self {
        Self { ingest }
    }
}

#[async_trait]
impl ImageSource for FsImageSource {
    async fn load(&self, photo: &Photo) -> color_eyre::Result<DynamicImage> {
        let path = self.ingest.resolve(&photo.relative_path)?;
        // Decoding is CPU bound, keep it off the async workers.
        let image = tokio::task::spawn_blocking(move || image::open(path)).await??;
        Ok(image)
    }
}
