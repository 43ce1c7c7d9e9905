use crate::{
    ApiSettings, DatabaseSettings, ExtractorSettings, RawFaceIndexSettings, RawSettings,
    SearchSettings, SecretSettings,
};
use color_eyre::eyre::{Result, bail};
use common_types::{ModelVersion, MultiFacePolicy};
use std::path::{Path, PathBuf, absolute};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub face_index: FaceIndexSettings,
    pub extractor: ExtractorSettings,
    pub ingest: IngestSettings,
    pub database: DatabaseSettings,
    pub api: ApiSettings,
    pub secrets: SecretSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FaceIndexSettings {
    pub model_version: ModelVersion,
    pub min_confidence: f32,
    pub multi_face_policy: MultiFacePolicy,
    pub throttle: Duration,
    pub extractor_timeout: Duration,
    pub store_timeout: Duration,
    pub progress_buffer: usize,
    pub search: SearchSettings,
}

#[derive(Debug, Clone)]
pub struct IngestSettings {
    pub media_root: PathBuf,
}

impl TryFrom<RawFaceIndexSettings> for FaceIndexSettings {
    type Error = color_eyre::Report;

    fn try_from(raw: RawFaceIndexSettings) -> Result<Self> {
        if raw.dimensions == 0 {
            bail!("face_index.dimensions must be greater than zero");
        }
        if !(0.0..=1.0).contains(&raw.min_confidence) {
            bail!(
                "face_index.min_confidence must be within 0..=1, got {}",
                raw.min_confidence
            );
        }
        if raw.extractor_timeout_ms == 0 || raw.store_timeout_ms == 0 {
            bail!("face_index extractor_timeout_ms and store_timeout_ms must be positive");
        }
        let search = &raw.search;
        if !(0.0..=2.0).contains(&search.default_threshold) {
            bail!(
                "face_index.search.default_threshold must be within 0..=2, got {}",
                search.default_threshold
            );
        }
        if search.max_results_cap == 0 {
            bail!("face_index.search.max_results_cap must be positive");
        }

        Ok(Self {
            model_version: ModelVersion::new(raw.model_version, raw.dimensions),
            min_confidence: raw.min_confidence,
            multi_face_policy: raw.multi_face_policy,
            throttle: Duration::from_millis(raw.throttle_ms),
            extractor_timeout: Duration::from_millis(raw.extractor_timeout_ms),
            store_timeout: Duration::from_millis(raw.store_timeout_ms),
            progress_buffer: raw.progress_buffer.max(1),
            search: raw.search,
        })
    }
}

impl TryFrom<RawSettings> for AppSettings {
    type Error = color_eyre::Report;

    fn try_from(raw: RawSettings) -> Result<Self> {
        let media_root = absolute(&raw.ingest.media_folder)?;
        Ok(Self {
            face_index: raw.face_index.try_into()?,
            extractor: raw.extractor,
            ingest: IngestSettings { media_root },
            database: raw.database,
            api: raw.api,
            secrets: raw.secrets,
        })
    }
}

impl IngestSettings {
    /// Resolves a photo's catalog path against the media root, refusing paths that escape it.
    pub fn resolve(&self, relative_path: &str) -> Result<PathBuf> {
        let relative = Path::new(relative_path);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            bail!("Photo path {relative_path} is not inside the media folder");
        }
        Ok(self.media_root.join(relative))
    }
}

