use common_types::MultiFacePolicy;
use serde::Deserialize;
use std::path::PathBuf;
use url::Url;

/// Settings as they appear in `config/settings.yaml`, before conversion into [`crate::AppSettings`].
#[derive(Debug, Deserialize, Clone)]
pub struct RawSettings {
    pub face_index: RawFaceIndexSettings,
    pub extractor: ExtractorSettings,
    pub ingest: RawIngestSettings,
    pub database: DatabaseSettings,
    pub api: ApiSettings,
    pub secrets: SecretSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawFaceIndexSettings {
    /// Name of the extractor model whose descriptors are stored.
    pub model_version: String,
    /// Descriptor length produced by `model_version`.
    pub dimensions: usize,
    /// Faces below this extractor confidence are ignored.
    pub min_confidence: f32,
    pub multi_face_policy: MultiFacePolicy,
    /// Pause between two photos of a bulk run.
    pub throttle_ms: u64,
    pub extractor_timeout_ms: u64,
    pub store_timeout_ms: u64,
    /// Capacity of the bulk progress channel.
    pub progress_buffer: usize,
    pub search: SearchSettings,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SearchSettings {
    pub default_threshold: f64,
    pub default_max_results: usize,
    pub max_results_cap: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExtractorSettings {
    /// Endpoint of the face analysis service.
    pub url: Url,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawIngestSettings {
    /// Folder photos are loaded from, photo paths are relative to it.
    pub media_folder: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub max_lifetime: u64,
    pub idle_timeout: u64,
    pub acquire_timeout: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    /// How long an ended bulk job stays queryable.
    pub bulk_job_retention_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SecretSettings {
    pub database_url: String,
}
