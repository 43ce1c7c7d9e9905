use common_types::Distance;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DescriptorSearchRequest {
    /// The raw query descriptor. Its length must equal the active model's dimensions.
    pub values: Vec<f32>,
    /// Model that produced `values`, checked against the active model when given.
    pub model_version: Option<String>,
    pub threshold: Option<Distance>,
    pub limit: Option<usize>,
}

#[derive(Deserialize, IntoParams, ToSchema, Debug, Clone, Copy, Default)]
#[serde(rename_all = "camelCase")]
pub struct SelfieSearchParams {
    pub threshold: Option<Distance>,
    pub limit: Option<usize>,
}

/// A photo that contains a face close to the query, with the distance of its closest face.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PhotoMatch {
    pub photo_id: String,
    pub distance: Distance,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub model_version: String,
    pub threshold: Distance,
    pub matches: Vec<PhotoMatch>,
}
