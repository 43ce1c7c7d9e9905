use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// The part of the catalog's 'photo' table the face index reads.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: String,
    pub photographer_id: String,
    pub event_id: Option<String>,
    pub relative_path: String,
    pub is_face_indexed: bool,
    pub created_at: DateTime<Utc>,
}
