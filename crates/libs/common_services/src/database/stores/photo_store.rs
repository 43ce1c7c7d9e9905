use crate::database::DbError;
use crate::database::photo::Photo;
use sqlx::{Executor, Postgres};

const PHOTO_COLUMNS: &str =
    "id, photographer_id, event_id, relative_path, is_face_indexed, created_at";

pub struct PhotoStore;

impl PhotoStore {
    pub async fn find_by_id(
        executor: impl Executor<'_, Database = Postgres>,
        photo_id: &str,
    ) -> Result<Option<Photo>, DbError> {
        Ok(
            sqlx::query_as::<_, Photo>(&format!("SELECT {PHOTO_COLUMNS} FROM photo WHERE id = $1"))
                .bind(photo_id)
                .fetch_optional(executor)
                .await?,
        )
    }

    /// Unindexed photos of a photographer, in catalog order.
    pub async fn list_unindexed_by_photographer(
        executor: impl Executor<'_, Database = Postgres>,
        photographer_id: &str,
    ) -> Result<Vec<Photo>, DbError> {
        Ok(sqlx::query_as::<_, Photo>(&format!(
            "SELECT {PHOTO_COLUMNS} FROM photo
             WHERE photographer_id = $1 AND NOT is_face_indexed
             ORDER BY created_at, id"
        ))
        .bind(photographer_id)
        .fetch_all(executor)
        .await?)
    }

    /// Unindexed photos of an event, in catalog order.
    pub async fn list_unindexed_by_event(
        executor: impl Executor<'_, Database = Postgres>,
        event_id: &str,
    ) -> Result<Vec<Photo>, DbError> {
        Ok(sqlx::query_as::<_, Photo>(&format!(
            "SELECT {PHOTO_COLUMNS} FROM photo
             WHERE event_id = $1 AND NOT is_face_indexed
             ORDER BY created_at, id"
        ))
        .bind(event_id)
        .fetch_all(executor)
        .await?)
    }

    /// Unindexed photos among `photo_ids`, in no particular order.
    pub async fn list_unindexed_by_ids(
        executor: impl Executor<'_, Database = Postgres>,
        photo_ids: &[String],
    ) -> Result<Vec<Photo>, DbError> {
        Ok(sqlx::query_as::<_, Photo>(&format!(
            "SELECT {PHOTO_COLUMNS} FROM photo
             WHERE id = ANY($1) AND NOT is_face_indexed"
        ))
        .bind(photo_ids)
        .fetch_all(executor)
        .await?)
    }

    pub async fn set_face_indexed(
        executor: impl Executor<'_, Database = Postgres>,
        photo_id: &str,
        indexed: bool,
    ) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE photo SET is_face_indexed = $2 WHERE id = $1")
            .bind(photo_id)
            .bind(indexed)
            .execute(executor)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::PhotoNotFound(photo_id.to_owned()));
        }
        Ok(())
    }
}
