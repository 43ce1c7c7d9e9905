use crate::database::DbError;
use crate::database::face_encoding::{FaceEncodingRow, FaceMatch};
use common_types::{DetectedFace, Descriptor, Distance};
use pgvector::Vector;
use sqlx::{Executor, PgTransaction, Postgres};

pub struct FaceEncodingStore;

impl FaceEncodingStore {
    /// Inserts one record per face and returns the stored rows.
    pub async fn create_many(
        tx: &mut PgTransaction<'_>,
        photo_id: &str,
        faces: &[DetectedFace],
    ) -> Result<Vec<FaceEncodingRow>, DbError> {
        let mut rows = Vec::with_capacity(faces.len());
        for face in faces {
            let descriptor = &face.descriptor;
            let row = sqlx::query_as::<_, FaceEncodingRow>(
                r"
                INSERT INTO face_encoding (
                    photo_id, model_version, dimensions, descriptor, confidence,
                    region_x, region_y, region_width, region_height
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING id, photo_id, model_version, descriptor, confidence,
                          region_x, region_y, region_width, region_height, created_at
                ",
            )
            .bind(photo_id)
            .bind(&descriptor.model_version().name)
            .bind(i32::try_from(descriptor.len()).unwrap_or(i32::MAX))
            .bind(Vector::from(descriptor.values().to_vec()))
            .bind(face.confidence)
            .bind(face.region.x)
            .bind(face.region.y)
            .bind(face.region.width)
            .bind(face.region.height)
            .fetch_one(&mut **tx)
            .await?;
            rows.push(row);
        }
        Ok(rows)
    }

    pub async fn delete_by_photo_id(
        executor: impl Executor<'_, Database = Postgres>,
        photo_id: &str,
    ) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM face_encoding WHERE photo_id = $1")
            .bind(photo_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Exact cosine-distance scan over the query's model version, one row per photo with
    /// its closest face.
    ///
    /// `<=>` is pgvector's cosine distance, `1 - a·b / (|a|·|b|)`, which does not rely on
    /// the stored vectors being normalised.
    pub async fn nearest(
        executor: impl Executor<'_, Database = Postgres>,
        query: &Descriptor,
        threshold: Distance,
        limit: i64,
    ) -> Result<Vec<FaceMatch>, DbError> {
        Ok(sqlx::query_as::<_, FaceMatch>(
            r"
            SELECT record_id, photo_id, distance
            FROM (
                SELECT DISTINCT ON (photo_id)
                       id AS record_id, photo_id, (descriptor <=> $1) AS distance
                FROM face_encoding
                WHERE model_version = $2 AND dimensions = $3
                ORDER BY photo_id, distance, id
            ) best_per_photo
            WHERE distance <= $4
            ORDER BY distance, photo_id
            LIMIT $5
            ",
        )
        .bind(Vector::from(query.values().to_vec()))
        .bind(&query.model_version().name)
        .bind(i32::try_from(query.len()).unwrap_or(i32::MAX))
        .bind(threshold)
        .bind(limit)
        .fetch_all(executor)
        .await?)
    }
}
