use crate::database::DbError;
use app_state::DatabaseSettings;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::info;

/// Get a database connection pool, optionally running the embedded migrations.
/// # Errors
///
/// * `PgPool::connect` can return an error if the database connection fails.
/// * `sqlx::migrate` can return an error if migrations fail.
pub async fn get_db_pool(
    database_url: &str,
    db_settings: &DatabaseSettings,
    migrate: bool,
) -> color_eyre::Result<Pool<Postgres>> {
    info!("Connecting to database.");
    let pool = PgPoolOptions::new()
        .max_connections(db_settings.max_connections)
        .min_connections(db_settings.min_connections)
        .max_lifetime(Duration::from_secs(db_settings.max_lifetime))
        .idle_timeout(Duration::from_secs(db_settings.idle_timeout))
        .acquire_timeout(Duration::from_secs(db_settings.acquire_timeout))
        .test_before_acquire(true)
        .connect(database_url)
        .await?;
    if migrate {
        run_migrations(&pool).await?;
    }
    Ok(pool)
}

pub async fn run_migrations(pool: &Pool<Postgres>) -> Result<(), DbError> {
    info!("Running migrations.");
    sqlx::migrate!("../../../migrations").run(pool).await?;
    Ok(())
}

/// Bounds a single store call, so a stuck database surfaces as an error instead of a hang.
pub async fn with_store_timeout<T>(
    after: Duration,
    operation: &'static str,
    call: impl Future<Output = Result<T, DbError>>,
) -> Result<T, DbError> {
    tokio::time::timeout(after, call)
        .await
        .map_err(|_| DbError::Timeout { operation, after })?
}
