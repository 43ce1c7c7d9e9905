use common_types::DescriptorError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Stored descriptor {record_id} is invalid: {source}")]
    CorruptDescriptor {
        record_id: i64,
        source: DescriptorError,
    },

    #[error("Descriptor rejected by the store: {0}")]
    InvalidDescriptor(DescriptorError),

    #[error("Photo {0} does not exist")]
    PhotoNotFound(String),

    #[error("Store call '{operation}' timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        Self::Sqlx(err)
    }
}

impl DbError {
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
