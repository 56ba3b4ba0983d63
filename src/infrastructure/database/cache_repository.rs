use crate::domain::errors::repository_error::RepositoryError;
use crate::domain::ports::secondary::metadata_cache::MetadataCache;
use crate::infrastructure::database::pool::SqliteRepositoryPool;
use crate::infrastructure::database::schema::cache_entries;
use diesel::prelude::*;
use diesel::{OptionalExtension, RunQueryDsl};
use std::sync::Arc;

/// Metadata cache persisted in the `cache_entries` table.
pub struct SqliteMetadataCache {
    pool: Arc<SqliteRepositoryPool>,
}

impl SqliteMetadataCache {
    #[must_use]
    /// Creates a new [`SqliteMetadataCache`] with the given pool.
    pub const fn new(pool: Arc<SqliteRepositoryPool>) -> Self {
        Self { pool }
    }
}

impl MetadataCache for SqliteMetadataCache {
    /// # Errors
    ///
    /// Returns a [`RepositoryError`] if:
    /// - A [`ConnectionPool`](RepositoryError::ConnectionPool) error occurs while acquiring a connection.
    /// - A [`Database`](RepositoryError::Database) error occurs during query execution.
    fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>, RepositoryError> {
        self.pool.execute_db_operation(|conn| {
            let payload = cache_entries::table
                .filter(cache_entries::key.eq(key))
                .select(cache_entries::payload)
                .first::<Vec<u8>>(conn)
                .optional()?;
            Ok(payload)
        })
    }

    /// Replaces any existing entry stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`RepositoryError`] if:
    /// - A [`ConnectionPool`](RepositoryError::ConnectionPool) error occurs while acquiring a connection.
    /// - A [`Database`](RepositoryError::Database) error occurs during the update operation.
    fn save(&self, key: &str, payload: &[u8]) -> Result<(), RepositoryError> {
        self.pool.execute_db_operation(|conn| {
            diesel::replace_into(cache_entries::table)
                .values((
                    cache_entries::key.eq(key),
                    cache_entries::payload.eq(payload),
                ))
                .execute(conn)?;
            Ok(())
        })
    }
}
