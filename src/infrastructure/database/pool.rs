use crate::config::constants::MIGRATIONS;
use crate::domain::errors::repository_error::RepositoryError;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel_migrations::MigrationHarness;
use std::sync::Arc;

type DieselPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DieselConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Connection pool backing the `SQLite` adapters.
///
/// Enables foreign keys, tunes pragmas and applies the embedded migrations
/// on the first connection.
pub struct SqliteRepositoryPool {
    pool: DieselPool,
}

impl SqliteRepositoryPool {
    /// Opens the database and brings its schema up to date.
    ///
    /// # Errors
    ///
    /// Returns a [`RepositoryError`] if:
    /// - A [`ConnectionPool`](RepositoryError::ConnectionPool) error occurs while building the pool.
    /// - A [`Database`](RepositoryError::Database) error occurs while applying pragmas.
    /// - A [`Migration`](RepositoryError::Migration) error occurs while running migrations.
    pub fn new(database_url: &str) -> Result<Arc<Self>, RepositoryError> {
        let pool = Self::create_pool(database_url)?;
        {
            let mut conn = pool.get()?;
            Self::enable_foreign_keys(&mut conn)?;
            Self::apply_pragmas(&mut conn)?;
            Self::run_migrations(&mut conn)?;
        }
        Ok(Arc::new(Self { pool }))
    }

    fn create_pool(database_url: &str) -> Result<DieselPool, RepositoryError> {
        let manager = ConnectionManager::<SqliteConnection>::new(database_url);
        Pool::builder()
            .build(manager)
            .map_err(RepositoryError::ConnectionPool)
    }

    fn enable_foreign_keys(conn: &mut SqliteConnection) -> Result<(), RepositoryError> {
        diesel::sql_query("PRAGMA foreign_keys = ON;").execute(conn)?;
        Ok(())
    }

    fn apply_pragmas(conn: &mut SqliteConnection) -> Result<(), RepositoryError> {
        let pragmas = [
            "PRAGMA journal_mode = WAL;",
            "PRAGMA synchronous = NORMAL;",
            "PRAGMA busy_timeout = 5000;",
        ];
        for pragma in pragmas {
            diesel::sql_query(pragma).execute(conn)?;
        }
        Ok(())
    }

    fn run_migrations(conn: &mut SqliteConnection) -> Result<(), RepositoryError> {
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|err| RepositoryError::Migration(err.to_string()))?;
        Ok(())
    }

    fn get_connection(&self) -> Result<DieselConnection, RepositoryError> {
        self.pool.get().map_err(RepositoryError::ConnectionPool)
    }

    /// Executes a database operation with automatic connection management.
    pub(crate) fn execute_db_operation<F, R>(&self, operation: F) -> Result<R, RepositoryError>
    where
        F: FnOnce(&mut DieselConnection) -> Result<R, RepositoryError>,
    {
        let mut conn = self.get_connection()?;
        operation(&mut conn)
    }
}
