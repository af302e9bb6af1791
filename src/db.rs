//! Database management for the dashboard.
//!
//! Provides a shared SQLite connection pool used by the user and session
//! stores. The pool is created once at startup and shared via clones
//! (sqlx pools are internally Arc-based).

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

pub use sqlx::SqlitePool as DbPool;

/// Shared database for the dashboard.
///
/// Owns the connection pool and handles migrations. Create once at startup
/// and hand out pool clones to the stores.
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Connect to the SQLite database at the given path, creating the file
    /// if needed, and run all pending migrations.
    pub async fn new(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("Failed to connect to SQLite database")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        info!(path = %db_path.display(), "Database connected");

        Ok(Self { pool })
    }

    /// In-memory database for tests.
    pub async fn new_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("Failed to open in-memory SQLite database")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self { pool })
    }

    /// Get a clone of the connection pool.
    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }
}
