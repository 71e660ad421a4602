//! Database module for the Mendeley SQLite library
//!
//! Opens the database read-only and exposes the highlight, note and title
//! queries. Nothing here writes to the database.

mod documents;
mod highlights;
mod notes;

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::{AppError, Result};

/// Read-only handle on a Mendeley desktop database
pub struct MendeleyDb {
    pool: SqlitePool,
}

impl MendeleyDb {
    /// Open the database at `path`.
    ///
    /// Fails with [`AppError::DatabaseNotFound`] when the file does not exist,
    /// so that SQLite never creates an empty database in its place.
    pub async fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(AppError::DatabaseNotFound(path.to_path_buf()));
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false);

        // A single connection: queries run one after another
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        tracing::debug!("Opened Mendeley database at {}", path.display());
        Ok(Self { pool })
    }

    #[cfg(test)]
    pub(crate) fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Release the connection
    pub async fn close(self) {
        self.pool.close().await;
    }
}
