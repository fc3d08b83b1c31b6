// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;
use std::time::Duration;

use deskline_core::DesklineError;
use tracing::{debug, info};

/// Milliseconds a statement waits on a locked database before failing.
const BUSY_TIMEOUT_MS: u64 = 5000;

/// Handle to the single SQLite connection.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path` in WAL mode and run migrations.
    pub async fn open(path: &str) -> Result<Self, DesklineError> {
        Self::open_with(path, true).await
    }

    /// Open the database, choosing the journal mode explicitly.
    ///
    /// Parent directories are created when missing.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, DesklineError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| DesklineError::Storage {
                    source: Box::new(e),
                })?;
            }
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| DesklineError::Storage {
                source: Box::new(e),
            })?;

        let journal_mode = conn
            .call(move |conn| -> Result<String, rusqlite::Error> {
                let mode = if wal_mode {
                    conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?
                } else {
                    conn.pragma_query_value(None, "journal_mode", |row| row.get(0))?
                };
                conn.pragma_update(None, "foreign_keys", "ON")?;
                conn.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))?;
                Ok(mode)
            })
            .await
            .map_err(map_tr_err)?;
        debug!(path, journal_mode = %journal_mode, "database pragmas applied");

        let applied = conn
            .call(|conn| -> Result<usize, DesklineError> { crate::migrations::run_migrations(conn) })
            .await
            .map_err(flatten_tr_err)?;
        if applied > 0 {
            info!(path, applied, "database migrations applied");
        }

        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL and close the connection.
    pub async fn close(self) -> Result<(), DesklineError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        self.conn
            .close()
            .await
            .map_err(|e| DesklineError::Storage {
                source: e.to_string().into(),
            })
    }
}

/// Convert a tokio-rusqlite error into a [`DesklineError`].
///
/// UNIQUE constraint failures become [`DesklineError::Conflict`] naming the
/// column; everything else is [`DesklineError::Storage`].
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> DesklineError {
    match e {
        tokio_rusqlite::Error::Error(inner) => map_sqlite_err(inner),
        other => DesklineError::Storage {
            source: other.to_string().into(),
        },
    }
}

/// Convert a rusqlite error into a [`DesklineError`], detecting unique violations.
pub fn map_sqlite_err(e: rusqlite::Error) -> DesklineError {
    match unique_violation_column(&e) {
        Some(field) => DesklineError::Conflict { field },
        None => DesklineError::Storage {
            source: Box::new(e),
        },
    }
}

/// Unwrap a closure that already produced a [`DesklineError`].
fn flatten_tr_err(e: tokio_rusqlite::Error<DesklineError>) -> DesklineError {
    match e {
        tokio_rusqlite::Error::Error(inner) => inner,
        other => DesklineError::Storage {
            source: other.to_string().into(),
        },
    }
}

/// Column named by a `UNIQUE constraint failed: table.column` error.
///
/// For composite constraints the first column is reported.
fn unique_violation_column(e: &rusqlite::Error) -> Option<String> {
    let rusqlite::Error::SqliteFailure(failure, Some(message)) = e else {
        return None;
    };
    if failure.extended_code != rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE {
        return None;
    }
    let columns = message.strip_prefix("UNIQUE constraint failed: ")?;
    let first = columns.split(',').next()?.trim();
    let column = first.rsplit('.').next().unwrap_or(first);
    Some(column.to_string())
}
