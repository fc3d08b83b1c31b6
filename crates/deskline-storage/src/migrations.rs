// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded database migrations using refinery.
//!
//! SQL files under `migrations/` are compiled into the binary by
//! `embed_migrations!` and applied every time a [`Database`](crate::Database)
//! is opened.

use deskline_core::DesklineError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Apply pending migrations. Returns how many ran.
///
/// Refinery records applied versions in `refinery_schema_history`.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<usize, DesklineError> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(|e| DesklineError::Storage {
            source: Box::new(e),
        })?;
    Ok(report.applied_migrations().len())
}
