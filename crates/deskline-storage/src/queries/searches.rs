// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only phone lookup log.

use deskline_core::DesklineError;
use deskline_core::types::{NewSearch, SearchLog};
use rusqlite::params;

use crate::database::{Database, map_tr_err};

/// Append one lookup record.
pub async fn record_search(db: &Database, search: &NewSearch) -> Result<(), DesklineError> {
    let search = search.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO searches (raw_query, modified_query, output) VALUES (?1, ?2, ?3)",
                params![search.raw_query, search.modified_query, search.output],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// The latest `limit` records, newest first.
pub async fn recent_searches(db: &Database, limit: u32) -> Result<Vec<SearchLog>, DesklineError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, raw_query, modified_query, output, created_at
                 FROM searches ORDER BY id DESC LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit], |row| {
                Ok(SearchLog {
                    id: row.get(0)?,
                    raw_query: row.get(1)?,
                    modified_query: row.get(2)?,
                    output: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?;
            let mut searches = Vec::new();
            for row in rows {
                searches.push(row?);
            }
            Ok(searches)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn recent_searches_are_newest_first_and_limited() {
        let (db, _dir) = setup_db().await;
        for i in 0..5 {
            record_search(
                &db,
                &NewSearch {
                    raw_query: format!("00880171100000{i}"),
                    modified_query: format!("+880171100000{i}"),
                    output: (i % 2 == 0).then(|| format!("{{\"id\":{i}}}")),
                },
            )
            .await
            .unwrap();
        }

        let recent = recent_searches(&db, 3).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].raw_query, "008801711000004");
        assert_eq!(recent[1].output, None);
        assert_eq!(recent[2].modified_query, "+8801711000002");
        db.close().await.unwrap();
    }
}
