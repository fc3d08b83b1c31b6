// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use deskline_config::model::StorageConfig;
use deskline_core::types::{
    NewSearch, NewTicket, NewUser, SearchLog, Ticket, TicketChanges, TicketStatus, User,
    UserChanges,
};
use deskline_core::{AdapterType, DesklineError, HealthStatus, PluginAdapter, StorageAdapter};

use crate::database::{Database, map_tr_err};
use crate::queries::{searches, tickets, users};

/// SQLite-backed storage adapter.
///
/// The database is opened lazily by [`StorageAdapter::initialize`]; every
/// other call fails with a storage error until then.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, DesklineError> {
        self.db.get().ok_or_else(|| DesklineError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    async fn checkpoint(db: &Database) -> Result<(), DesklineError> {
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
            })
            .await
            .map_err(map_tr_err)
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, DesklineError> {
        let db = match self.db() {
            Ok(db) => db,
            Err(e) => return Ok(HealthStatus::Unhealthy(e.to_string())),
        };
        let probe = db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row("SELECT 1", [], |row| row.get(0))
            })
            .await;
        Ok(match probe {
            Ok(_) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }

    async fn shutdown(&self) -> Result<(), DesklineError> {
        if let Some(db) = self.db.get() {
            Self::checkpoint(db).await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), DesklineError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| DesklineError::Storage {
            source: "storage already initialized".into(),
        })?;
        info!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), DesklineError> {
        Self::checkpoint(self.db()?).await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    // --- Users ---

    async fn get_user(&self, id: i64) -> Result<Option<User>, DesklineError> {
        users::get_user(self.db()?, id).await
    }

    async fn find_user_by_phone(&self, phone: &str) -> Result<Option<User>, DesklineError> {
        users::find_user_by_phone(self.db()?, phone).await
    }

    async fn find_user_by_email_or_phone(
        &self,
        email: &str,
        phone: Option<&str>,
    ) -> Result<Option<User>, DesklineError> {
        users::find_user_by_email_or_phone(self.db()?, email, phone).await
    }

    async fn email_taken(
        &self,
        email: &str,
        except_id: Option<i64>,
    ) -> Result<bool, DesklineError> {
        users::email_taken(self.db()?, email, except_id).await
    }

    async fn phone_taken(
        &self,
        phone: &str,
        except_id: Option<i64>,
    ) -> Result<bool, DesklineError> {
        users::phone_taken(self.db()?, phone, except_id).await
    }

    async fn insert_user(&self, user: &NewUser) -> Result<User, DesklineError> {
        users::insert_user(self.db()?, user).await
    }

    async fn update_user(
        &self,
        id: i64,
        changes: &UserChanges,
    ) -> Result<Option<User>, DesklineError> {
        users::update_user(self.db()?, id, changes).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool, DesklineError> {
        users::delete_user(self.db()?, id).await
    }

    async fn list_users(&self) -> Result<Vec<User>, DesklineError> {
        users::list_users(self.db()?).await
    }

    // --- Tickets ---

    async fn insert_ticket(&self, ticket: &NewTicket) -> Result<Ticket, DesklineError> {
        tickets::insert_ticket(self.db()?, ticket).await
    }

    async fn get_ticket(&self, id: i64) -> Result<Option<Ticket>, DesklineError> {
        tickets::get_ticket(self.db()?, id).await
    }

    async fn list_tickets_for_user(&self, user_id: i64) -> Result<Vec<Ticket>, DesklineError> {
        tickets::list_tickets_for_user(self.db()?, user_id).await
    }

    async fn latest_ticket_for_user(
        &self,
        user_id: i64,
    ) -> Result<Option<Ticket>, DesklineError> {
        tickets::latest_ticket_for_user(self.db()?, user_id).await
    }

    async fn update_ticket_status(
        &self,
        id: i64,
        status: TicketStatus,
    ) -> Result<Option<Ticket>, DesklineError> {
        tickets::update_ticket_status(self.db()?, id, status).await
    }

    async fn update_ticket(
        &self,
        id: i64,
        changes: &TicketChanges,
    ) -> Result<Option<Ticket>, DesklineError> {
        tickets::update_ticket(self.db()?, id, changes).await
    }

    async fn list_tickets(&self) -> Result<Vec<Ticket>, DesklineError> {
        tickets::list_tickets(self.db()?).await
    }

    // --- Search log ---

    async fn record_search(&self, search: &NewSearch) -> Result<(), DesklineError> {
        searches::record_search(self.db()?, search).await
    }

    async fn recent_searches(&self, limit: u32) -> Result<Vec<SearchLog>, DesklineError> {
        searches::recent_searches(self.db()?, limit).await
    }
}
