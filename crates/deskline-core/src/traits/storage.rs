// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for the record store.

use async_trait::async_trait;

use crate::error::DesklineError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    NewSearch, NewTicket, NewUser, SearchLog, Ticket, TicketChanges, TicketStatus, User,
    UserChanges,
};

/// Durable storage for users, tickets, and the search log.
///
/// Unique-constraint failures on insert or update surface as
/// [`DesklineError::Conflict`] naming the offending column.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), DesklineError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), DesklineError>;

    // --- Users ---

    async fn get_user(&self, id: i64) -> Result<Option<User>, DesklineError>;

    /// Exact match on the stored phone number.
    async fn find_user_by_phone(&self, phone: &str) -> Result<Option<User>, DesklineError>;

    /// First user whose email equals `email` or whose phone equals `phone`.
    /// An email match wins over a phone match.
    async fn find_user_by_email_or_phone(
        &self,
        email: &str,
        phone: Option<&str>,
    ) -> Result<Option<User>, DesklineError>;

    /// Whether another user (other than `except_id`) already uses `email`.
    async fn email_taken(&self, email: &str, except_id: Option<i64>)
    -> Result<bool, DesklineError>;

    /// Whether another user (other than `except_id`) already uses `phone`.
    async fn phone_taken(&self, phone: &str, except_id: Option<i64>)
    -> Result<bool, DesklineError>;

    async fn insert_user(&self, user: &NewUser) -> Result<User, DesklineError>;

    /// Applies `changes` and returns the updated row, `None` if `id` is unknown.
    async fn update_user(
        &self,
        id: i64,
        changes: &UserChanges,
    ) -> Result<Option<User>, DesklineError>;

    /// Deletes a user and, by cascade, their tickets. Returns whether a row was removed.
    async fn delete_user(&self, id: i64) -> Result<bool, DesklineError>;

    async fn list_users(&self) -> Result<Vec<User>, DesklineError>;

    // --- Tickets ---

    async fn insert_ticket(&self, ticket: &NewTicket) -> Result<Ticket, DesklineError>;

    async fn get_ticket(&self, id: i64) -> Result<Option<Ticket>, DesklineError>;

    /// Tickets owned by `user_id`, newest first.
    async fn list_tickets_for_user(&self, user_id: i64) -> Result<Vec<Ticket>, DesklineError>;

    /// Most recently created ticket for `user_id`; insertion order breaks ties.
    async fn latest_ticket_for_user(&self, user_id: i64)
    -> Result<Option<Ticket>, DesklineError>;

    async fn update_ticket_status(
        &self,
        id: i64,
        status: TicketStatus,
    ) -> Result<Option<Ticket>, DesklineError>;

    async fn update_ticket(
        &self,
        id: i64,
        changes: &TicketChanges,
    ) -> Result<Option<Ticket>, DesklineError>;

    /// All tickets, newest first.
    async fn list_tickets(&self) -> Result<Vec<Ticket>, DesklineError>;

    // --- Search log ---

    async fn record_search(&self, search: &NewSearch) -> Result<(), DesklineError>;

    /// Latest `limit` search-log rows, newest first.
    async fn recent_searches(&self, limit: u32) -> Result<Vec<SearchLog>, DesklineError>;
}
