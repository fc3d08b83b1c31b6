// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket CRUD operations.
//!
//! Tickets are never deleted directly; they go away only when their owner does.

use deskline_core::DesklineError;
use deskline_core::types::{NewTicket, Ticket, TicketChanges, TicketStatus};
use rusqlite::types::Value;
use rusqlite::{OptionalExtension, params, params_from_iter};

use crate::database::{Database, map_tr_err};
use crate::queries::enum_column;

const TICKET_COLUMNS: &str =
    "id, title, description, user_id, ticket_number, status, created_at, updated_at";

/// Newest first; ids break ties between rows created in the same millisecond.
const NEWEST_FIRST: &str = "ORDER BY created_at DESC, id DESC";

fn ticket_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Ticket> {
    Ok(Ticket {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        user_id: row.get(3)?,
        ticket_number: row.get(4)?,
        status: enum_column(row, 5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Insert a ticket and return the stored row.
///
/// A taken `ticket_number` surfaces as `Conflict { field: "ticket_number" }`.
pub async fn insert_ticket(db: &Database, ticket: &NewTicket) -> Result<Ticket, DesklineError> {
    let ticket = ticket.clone();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "INSERT INTO tickets (title, description, user_id, ticket_number, status)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     RETURNING {TICKET_COLUMNS}"
                ),
                params![
                    ticket.title,
                    ticket.description,
                    ticket.user_id,
                    ticket.ticket_number,
                    ticket.status.as_ref(),
                ],
                ticket_from_row,
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Get a ticket by ID.
pub async fn get_ticket(db: &Database, id: i64) -> Result<Option<Ticket>, DesklineError> {
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = ?1"))?;
            let result = stmt.query_row(params![id], ticket_from_row);
            match result {
                Ok(ticket) => Ok(Some(ticket)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Tickets owned by `user_id`, newest first.
pub async fn list_tickets_for_user(
    db: &Database,
    user_id: i64,
) -> Result<Vec<Ticket>, DesklineError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TICKET_COLUMNS} FROM tickets WHERE user_id = ?1 {NEWEST_FIRST}"
            ))?;
            let rows = stmt.query_map(params![user_id], ticket_from_row)?;
            let mut tickets = Vec::new();
            for row in rows {
                tickets.push(row?);
            }
            Ok(tickets)
        })
        .await
        .map_err(map_tr_err)
}

/// The most recently created ticket for `user_id`.
pub async fn latest_ticket_for_user(
    db: &Database,
    user_id: i64,
) -> Result<Option<Ticket>, DesklineError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {TICKET_COLUMNS} FROM tickets WHERE user_id = ?1 {NEWEST_FIRST} LIMIT 1"
                ),
                params![user_id],
                ticket_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Overwrite a ticket's status and bump `updated_at`.
pub async fn update_ticket_status(
    db: &Database,
    id: i64,
    status: TicketStatus,
) -> Result<Option<Ticket>, DesklineError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "UPDATE tickets
                     SET status = ?1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                     WHERE id = ?2
                     RETURNING {TICKET_COLUMNS}"
                ),
                params![status.as_ref(), id],
                ticket_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Apply a partial update to title, description, or status.
pub async fn update_ticket(
    db: &Database,
    id: i64,
    changes: &TicketChanges,
) -> Result<Option<Ticket>, DesklineError> {
    let mut assignments = Vec::new();
    let mut values = Vec::new();
    if let Some(title) = &changes.title {
        values.push(Value::Text(title.clone()));
        assignments.push(format!("title = ?{}", values.len()));
    }
    if let Some(description) = &changes.description {
        values.push(Value::Text(description.clone()));
        assignments.push(format!("description = ?{}", values.len()));
    }
    if let Some(status) = changes.status {
        values.push(Value::Text(status.to_string()));
        assignments.push(format!("status = ?{}", values.len()));
    }
    assignments.push("updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')".to_string());
    values.push(Value::Integer(id));
    let sql = format!(
        "UPDATE tickets SET {} WHERE id = ?{} RETURNING {TICKET_COLUMNS}",
        assignments.join(", "),
        values.len()
    );

    db.connection()
        .call(move |conn| {
            conn.query_row(&sql, params_from_iter(values), ticket_from_row)
                .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Every ticket, newest first.
pub async fn list_tickets(db: &Database) -> Result<Vec<Ticket>, DesklineError> {
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {TICKET_COLUMNS} FROM tickets {NEWEST_FIRST}"))?;
            let rows = stmt.query_map([], ticket_from_row)?;
            let mut tickets = Vec::new();
            for row in rows {
                tickets.push(row?);
            }
            Ok(tickets)
        })
        .await
        .map_err(map_tr_err)
}
