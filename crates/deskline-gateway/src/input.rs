// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request input shared by the API and the web forms.

use serde_json::Value;

use deskline_core::types::Ticket;
use deskline_core::{DesklineError, ValidationErrors};
use deskline_identity::fields::json_text;
use deskline_tickets::manager::check_content;
use deskline_tickets::{TicketFields, TicketManager, UserRef};

/// Path ids that are not positive integers match nothing.
pub fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

/// Title and description from a JSON body.
///
/// Values of the wrong JSON type are left unset and recorded in `unreadable`.
pub fn ticket_content_from_json(body: &Value, unreadable: &mut ValidationErrors) -> TicketFields {
    TicketFields {
        title: json_text(unreadable, body, "title"),
        description: json_text(unreadable, body, "description"),
        status: None,
    }
}

/// Owner id for a new ticket, recording a message under `user_id` when it is
/// missing or malformed. Accepts a JSON number or numeric text.
pub fn owner_id(errors: &mut ValidationErrors, value: Option<&Value>) -> Option<i64> {
    let id = match value {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) if text.trim().is_empty() => None,
        Some(Value::String(text)) => Some(parse_id(text)),
        Some(Value::Number(n)) => Some(n.as_i64().filter(|id| *id > 0)),
        Some(_) => Some(None),
    };
    match id {
        None => {
            errors.add("user_id", "The user id field is required.");
            None
        }
        Some(None) => {
            errors.add("user_id", "The selected user id is invalid.");
            None
        }
        Some(Some(id)) => Some(id),
    }
}

/// Open a ticket for the user named by `user_id`.
///
/// A bad id or unreadable content is reported together with any title or
/// description failures, without touching the store.
pub async fn create_for_owner(
    tickets: &TicketManager,
    user_id: Option<&Value>,
    fields: &TicketFields,
    unreadable: &ValidationErrors,
) -> Result<Ticket, DesklineError> {
    let mut errors = ValidationErrors::new();
    match owner_id(&mut errors, user_id) {
        Some(id) if unreadable.is_empty() => tickets.create(UserRef::Id(id), fields).await,
        _ => {
            check_content(&mut errors, fields);
            errors.overlay(unreadable);
            Err(DesklineError::Validation(errors))
        }
    }
}
