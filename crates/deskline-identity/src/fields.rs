// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Caller-supplied user fields, before validation.

use deskline_core::ValidationErrors;
use deskline_core::types::ActiveStatus;
use serde_json::Value;

use crate::validation::label;

/// A balance as callers send it: a JSON number or numeric text.
#[derive(Debug, Clone, PartialEq)]
pub enum BalanceInput {
    Number(f64),
    Text(String),
}

impl From<f64> for BalanceInput {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// User fields accepted by upsert, create, and update.
///
/// Everything is optional at this layer; each operation applies its own
/// required-field rules.
#[derive(Clone, Default)]
pub struct UserFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub password: Option<String>,
    pub balance: Option<BalanceInput>,
    pub payment_status: Option<String>,
    pub active_status: Option<ActiveStatus>,
    /// Fields the input carried in a shape no rule can use, with the message
    /// to report for each. Those fields are left `None` above.
    pub unreadable: ValidationErrors,
}

impl UserFields {
    /// Read user fields from a JSON body without failing on odd types.
    ///
    /// `null` counts as absent and unknown keys are ignored. A value of the
    /// wrong JSON type is recorded in `unreadable` so it can be reported next
    /// to the other field failures.
    pub fn from_json(body: &Value) -> Self {
        let mut unreadable = ValidationErrors::new();
        let name = json_text(&mut unreadable, body, "name");
        let email = json_text(&mut unreadable, body, "email");
        let phone_number = json_text(&mut unreadable, body, "phone_number");
        let password = json_text(&mut unreadable, body, "password");
        let balance = json_balance(&mut unreadable, body);
        let payment_status = json_text(&mut unreadable, body, "payment_status");
        let active_status = json_active_status(&mut unreadable, body);
        Self {
            name,
            email,
            phone_number,
            password,
            balance,
            payment_status,
            active_status,
            unreadable,
        }
    }
}

/// A string member of `body`; any other non-null type is unreadable.
pub fn json_text(unreadable: &mut ValidationErrors, body: &Value, field: &str) -> Option<String> {
    match body.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(_) => {
            unreadable.add(field, format!("The {} field must be a string.", label(field)));
            None
        }
    }
}

fn json_balance(unreadable: &mut ValidationErrors, body: &Value) -> Option<BalanceInput> {
    match body.get("balance") {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_f64().map(BalanceInput::Number),
        Some(Value::String(text)) => Some(BalanceInput::Text(text.clone())),
        Some(_) => {
            unreadable.add("balance", "The balance field must be a number.");
            None
        }
    }
}

/// Booleans, `0`/`1`, and the text spellings [`ActiveStatus`] knows.
fn json_active_status(unreadable: &mut ValidationErrors, body: &Value) -> Option<ActiveStatus> {
    let value = match body.get("active_status") {
        None | Some(Value::Null) => return None,
        Some(Value::String(text)) if text.trim().is_empty() => return None,
        Some(value) => value,
    };
    match serde_json::from_value::<ActiveStatus>(value.clone()) {
        Ok(status) => Some(status),
        Err(_) => {
            unreadable.add("active_status", "The active status field must be true or false.");
            None
        }
    }
}

impl std::fmt::Debug for UserFields {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserFields")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("phone_number", &self.phone_number)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .field("balance", &self.balance)
            .field("payment_status", &self.payment_status)
            .field("active_status", &self.active_status)
            .field("unreadable", &self.unreadable)
            .finish()
    }
}
