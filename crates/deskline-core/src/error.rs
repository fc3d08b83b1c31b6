// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Deskline support desk.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;

/// The primary error type used across storage, identity, ticket, and gateway code.
#[derive(Debug, Error)]
pub enum DesklineError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Request input failed one or more field rules.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// No user matched the given id or identity.
    #[error("user not found")]
    UserNotFound,

    /// No ticket matched the given id.
    #[error("ticket not found")]
    TicketNotFound,

    /// The user exists but has never filed a ticket.
    #[error("no tickets found for this user")]
    NoTicketsFound,

    /// The caller failed the verify-caller check.
    #[error("caller is not authorized")]
    Unauthorized,

    /// A phone number could not be parsed into E.164 form.
    #[error("invalid phone number format: {input}")]
    InvalidPhoneFormat { input: String },

    /// A unique constraint rejected the write (lost a race on email, phone, or ticket number).
    #[error("unique constraint violated on `{field}`")]
    Conflict { field: String },

    /// Every generated ticket number collided with an existing one.
    #[error("could not allocate a unique ticket number after {attempts} attempts")]
    TicketNumberExhausted { attempts: u32 },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DesklineError {
    /// Shorthand for a validation failure on a single field.
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        Self::Validation(errors)
    }
}

impl From<ValidationErrors> for DesklineError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

/// Field-level validation messages, keyed by input field name.
///
/// Fields keep the order they were first recorded in, which is the order
/// the rules ran. Serializes as `{"field": ["message", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<(String, Vec<String>)>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, field: &str) -> &mut Vec<String> {
        let index = match self.0.iter().position(|(name, _)| name == field) {
            Some(index) => index,
            None => {
                self.0.push((field.to_string(), Vec::new()));
                self.0.len() - 1
            }
        };
        &mut self.0[index].1
    }

    /// Record a message against `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.entry(field).push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of messages across all fields.
    pub fn len(&self) -> usize {
        self.0.iter().map(|(_, messages)| messages.len()).sum()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Messages recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
    }

    /// Field names in the order they were first recorded.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn first_message(&self) -> Option<&str> {
        self.0
            .first()
            .and_then(|(_, messages)| messages.first())
            .map(String::as_str)
    }

    /// Fold `other` into `self`.
    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.0 {
            self.entry(&field).extend(messages);
        }
    }

    /// Let `other` speak for every field it names.
    ///
    /// A field already present keeps its position but takes `other`'s
    /// messages; new fields are appended.
    pub fn overlay(&mut self, other: &ValidationErrors) {
        for (field, messages) in &other.0 {
            *self.entry(field) = messages.clone();
        }
    }

    /// `Ok(())` when nothing was recorded, otherwise a [`DesklineError::Validation`].
    pub fn into_result(self) -> Result<(), DesklineError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DesklineError::Validation(self))
        }
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, messages) in &self.0 {
            map.serialize_entry(field, messages)?;
        }
        map.end()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(first) = self.first_message() else {
            return f.write_str("no errors");
        };
        match self.len() {
            1 => f.write_str(first),
            2 => write!(f, "{first} (and 1 more error)"),
            n => write!(f, "{first} (and {} more errors)", n - 1),
        }
    }
}
