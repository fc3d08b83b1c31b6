// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record types shared by the store, the identity resolver, the ticket
//! manager, and the gateway.
//!
//! Timestamps are ISO 8601 strings written by SQLite
//! (`strftime('%Y-%m-%dT%H:%M:%fZ', 'now')`).

use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Auth,
    Gateway,
}

/// Billing state of a user account.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    #[default]
    Unpaid,
    Pending,
}

/// Whether a user account is enabled.
///
/// Serialized as `"active"`/`"inactive"`. Deserialization also accepts the
/// boolean spellings callers send (`true`, `false`, `1`, `0`, `"1"`, `"0"`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter, Serialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActiveStatus {
    #[default]
    Active,
    Inactive,
}

impl ActiveStatus {
    pub fn from_flag(active: bool) -> Self {
        if active { Self::Active } else { Self::Inactive }
    }

    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

impl FromStr for ActiveStatus {
    type Err = strum::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" | "true" | "1" | "on" => Ok(Self::Active),
            "inactive" | "false" | "0" | "off" => Ok(Self::Inactive),
            _ => Err(strum::ParseError::VariantNotFound),
        }
    }
}

impl<'de> Deserialize<'de> for ActiveStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Flag(bool),
            Number(i64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Flag(flag) => Ok(Self::from_flag(flag)),
            Repr::Number(1) => Ok(Self::Active),
            Repr::Number(0) => Ok(Self::Inactive),
            Repr::Number(n) => Err(D::Error::custom(format!("invalid active status `{n}`"))),
            Repr::Text(text) => text
                .parse()
                .map_err(|_| D::Error::custom(format!("invalid active status `{text}`"))),
        }
    }
}

/// Ticket workflow state.
///
/// Any state may be assigned from any other; there is no transition graph.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
}

/// A stored user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    /// Argon2 PHC hash. Never serialized.
    #[serde(skip_serializing)]
    pub password: String,
    pub balance: f64,
    pub payment_status: PaymentStatus,
    pub active_status: ActiveStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// A user together with their tickets, newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserWithTickets {
    #[serde(flatten)]
    pub user: User,
    pub tickets: Vec<Ticket>,
}

/// Column values for inserting a user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub password_hash: String,
    pub balance: f64,
    pub payment_status: PaymentStatus,
    pub active_status: ActiveStatus,
}

/// Partial update of a user. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub password_hash: Option<String>,
    pub balance: Option<f64>,
    pub payment_status: Option<PaymentStatus>,
    pub active_status: Option<ActiveStatus>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A stored support ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ticket {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub user_id: i64,
    pub ticket_number: String,
    pub status: TicketStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// A ticket together with its owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketWithUser {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub user: User,
}

/// Column values for inserting a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub ticket_number: String,
    pub status: TicketStatus,
}

/// Partial update of a ticket. The ticket number is immutable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TicketStatus>,
}

/// One row of the phone-lookup audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchLog {
    pub id: i64,
    pub raw_query: String,
    pub modified_query: String,
    /// JSON snapshot of the matched user, `None` on a miss.
    pub output: Option<String>,
    pub created_at: String,
}

/// Column values for appending to the search log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSearch {
    pub raw_query: String,
    pub modified_query: String,
    pub output: Option<String>,
}
