// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket lifecycle management for the Deskline support desk.

pub mod manager;
pub mod number;

pub use manager::{TicketFields, TicketManager, UserRef};
pub use number::{RandomTicketNumbers, TicketNumberGenerator};
