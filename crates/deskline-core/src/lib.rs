// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Deskline support desk.
//!
//! This crate provides the record types, the error taxonomy, and the adapter
//! traits shared by the store, the identity resolver, the ticket manager, and
//! the HTTP gateway.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{DesklineError, ValidationErrors};
pub use types::{AdapterType, HealthStatus};

pub use traits::{CallerVerifier, PluginAdapter, StorageAdapter};
