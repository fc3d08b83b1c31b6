// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Deskline integration tests.
//!
//! [`TestHarness`] wires storage, the user resolver, the ticket manager, and
//! the HTTP router over a throwaway SQLite database.

pub mod harness;

pub use harness::{TEST_UPSERT_KEY, TestHarness, TestHarnessBuilder, text};
