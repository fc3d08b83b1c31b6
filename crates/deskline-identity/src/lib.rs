// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User identity for the Deskline support desk.
//!
//! Phone normalization, Argon2id password hashing, shared-key caller
//! verification, field validation, and the [`UserResolver`] that ties them
//! to the record store.

pub mod fields;
pub mod password;
pub mod phone;
pub mod resolver;
pub mod validation;
pub mod verifier;

pub use fields::{BalanceInput, UserFields};
pub use password::PasswordHasher;
pub use resolver::UserResolver;
pub use verifier::SharedKeyVerifier;
