// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Caller verification for privileged operations.

use async_trait::async_trait;

use crate::error::DesklineError;
use crate::traits::adapter::PluginAdapter;

/// Decides whether a caller may run a privileged operation such as the
/// user upsert.
///
/// `credential` is whatever the caller presented (for the shipped
/// implementation, the `key` field of the request body). Implementations
/// return [`DesklineError::Unauthorized`] on mismatch.
#[async_trait]
pub trait CallerVerifier: PluginAdapter {
    async fn verify(&self, credential: Option<&str>) -> Result<(), DesklineError>;
}
