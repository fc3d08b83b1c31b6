// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Deskline support desk.
//!
//! Serves the JSON API under the configured prefix and the server-rendered
//! web pages from the root, on one axum router.

pub mod api;
pub mod error;
pub mod html;
pub mod input;
pub mod server;
pub mod web;

use async_trait::async_trait;
use axum::Router;
use tokio_util::sync::CancellationToken;

use deskline_config::model::GatewayConfig;
use deskline_core::{AdapterType, DesklineError, HealthStatus, PluginAdapter};

pub use server::{AppState, HealthState, build_router, start_server};

/// The HTTP front end as a managed adapter.
pub struct Gateway {
    config: GatewayConfig,
    state: AppState,
    shutdown: CancellationToken,
}

impl Gateway {
    /// `shutdown` stops the server gracefully once cancelled.
    pub fn new(config: GatewayConfig, state: AppState, shutdown: CancellationToken) -> Self {
        Self {
            config,
            state,
            shutdown,
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone(), &self.config.api_prefix)
    }

    /// Serve until the shutdown token is cancelled.
    pub async fn run(&self) -> Result<(), DesklineError> {
        start_server(&self.config, self.state.clone(), self.shutdown.clone()).await
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("config", &self.config)
            .field("stopping", &self.shutdown.is_cancelled())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PluginAdapter for Gateway {
    fn name(&self) -> &str {
        "http-gateway"
    }

    fn version(&self) -> semver::Version {
        semver::Version::parse(env!("CARGO_PKG_VERSION")).unwrap_or(semver::Version::new(0, 1, 0))
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Gateway
    }

    async fn health_check(&self) -> Result<HealthStatus, DesklineError> {
        if self.shutdown.is_cancelled() {
            return Ok(HealthStatus::Unhealthy("shutting down".to_string()));
        }
        self.state.storage.health_check().await
    }

    async fn shutdown(&self) -> Result<(), DesklineError> {
        self.shutdown.cancel();
        Ok(())
    }
}
