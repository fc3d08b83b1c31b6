// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `deskline serve` command implementation.
//!
//! Opens SQLite storage, wires the resolver and ticket manager into the
//! gateway, and serves until SIGINT or SIGTERM.

use std::sync::Arc;

use deskline_config::DesklineConfig;
use deskline_core::{DesklineError, StorageAdapter};
use deskline_gateway::{AppState, Gateway};
use deskline_storage::SqliteStorage;
use tracing::{info, warn};

use crate::shutdown;

/// Runs the `deskline serve` command.
pub async fn run_serve(config: DesklineConfig) -> Result<(), DesklineError> {
    init_tracing(&config.server.log_level);

    info!(version = env!("CARGO_PKG_VERSION"), "starting deskline");

    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;
    info!(path = %config.storage.database_path, "storage initialized");

    if config.identity.upsert_key.is_none() {
        warn!("identity.upsert_key is not set; every upsert will be rejected");
    }

    let state = AppState::from_config(&config, storage.clone())?;
    let cancel = shutdown::install_signal_handler();
    let gateway = Gateway::new(config.gateway.clone(), state, cancel);

    let result = gateway.run().await;

    if let Err(e) = storage.close().await {
        warn!(error = %e, "failed to close storage cleanly");
    }
    log_heap_usage();
    info!("deskline stopped");

    result
}

/// Log jemalloc's view of the heap on the way out.
#[cfg(not(target_env = "msvc"))]
fn log_heap_usage() {
    let _ = tikv_jemalloc_ctl::epoch::advance();
    let allocated = tikv_jemalloc_ctl::stats::allocated::read().unwrap_or(0);
    let resident = tikv_jemalloc_ctl::stats::resident::read().unwrap_or(0);
    info!(
        allocated_kb = allocated / 1024,
        resident_kb = resident / 1024,
        "heap usage at shutdown"
    );
}

#[cfg(target_env = "msvc")]
fn log_heap_usage() {}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` takes precedence when set. The `deskline` directive also
/// covers the `deskline_*` library crates.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("deskline={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
