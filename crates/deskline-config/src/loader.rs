// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./deskline.toml` > `~/.config/deskline/deskline.toml` > `/etc/deskline/deskline.toml`
//! with environment variable overrides via `DESKLINE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::DesklineConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/deskline/deskline.toml` (system-wide)
/// 3. `~/.config/deskline/deskline.toml` (user XDG config)
/// 4. `./deskline.toml` (local directory)
/// 5. `DESKLINE_*` environment variables
pub fn load_config() -> Result<DesklineConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<DesklineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DesklineConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<DesklineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DesklineConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(DesklineConfig::default()))
        .merge(Toml::file("/etc/deskline/deskline.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("deskline/deskline.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("deskline.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")`: `DESKLINE_IDENTITY_UPSERT_KEY`
/// must map to `identity.upsert_key`, not `identity.upsert.key`.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("DESKLINE_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env var name to its dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    const SECTIONS: [&str; 5] = ["server", "storage", "gateway", "identity", "tickets"];

    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
