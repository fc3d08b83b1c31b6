// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Deskline support desk.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Deskline configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DesklineConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// User identity resolution settings.
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Ticket lifecycle settings.
    #[serde(default)]
    pub tickets: TicketsConfig,
}

/// Process-wide configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    "deskline.db".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path prefix for the JSON API. Web pages are served from the root.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_prefix: default_api_prefix(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_api_prefix() -> String {
    "/api".to_string()
}

/// User identity resolution configuration.
///
/// Argon2id parameters follow the OWASP minimum (19 MiB, 2 passes, 1 lane).
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    /// Shared secret callers must present to the upsert endpoint.
    /// `None` rejects every upsert.
    #[serde(default)]
    pub upsert_key: Option<String>,

    /// ISO 3166 region assumed for phone numbers without a `+`/`00` prefix.
    #[serde(default = "default_region")]
    pub default_region: String,

    /// Password hashed for users created by the upsert without one.
    #[serde(default = "default_fallback_password")]
    pub fallback_password: String,

    /// Argon2id memory cost in KiB.
    #[serde(default = "default_hash_memory_cost")]
    pub hash_memory_cost: u32,

    /// Argon2id iteration count.
    #[serde(default = "default_hash_iterations")]
    pub hash_iterations: u32,

    /// Argon2id parallelism lanes.
    #[serde(default = "default_hash_parallelism")]
    pub hash_parallelism: u32,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            upsert_key: None,
            default_region: default_region(),
            fallback_password: default_fallback_password(),
            hash_memory_cost: default_hash_memory_cost(),
            hash_iterations: default_hash_iterations(),
            hash_parallelism: default_hash_parallelism(),
        }
    }
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("upsert_key", &self.upsert_key.as_ref().map(|_| "[redacted]"))
            .field("default_region", &self.default_region)
            .field("fallback_password", &"[redacted]")
            .field("hash_memory_cost", &self.hash_memory_cost)
            .field("hash_iterations", &self.hash_iterations)
            .field("hash_parallelism", &self.hash_parallelism)
            .finish()
    }
}

fn default_region() -> String {
    "BD".to_string()
}

fn default_fallback_password() -> String {
    "12345678".to_string()
}

fn default_hash_memory_cost() -> u32 {
    19456
}

fn default_hash_iterations() -> u32 {
    2
}

fn default_hash_parallelism() -> u32 {
    1
}

/// Ticket lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TicketsConfig {
    /// Literal prefix of every ticket number.
    #[serde(default = "default_number_prefix")]
    pub number_prefix: String,

    /// Count of random `[A-Z0-9]` characters after the prefix.
    #[serde(default = "default_number_length")]
    pub number_length: usize,

    /// Insert attempts before giving up on ticket number collisions.
    #[serde(default = "default_max_number_attempts")]
    pub max_number_attempts: u32,

    /// Rows returned by the search-log listing.
    #[serde(default = "default_recent_searches_limit")]
    pub recent_searches_limit: u32,
}

impl Default for TicketsConfig {
    fn default() -> Self {
        Self {
            number_prefix: default_number_prefix(),
            number_length: default_number_length(),
            max_number_attempts: default_max_number_attempts(),
            recent_searches_limit: default_recent_searches_limit(),
        }
    }
}

fn default_number_prefix() -> String {
    "TKT-".to_string()
}

fn default_number_length() -> usize {
    8
}

fn default_max_number_attempts() -> u32 {
    5
}

fn default_recent_searches_limit() -> u32 {
    25
}
