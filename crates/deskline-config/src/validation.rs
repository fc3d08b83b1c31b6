// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde attributes cannot express: bindable hosts,
//! known phone regions, hasher parameters, ticket number shape.

use crate::diagnostic::ConfigError;
use crate::model::DesklineConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first.
pub fn validate_config(config: &DesklineConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::validation("gateway.host must not be empty"));
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::validation(format!(
                "gateway.host `{host}` is not a valid IP address or hostname"
            )));
        }
    }

    let prefix = &config.gateway.api_prefix;
    if !prefix.starts_with('/') || prefix.len() < 2 || prefix.ends_with('/') {
        errors.push(ConfigError::validation(format!(
            "gateway.api_prefix must look like `/api`, got `{prefix}`"
        )));
    }

    if config
        .identity
        .default_region
        .trim()
        .to_ascii_uppercase()
        .parse::<phonenumber::country::Id>()
        .is_err()
    {
        errors.push(ConfigError::validation(format!(
            "identity.default_region `{}` is not a known ISO 3166 region code",
            config.identity.default_region
        )));
    }

    if config.identity.fallback_password.chars().count() < 8 {
        errors.push(ConfigError::validation(
            "identity.fallback_password must be at least 8 characters",
        ));
    }

    if let Err(e) = argon2::Params::new(
        config.identity.hash_memory_cost,
        config.identity.hash_iterations,
        config.identity.hash_parallelism,
        None,
    ) {
        errors.push(ConfigError::validation(format!(
            "identity.hash_* parameters rejected by Argon2: {e}"
        )));
    }

    if config.identity.upsert_key.as_deref() == Some("") {
        errors.push(ConfigError::validation(
            "identity.upsert_key must not be empty; omit it to disable the upsert endpoint",
        ));
    }

    if !(4..=32).contains(&config.tickets.number_length) {
        errors.push(ConfigError::validation(format!(
            "tickets.number_length must be between 4 and 32, got {}",
            config.tickets.number_length
        )));
    }

    if config.tickets.max_number_attempts < 1 {
        errors.push(ConfigError::validation(
            "tickets.max_number_attempts must be at least 1",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
