// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared-secret caller verification for the user upsert.
//!
//! When no key is configured every caller is rejected (fail-closed).

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error};

use deskline_config::model::IdentityConfig;
use deskline_core::{AdapterType, CallerVerifier, DesklineError, HealthStatus, PluginAdapter};

/// Compares the presented credential against `identity.upsert_key`.
#[derive(Debug)]
pub struct SharedKeyVerifier {
    key: Option<SecretString>,
}

impl SharedKeyVerifier {
    pub fn new(key: Option<String>) -> Self {
        Self {
            key: key.map(SecretString::from),
        }
    }

    pub fn from_config(config: &IdentityConfig) -> Self {
        Self::new(config.upsert_key.clone())
    }
}

#[async_trait]
impl PluginAdapter for SharedKeyVerifier {
    fn name(&self) -> &str {
        "shared-key"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Auth
    }

    async fn health_check(&self) -> Result<HealthStatus, DesklineError> {
        Ok(match self.key {
            Some(_) => HealthStatus::Healthy,
            None => HealthStatus::Degraded("no upsert key configured".to_string()),
        })
    }

    async fn shutdown(&self) -> Result<(), DesklineError> {
        Ok(())
    }
}

#[async_trait]
impl CallerVerifier for SharedKeyVerifier {
    async fn verify(&self, credential: Option<&str>) -> Result<(), DesklineError> {
        let Some(expected) = &self.key else {
            error!("no upsert key configured -- rejecting caller");
            return Err(DesklineError::Unauthorized);
        };
        match credential {
            Some(presented) if presented == expected.expose_secret() => Ok(()),
            Some(_) => {
                debug!("caller presented a wrong key");
                Err(DesklineError::Unauthorized)
            }
            None => {
                debug!("caller presented no key");
                Err(DesklineError::Unauthorized)
            }
        }
    }
}
