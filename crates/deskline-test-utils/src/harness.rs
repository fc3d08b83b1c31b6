// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the same stack `deskline serve` runs (SQLite
//! storage, resolver, ticket manager, router) on a temp database, and
//! drives requests through the router in-process.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use deskline_config::model::{DesklineConfig, IdentityConfig, StorageConfig};
use deskline_core::{DesklineError, StorageAdapter};
use deskline_gateway::{AppState, build_router};
use deskline_storage::SqliteStorage;

/// Shared key the harness configures for the upsert endpoint.
pub const TEST_UPSERT_KEY: &str = "test-upsert-key";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    upsert_key: Option<String>,
    api_prefix: String,
    recent_searches_limit: Option<u32>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            upsert_key: Some(TEST_UPSERT_KEY.to_string()),
            api_prefix: "/api".to_string(),
            recent_searches_limit: None,
        }
    }

    /// Replace the upsert key. `None` makes every upsert fail verification.
    pub fn with_upsert_key(mut self, key: Option<&str>) -> Self {
        self.upsert_key = key.map(str::to_string);
        self
    }

    pub fn with_api_prefix(mut self, prefix: &str) -> Self {
        self.api_prefix = prefix.to_string();
        self
    }

    pub fn with_recent_searches_limit(mut self, limit: u32) -> Self {
        self.recent_searches_limit = Some(limit);
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, DesklineError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| DesklineError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let mut config = DesklineConfig {
            storage: StorageConfig {
                database_path: db_path.to_string_lossy().to_string(),
                wal_mode: true,
            },
            // Cheap hashing keeps tests fast.
            identity: IdentityConfig {
                upsert_key: self.upsert_key,
                hash_memory_cost: 1024,
                hash_iterations: 1,
                ..IdentityConfig::default()
            },
            ..DesklineConfig::default()
        };
        config.gateway.api_prefix = self.api_prefix;
        if let Some(limit) = self.recent_searches_limit {
            config.tickets.recent_searches_limit = limit;
        }

        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

        let state = AppState::from_config(&config, storage.clone())?;
        let router = build_router(state.clone(), &config.gateway.api_prefix);

        Ok(TestHarness {
            storage,
            state,
            router,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment over temp storage.
pub struct TestHarness {
    /// SQLite storage adapter (temp DB, cleaned up on drop).
    pub storage: Arc<dyn StorageAdapter>,
    /// Resolver and ticket manager, as the handlers see them.
    pub state: AppState,
    /// The full application router.
    pub router: Router,
    pub config: DesklineConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Build a harness with defaults.
    pub async fn new() -> Result<Self, DesklineError> {
        Self::builder().build().await
    }

    /// The upsert key requests should carry.
    pub fn upsert_key(&self) -> Option<&str> {
        self.config.identity.upsert_key.as_deref()
    }

    /// `path` under the configured API prefix.
    pub fn api(&self, path: &str) -> String {
        format!("{}{}", self.config.gateway.api_prefix, path)
    }

    /// Drive one request through the router.
    pub async fn send(&self, request: Request<Body>) -> Result<Response<Body>, DesklineError> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| DesklineError::Internal(format!("router failed: {e}")))
    }

    /// Send a JSON request and decode the JSON answer.
    ///
    /// An empty response body decodes as `Value::Null`.
    pub async fn json(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value), DesklineError> {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .map_err(|e| DesklineError::Internal(format!("bad request: {e}")))?;

        let response = self.send(request).await?;
        let status = response.status();
        let bytes = read_body(response).await?;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .map_err(|e| DesklineError::Internal(format!("response is not JSON: {e}")))?
        };
        Ok((status, value))
    }

    /// Submit a urlencoded form, as a browser would.
    pub async fn form(&self, uri: &str, body: &str) -> Result<Response<Body>, DesklineError> {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .map_err(|e| DesklineError::Internal(format!("bad request: {e}")))?;
        self.send(request).await
    }

    /// GET `uri`, optionally presenting a `Cookie` header.
    pub async fn get(
        &self,
        uri: &str,
        cookie: Option<&str>,
    ) -> Result<Response<Body>, DesklineError> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder
            .body(Body::empty())
            .map_err(|e| DesklineError::Internal(format!("bad request: {e}")))?;
        self.send(request).await
    }

    /// Fetch a page and return its status and HTML.
    pub async fn page(&self, uri: &str) -> Result<(StatusCode, String), DesklineError> {
        let response = self.get(uri, None).await?;
        let status = response.status();
        Ok((status, text(response).await?))
    }

    /// Upsert a user through the API with the harness key and return its id.
    pub async fn upsert(&self, email: &str, phone: &str) -> Result<i64, DesklineError> {
        let body = serde_json::json!({
            "key": self.upsert_key(),
            "name": "Test User",
            "email": email,
            "phone_number": phone,
        });
        let (status, body) = self.json("POST", &self.api("/user/create"), Some(body)).await?;
        if status != StatusCode::OK {
            return Err(DesklineError::Internal(format!("upsert answered {status}: {body}")));
        }
        body["user"]["id"]
            .as_i64()
            .ok_or_else(|| DesklineError::Internal(format!("upsert returned no id: {body}")))
    }
}

/// A response body as text.
pub async fn text(response: Response<Body>) -> Result<String, DesklineError> {
    let bytes = read_body(response).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

async fn read_body(response: Response<Body>) -> Result<axum::body::Bytes, DesklineError> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .map_err(|e| DesklineError::Internal(format!("failed to read body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn harness_builds_with_defaults() {
        let harness = TestHarness::new().await.unwrap();
        assert_eq!(harness.upsert_key(), Some(TEST_UPSERT_KEY));
        assert_eq!(harness.api("/searches"), "/api/searches");
        assert!(harness.storage.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn harness_honors_prefix_and_limit() {
        let harness = TestHarness::builder()
            .with_api_prefix("/v1")
            .with_recent_searches_limit(3)
            .with_upsert_key(None)
            .build()
            .await
            .unwrap();
        assert_eq!(harness.state.recent_searches_limit, 3);
        assert_eq!(harness.upsert_key(), None);

        let (status, body) = harness.json("GET", "/v1/health", None).await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn upsert_helper_returns_the_same_id_for_one_identity() {
        let harness = TestHarness::new().await.unwrap();
        let first = harness.upsert("a@example.com", "+8801711111111").await.unwrap();
        let again = harness.upsert("b@example.com", "01711111111").await.unwrap();
        assert_eq!(first, again);

        let keyless = TestHarness::builder()
            .with_upsert_key(None)
            .build()
            .await
            .unwrap();
        assert!(keyless.upsert("a@example.com", "+8801711111111").await.is_err());
    }
}
