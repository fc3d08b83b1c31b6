// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Infallible wrappers over the shared [`TestHarness`].

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};

use deskline_test_utils::TestHarness;

pub use deskline_test_utils::TEST_UPSERT_KEY as KEY;

pub struct TestApp {
    pub harness: TestHarness,
}

pub async fn app() -> TestApp {
    TestApp {
        harness: TestHarness::new().await.unwrap(),
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.harness.send(request).await.unwrap()
    }

    pub async fn json(
        &self,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        self.harness.json(method, uri, body).await.unwrap()
    }

    pub async fn form(&self, uri: &str, body: &str) -> Response<Body> {
        self.harness.form(uri, body).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        self.harness.get(uri, cookie).await.unwrap()
    }

    pub async fn upsert(&self, email: &str, phone: &str) -> i64 {
        self.harness.upsert(email, phone).await.unwrap()
    }
}

pub async fn text(response: Response<Body>) -> String {
    deskline_test_utils::text(response).await.unwrap()
}
