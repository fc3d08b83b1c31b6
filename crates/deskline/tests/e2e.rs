// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests over the assembled stack.
//!
//! Each test gets an isolated TestHarness with its own temp SQLite database.

use axum::http::{StatusCode, header};
use serde_json::json;

use deskline_test_utils::TestHarness;

// ---- Support desk flow: upsert, lookup, ticket, status ----

#[tokio::test]
async fn support_call_flow() {
    let harness = TestHarness::new().await.unwrap();
    let key = harness.upsert_key().unwrap().to_string();

    let (status, body) = harness
        .json(
            "POST",
            &harness.api("/user/create"),
            Some(json!({
                "key": key,
                "name": "Caller",
                "email": "caller@example.com",
                "phone_number": "01712345678",
                "balance": "20.5",
                "active_status": true,
            })),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["user"]["phone_number"], "+8801712345678");
    assert_eq!(body["user"]["balance"], 20.5);
    assert_eq!(body["user"]["active_status"], "active");
    let user_id = body["user"]["id"].as_i64().unwrap();

    let (_, body) = harness
        .json("GET", &harness.api("/user-phone/008801712345678"), None)
        .await
        .unwrap();
    assert_eq!(body["user"]["id"], user_id);

    let (status, body) = harness
        .json(
            "POST",
            &harness.api("/user/ticket-create/phn"),
            Some(json!({
                "phone": "008801712345678",
                "title": "No signal",
                "description": "Phone shows no bars",
            })),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let ticket_id = body["ticket"]["id"].as_i64().unwrap();
    assert_eq!(body["ticket"]["user_id"], user_id);

    let (status, _) = harness
        .json(
            "PUT",
            &harness.api(&format!("/ticket-status/{ticket_id}")),
            Some(json!({"status": "resolved"})),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);

    let (_, body) = harness
        .json("GET", &harness.api(&format!("/user/{user_id}")), None)
        .await
        .unwrap();
    assert_eq!(body["user"]["tickets"][0]["status"], "resolved");

    let (status, page) = harness.page(&format!("/tickets/{ticket_id}")).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("No signal"));
    assert!(page.contains("Caller"));
}

// ---- Upsert identity resolution ----

#[tokio::test]
async fn upsert_matches_by_phone_when_email_is_new() {
    let harness = TestHarness::new().await.unwrap();
    let key = harness.upsert_key().unwrap().to_string();
    let uri = harness.api("/user/create");

    let (_, first) = harness
        .json(
            "POST",
            &uri,
            Some(json!({"key": key, "name": "A", "email": "a@example.com", "phone_number": "+8801811111111"})),
        )
        .await
        .unwrap();

    let (status, second) = harness
        .json(
            "POST",
            &uri,
            Some(json!({"key": key, "name": "A2", "email": "a2@example.com", "phone_number": "01811111111"})),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["message"], "User successfully updated");
    assert_eq!(second["user"]["id"], first["user"]["id"]);
    assert_eq!(second["user"]["email"], "a2@example.com");
    assert_eq!(harness.storage.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn upserts_rejected_without_configured_key() {
    let harness = TestHarness::builder()
        .with_upsert_key(None)
        .build()
        .await
        .unwrap();

    let (status, body) = harness
        .json(
            "POST",
            &harness.api("/user/create"),
            Some(json!({"key": "", "name": "A", "email": "a@example.com"})),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Invalid key");
    assert!(harness.storage.list_users().await.unwrap().is_empty());
}

// ---- Configuration wiring ----

#[tokio::test]
async fn api_prefix_and_search_limit_follow_config() {
    let harness = TestHarness::builder()
        .with_api_prefix("/v2")
        .with_recent_searches_limit(2)
        .build()
        .await
        .unwrap();

    for phone in ["111", "222", "333"] {
        harness
            .json("GET", &format!("/v2/user-phone/{phone}"), None)
            .await
            .unwrap();
    }

    let (status, body) = harness.json("GET", "/v2/searches", None).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let searches = body["searches"].as_array().unwrap();
    assert_eq!(searches.len(), 2);
    assert_eq!(searches[0]["raw_query"], "333");

    let (status, _) = harness.page("/api/searches").await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---- Web and API share one store ----

#[tokio::test]
async fn web_created_user_is_visible_to_api() {
    let harness = TestHarness::new().await.unwrap();

    let response = harness
        .form(
            "/users",
            "name=Web+User&email=web%40example.com&phone_number=%2B8801911111111&password=password&active_status=on",
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/users");

    let (status, body) = harness
        .json("GET", &harness.api("/user-phone/+8801911111111"), None)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Web User");
    assert_eq!(body["user"]["active_status"], "active");

    let user_id = body["user"]["id"].as_i64().unwrap();
    let (status, body) = harness
        .json("GET", &harness.api(&format!("/user/last-ticket/{user_id}")), None)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "No tickets found for this user");
}
