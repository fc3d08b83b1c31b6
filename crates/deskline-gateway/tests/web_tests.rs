// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Web pages: forms, redirects, flash messages, and 404s.

mod common;

use axum::http::{StatusCode, header};

use common::{app, text};

fn flash_cookie(response: &axum::http::Response<axum::body::Body>) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("flash cookie set")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn create_user_redirects_with_flash() {
    let app = app().await;

    let response = app
        .form(
            "/users",
            "name=Jane+Smith&email=jane%40example.com&phone_number=9876543210&password=password&balance=50&payment_status=pending&active_status=1",
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/users");
    let cookie = flash_cookie(&response);
    assert_eq!(cookie, "flash=user-created");

    let response = app.get("/users", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let removal = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("flash cleared")
        .to_str()
        .unwrap()
        .to_string();
    assert!(removal.starts_with("flash="));
    let page = text(response).await;
    assert!(page.contains("User created successfully"));
    assert!(page.contains("Jane Smith"));
    assert!(page.contains("$50.00"));

    let page = text(app.get("/users", None).await).await;
    assert!(!page.contains("User created successfully"));
}

#[tokio::test]
async fn invalid_user_form_rerenders_with_422() {
    let app = app().await;

    let response = app
        .form("/users", "name=&email=bad&phone_number=&password=short")
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let page = text(response).await;
    assert!(page.contains("The name field is required."));
    assert!(page.contains("The email field must be a valid email address."));
    assert!(page.contains("The phone number field is required."));
    assert!(page.contains("The password field must be at least 8 characters."));
    assert!(page.contains(r#"value="bad""#));
}

#[tokio::test]
async fn duplicate_email_is_reported_as_taken() {
    let app = app().await;
    let body = "name=A&email=a%40x.com&phone_number=111&password=password1&active_status=1";
    assert_eq!(app.form("/users", body).await.status(), StatusCode::SEE_OTHER);

    let response = app
        .form(
            "/users",
            "name=B&email=a%40x.com&phone_number=222&password=password1",
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(text(response).await.contains("The email has already been taken."));
}

#[tokio::test]
async fn edit_user_via_post_keeps_password() {
    let app = app().await;
    let id = app.upsert("g@x.com", "01711111111").await;

    let response = app.get(&format!("/users/{id}/edit"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(text(response).await.contains("g@x.com"));

    let response = app
        .form(
            &format!("/users/{id}"),
            "name=Renamed&email=g%40x.com&phone_number=%2B8801711111111&password=&balance=12.5&payment_status=paid",
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], format!("/users/{id}"));
    let cookie = flash_cookie(&response);

    let page = text(app.get(&format!("/users/{id}"), Some(&cookie)).await).await;
    assert!(page.contains("User updated successfully"));
    assert!(page.contains("Renamed"));
    assert!(page.contains("$12.50"));
    assert!(page.contains("Inactive"));
}

#[tokio::test]
async fn ticket_pages_round_trip() {
    let app = app().await;
    let user_id = app.upsert("h@x.com", "01811111111").await;

    let page = text(app.get(&format!("/tickets/create?user_id={user_id}"), None).await).await;
    assert!(page.contains(&format!(r#"<option value="{user_id}" selected>"#)));

    let response = app
        .form(
            "/tickets",
            &format!("user_id={user_id}&title=Printer&description=Out+of+%3Ctoner%3E"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response.headers()[header::LOCATION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(location.starts_with("/tickets/"));
    let cookie = flash_cookie(&response);

    let page = text(app.get(&location, Some(&cookie)).await).await;
    assert!(page.contains("Ticket created successfully"));
    assert!(page.contains("Out of &lt;toner&gt;"));
    assert!(page.contains("TKT-"));

    let response = app
        .form(
            &location,
            "title=Printer&description=Fixed&status=resolved",
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let page = text(app.get("/tickets", None).await).await;
    assert!(page.contains("Printer"));
    assert!(page.contains("Resolved"));

    let page = text(app.get(&format!("/users/{user_id}"), None).await).await;
    assert!(page.contains("Printer"));
}

#[tokio::test]
async fn invalid_ticket_forms_rerender() {
    let app = app().await;

    let response = app.form("/tickets", "user_id=&title=&description=").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let page = text(response).await;
    assert!(page.contains("The user id field is required."));
    assert!(page.contains("The title field is required."));

    let user_id = app.upsert("i@x.com", "01911111111").await;
    let response = app
        .form(
            "/tickets",
            &format!("user_id={user_id}&title=T&description=D"),
        )
        .await;
    let location = response.headers()[header::LOCATION]
        .to_str()
        .unwrap()
        .to_string();

    let response = app
        .form(&location, "title=T&description=D&status=archived")
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(text(response).await.contains("The selected status is invalid."));
}

#[tokio::test]
async fn unknown_records_render_404() {
    let app = app().await;

    for uri in ["/users/42", "/users/42/edit", "/tickets/42", "/tickets/x/edit", "/nowhere"] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        assert!(text(response).await.contains("not found."));
    }
}
