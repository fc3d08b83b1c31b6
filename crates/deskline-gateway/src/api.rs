// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON API handlers.
//!
//! Lookups that miss answer `200` with a `message` body; existing clients
//! key off the message rather than the status.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;

use deskline_core::types::{SearchLog, Ticket};
use deskline_core::{DesklineError, HealthStatus, ValidationErrors};
use deskline_identity::UserFields;
use deskline_identity::fields::json_text;
use deskline_tickets::manager::{check_content, check_status};
use deskline_tickets::UserRef;

use crate::error::{ApiError, MessageResponse, user_not_found_flagged};
use crate::input::{create_for_owner, parse_id, ticket_content_from_json};
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct UserResponse<T> {
    pub user: T,
}

#[derive(Debug, Serialize)]
pub struct TicketResponse<T> {
    pub ticket: T,
}

#[derive(Debug, Serialize)]
pub struct UserMessageResponse<T> {
    pub message: &'static str,
    pub user: T,
}

#[derive(Debug, Serialize)]
pub struct TicketMessageResponse<T> {
    pub message: &'static str,
    pub ticket: T,
}

#[derive(Debug, Serialize)]
pub struct SearchesResponse {
    pub searches: Vec<SearchLog>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, `degraded`, or `unhealthy`, from the storage check.
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

fn miss(message: &str) -> Response {
    (StatusCode::OK, Json(MessageResponse::new(message))).into_response()
}

/// GET /user/{id}
///
/// The user with their tickets, newest first.
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let Some(id) = parse_id(&id) else {
        return Ok(miss("User not found"));
    };
    match state.resolver.find_by_id(id).await {
        Ok(user) => Ok(Json(UserResponse { user }).into_response()),
        Err(DesklineError::UserNotFound) => Ok(miss("User not found")),
        Err(e) => Err(e.into()),
    }
}

/// GET /user-phone/{phone}
pub async fn get_user_by_phone(
    State(state): State<AppState>,
    Path(phone): Path<String>,
) -> Result<Response, ApiError> {
    match state.resolver.find_by_phone(&phone).await {
        Ok(user) => Ok(Json(UserResponse { user }).into_response()),
        Err(DesklineError::UserNotFound) => Ok(miss("User not found")),
        Err(e) => Err(e.into()),
    }
}

/// POST /user/create
///
/// Upsert keyed on email or phone, gated by the shared key.
///
/// The body is taken as loose JSON so the key is checked before any field's
/// type is; a `key` that is not a string counts as missing.
pub async fn post_user_create(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = payload?;
    let key = body.get("key").and_then(Value::as_str);
    let fields = UserFields::from_json(&body);
    let (user, created) = state.resolver.resolve_or_create(key, &fields).await?;
    let message = if created {
        "User successfully created"
    } else {
        "User successfully updated"
    };
    Ok(Json(UserMessageResponse { message, user }).into_response())
}

/// POST /user/ticket-create
pub async fn post_ticket_create(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = payload?;
    let mut unreadable = ValidationErrors::new();
    let fields = ticket_content_from_json(&body, &mut unreadable);
    let ticket =
        create_for_owner(&state.tickets, body.get("user_id"), &fields, &unreadable).await?;
    Ok(created_ticket(ticket))
}

/// POST /user/ticket-create/phn
///
/// The owner is looked up by phone after rewriting a `00` prefix.
pub async fn post_ticket_create_by_phone(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = payload?;
    let mut unreadable = ValidationErrors::new();
    let phone = owner_phone(&body, &mut unreadable);
    let fields = ticket_content_from_json(&body, &mut unreadable);

    let phone = match phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()) {
        Some(phone) if unreadable.is_empty() => phone,
        phone => {
            let mut errors = ValidationErrors::new();
            if phone.is_none() {
                errors.add("phone_number", "The phone number field is required.");
            }
            check_content(&mut errors, &fields);
            errors.overlay(&unreadable);
            return Err(errors.into());
        }
    };

    match state.tickets.create(UserRef::Phone(phone), &fields).await {
        Ok(ticket) => Ok(created_ticket(ticket)),
        Err(DesklineError::UserNotFound) => Ok(user_not_found_flagged()),
        Err(e) => Err(e.into()),
    }
}

/// `phone_number`, or `phone` when that is absent.
fn owner_phone(body: &Value, unreadable: &mut ValidationErrors) -> Option<String> {
    let value = match body.get("phone_number") {
        None | Some(Value::Null) => body.get("phone"),
        given => given,
    };
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(phone)) => Some(phone.clone()),
        Some(_) => {
            unreadable.add("phone_number", "The phone number field must be a string.");
            None
        }
    }
}

fn created_ticket(ticket: Ticket) -> Response {
    (
        StatusCode::CREATED,
        Json(TicketMessageResponse {
            message: "Ticket created successfully",
            ticket,
        }),
    )
        .into_response()
}

/// GET /user/ticket/{id}
///
/// The ticket with its owner.
pub async fn get_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let Some(id) = parse_id(&id) else {
        return Ok(miss("Ticket not found"));
    };
    match state.tickets.find_by_id(id).await {
        Ok(ticket) => Ok(Json(TicketResponse { ticket }).into_response()),
        Err(DesklineError::TicketNotFound) => Ok(miss("Ticket not found")),
        Err(e) => Err(e.into()),
    }
}

/// GET /user/last-ticket/{id}
///
/// `id` is a user id.
pub async fn get_last_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let Some(id) = parse_id(&id) else {
        return Ok(miss("User not found"));
    };
    match state.tickets.find_latest_for_user(id).await {
        Ok(ticket) => Ok(Json(TicketResponse { ticket }).into_response()),
        Err(DesklineError::UserNotFound) => Ok(miss("User not found")),
        Err(DesklineError::NoTicketsFound) => Ok(miss("No tickets found for this user")),
        Err(e) => Err(e.into()),
    }
}

/// PUT /ticket-status/{id}
///
/// The status is validated before the ticket is looked up.
pub async fn put_ticket_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = payload?;
    let mut unreadable = ValidationErrors::new();
    let status = json_text(&mut unreadable, &body, "status").unwrap_or_default();
    unreadable.into_result()?;

    let Some(id) = parse_id(&id) else {
        let mut errors = ValidationErrors::new();
        check_status(&mut errors, Some(&status));
        errors.into_result()?;
        return Ok(miss("Ticket not found"));
    };

    match state.tickets.update_status(id, &status).await {
        Ok(ticket) => Ok(Json(TicketMessageResponse {
            message: "Ticket status updated successfully",
            ticket,
        })
        .into_response()),
        Err(DesklineError::TicketNotFound) => Ok(miss("Ticket not found")),
        Err(e) => Err(e.into()),
    }
}

/// GET /searches
///
/// Latest phone lookups, newest first.
pub async fn get_searches(State(state): State<AppState>) -> Result<Response, ApiError> {
    let searches = state
        .resolver
        .recent_searches(state.recent_searches_limit)
        .await?;
    Ok(Json(SearchesResponse { searches }).into_response())
}

/// GET /health
pub async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = match state.storage.health_check().await {
        Ok(HealthStatus::Healthy) => "ok",
        Ok(HealthStatus::Degraded(_)) => "degraded",
        Ok(HealthStatus::Unhealthy(reason)) => {
            tracing::warn!(%reason, "storage reported unhealthy");
            "unhealthy"
        }
        Err(e) => {
            tracing::warn!(error = %e, "storage health check failed");
            "unhealthy"
        }
    };
    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
    })
}
