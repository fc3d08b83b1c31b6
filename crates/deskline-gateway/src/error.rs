// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from [`DesklineError`] to JSON API responses.
//!
//! Handlers that must answer a miss with `200` and a message do so
//! themselves; everything reaching [`ApiError`] uses the status below.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use deskline_core::{DesklineError, ValidationErrors};

/// Body for responses that carry only a message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body for `422` validation failures.
#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    pub message: String,
    pub errors: ValidationErrors,
}

impl From<ValidationErrors> for ValidationResponse {
    fn from(errors: ValidationErrors) -> Self {
        Self {
            message: errors.to_string(),
            errors,
        }
    }
}

/// A failed API request.
#[derive(Debug)]
pub enum ApiError {
    Domain(DesklineError),
    /// The request body could not be read as JSON.
    Rejected { status: StatusCode, message: String },
}

impl From<DesklineError> for ApiError {
    fn from(err: DesklineError) -> Self {
        Self::Domain(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Domain(DesklineError::Validation(errors))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(MessageResponse::new(text))).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = match self {
            Self::Rejected { status, message: text } => return message(status, &text),
            Self::Domain(err) => err,
        };

        match err {
            DesklineError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ValidationResponse::from(errors)),
            )
                .into_response(),
            DesklineError::Conflict { field } => {
                let mut errors = ValidationErrors::new();
                errors.add(
                    &field,
                    format!("The {} has already been taken.", field.replace('_', " ")),
                );
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(ValidationResponse::from(errors)),
                )
                    .into_response()
            }
            DesklineError::Unauthorized => message(StatusCode::FORBIDDEN, "Invalid key"),
            DesklineError::InvalidPhoneFormat { .. } => {
                message(StatusCode::UNPROCESSABLE_ENTITY, "Invalid phone number format")
            }
            DesklineError::UserNotFound => message(StatusCode::NOT_FOUND, "User not found"),
            DesklineError::TicketNotFound => message(StatusCode::NOT_FOUND, "Ticket not found"),
            DesklineError::NoTicketsFound => {
                message(StatusCode::NOT_FOUND, "No tickets found for this user")
            }
            other => {
                tracing::error!(error = %other, "request failed");
                message(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

/// Body of the `ticket-create/phn` miss.
pub fn user_not_found_flagged() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "User not found!", "status": false })),
    )
        .into_response()
}
