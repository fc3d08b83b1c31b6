// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Web page handlers.
//!
//! Successful writes redirect with `303 See Other` and leave a one-shot
//! `flash` cookie that the next rendered page consumes.

use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use tracing::error;

use deskline_core::types::ActiveStatus;
use deskline_core::{DesklineError, ValidationErrors};
use deskline_identity::{BalanceInput, UserFields};
use deskline_tickets::TicketFields;

use crate::html::{self, TicketFormValues, UserFormTarget, UserFormValues};
use crate::input::{create_for_owner, parse_id};
use crate::server::AppState;

const FLASH_COOKIE: &str = "flash";

/// Success notices carried across a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    UserCreated,
    UserUpdated,
    TicketCreated,
    TicketUpdated,
}

impl Flash {
    fn code(self) -> &'static str {
        match self {
            Self::UserCreated => "user-created",
            Self::UserUpdated => "user-updated",
            Self::TicketCreated => "ticket-created",
            Self::TicketUpdated => "ticket-updated",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        match code {
            "user-created" => Some(Self::UserCreated),
            "user-updated" => Some(Self::UserUpdated),
            "ticket-created" => Some(Self::TicketCreated),
            "ticket-updated" => Some(Self::TicketUpdated),
            _ => None,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::UserCreated => "User created successfully",
            Self::UserUpdated => "User updated successfully",
            Self::TicketCreated => "Ticket created successfully",
            Self::TicketUpdated => "Ticket updated successfully",
        }
    }
}

fn redirect_with_flash(jar: CookieJar, to: &str, flash: Flash) -> Response {
    let cookie = Cookie::build((FLASH_COOKIE, flash.code()))
        .path("/")
        .http_only(true);
    (jar.add(cookie), Redirect::to(to)).into_response()
}

/// Read and clear the pending flash message.
fn take_flash(jar: CookieJar) -> (CookieJar, Option<&'static str>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, None);
    };
    let message = Flash::from_code(cookie.value()).map(Flash::message);
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), message)
}

fn page(status: StatusCode, body: String) -> Response {
    (status, Html(body)).into_response()
}

fn missing(what: &str) -> Response {
    page(StatusCode::NOT_FOUND, html::not_found(what))
}

fn failure(err: DesklineError) -> Response {
    match err {
        DesklineError::UserNotFound => missing("User"),
        DesklineError::TicketNotFound => missing("Ticket"),
        other => {
            error!(error = %other, "page request failed");
            page(
                StatusCode::INTERNAL_SERVER_ERROR,
                html::layout(
                    "Error",
                    None,
                    r#"<div class="alert alert-danger">Something went wrong. Please try again.</div>"#,
                ),
            )
        }
    }
}

/// Fallback for unknown paths.
pub async fn not_found() -> Response {
    missing("Page")
}

// --- Users ---

/// User form as posted by the browser. An unchecked `active_status` box
/// is absent from the body and means inactive.
#[derive(Default, Deserialize)]
pub struct UserForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub balance: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub active_status: Option<String>,
}

impl UserForm {
    fn active(&self) -> ActiveStatus {
        self.active_status
            .as_deref()
            .and_then(|v| v.parse().ok())
            .unwrap_or(ActiveStatus::Inactive)
    }

    fn fields(&self) -> UserFields {
        UserFields {
            name: self.name.clone(),
            email: self.email.clone(),
            phone_number: self.phone_number.clone(),
            password: self.password.clone(),
            balance: self.balance.clone().map(BalanceInput::Text),
            payment_status: self.payment_status.clone(),
            active_status: Some(self.active()),
            ..UserFields::default()
        }
    }

    fn values(&self) -> UserFormValues {
        UserFormValues {
            name: self.name.clone().unwrap_or_default(),
            email: self.email.clone().unwrap_or_default(),
            phone_number: self.phone_number.clone().unwrap_or_default(),
            balance: self.balance.clone().unwrap_or_default(),
            payment_status: self.payment_status.clone().unwrap_or_default(),
            active: self.active().is_active(),
        }
    }
}

/// GET / and GET /users
pub async fn users_index(State(state): State<AppState>, jar: CookieJar) -> Response {
    match state.resolver.list().await {
        Ok(users) => {
            let (jar, flash) = take_flash(jar);
            (jar, Html(html::users_index(&users, flash))).into_response()
        }
        Err(e) => failure(e),
    }
}

/// GET /users/create
pub async fn users_create() -> Html<String> {
    Html(html::user_form(
        UserFormTarget::Create,
        &UserFormValues::default(),
        &ValidationErrors::new(),
    ))
}

/// POST /users
pub async fn users_store(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<UserForm>,
) -> Response {
    match state.resolver.create(&form.fields()).await {
        Ok(_) => redirect_with_flash(jar, "/users", Flash::UserCreated),
        Err(DesklineError::Validation(errors)) => page(
            StatusCode::UNPROCESSABLE_ENTITY,
            html::user_form(UserFormTarget::Create, &form.values(), &errors),
        ),
        Err(e) => failure(e),
    }
}

/// GET /users/{id}
pub async fn users_show(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Response {
    let Some(id) = parse_id(&id) else {
        return missing("User");
    };
    match state.resolver.find_by_id(id).await {
        Ok(data) => {
            let (jar, flash) = take_flash(jar);
            (jar, Html(html::user_show(&data, flash))).into_response()
        }
        Err(e) => failure(e),
    }
}

/// GET /users/{id}/edit
pub async fn users_edit(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(id) = parse_id(&id) else {
        return missing("User");
    };
    match state.resolver.find_by_id(id).await {
        Ok(data) => page(
            StatusCode::OK,
            html::user_form(
                UserFormTarget::Edit(id),
                &UserFormValues::from(&data.user),
                &ValidationErrors::new(),
            ),
        ),
        Err(e) => failure(e),
    }
}

/// PUT|POST /users/{id}
pub async fn users_update(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<String>,
    Form(form): Form<UserForm>,
) -> Response {
    let Some(id) = parse_id(&id) else {
        return missing("User");
    };
    match state.resolver.update(id, &form.fields()).await {
        Ok(user) => redirect_with_flash(jar, &format!("/users/{}", user.id), Flash::UserUpdated),
        Err(DesklineError::Validation(errors)) => page(
            StatusCode::UNPROCESSABLE_ENTITY,
            html::user_form(UserFormTarget::Edit(id), &form.values(), &errors),
        ),
        Err(e) => failure(e),
    }
}

// --- Tickets ---

/// Ticket form as posted by the browser.
#[derive(Debug, Default, Deserialize)]
pub struct TicketForm {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl TicketForm {
    fn fields(&self) -> TicketFields {
        TicketFields {
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status.clone(),
        }
    }

    fn values(&self) -> TicketFormValues {
        TicketFormValues {
            user_id: self.user_id.clone().unwrap_or_default(),
            title: self.title.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
            status: self.status.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateTicketQuery {
    #[serde(default)]
    pub user_id: Option<String>,
}

async fn render_ticket_create(
    state: &AppState,
    status: StatusCode,
    values: &TicketFormValues,
    errors: &ValidationErrors,
) -> Response {
    match state.resolver.list().await {
        Ok(users) => page(status, html::ticket_create(&users, values, errors)),
        Err(e) => failure(e),
    }
}

/// GET /tickets
pub async fn tickets_index(State(state): State<AppState>, jar: CookieJar) -> Response {
    match state.tickets.list().await {
        Ok(tickets) => {
            let (jar, flash) = take_flash(jar);
            (jar, Html(html::tickets_index(&tickets, flash))).into_response()
        }
        Err(e) => failure(e),
    }
}

/// GET /tickets/create
///
/// `?user_id=` preselects the owner.
pub async fn tickets_create(
    State(state): State<AppState>,
    Query(query): Query<CreateTicketQuery>,
) -> Response {
    let values = TicketFormValues {
        user_id: query.user_id.unwrap_or_default(),
        ..TicketFormValues::default()
    };
    render_ticket_create(&state, StatusCode::OK, &values, &ValidationErrors::new()).await
}

/// POST /tickets
pub async fn tickets_store(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<TicketForm>,
) -> Response {
    let owner = form.user_id.clone().map(serde_json::Value::String);
    let created = create_for_owner(
        &state.tickets,
        owner.as_ref(),
        &form.fields(),
        &ValidationErrors::new(),
    )
    .await;
    match created {
        Ok(ticket) => redirect_with_flash(
            jar,
            &format!("/tickets/{}", ticket.id),
            Flash::TicketCreated,
        ),
        Err(DesklineError::Validation(errors)) => {
            render_ticket_create(&state, StatusCode::UNPROCESSABLE_ENTITY, &form.values(), &errors)
                .await
        }
        Err(e) => failure(e),
    }
}

/// GET /tickets/{id}
pub async fn tickets_show(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Response {
    let Some(id) = parse_id(&id) else {
        return missing("Ticket");
    };
    match state.tickets.find_by_id(id).await {
        Ok(data) => {
            let (jar, flash) = take_flash(jar);
            (jar, Html(html::ticket_show(&data, flash))).into_response()
        }
        Err(e) => failure(e),
    }
}

/// GET /tickets/{id}/edit
pub async fn tickets_edit(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(id) = parse_id(&id) else {
        return missing("Ticket");
    };
    match state.tickets.find_by_id(id).await {
        Ok(data) => {
            let values = TicketFormValues {
                user_id: data.user.id.to_string(),
                title: data.ticket.title,
                description: data.ticket.description,
                status: data.ticket.status.to_string(),
            };
            page(
                StatusCode::OK,
                html::ticket_edit(id, &values, &ValidationErrors::new()),
            )
        }
        Err(e) => failure(e),
    }
}

/// PUT|POST /tickets/{id}
pub async fn tickets_update(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<String>,
    Form(form): Form<TicketForm>,
) -> Response {
    let Some(id) = parse_id(&id) else {
        return missing("Ticket");
    };
    match state.tickets.update(id, &form.fields()).await {
        Ok(ticket) => redirect_with_flash(
            jar,
            &format!("/tickets/{}", ticket.id),
            Flash::TicketUpdated,
        ),
        Err(DesklineError::Validation(errors)) => page(
            StatusCode::UNPROCESSABLE_ENTITY,
            html::ticket_edit(id, &form.values(), &errors),
        ),
        Err(e) => failure(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_codes_round_trip() {
        for flash in [
            Flash::UserCreated,
            Flash::UserUpdated,
            Flash::TicketCreated,
            Flash::TicketUpdated,
        ] {
            assert_eq!(Flash::from_code(flash.code()), Some(flash));
        }
        assert_eq!(Flash::from_code("<script>"), None);
    }

    #[test]
    fn take_flash_consumes_cookie() {
        let jar = CookieJar::new().add(Cookie::new(FLASH_COOKIE, "user-updated"));
        let (jar, message) = take_flash(jar);
        assert_eq!(message, Some("User updated successfully"));
        assert!(jar.get(FLASH_COOKIE).is_none());

        let (_, message) = take_flash(CookieJar::new());
        assert_eq!(message, None);
    }

    #[test]
    fn unchecked_box_means_inactive() {
        let form = UserForm {
            name: Some("Ann".into()),
            ..UserForm::default()
        };
        assert_eq!(form.fields().active_status, Some(ActiveStatus::Inactive));

        let form = UserForm {
            active_status: Some("1".into()),
            ..UserForm::default()
        };
        assert_eq!(form.fields().active_status, Some(ActiveStatus::Active));
        assert!(form.values().active);
    }

    #[test]
    fn blank_balance_is_passed_as_text() {
        let form = UserForm {
            balance: Some("".into()),
            ..UserForm::default()
        };
        assert_eq!(form.fields().balance, Some(BalanceInput::Text(String::new())));
    }
}
