// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-rendered HTML pages.
//!
//! Pages are assembled with `format!` and `push_str`. Every caller-controlled
//! string goes through [`escape`] before it reaches the markup.

use chrono::DateTime;
use strum::IntoEnumIterator;

use deskline_core::ValidationErrors;
use deskline_core::types::{
    ActiveStatus, PaymentStatus, TicketStatus, TicketWithUser, User, UserWithTickets,
};

const STYLESHEET: &str = "https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css";

/// Escape text for use in element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `$1,234.50`
pub fn money(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

fn format_timestamp(ts: &str, pattern: &str) -> String {
    match DateTime::parse_from_rfc3339(ts) {
        Ok(parsed) => parsed.format(pattern).to_string(),
        Err(_) => ts.to_string(),
    }
}

/// `Oct 18, 2026`
pub fn date(ts: &str) -> String {
    format_timestamp(ts, "%b %d, %Y")
}

/// `Oct 18, 2026 14:05`
pub fn date_time(ts: &str) -> String {
    format_timestamp(ts, "%b %d, %Y %H:%M")
}

/// `in_progress` -> `In progress`
fn humanize(value: &str) -> String {
    let spaced = value.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => spaced,
    }
}

fn badge(class: &str, label: &str) -> String {
    format!(r#"<span class="badge bg-{class}">{}</span>"#, escape(label))
}

fn ticket_badge(status: TicketStatus) -> String {
    let class = match status {
        TicketStatus::Open => "danger",
        TicketStatus::InProgress => "warning",
        TicketStatus::Resolved => "info",
        TicketStatus::Closed => "success",
    };
    badge(class, &humanize(status.as_ref()))
}

fn payment_badge(status: PaymentStatus) -> String {
    let class = match status {
        PaymentStatus::Paid => "success",
        PaymentStatus::Pending => "warning",
        PaymentStatus::Unpaid => "danger",
    };
    badge(class, &humanize(status.as_ref()))
}

fn active_badge(status: ActiveStatus) -> String {
    let class = if status.is_active() { "success" } else { "danger" };
    badge(class, &humanize(status.as_ref()))
}

/// Wrap page content in the shared document shell.
pub fn layout(title: &str, flash: Option<&str>, content: &str) -> String {
    let flash = match flash {
        Some(message) => format!(
            r#"<div class="alert alert-success">{}</div>"#,
            escape(message)
        ),
        None => String::new(),
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} - Deskline</title>
<link rel="stylesheet" href="{STYLESHEET}">
</head>
<body>
<nav class="navbar navbar-expand navbar-dark bg-dark mb-4">
<div class="container">
<a class="navbar-brand" href="/">Deskline</a>
<div class="navbar-nav">
<a class="nav-link" href="/users">Users</a>
<a class="nav-link" href="/tickets">Tickets</a>
</div>
</div>
</nav>
<main class="container">
{flash}
{content}
</main>
</body>
</html>
"#,
        title = escape(title),
    )
}

fn card_header(title: &str, action: Option<(&str, &str)>) -> String {
    let action = match action {
        Some((href, label)) => format!(r#"<a href="{href}" class="btn btn-light">{label}</a>"#),
        None => String::new(),
    };
    format!(
        r#"<div class="card-header bg-primary text-white d-flex justify-content-between align-items-center"><h2>{title}</h2>{action}</div>"#
    )
}

fn invalid(errors: &ValidationErrors, field: &str) -> &'static str {
    if errors.contains(field) {
        " is-invalid"
    } else {
        ""
    }
}

fn feedback(errors: &ValidationErrors, field: &str) -> String {
    errors
        .get(field)
        .and_then(|messages| messages.first())
        .map(|message| format!(r#"<div class="invalid-feedback">{}</div>"#, escape(message)))
        .unwrap_or_default()
}

fn text_input(
    errors: &ValidationErrors,
    field: &str,
    label: &str,
    kind: &str,
    value: &str,
    extra: &str,
) -> String {
    format!(
        r#"<div class="mb-3"><label for="{field}" class="form-label">{label}</label><input type="{kind}" class="form-control{invalid}" id="{field}" name="{field}" value="{value}"{extra}>{feedback}</div>"#,
        invalid = invalid(errors, field),
        value = escape(value),
        feedback = feedback(errors, field),
    )
}

fn select_options<I>(options: I, selected: &str) -> String
where
    I: IntoIterator<Item = (String, String)>,
{
    options
        .into_iter()
        .map(|(value, label)| {
            let mark = if value == selected { " selected" } else { "" };
            format!(
                r#"<option value="{}"{mark}>{}</option>"#,
                escape(&value),
                escape(&label)
            )
        })
        .collect()
}

// --- Users ---

/// GET /users
pub fn users_index(users: &[User], flash: Option<&str>) -> String {
    let mut rows = String::new();
    for user in users {
        rows.push_str(&format!(
            r#"<tr><td>{id}</td><td>{name}</td><td>{email}</td><td>{phone}</td><td>{balance}</td><td>{payment}</td><td>{active}</td><td><a href="/users/{id}" class="btn btn-sm btn-info">View Tickets</a> <a href="/users/{id}/edit" class="btn btn-sm btn-primary">Edit</a></td></tr>"#,
            id = user.id,
            name = escape(&user.name),
            email = escape(&user.email),
            phone = escape(user.phone_number.as_deref().unwrap_or("")),
            balance = money(user.balance),
            payment = payment_badge(user.payment_status),
            active = active_badge(user.active_status),
        ));
    }

    let content = format!(
        r#"<div class="card">{header}<div class="card-body"><table class="table table-striped"><thead><tr><th>ID</th><th>Name</th><th>Email</th><th>Phone</th><th>Balance</th><th>Payment Status</th><th>Active Status</th><th>Actions</th></tr></thead><tbody>{rows}</tbody></table></div></div>"#,
        header = card_header("User List", Some(("/users/create", "Create New User"))),
    );
    layout("Users", flash, &content)
}

/// Values redisplayed in the user form.
#[derive(Debug, Clone, PartialEq)]
pub struct UserFormValues {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub balance: String,
    pub payment_status: String,
    pub active: bool,
}

impl Default for UserFormValues {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone_number: String::new(),
            balance: "0".to_string(),
            payment_status: PaymentStatus::Unpaid.to_string(),
            active: true,
        }
    }
}

impl From<&User> for UserFormValues {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone().unwrap_or_default(),
            balance: format!("{:.2}", user.balance),
            payment_status: user.payment_status.to_string(),
            active: user.active_status.is_active(),
        }
    }
}

/// Where the user form submits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserFormTarget {
    Create,
    Edit(i64),
}

/// GET /users/create and GET /users/{id}/edit
pub fn user_form(target: UserFormTarget, values: &UserFormValues, errors: &ValidationErrors) -> String {
    let (title, action, submit, cancel, password_extra) = match target {
        UserFormTarget::Create => (
            "Create New User".to_string(),
            "/users".to_string(),
            "Create User",
            "/users".to_string(),
            " required",
        ),
        UserFormTarget::Edit(id) => (
            "Edit User".to_string(),
            format!("/users/{id}"),
            "Update User",
            format!("/users/{id}"),
            r#" placeholder="Leave blank to keep the current password""#,
        ),
    };

    let payment_options = select_options(
        PaymentStatus::iter().map(|s| (s.to_string(), humanize(s.as_ref()))),
        &values.payment_status,
    );
    let checked = if values.active { " checked" } else { "" };

    let mut form = String::new();
    form.push_str(&text_input(errors, "name", "Name", "text", &values.name, " required"));
    form.push_str(&text_input(errors, "email", "Email", "email", &values.email, " required"));
    form.push_str(&text_input(
        errors,
        "phone_number",
        "Phone Number",
        "text",
        &values.phone_number,
        " required",
    ));
    form.push_str(&text_input(errors, "password", "Password", "password", "", password_extra));
    form.push_str(&text_input(
        errors,
        "balance",
        "Balance",
        "number",
        &values.balance,
        r#" step="0.01""#,
    ));
    form.push_str(&format!(
        r#"<div class="mb-3"><label for="payment_status" class="form-label">Payment Status</label><select class="form-select{invalid}" id="payment_status" name="payment_status">{payment_options}</select>{feedback}</div>"#,
        invalid = invalid(errors, "payment_status"),
        feedback = feedback(errors, "payment_status"),
    ));
    form.push_str(&format!(
        r#"<div class="mb-3 form-check"><input type="checkbox" class="form-check-input" id="active_status" name="active_status" value="1"{checked}><label class="form-check-label" for="active_status">Active</label></div>"#
    ));

    let content = format!(
        r#"<div class="card"><div class="card-header bg-primary text-white"><h2>{title}</h2></div><div class="card-body"><form action="{action}" method="POST">{form}<div class="d-flex justify-content-between"><a href="{cancel}" class="btn btn-secondary">Cancel</a><button type="submit" class="btn btn-primary">{submit}</button></div></form></div></div>"#
    );
    layout(&title, None, &content)
}

/// GET /users/{id}
pub fn user_show(data: &UserWithTickets, flash: Option<&str>) -> String {
    let user = &data.user;

    let tickets = if data.tickets.is_empty() {
        r#"<div class="alert alert-info">This user has no tickets yet.</div>"#.to_string()
    } else {
        let mut rows = String::new();
        for ticket in &data.tickets {
            rows.push_str(&format!(
                r#"<tr><td>{number}</td><td><a href="/tickets/{id}">{title}</a></td><td>{status}</td><td>{created}</td></tr>"#,
                number = escape(&ticket.ticket_number),
                id = ticket.id,
                title = escape(&ticket.title),
                status = ticket_badge(ticket.status),
                created = date(&ticket.created_at),
            ));
        }
        format!(
            r#"<table class="table table-striped"><thead><tr><th>Ticket #</th><th>Title</th><th>Status</th><th>Created</th></tr></thead><tbody>{rows}</tbody></table>"#
        )
    };

    let content = format!(
        r#"<div class="row"><div class="col-md-4"><div class="card mb-4">{details_header}<div class="card-body"><h4>{name}</h4><p><strong>Email:</strong> {email}</p><p><strong>Phone:</strong> {phone}</p><p><strong>Balance:</strong> {balance}</p><p><strong>Payment Status:</strong> {payment}</p><p><strong>Account Status:</strong> {active}</p><a href="/users" class="btn btn-secondary">Back to Users</a></div></div></div><div class="col-md-8"><div class="card">{tickets_header}<div class="card-body">{tickets}</div></div></div></div>"#,
        details_header = card_header("User Details", Some((&format!("/users/{}/edit", user.id), "Edit User"))),
        tickets_header = card_header(
            "User Tickets",
            Some((&format!("/tickets/create?user_id={}", user.id), "Create Ticket"))
        ),
        name = escape(&user.name),
        email = escape(&user.email),
        phone = escape(user.phone_number.as_deref().unwrap_or("")),
        balance = money(user.balance),
        payment = payment_badge(user.payment_status),
        active = active_badge(user.active_status),
    );
    layout(&user.name, flash, &content)
}

// --- Tickets ---

/// GET /tickets
pub fn tickets_index(tickets: &[TicketWithUser], flash: Option<&str>) -> String {
    let mut rows = String::new();
    for TicketWithUser { ticket, user } in tickets {
        rows.push_str(&format!(
            r#"<tr><td>{id}</td><td>{number}</td><td>{title}</td><td><a href="/users/{user_id}">{user}</a></td><td>{status}</td><td>{created}</td><td><a href="/tickets/{id}" class="btn btn-sm btn-info">View</a> <a href="/tickets/{id}/edit" class="btn btn-sm btn-primary">Edit</a></td></tr>"#,
            id = ticket.id,
            number = escape(&ticket.ticket_number),
            title = escape(&ticket.title),
            user_id = user.id,
            user = escape(&user.name),
            status = ticket_badge(ticket.status),
            created = date(&ticket.created_at),
        ));
    }

    let content = format!(
        r#"<div class="card">{header}<div class="card-body"><table class="table table-striped"><thead><tr><th>ID</th><th>Ticket Number</th><th>Title</th><th>User</th><th>Status</th><th>Created</th><th>Actions</th></tr></thead><tbody>{rows}</tbody></table></div></div>"#,
        header = card_header("Ticket List", Some(("/tickets/create", "Create New Ticket"))),
    );
    layout("Tickets", flash, &content)
}

/// Values redisplayed in the ticket forms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketFormValues {
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub status: String,
}

fn content_fields(errors: &ValidationErrors, values: &TicketFormValues) -> String {
    let mut out = text_input(errors, "title", "Title", "text", &values.title, " required");
    out.push_str(&format!(
        r#"<div class="mb-3"><label for="description" class="form-label">Description</label><textarea class="form-control{invalid}" id="description" name="description" rows="4" required>{value}</textarea>{feedback}</div>"#,
        invalid = invalid(errors, "description"),
        value = escape(&values.description),
        feedback = feedback(errors, "description"),
    ));
    out
}

/// GET /tickets/create
pub fn ticket_create(users: &[User], values: &TicketFormValues, errors: &ValidationErrors) -> String {
    let mut options = String::from(r#"<option value="">Select User</option>"#);
    options.push_str(&select_options(
        users.iter().map(|user| {
            let label = match &user.phone_number {
                Some(phone) => format!("{} ({phone})", user.name),
                None => user.name.clone(),
            };
            (user.id.to_string(), label)
        }),
        &values.user_id,
    ));

    let content = format!(
        r#"<div class="card"><div class="card-header bg-primary text-white"><h2>Create New Ticket</h2></div><div class="card-body"><form action="/tickets" method="POST"><div class="mb-3"><label for="user_id" class="form-label">User</label><select class="form-select{invalid}" id="user_id" name="user_id" required>{options}</select>{feedback}</div>{fields}<div class="d-flex justify-content-between"><a href="/tickets" class="btn btn-secondary">Cancel</a><button type="submit" class="btn btn-primary">Create Ticket</button></div></form></div></div>"#,
        invalid = invalid(errors, "user_id"),
        feedback = feedback(errors, "user_id"),
        fields = content_fields(errors, values),
    );
    layout("Create Ticket", None, &content)
}

/// GET /tickets/{id}
pub fn ticket_show(data: &TicketWithUser, flash: Option<&str>) -> String {
    let TicketWithUser { ticket, user } = data;
    let content = format!(
        r#"<div class="card">{header}<div class="card-body"><div class="row mb-4"><div class="col-md-6"><h4>Ticket Information</h4><table class="table"><tr><th>Ticket Number:</th><td>{number}</td></tr><tr><th>Title:</th><td>{title}</td></tr><tr><th>Status:</th><td>{status}</td></tr><tr><th>Created:</th><td>{created}</td></tr><tr><th>Last Updated:</th><td>{updated}</td></tr></table></div><div class="col-md-6"><h4>User Information</h4><table class="table"><tr><th>Name:</th><td><a href="/users/{user_id}">{name}</a></td></tr><tr><th>Email:</th><td>{email}</td></tr><tr><th>Phone:</th><td>{phone}</td></tr><tr><th>Balance:</th><td>{balance}</td></tr><tr><th>Payment Status:</th><td>{payment}</td></tr></table></div></div><div class="card mb-4"><div class="card-header"><h4>Description</h4></div><div class="card-body" style="white-space: pre-wrap">{description}</div></div><a href="/tickets" class="btn btn-secondary">Back to List</a></div></div>"#,
        header = card_header(
            "Ticket Details",
            Some((&format!("/tickets/{}/edit", ticket.id), "Edit Ticket"))
        ),
        number = escape(&ticket.ticket_number),
        title = escape(&ticket.title),
        status = ticket_badge(ticket.status),
        created = date_time(&ticket.created_at),
        updated = date_time(&ticket.updated_at),
        user_id = user.id,
        name = escape(&user.name),
        email = escape(&user.email),
        phone = escape(user.phone_number.as_deref().unwrap_or("")),
        balance = money(user.balance),
        payment = payment_badge(user.payment_status),
        description = escape(&ticket.description),
    );
    layout(&ticket.ticket_number, flash, &content)
}

/// GET /tickets/{id}/edit
pub fn ticket_edit(ticket_id: i64, values: &TicketFormValues, errors: &ValidationErrors) -> String {
    let status_options = select_options(
        TicketStatus::iter().map(|s| (s.to_string(), humanize(s.as_ref()))),
        &values.status,
    );
    let content = format!(
        r#"<div class="card"><div class="card-header bg-primary text-white"><h2>Edit Ticket</h2></div><div class="card-body"><form action="/tickets/{ticket_id}" method="POST">{fields}<div class="mb-3"><label for="status" class="form-label">Status</label><select class="form-select{invalid}" id="status" name="status" required>{status_options}</select>{feedback}</div><div class="d-flex justify-content-between"><a href="/tickets/{ticket_id}" class="btn btn-secondary">Cancel</a><button type="submit" class="btn btn-primary">Update Ticket</button></div></form></div></div>"#,
        fields = content_fields(errors, values),
        invalid = invalid(errors, "status"),
        feedback = feedback(errors, "status"),
    );
    layout("Edit Ticket", None, &content)
}

/// Body of every 404 page.
pub fn not_found(what: &str) -> String {
    let content = format!(
        r#"<div class="card"><div class="card-body text-center"><h2>404</h2><p>{} not found.</p><a href="/" class="btn btn-primary">Back to Users</a></div></div>"#,
        escape(what)
    );
    layout("Not Found", None, &content)
}
