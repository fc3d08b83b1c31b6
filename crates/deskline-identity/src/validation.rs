// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Field rules shared by the user and ticket operations.
//!
//! Each check records a human-readable message against the field name and
//! returns the cleaned value when the field passed. Blank strings count as
//! absent.

use std::sync::LazyLock;

use deskline_core::ValidationErrors;
use deskline_core::types::PaymentStatus;
use regex::Regex;

use crate::fields::BalanceInput;

pub const MAX_NAME_CHARS: usize = 255;
pub const MAX_EMAIL_CHARS: usize = 255;
pub const MAX_PHONE_CHARS: usize = 20;
pub const MIN_PASSWORD_CHARS: usize = 8;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

pub(crate) fn label(field: &str) -> String {
    field.replace('_', " ")
}

/// Whether `field` should go through its rules.
///
/// A field the input carried in an unusable shape reports that message
/// instead, so it never also reads as missing.
pub fn readable(errors: &mut ValidationErrors, unreadable: &ValidationErrors, field: &str) -> bool {
    let Some(messages) = unreadable.get(field) else {
        return true;
    };
    for message in messages {
        errors.add(field, message.clone());
    }
    false
}

/// Trimmed value, or `None` when absent or blank.
pub fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Require a non-blank value.
pub fn required(errors: &mut ValidationErrors, field: &str, value: Option<&str>) -> Option<String> {
    match present(value) {
        Some(v) => Some(v.to_string()),
        None => {
            errors.add(field, format!("The {} field is required.", label(field)));
            None
        }
    }
}

/// Reject values longer than `max` characters. Returns whether the value passed.
pub fn max_chars(errors: &mut ValidationErrors, field: &str, value: &str, max: usize) -> bool {
    if value.chars().count() > max {
        errors.add(
            field,
            format!(
                "The {} field must not be greater than {max} characters.",
                label(field)
            ),
        );
        return false;
    }
    true
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

/// Required, well-formed, at most 255 characters.
pub fn email(errors: &mut ValidationErrors, value: Option<&str>) -> Option<String> {
    let value = required(errors, "email", value)?;
    if !is_valid_email(&value) {
        errors.add("email", "The email field must be a valid email address.");
        return None;
    }
    max_chars(errors, "email", &value, MAX_EMAIL_CHARS).then_some(value)
}

/// Required, at most 255 characters.
pub fn name(errors: &mut ValidationErrors, value: Option<&str>) -> Option<String> {
    let value = required(errors, "name", value)?;
    max_chars(errors, "name", &value, MAX_NAME_CHARS).then_some(value)
}

/// Phone number of at most 20 characters.
///
/// An absent optional number and a rejected one both return `None`; the
/// latter leaves a message under `phone_number`.
pub fn phone(
    errors: &mut ValidationErrors,
    value: Option<&str>,
    is_required: bool,
) -> Option<String> {
    let value = if is_required {
        required(errors, "phone_number", value)?
    } else {
        present(value)?.to_string()
    };
    max_chars(errors, "phone_number", &value, MAX_PHONE_CHARS).then_some(value)
}

/// Password of at least 8 characters. Surrounding whitespace is kept.
pub fn password(
    errors: &mut ValidationErrors,
    value: Option<&str>,
    is_required: bool,
) -> Option<String> {
    let given = value.filter(|v| !v.trim().is_empty());
    let Some(password) = given else {
        if is_required {
            errors.add("password", "The password field is required.");
        }
        return None;
    };
    if password.chars().count() < MIN_PASSWORD_CHARS {
        errors.add(
            "password",
            format!("The password field must be at least {MIN_PASSWORD_CHARS} characters."),
        );
        return None;
    }
    Some(password.to_string())
}

/// Optional numeric balance, rounded to cents.
pub fn balance(errors: &mut ValidationErrors, value: Option<&BalanceInput>) -> Option<f64> {
    let parsed = match value? {
        BalanceInput::Number(n) => Some(*n),
        BalanceInput::Text(text) => {
            let text = present(Some(text))?;
            text.parse::<f64>().ok()
        }
    };
    match parsed.filter(|n| n.is_finite()) {
        Some(n) => Some((n * 100.0).round() / 100.0),
        None => {
            errors.add("balance", "The balance field must be a number.");
            None
        }
    }
}

/// Optional payment status, one of `paid`, `unpaid`, `pending`.
pub fn payment_status(
    errors: &mut ValidationErrors,
    value: Option<&str>,
) -> Option<PaymentStatus> {
    let value = present(value)?;
    match value.parse() {
        Ok(status) => Some(status),
        Err(_) => {
            errors.add("payment_status", "The selected payment status is invalid.");
            None
        }
    }
}

/// Message recorded when a unique column is already in use.
pub fn taken(errors: &mut ValidationErrors, field: &str) {
    errors.add(field, format!("The {} has already been taken.", label(field)));
}
