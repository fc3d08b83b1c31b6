// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket lifecycle.
//!
//! Status assignment is unordered: any of the four states may replace any
//! other. Only membership is checked.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use deskline_config::model::TicketsConfig;
use deskline_core::types::{NewTicket, Ticket, TicketChanges, TicketStatus, TicketWithUser, User};
use deskline_core::{DesklineError, StorageAdapter, ValidationErrors};
use deskline_identity::phone::normalize_simple;
use deskline_identity::validation;

use crate::number::{RandomTicketNumbers, TicketNumberGenerator};

const MAX_TITLE_CHARS: usize = 255;

/// How a new ticket names its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserRef {
    /// Must exist; an unknown id is a validation failure on `user_id`.
    Id(i64),
    /// Raw phone, `00` prefix rewritten before lookup; no match is `UserNotFound`.
    Phone(String),
}

/// Caller-supplied ticket fields, before validation.
#[derive(Debug, Clone, Default)]
pub struct TicketFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

/// Check title (required, at most 255 characters) and description (required).
pub fn check_content(
    errors: &mut ValidationErrors,
    fields: &TicketFields,
) -> (Option<String>, Option<String>) {
    let title = validation::required(errors, "title", fields.title.as_deref())
        .filter(|title| validation::max_chars(errors, "title", title, MAX_TITLE_CHARS));
    let description = validation::required(errors, "description", fields.description.as_deref());
    (title, description)
}

/// Parse a status, recording a message on failure.
pub fn check_status(errors: &mut ValidationErrors, value: Option<&str>) -> Option<TicketStatus> {
    let value = validation::required(errors, "status", value)?;
    match value.parse() {
        Ok(status) => Some(status),
        Err(_) => {
            errors.add("status", "The selected status is invalid.");
            None
        }
    }
}

/// Creates, reads, and transitions tickets.
pub struct TicketManager {
    storage: Arc<dyn StorageAdapter>,
    numbers: Arc<dyn TicketNumberGenerator>,
    max_number_attempts: u32,
}

impl TicketManager {
    pub fn new(storage: Arc<dyn StorageAdapter>, config: &TicketsConfig) -> Self {
        Self::with_generator(
            storage,
            Arc::new(RandomTicketNumbers::from_config(config)),
            config.max_number_attempts,
        )
    }

    pub fn with_generator(
        storage: Arc<dyn StorageAdapter>,
        numbers: Arc<dyn TicketNumberGenerator>,
        max_number_attempts: u32,
    ) -> Self {
        Self {
            storage,
            numbers,
            max_number_attempts: max_number_attempts.max(1),
        }
    }

    /// Open a new ticket for the referenced user.
    ///
    /// A ticket number taken by another ticket is regenerated up to the
    /// configured attempt budget before giving up with
    /// [`DesklineError::TicketNumberExhausted`].
    pub async fn create(&self, user: UserRef, fields: &TicketFields) -> Result<Ticket, DesklineError> {
        let mut errors = ValidationErrors::new();
        let owner = match &user {
            UserRef::Id(id) => {
                let owner = self.storage.get_user(*id).await?;
                if owner.is_none() {
                    errors.add("user_id", "The selected user id is invalid.");
                }
                owner
            }
            UserRef::Phone(_) => None,
        };
        let (title, description) = check_content(&mut errors, fields);
        errors.into_result()?;

        // Phone owners are looked up only once the content is valid.
        let owner = match (owner, user) {
            (Some(owner), _) => owner,
            (None, UserRef::Phone(raw)) => self
                .storage
                .find_user_by_phone(&normalize_simple(&raw))
                .await?
                .ok_or(DesklineError::UserNotFound)?,
            (None, UserRef::Id(_)) => {
                return Err(DesklineError::Internal("validated ticket has no owner".into()));
            }
        };
        let (Some(title), Some(description)) = (title, description) else {
            return Err(DesklineError::Internal(
                "validated ticket is missing a field".into(),
            ));
        };

        for attempt in 1..=self.max_number_attempts {
            let new_ticket = NewTicket {
                user_id: owner.id,
                title: title.clone(),
                description: description.clone(),
                ticket_number: self.numbers.generate(),
                status: TicketStatus::Open,
            };
            match self.storage.insert_ticket(&new_ticket).await {
                Ok(ticket) => {
                    info!(
                        ticket_id = ticket.id,
                        ticket_number = %ticket.ticket_number,
                        user_id = owner.id,
                        "ticket created"
                    );
                    return Ok(ticket);
                }
                Err(DesklineError::Conflict { field }) if field == "ticket_number" => {
                    warn!(
                        attempt,
                        ticket_number = %new_ticket.ticket_number,
                        "ticket number collision, regenerating"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(DesklineError::TicketNumberExhausted {
            attempts: self.max_number_attempts,
        })
    }

    /// A ticket together with its owner.
    pub async fn find_by_id(&self, id: i64) -> Result<TicketWithUser, DesklineError> {
        let ticket = self
            .storage
            .get_ticket(id)
            .await?
            .ok_or(DesklineError::TicketNotFound)?;
        let user = self
            .storage
            .get_user(ticket.user_id)
            .await?
            .ok_or(DesklineError::UserNotFound)?;
        Ok(TicketWithUser { ticket, user })
    }

    pub async fn find_latest_for_user(&self, user_id: i64) -> Result<Ticket, DesklineError> {
        if self.storage.get_user(user_id).await?.is_none() {
            return Err(DesklineError::UserNotFound);
        }
        self.storage
            .latest_ticket_for_user(user_id)
            .await?
            .ok_or(DesklineError::NoTicketsFound)
    }

    /// Overwrite the status. The value is checked before the ticket is looked up.
    pub async fn update_status(&self, id: i64, new_status: &str) -> Result<Ticket, DesklineError> {
        let mut errors = ValidationErrors::new();
        let status = check_status(&mut errors, Some(new_status));
        errors.into_result()?;
        let Some(status) = status else {
            return Err(DesklineError::invalid("status", "The status field is required."));
        };

        let ticket = self
            .storage
            .update_ticket_status(id, status)
            .await?
            .ok_or(DesklineError::TicketNotFound)?;
        info!(ticket_id = id, status = %status, "ticket status updated");
        Ok(ticket)
    }

    /// Edit-form update of title, description, and status.
    pub async fn update(&self, id: i64, fields: &TicketFields) -> Result<Ticket, DesklineError> {
        if self.storage.get_ticket(id).await?.is_none() {
            return Err(DesklineError::TicketNotFound);
        }

        let mut errors = ValidationErrors::new();
        let (title, description) = check_content(&mut errors, fields);
        let status = check_status(&mut errors, fields.status.as_deref());
        errors.into_result()?;

        let changes = TicketChanges {
            title,
            description,
            status,
        };
        let ticket = self
            .storage
            .update_ticket(id, &changes)
            .await?
            .ok_or(DesklineError::TicketNotFound)?;
        info!(ticket_id = id, "ticket updated");
        Ok(ticket)
    }

    /// Every ticket with its owner, newest first.
    pub async fn list(&self) -> Result<Vec<TicketWithUser>, DesklineError> {
        let tickets = self.storage.list_tickets().await?;
        let owners: HashMap<i64, User> = self
            .storage
            .list_users()
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();
        Ok(tickets
            .into_iter()
            .filter_map(|ticket| {
                let user = owners.get(&ticket.user_id)?.clone();
                Some(TicketWithUser { ticket, user })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use deskline_config::model::StorageConfig;
    use deskline_core::types::{ActiveStatus, NewUser, PaymentStatus};
    use deskline_storage::SqliteStorage;
    use tempfile::tempdir;

    /// Hands out a fixed script of numbers, then repeats the last one.
    struct ScriptedNumbers(Mutex<Vec<&'static str>>);

    impl ScriptedNumbers {
        fn new(script: &[&'static str]) -> Self {
            let mut script = script.to_vec();
            script.reverse();
            Self(Mutex::new(script))
        }
    }

    impl TicketNumberGenerator for ScriptedNumbers {
        fn generate(&self) -> String {
            let mut script = self.0.lock().unwrap();
            if script.len() > 1 {
                script.pop().unwrap().to_string()
            } else {
                script[0].to_string()
            }
        }
    }

    async fn setup() -> (Arc<SqliteStorage>, User, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let storage = Arc::new(SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("test.db").to_str().unwrap().to_string(),
            wal_mode: true,
        }));
        storage.initialize().await.unwrap();
        let user = storage
            .insert_user(&NewUser {
                name: "Jane Smith".into(),
                email: "jane@example.com".into(),
                phone_number: Some("+8801711111111".into()),
                password_hash: "$argon2id$stub".into(),
                balance: 50.0,
                payment_status: PaymentStatus::Pending,
                active_status: ActiveStatus::Active,
            })
            .await
            .unwrap();
        (storage, user, dir)
    }

    fn content(title: &str, description: &str) -> TicketFields {
        TicketFields {
            title: Some(title.into()),
            description: Some(description.into()),
            status: None,
        }
    }

    #[tokio::test]
    async fn create_by_id_opens_ticket_with_tkt_number() {
        let (storage, user, _dir) = setup().await;
        let manager = TicketManager::new(storage, &TicketsConfig::default());

        let ticket = manager
            .create(UserRef::Id(user.id), &content("T", "D"))
            .await
            .unwrap();
        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.user_id, user.id);
        let suffix = ticket.ticket_number.strip_prefix("TKT-").unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn create_by_phone_normalizes_double_zero() {
        let (storage, user, _dir) = setup().await;
        let manager = TicketManager::new(storage, &TicketsConfig::default());

        let ticket = manager
            .create(UserRef::Phone("008801711111111".into()), &content("T", "D"))
            .await
            .unwrap();
        assert_eq!(ticket.user_id, user.id);
        assert_eq!(ticket.status, TicketStatus::Open);

        let err = manager
            .create(UserRef::Phone("01711111111".into()), &content("T", "D"))
            .await
            .unwrap_err();
        assert!(matches!(err, DesklineError::UserNotFound));
    }

    #[tokio::test]
    async fn create_validates_all_fields_together() {
        let (storage, user, _dir) = setup().await;
        let manager = TicketManager::new(storage.clone(), &TicketsConfig::default());

        let long_title = "x".repeat(256);
        let err = manager
            .create(UserRef::Id(user.id + 1), &content(&long_title, ""))
            .await
            .unwrap_err();
        let DesklineError::Validation(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert!(errors.contains("title"));
        assert!(errors.contains("description"));
        assert!(errors.contains("user_id"));
        assert!(storage.list_tickets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn collision_is_retried_with_a_new_number() {
        let (storage, user, _dir) = setup().await;
        let numbers = Arc::new(ScriptedNumbers::new(&["TKT-AAAAAAAA", "TKT-AAAAAAAA", "TKT-BBBBBBBB"]));
        let manager = TicketManager::with_generator(storage, numbers, 5);

        let first = manager
            .create(UserRef::Id(user.id), &content("one", "D"))
            .await
            .unwrap();
        let second = manager
            .create(UserRef::Id(user.id), &content("two", "D"))
            .await
            .unwrap();
        assert_eq!(first.ticket_number, "TKT-AAAAAAAA");
        assert_eq!(second.ticket_number, "TKT-BBBBBBBB");
    }

    #[tokio::test]
    async fn exhausted_attempts_fail() {
        let (storage, user, _dir) = setup().await;
        let numbers = Arc::new(ScriptedNumbers::new(&["TKT-SAMESAME"]));
        let manager = TicketManager::with_generator(storage.clone(), numbers, 3);

        manager
            .create(UserRef::Id(user.id), &content("one", "D"))
            .await
            .unwrap();
        let err = manager
            .create(UserRef::Id(user.id), &content("two", "D"))
            .await
            .unwrap_err();
        assert!(matches!(err, DesklineError::TicketNumberExhausted { attempts: 3 }));
        assert_eq!(storage.list_tickets().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn latest_ticket_wins() {
        let (storage, user, _dir) = setup().await;
        let manager = TicketManager::new(storage, &TicketsConfig::default());

        assert!(matches!(
            manager.find_latest_for_user(user.id).await,
            Err(DesklineError::NoTicketsFound)
        ));
        assert!(matches!(
            manager.find_latest_for_user(user.id + 1).await,
            Err(DesklineError::UserNotFound)
        ));

        let mut last = None;
        for title in ["T1", "T2", "T3"] {
            last = Some(
                manager
                    .create(UserRef::Id(user.id), &content(title, "D"))
                    .await
                    .unwrap(),
            );
        }
        let latest = manager.find_latest_for_user(user.id).await.unwrap();
        assert_eq!(Some(latest), last);
    }

    #[tokio::test]
    async fn status_accepts_only_known_values() {
        let (storage, user, _dir) = setup().await;
        let manager = TicketManager::new(storage, &TicketsConfig::default());
        let ticket = manager
            .create(UserRef::Id(user.id), &content("T", "D"))
            .await
            .unwrap();

        for status in ["closed", "open", "resolved", "in_progress"] {
            let updated = manager.update_status(ticket.id, status).await.unwrap();
            assert_eq!(updated.status.as_ref(), status);
        }

        let err = manager.update_status(ticket.id, "pending").await.unwrap_err();
        assert!(matches!(err, DesklineError::Validation(_)));
        let stored = manager.find_by_id(ticket.id).await.unwrap();
        assert_eq!(stored.ticket.status, TicketStatus::InProgress);
        assert_eq!(stored.user.id, user.id);

        assert!(matches!(
            manager.update_status(ticket.id + 1, "closed").await,
            Err(DesklineError::TicketNotFound)
        ));
    }

    #[tokio::test]
    async fn edit_updates_content_and_lists_with_owner() {
        let (storage, user, _dir) = setup().await;
        let manager = TicketManager::new(storage, &TicketsConfig::default());
        let ticket = manager
            .create(UserRef::Id(user.id), &content("T", "D"))
            .await
            .unwrap();

        let edit = TicketFields {
            title: Some("New title".into()),
            description: Some("New description".into()),
            status: Some("resolved".into()),
        };
        let updated = manager.update(ticket.id, &edit).await.unwrap();
        assert_eq!(updated.title, "New title");
        assert_eq!(updated.status, TicketStatus::Resolved);
        assert_eq!(updated.ticket_number, ticket.ticket_number);

        let bad = TicketFields {
            status: Some("done".into()),
            ..edit.clone()
        };
        assert!(matches!(
            manager.update(ticket.id, &bad).await,
            Err(DesklineError::Validation(_))
        ));
        assert!(matches!(
            manager.update(ticket.id + 1, &edit).await,
            Err(DesklineError::TicketNotFound)
        ));

        let listed = manager.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].user.email, "jane@example.com");
    }
}
