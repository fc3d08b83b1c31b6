// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User identity resolution.
//!
//! [`UserResolver`] owns every user-facing write: the idempotent upsert keyed
//! on email or phone, strict creation from the web form, and partial updates.
//! Phone lookups append to the search log whether or not they match.

use std::sync::Arc;

use phonenumber::country::Id as Region;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use deskline_config::model::IdentityConfig;
use deskline_core::types::{
    ActiveStatus, NewSearch, NewUser, PaymentStatus, SearchLog, User, UserChanges, UserWithTickets,
};
use deskline_core::{CallerVerifier, DesklineError, StorageAdapter, ValidationErrors};

use crate::fields::UserFields;
use crate::password::PasswordHasher;
use crate::phone::{normalize_e164, normalize_simple, parse_region};
use crate::validation;

/// Field values that passed their rules. `None` means absent or rejected.
#[derive(Default)]
struct Checked {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    password: Option<String>,
    balance: Option<f64>,
    payment_status: Option<PaymentStatus>,
    active_status: Option<ActiveStatus>,
}

fn check(
    fields: &UserFields,
    phone_required: bool,
    password_required: bool,
) -> (Checked, ValidationErrors) {
    let mut errors = ValidationErrors::new();
    let unreadable = &fields.unreadable;
    let rule = |errors: &mut ValidationErrors, field: &str| {
        validation::readable(errors, unreadable, field)
    };

    let name = rule(&mut errors, "name")
        .then(|| validation::name(&mut errors, fields.name.as_deref()))
        .flatten();
    let email = rule(&mut errors, "email")
        .then(|| validation::email(&mut errors, fields.email.as_deref()))
        .flatten();
    let phone = rule(&mut errors, "phone_number")
        .then(|| validation::phone(&mut errors, fields.phone_number.as_deref(), phone_required))
        .flatten();
    let password = rule(&mut errors, "password")
        .then(|| validation::password(&mut errors, fields.password.as_deref(), password_required))
        .flatten();
    let balance = rule(&mut errors, "balance")
        .then(|| validation::balance(&mut errors, fields.balance.as_ref()))
        .flatten();
    let payment_status = rule(&mut errors, "payment_status")
        .then(|| validation::payment_status(&mut errors, fields.payment_status.as_deref()))
        .flatten();
    let active_status = rule(&mut errors, "active_status")
        .then_some(fields.active_status)
        .flatten();

    let checked = Checked {
        name,
        email,
        phone,
        password,
        balance,
        payment_status,
        active_status,
    };
    (checked, errors)
}

/// Turn a lost uniqueness race into the same message the pre-check gives.
fn conflict_to_validation(err: DesklineError) -> DesklineError {
    match err {
        DesklineError::Conflict { field } => {
            let mut errors = ValidationErrors::new();
            validation::taken(&mut errors, &field);
            DesklineError::Validation(errors)
        }
        other => other,
    }
}

/// Resolves, creates, and updates users.
pub struct UserResolver {
    storage: Arc<dyn StorageAdapter>,
    verifier: Arc<dyn CallerVerifier>,
    hasher: PasswordHasher,
    default_region: Region,
    fallback_password: SecretString,
}

impl UserResolver {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        verifier: Arc<dyn CallerVerifier>,
        config: &IdentityConfig,
    ) -> Result<Self, DesklineError> {
        Ok(Self {
            storage,
            verifier,
            hasher: PasswordHasher::from_config(config)?,
            default_region: parse_region(&config.default_region)?,
            fallback_password: SecretString::from(config.fallback_password.clone()),
        })
    }

    /// A user and their tickets, newest first.
    pub async fn find_by_id(&self, id: i64) -> Result<UserWithTickets, DesklineError> {
        let user = self
            .storage
            .get_user(id)
            .await?
            .ok_or(DesklineError::UserNotFound)?;
        let tickets = self.storage.list_tickets_for_user(id).await?;
        Ok(UserWithTickets { user, tickets })
    }

    /// Exact match on the stored phone after rewriting a `00` prefix.
    ///
    /// Every call appends one search-log row. A failed append is logged and
    /// does not affect the result.
    pub async fn find_by_phone(&self, raw: &str) -> Result<User, DesklineError> {
        let normalized = normalize_simple(raw);
        let user = self.storage.find_user_by_phone(&normalized).await?;

        let output = match user.as_ref().map(serde_json::to_string).transpose() {
            Ok(output) => output,
            Err(e) => {
                warn!(error = %e, "could not snapshot user for search log");
                None
            }
        };
        let search = NewSearch {
            raw_query: raw.to_string(),
            modified_query: normalized,
            output,
        };
        if let Err(e) = self.storage.record_search(&search).await {
            warn!(error = %e, "failed to record phone search");
        }

        user.ok_or(DesklineError::UserNotFound)
    }

    /// Create-or-update keyed on email or phone. Returns the user and whether
    /// it was created.
    ///
    /// The caller is verified before any input is looked at. Phone numbers are
    /// stored in E.164. On update only supplied fields change; the password
    /// hash is kept unless a new password is given.
    pub async fn resolve_or_create(
        &self,
        key: Option<&str>,
        fields: &UserFields,
    ) -> Result<(User, bool), DesklineError> {
        self.verifier.verify(key).await?;

        let (checked, errors) = check(fields, false, false);
        errors.into_result()?;
        let (Some(name), Some(email)) = (checked.name, checked.email) else {
            return Err(DesklineError::Internal(
                "validated upsert is missing name or email".into(),
            ));
        };

        let phone = match checked.phone {
            Some(raw) => Some(normalize_e164(&raw, self.default_region)?),
            None => None,
        };

        let existing = self
            .storage
            .find_user_by_email_or_phone(&email, phone.as_deref())
            .await?;

        if let Some(existing) = existing {
            let password_hash = match checked.password {
                Some(plain) => Some(self.hasher.hash_blocking(plain).await?),
                None => None,
            };
            let changes = UserChanges {
                name: Some(name),
                email: Some(email),
                phone_number: phone,
                password_hash,
                balance: checked.balance,
                payment_status: checked.payment_status,
                active_status: checked.active_status,
            };
            let user = self
                .storage
                .update_user(existing.id, &changes)
                .await?
                .ok_or(DesklineError::UserNotFound)?;
            info!(user_id = user.id, "user updated by upsert");
            return Ok((user, false));
        }

        let plain = checked
            .password
            .unwrap_or_else(|| self.fallback_password.expose_secret().to_string());
        let new_user = NewUser {
            name,
            email,
            phone_number: phone,
            password_hash: self.hasher.hash_blocking(plain).await?,
            balance: checked.balance.unwrap_or(0.0),
            payment_status: checked.payment_status.unwrap_or_default(),
            active_status: checked.active_status.unwrap_or_default(),
        };
        let user = self.storage.insert_user(&new_user).await?;
        info!(user_id = user.id, "user created by upsert");
        Ok((user, true))
    }

    /// Strict creation: name, email, phone, and password are all required and
    /// email and phone must be unused. The phone is stored as given.
    pub async fn create(&self, fields: &UserFields) -> Result<User, DesklineError> {
        let (checked, mut errors) = check(fields, true, true);
        self.check_unique(&mut errors, &checked, None).await?;
        errors.into_result()?;

        let (Some(name), Some(email), Some(phone), Some(password)) =
            (checked.name, checked.email, checked.phone, checked.password)
        else {
            return Err(DesklineError::Internal(
                "validated user is missing a required field".into(),
            ));
        };

        let new_user = NewUser {
            name,
            email,
            phone_number: Some(phone),
            password_hash: self.hasher.hash_blocking(password).await?,
            balance: checked.balance.unwrap_or(0.0),
            payment_status: checked.payment_status.unwrap_or_default(),
            active_status: checked.active_status.unwrap_or_default(),
        };
        let user = self
            .storage
            .insert_user(&new_user)
            .await
            .map_err(conflict_to_validation)?;
        info!(user_id = user.id, "user created");
        Ok(user)
    }

    /// Edit-form update. Name, email, and phone are required; a blank
    /// password leaves the stored hash alone.
    pub async fn update(&self, id: i64, fields: &UserFields) -> Result<User, DesklineError> {
        if self.storage.get_user(id).await?.is_none() {
            return Err(DesklineError::UserNotFound);
        }

        let (checked, mut errors) = check(fields, true, false);
        self.check_unique(&mut errors, &checked, Some(id)).await?;
        errors.into_result()?;

        let password_hash = match checked.password {
            Some(plain) => Some(self.hasher.hash_blocking(plain).await?),
            None => None,
        };
        let changes = UserChanges {
            name: checked.name,
            email: checked.email,
            phone_number: checked.phone,
            password_hash,
            balance: checked.balance,
            payment_status: checked.payment_status,
            active_status: checked.active_status,
        };
        let user = self
            .storage
            .update_user(id, &changes)
            .await
            .map_err(conflict_to_validation)?
            .ok_or(DesklineError::UserNotFound)?;
        info!(user_id = id, "user updated");
        Ok(user)
    }

    pub async fn list(&self) -> Result<Vec<User>, DesklineError> {
        self.storage.list_users().await
    }

    /// Latest `limit` phone lookups, newest first.
    pub async fn recent_searches(&self, limit: u32) -> Result<Vec<SearchLog>, DesklineError> {
        self.storage.recent_searches(limit).await
    }

    async fn check_unique(
        &self,
        errors: &mut ValidationErrors,
        checked: &Checked,
        except_id: Option<i64>,
    ) -> Result<(), DesklineError> {
        if let Some(email) = &checked.email {
            if self.storage.email_taken(email, except_id).await? {
                validation::taken(errors, "email");
            }
        }
        if let Some(phone) = &checked.phone {
            if self.storage.phone_taken(phone, except_id).await? {
                validation::taken(errors, "phone_number");
            }
        }
        debug!(errors = errors.len(), "uniqueness checked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::BalanceInput;
    use crate::verifier::SharedKeyVerifier;
    use deskline_config::model::StorageConfig;
    use deskline_storage::SqliteStorage;
    use tempfile::tempdir;

    const KEY: Option<&str> = Some("pia-123");

    async fn setup() -> (UserResolver, Arc<SqliteStorage>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let storage = Arc::new(SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("test.db").to_str().unwrap().to_string(),
            wal_mode: true,
        }));
        storage.initialize().await.unwrap();

        let config = IdentityConfig {
            upsert_key: Some("pia-123".into()),
            hash_memory_cost: 1024,
            hash_iterations: 1,
            ..IdentityConfig::default()
        };
        let verifier = Arc::new(SharedKeyVerifier::from_config(&config));
        let resolver = UserResolver::new(storage.clone(), verifier, &config).unwrap();
        (resolver, storage, dir)
    }

    fn fields(name: &str, email: &str, phone: Option<&str>) -> UserFields {
        UserFields {
            name: Some(name.into()),
            email: Some(email.into()),
            phone_number: phone.map(Into::into),
            ..UserFields::default()
        }
    }

    #[tokio::test]
    async fn upsert_creates_with_defaults_then_updates_in_place() {
        let (resolver, storage, _dir) = setup().await;

        let (created, was_created) = resolver
            .resolve_or_create(KEY, &fields("A", "a@x.com", Some("01711111111")))
            .await
            .unwrap();
        assert!(was_created);
        assert_eq!(created.balance, 0.0);
        assert_eq!(created.payment_status, PaymentStatus::Unpaid);
        assert_eq!(created.active_status, ActiveStatus::Active);
        assert_eq!(created.phone_number.as_deref(), Some("+8801711111111"));
        assert!(resolver.hasher.verify("12345678", &created.password));

        let second = UserFields {
            balance: Some(BalanceInput::Number(50.0)),
            ..fields("A", "a@x.com", None)
        };
        let (updated, was_created) = resolver.resolve_or_create(KEY, &second).await.unwrap();
        assert!(!was_created);
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.balance, 50.0);
        assert_eq!(updated.phone_number.as_deref(), Some("+8801711111111"));
        assert_eq!(updated.password, created.password);
        assert_eq!(storage.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn upsert_matches_on_phone_alone() {
        let (resolver, _storage, _dir) = setup().await;
        let (first, _) = resolver
            .resolve_or_create(KEY, &fields("A", "a@x.com", Some("+8801711111111")))
            .await
            .unwrap();
        let (second, was_created) = resolver
            .resolve_or_create(KEY, &fields("A2", "new@x.com", Some("008801711111111")))
            .await
            .unwrap();
        assert!(!was_created);
        assert_eq!(second.id, first.id);
        assert_eq!(second.email, "new@x.com");
        assert_eq!(second.name, "A2");
    }

    #[tokio::test]
    async fn upsert_matches_email_in_any_case() {
        let (resolver, storage, _dir) = setup().await;
        let (first, _) = resolver
            .resolve_or_create(KEY, &fields("A", "Pat@Example.com", None))
            .await
            .unwrap();
        let (second, was_created) = resolver
            .resolve_or_create(KEY, &fields("A", "pat@example.com", None))
            .await
            .unwrap();
        assert!(!was_created);
        assert_eq!(second.id, first.id);
        assert_eq!(second.email, "pat@example.com");
        assert_eq!(storage.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn upsert_rejects_bad_key_before_validation() {
        let (resolver, storage, _dir) = setup().await;
        let err = resolver
            .resolve_or_create(Some("wrong"), &UserFields::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DesklineError::Unauthorized));
        assert!(storage.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upsert_rejects_unparseable_phone_without_writing() {
        let (resolver, storage, _dir) = setup().await;
        let err = resolver
            .resolve_or_create(KEY, &fields("A", "a@x.com", Some("abc")))
            .await
            .unwrap_err();
        assert!(matches!(err, DesklineError::InvalidPhoneFormat { .. }));
        assert!(storage.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upsert_validates_fields() {
        let (resolver, _storage, _dir) = setup().await;
        let bad = UserFields {
            password: Some("short".into()),
            payment_status: Some("refunded".into()),
            ..fields("", "nope", None)
        };
        let err = resolver.resolve_or_create(KEY, &bad).await.unwrap_err();
        let DesklineError::Validation(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        for field in ["name", "email", "password", "payment_status"] {
            assert!(errors.contains(field), "missing {field}");
        }
    }

    #[tokio::test]
    async fn upsert_rejects_bad_key_before_reading_odd_types() {
        let (resolver, storage, _dir) = setup().await;
        let odd = UserFields::from_json(&serde_json::json!({"name": 5, "active_status": "maybe"}));
        let err = resolver
            .resolve_or_create(Some("wrong"), &odd)
            .await
            .unwrap_err();
        assert!(matches!(err, DesklineError::Unauthorized));
        assert!(storage.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upsert_reports_odd_types_in_rule_order() {
        let (resolver, storage, _dir) = setup().await;
        let odd = UserFields::from_json(&serde_json::json!({
            "name": 5,
            "email": "a@x.com",
            "payment_status": "refunded",
            "active_status": "maybe",
        }));
        let err = resolver.resolve_or_create(KEY, &odd).await.unwrap_err();
        let DesklineError::Validation(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            ["name", "payment_status", "active_status"]
        );
        assert_eq!(
            errors.get("name").unwrap(),
            ["The name field must be a string."]
        );
        assert_eq!(
            errors.get("active_status").unwrap(),
            ["The active status field must be true or false."]
        );
        assert!(storage.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upsert_supplied_password_is_hashed() {
        let (resolver, _storage, _dir) = setup().await;
        let input = UserFields {
            password: Some("s3cretpass".into()),
            ..fields("A", "a@x.com", None)
        };
        let (user, _) = resolver.resolve_or_create(KEY, &input).await.unwrap();
        assert!(resolver.hasher.verify("s3cretpass", &user.password));
        assert!(!resolver.hasher.verify("12345678", &user.password));
    }

    #[tokio::test]
    async fn phone_lookup_logs_hits_and_misses() {
        let (resolver, _storage, _dir) = setup().await;
        resolver
            .resolve_or_create(KEY, &fields("A", "a@x.com", Some("+8801711111111")))
            .await
            .unwrap();

        let user = resolver.find_by_phone("008801711111111").await.unwrap();
        assert_eq!(user.email, "a@x.com");
        let miss = resolver.find_by_phone("01711111111").await.unwrap_err();
        assert!(matches!(miss, DesklineError::UserNotFound));

        let searches = resolver.recent_searches(25).await.unwrap();
        assert_eq!(searches.len(), 2);
        assert_eq!(searches[0].raw_query, "01711111111");
        assert_eq!(searches[0].output, None);
        assert_eq!(searches[1].modified_query, "+8801711111111");
        let snapshot = searches[1].output.as_deref().unwrap();
        assert!(snapshot.contains("a@x.com"));
        assert!(!snapshot.contains("argon2"));
    }

    #[tokio::test]
    async fn find_by_id_includes_tickets() {
        let (resolver, _storage, _dir) = setup().await;
        let (user, _) = resolver
            .resolve_or_create(KEY, &fields("A", "a@x.com", None))
            .await
            .unwrap();
        let found = resolver.find_by_id(user.id).await.unwrap();
        assert_eq!(found.user.id, user.id);
        assert!(found.tickets.is_empty());
        assert!(matches!(
            resolver.find_by_id(user.id + 1).await,
            Err(DesklineError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn strict_create_requires_everything_and_uniqueness() {
        let (resolver, storage, _dir) = setup().await;
        let err = resolver
            .create(&fields("A", "a@x.com", None))
            .await
            .unwrap_err();
        let DesklineError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.contains("phone_number"));
        assert!(errors.contains("password"));

        let full = UserFields {
            password: Some("password".into()),
            ..fields("A", "a@x.com", Some("1234567890"))
        };
        let user = resolver.create(&full).await.unwrap();
        assert_eq!(user.phone_number.as_deref(), Some("1234567890"));

        let err = resolver.create(&full).await.unwrap_err();
        let DesklineError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(
            errors.get("email").unwrap(),
            ["The email has already been taken."]
        );
        assert!(errors.contains("phone_number"));
        assert_eq!(storage.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_keeps_password_when_blank() {
        let (resolver, _storage, _dir) = setup().await;
        let full = UserFields {
            password: Some("password".into()),
            ..fields("A", "a@x.com", Some("1234567890"))
        };
        let user = resolver.create(&full).await.unwrap();

        let edit = UserFields {
            password: Some("".into()),
            payment_status: Some("paid".into()),
            ..fields("A B", "a@x.com", Some("1234567890"))
        };
        let updated = resolver.update(user.id, &edit).await.unwrap();
        assert_eq!(updated.name, "A B");
        assert_eq!(updated.payment_status, PaymentStatus::Paid);
        assert_eq!(updated.password, user.password);

        assert!(matches!(
            resolver.update(user.id + 10, &edit).await,
            Err(DesklineError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn update_rejects_email_of_another_user() {
        let (resolver, _storage, _dir) = setup().await;
        let first = UserFields {
            password: Some("password".into()),
            ..fields("A", "a@x.com", Some("111"))
        };
        let second = UserFields {
            password: Some("password".into()),
            ..fields("B", "b@x.com", Some("222"))
        };
        resolver.create(&first).await.unwrap();
        let b = resolver.create(&second).await.unwrap();

        let err = resolver
            .update(b.id, &fields("B", "a@x.com", Some("222")))
            .await
            .unwrap_err();
        let DesklineError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.contains("email"));
        assert!(!errors.contains("phone_number"));
    }
}
