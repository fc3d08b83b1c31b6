// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User CRUD operations.

use deskline_core::DesklineError;
use deskline_core::types::{NewUser, User, UserChanges};
use rusqlite::types::Value;
use rusqlite::{OptionalExtension, params, params_from_iter};

use crate::database::{Database, map_tr_err};
use crate::queries::enum_column;

const USER_COLUMNS: &str = "id, name, email, phone_number, password, balance, \
                            payment_status, active_status, created_at, updated_at";

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone_number: row.get(3)?,
        password: row.get(4)?,
        balance: row.get(5)?,
        payment_status: enum_column(row, 6)?,
        active_status: enum_column(row, 7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// Insert a user and return the stored row.
pub async fn insert_user(db: &Database, user: &NewUser) -> Result<User, DesklineError> {
    let user = user.clone();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "INSERT INTO users (name, email, phone_number, password, balance, \
                     payment_status, active_status) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
                     RETURNING {USER_COLUMNS}"
                ),
                params![
                    user.name,
                    user.email,
                    user.phone_number,
                    user.password_hash,
                    user.balance,
                    user.payment_status.as_ref(),
                    user.active_status.as_ref(),
                ],
                user_from_row,
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Get a user by ID.
pub async fn get_user(db: &Database, id: i64) -> Result<Option<User>, DesklineError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))?;
            stmt.query_row(params![id], user_from_row).optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Get a user by exact stored phone number.
pub async fn find_user_by_phone(db: &Database, phone: &str) -> Result<Option<User>, DesklineError> {
    let phone = phone.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE phone_number = ?1"
            ))?;
            stmt.query_row(params![phone], user_from_row).optional()
        })
        .await
        .map_err(map_tr_err)
}

/// First user matching `email`, or `phone` when given. Email matches sort
/// first and ignore ASCII case.
pub async fn find_user_by_email_or_phone(
    db: &Database,
    email: &str,
    phone: Option<&str>,
) -> Result<Option<User>, DesklineError> {
    let email = email.to_string();
    let phone = phone.map(str::to_string);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users
                 WHERE email = ?1 COLLATE NOCASE
                    OR (?2 IS NOT NULL AND phone_number = ?2)
                 ORDER BY (email = ?1 COLLATE NOCASE) DESC, id ASC
                 LIMIT 1"
            ))?;
            stmt.query_row(params![email, phone], user_from_row).optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Whether any user other than `except_id` satisfies `condition`, with the
/// value bound to `?1`.
async fn value_taken(
    db: &Database,
    condition: &'static str,
    value: &str,
    except_id: Option<i64>,
) -> Result<bool, DesklineError> {
    let value = value.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT EXISTS(SELECT 1 FROM users WHERE {condition} \
                     AND (?2 IS NULL OR id != ?2))"
                ),
                params![value, except_id],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

pub async fn email_taken(
    db: &Database,
    email: &str,
    except_id: Option<i64>,
) -> Result<bool, DesklineError> {
    value_taken(db, "email = ?1 COLLATE NOCASE", email, except_id).await
}

pub async fn phone_taken(
    db: &Database,
    phone: &str,
    except_id: Option<i64>,
) -> Result<bool, DesklineError> {
    value_taken(db, "phone_number = ?1", phone, except_id).await
}

/// Apply a partial update and bump `updated_at`. Returns `None` for an unknown id.
pub async fn update_user(
    db: &Database,
    id: i64,
    changes: &UserChanges,
) -> Result<Option<User>, DesklineError> {
    let mut sets: Vec<&'static str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(name) = &changes.name {
        sets.push("name");
        values.push(Value::Text(name.clone()));
    }
    if let Some(email) = &changes.email {
        sets.push("email");
        values.push(Value::Text(email.clone()));
    }
    if let Some(phone) = &changes.phone_number {
        sets.push("phone_number");
        values.push(Value::Text(phone.clone()));
    }
    if let Some(hash) = &changes.password_hash {
        sets.push("password");
        values.push(Value::Text(hash.clone()));
    }
    if let Some(balance) = changes.balance {
        sets.push("balance");
        values.push(Value::Real(balance));
    }
    if let Some(status) = changes.payment_status {
        sets.push("payment_status");
        values.push(Value::Text(status.to_string()));
    }
    if let Some(status) = changes.active_status {
        sets.push("active_status");
        values.push(Value::Text(status.to_string()));
    }

    let mut assignments: Vec<String> = sets
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{column} = ?{}", i + 1))
        .collect();
    assignments.push("updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')".to_string());
    let sql = format!(
        "UPDATE users SET {} WHERE id = ?{} RETURNING {USER_COLUMNS}",
        assignments.join(", "),
        values.len() + 1
    );
    values.push(Value::Integer(id));

    db.connection()
        .call(move |conn| {
            conn.query_row(&sql, params_from_iter(values), user_from_row)
                .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a user. Their tickets go with them via `ON DELETE CASCADE`.
pub async fn delete_user(db: &Database, id: i64) -> Result<bool, DesklineError> {
    db.connection()
        .call(move |conn| {
            let removed = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// All users, newest first.
pub async fn list_users(db: &Database) -> Result<Vec<User>, DesklineError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt.query_map([], user_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use deskline_core::types::{ActiveStatus, PaymentStatus};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn make_user(email: &str, phone: Option<&str>) -> NewUser {
        NewUser {
            name: "Jane Smith".to_string(),
            email: email.to_string(),
            phone_number: phone.map(str::to_string),
            password_hash: "$argon2id$stub".to_string(),
            balance: 0.0,
            payment_status: PaymentStatus::Unpaid,
            active_status: ActiveStatus::Active,
        }
    }

    #[tokio::test]
    async fn insert_and_get_user_roundtrips() {
        let (db, _dir) = setup_db().await;
        let inserted = insert_user(&db, &make_user("jane@example.com", Some("+8801711111111")))
            .await
            .unwrap();
        assert!(inserted.id > 0);
        assert!(!inserted.created_at.is_empty());

        let fetched = get_user(&db, inserted.id).await.unwrap().unwrap();
        assert_eq!(fetched, inserted);
        assert_eq!(fetched.payment_status, PaymentStatus::Unpaid);
        assert_eq!(fetched.phone_number.as_deref(), Some("+8801711111111"));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_nonexistent_user_returns_none() {
        let (db, _dir) = setup_db().await;
        assert!(get_user(&db, 42).await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let (db, _dir) = setup_db().await;
        insert_user(&db, &make_user("dup@example.com", None)).await.unwrap();
        let err = insert_user(&db, &make_user("dup@example.com", None))
            .await
            .unwrap_err();
        assert!(
            matches!(&err, DesklineError::Conflict { field } if field == "email"),
            "got {err:?}"
        );
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_phone_is_a_conflict() {
        let (db, _dir) = setup_db().await;
        insert_user(&db, &make_user("a@example.com", Some("+15550001")))
            .await
            .unwrap();
        let err = insert_user(&db, &make_user("b@example.com", Some("+15550001")))
            .await
            .unwrap_err();
        assert!(matches!(&err, DesklineError::Conflict { field } if field == "phone_number"));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn users_without_phone_do_not_collide() {
        let (db, _dir) = setup_db().await;
        insert_user(&db, &make_user("a@example.com", None)).await.unwrap();
        insert_user(&db, &make_user("b@example.com", None)).await.unwrap();
        assert_eq!(list_users(&db).await.unwrap().len(), 2);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn email_match_wins_over_phone_match() {
        let (db, _dir) = setup_db().await;
        let by_phone = insert_user(&db, &make_user("phone@example.com", Some("+15550002")))
            .await
            .unwrap();
        let by_email = insert_user(&db, &make_user("email@example.com", None))
            .await
            .unwrap();

        let found = find_user_by_email_or_phone(&db, "email@example.com", Some("+15550002"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, by_email.id);

        let found = find_user_by_email_or_phone(&db, "nobody@example.com", Some("+15550002"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, by_phone.id);

        let none = find_user_by_email_or_phone(&db, "nobody@example.com", None)
            .await
            .unwrap();
        assert!(none.is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn taken_checks_exclude_own_id() {
        let (db, _dir) = setup_db().await;
        let user = insert_user(&db, &make_user("own@example.com", Some("+15550003")))
            .await
            .unwrap();

        assert!(email_taken(&db, "own@example.com", None).await.unwrap());
        assert!(!email_taken(&db, "own@example.com", Some(user.id)).await.unwrap());
        assert!(phone_taken(&db, "+15550003", None).await.unwrap());
        assert!(!phone_taken(&db, "+15550003", Some(user.id)).await.unwrap());
        assert!(!phone_taken(&db, "+19999999", None).await.unwrap());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn email_identity_ignores_case() {
        let (db, _dir) = setup_db().await;
        let user = insert_user(&db, &make_user("Mixed@Example.com", None))
            .await
            .unwrap();
        assert_eq!(user.email, "Mixed@Example.com");

        let found = find_user_by_email_or_phone(&db, "mixed@example.com", None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, user.id);
        assert!(email_taken(&db, "MIXED@EXAMPLE.COM", None).await.unwrap());
        assert!(!email_taken(&db, "mixed@example.com", Some(user.id)).await.unwrap());

        let err = insert_user(&db, &make_user("mixed@example.com", None))
            .await
            .unwrap_err();
        assert!(
            matches!(&err, DesklineError::Conflict { field } if field == "email"),
            "got {err:?}"
        );
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn partial_update_leaves_other_columns() {
        let (db, _dir) = setup_db().await;
        let user = insert_user(&db, &make_user("upd@example.com", Some("+15550004")))
            .await
            .unwrap();

        let changes = UserChanges {
            balance: Some(50.0),
            payment_status: Some(PaymentStatus::Paid),
            ..UserChanges::default()
        };
        let updated = update_user(&db, user.id, &changes).await.unwrap().unwrap();
        assert_eq!(updated.balance, 50.0);
        assert_eq!(updated.payment_status, PaymentStatus::Paid);
        assert_eq!(updated.phone_number, user.phone_number);
        assert_eq!(updated.password, user.password);
        assert_eq!(updated.email, user.email);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_unknown_user_returns_none() {
        let (db, _dir) = setup_db().await;
        let changes = UserChanges {
            name: Some("Ghost".into()),
            ..UserChanges::default()
        };
        assert!(update_user(&db, 99, &changes).await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_user_reports_removal() {
        let (db, _dir) = setup_db().await;
        let user = insert_user(&db, &make_user("del@example.com", None)).await.unwrap();
        assert!(delete_user(&db, user.id).await.unwrap());
        assert!(!delete_user(&db, user.id).await.unwrap());
        assert!(get_user(&db, user.id).await.unwrap().is_none());
        db.close().await.unwrap();
    }
}
