// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account operations.

use chrono::Utc;
use parley_core::{Credentials, ParleyError};
use rusqlite::{OptionalExtension, params};

use super::format_timestamp;
use crate::database::{Database, map_tr_err};

/// Create an account. Returns `false` if the username is already taken.
pub async fn create_user(db: &Database, credentials: &Credentials) -> Result<bool, ParleyError> {
    let credentials = credentials.clone();
    let created_at = format_timestamp(&Utc::now());
    db.connection()
        .call(move |conn| {
            let result = conn.execute(
                "INSERT INTO users (username, password, created_at) VALUES (?1, ?2, ?3)",
                params![credentials.username, credentials.password, created_at],
            );
            match result {
                Ok(_) => Ok(true),
                Err(rusqlite::Error::SqliteFailure(err, _))
                    if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    Ok(false)
                }
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Stored credentials for `username`, if the account exists.
pub async fn get_credentials(
    db: &Database,
    username: &str,
) -> Result<Option<Credentials>, ParleyError> {
    let username = username.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT username, password FROM users WHERE username = ?1",
                params![username],
                |row| {
                    Ok(Credentials {
                        username: row.get(0)?,
                        password: row.get(1)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Case-insensitive substring search over usernames, ordered by username.
///
/// `%`, `_` and `\` in the query match literally.
pub async fn search_usernames(
    db: &Database,
    query: &str,
    limit: i64,
) -> Result<Vec<String>, ParleyError> {
    let pattern = format!("%{}%", escape_like(query));
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT username FROM users WHERE username LIKE ?1 ESCAPE '\\'
                 ORDER BY username LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![pattern, limit], |row| row.get(0))?;
            rows.collect::<Result<Vec<String>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_db() -> Database {
        let db = Database::open_in_memory().await.unwrap();
        for name in ["alice", "Alicia", "bob", "mal_ice"] {
            assert!(create_user(&db, &Credentials::new(name, "pw")).await.unwrap());
        }
        db
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let db = setup_db().await;
        assert!(!create_user(&db, &Credentials::new("alice", "other")).await.unwrap());
        let stored = get_credentials(&db, "alice").await.unwrap().unwrap();
        assert_eq!(stored.password, "pw");
    }

    #[tokio::test]
    async fn missing_user_has_no_credentials() {
        let db = setup_db().await;
        assert!(get_credentials(&db, "nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_sorted() {
        let db = setup_db().await;
        let found = search_usernames(&db, "ALI", 20).await.unwrap();
        assert_eq!(found, vec!["Alicia", "alice"]);
    }

    #[tokio::test]
    async fn search_treats_wildcards_literally() {
        let db = setup_db().await;
        assert_eq!(search_usernames(&db, "_", 20).await.unwrap(), vec!["mal_ice"]);
        assert!(search_usernames(&db, "%", 20).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_respects_limit() {
        let db = setup_db().await;
        assert_eq!(search_usernames(&db, "", 2).await.unwrap().len(), 2);
    }

    #[test]
    fn escape_like_escapes_metacharacters() {
        assert_eq!(escape_like(r"a%b_c\d"), r"a\%b\_c\\d");
    }
}
