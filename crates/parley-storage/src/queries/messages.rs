// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Direct message operations.

use chrono::{SubsecRound, Utc};
use parley_core::{Message, NewMessage, ParleyError};
use rusqlite::params;

use super::{format_timestamp, parse_timestamp};
use crate::database::{Database, map_tr_err};

/// Insert a message, returning it with its assigned id and timestamp.
///
/// The timestamp is truncated to the stored precision so the returned value
/// equals what later reads produce.
pub async fn insert_message(db: &Database, msg: &NewMessage) -> Result<Message, ParleyError> {
    let msg = msg.clone();
    let sent_at = Utc::now().trunc_subsecs(3);
    let stamp = format_timestamp(&sent_at);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (sender, receiver, body, sent_at) VALUES (?1, ?2, ?3, ?4)",
                params![msg.sender, msg.receiver, msg.body, stamp],
            )?;
            Ok(Message {
                id: conn.last_insert_rowid(),
                sender: msg.sender,
                receiver: msg.receiver,
                body: msg.body,
                sent_at,
            })
        })
        .await
        .map_err(map_tr_err)
}

/// Messages between two users in either direction, ascending by id.
pub async fn get_conversation(
    db: &Database,
    user_a: &str,
    user_b: &str,
    limit: Option<i64>,
) -> Result<Vec<Message>, ParleyError> {
    let (user_a, user_b) = (user_a.to_string(), user_b.to_string());
    // SQLite treats a negative LIMIT as no limit.
    let limit = limit.unwrap_or(-1);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, sender, receiver, body, sent_at FROM messages
                 WHERE (sender = ?1 AND receiver = ?2) OR (sender = ?2 AND receiver = ?1)
                 ORDER BY id ASC LIMIT ?3",
            )?;
            let rows = stmt.query_map(params![user_a, user_b, limit], |row| {
                let raw: String = row.get(4)?;
                Ok(Message {
                    id: row.get(0)?,
                    sender: row.get(1)?,
                    receiver: row.get(2)?,
                    body: row.get(3)?,
                    sent_at: parse_timestamp(4, &raw)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Delete message `id` if `sender` wrote it. Returns whether a row was removed.
pub async fn delete_message(db: &Database, id: i64, sender: &str) -> Result<bool, ParleyError> {
    let sender = sender.to_string();
    db.connection()
        .call(move |conn| {
            let removed = conn.execute(
                "DELETE FROM messages WHERE id = ?1 AND sender = ?2",
                params![id, sender],
            )?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}
