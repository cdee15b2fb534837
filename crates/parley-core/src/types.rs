// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Parley server.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ParleyError;

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// A message submitted for sending, before the store assigns `id` and `sent_at`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewMessage {
    pub sender: String,
    pub receiver: String,
    pub body: String,
}

impl NewMessage {
    pub fn new(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            body: body.into(),
        }
    }

    /// Rejects empty or whitespace-only fields, reporting the first offender.
    pub fn validate(&self) -> Result<(), ParleyError> {
        for (field, value) in [
            ("sender", &self.sender),
            ("receiver", &self.receiver),
            ("body", &self.body),
        ] {
            if value.trim().is_empty() {
                return Err(ParleyError::validation(field, "must not be empty"));
            }
        }
        Ok(())
    }
}

/// A persisted direct message.
///
/// `id` and `sent_at` are assigned by the message store at insert time and
/// never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub sender: String,
    pub receiver: String,
    pub body: String,
    #[serde(serialize_with = "serialize_millis")]
    pub sent_at: DateTime<Utc>,
}

/// RFC 3339 with exactly three fractional digits and a `Z` suffix.
fn serialize_millis<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Events pushed to a live connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveEvent {
    /// A message addressed to the connected user was just persisted.
    NewMessage { message: Message },
}

impl LiveEvent {
    /// Encodes the event as the JSON text frame sent over the wire.
    pub fn to_json(&self) -> Result<String, ParleyError> {
        serde_json::to_string(self)
            .map_err(|e| ParleyError::Internal(format!("failed to encode live event: {e}")))
    }
}

/// Account credentials. The password is an opaque string compared verbatim.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Rejects an empty username or password.
    pub fn validate(&self) -> Result<(), ParleyError> {
        if self.username.trim().is_empty() {
            return Err(ParleyError::validation("username", "must not be empty"));
        }
        if self.password.is_empty() {
            return Err(ParleyError::validation("password", "must not be empty"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_message() -> Message {
        Message {
            id: 1,
            sender: "bob".into(),
            receiver: "alice".into(),
            body: "hello".into(),
            sent_at: Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn new_message_rejects_each_empty_field() {
        let cases = [
            (NewMessage::new("", "b", "hi"), "sender"),
            (NewMessage::new("a", "  ", "hi"), "receiver"),
            (NewMessage::new("a", "b", "\n"), "body"),
        ];
        for (msg, expected) in cases {
            match msg.validate() {
                Err(ParleyError::Validation { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected validation error for {expected}, got {other:?}"),
            }
        }
    }

    #[test]
    fn new_message_accepts_populated_fields() {
        assert!(NewMessage::new("a", "b", "hi").validate().is_ok());
    }

    #[test]
    fn message_serializes_sent_at_in_camel_case() {
        let json = serde_json::to_value(sample_message()).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["sender"], "bob");
        assert_eq!(json["sentAt"], "2026-01-01T12:00:00.000Z");
        assert!(json.get("sent_at").is_none());
    }

    #[test]
    fn live_event_envelope_shape() {
        let event = LiveEvent::NewMessage {
            message: sample_message(),
        };
        let json: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(json["type"], "new_message");
        assert_eq!(json["message"]["id"], 1);
        assert_eq!(json["message"]["body"], "hello");
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let creds = Credentials::new("alice", "hunter2");
        let debug = format!("{creds:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn credentials_require_both_fields() {
        assert!(Credentials::new("", "pw").validate().is_err());
        assert!(Credentials::new("alice", "").validate().is_err());
        assert!(Credentials::new("alice", "pw").validate().is_ok());
    }

    #[test]
    fn sent_at_always_carries_millis() {
        let mut message = sample_message();
        message.sent_at += chrono::Duration::milliseconds(7);
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["sentAt"], "2026-01-01T12:00:00.007Z");

        let back: Message = serde_json::from_value(json).unwrap();
        assert_eq!(back, message);
    }
}
