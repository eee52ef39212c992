//! Conversation message types.
//!
//! A [`Message`] is one entry of the canonical transcript. Entries come from
//! three places: local echoes of what the user typed, synthetic failure notes
//! produced by the client, and history entries assigned an id by the server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque server-assigned message identifier.
///
/// The backend stores messages with integer primary keys, but nothing in the
/// client depends on that; ids are compared as strings only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for MessageId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum WireId {
            Number(serde_json::Number),
            Text(String),
        }

        Ok(match WireId::deserialize(deserializer)? {
            WireId::Number(n) => MessageId(n.to_string()),
            WireId::Text(s) => MessageId(s),
        })
    }
}

/// Represents the author of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message typed by the customer.
    User,
    /// Message from the AI support agent.
    Assistant,
    /// Message from a human support agent after escalation.
    Human,
}

impl MessageRole {
    /// Parses a wire role string.
    ///
    /// Returns `None` for roles the transcript never displays
    /// (`system`, `tool`, or anything unknown).
    pub fn from_wire(role: &str) -> Option<Self> {
        match role.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            "human" => Some(Self::Human),
            _ => None,
        }
    }

    /// Whether history entries with this role are rendered from a poll.
    ///
    /// User turns are already on screen as local echoes.
    pub fn is_remote_author(self) -> bool {
        matches!(self, Self::Assistant | Self::Human)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::User => "You",
            Self::Assistant => "Assistant",
            Self::Human => "Agent",
        }
    }
}

/// Where a transcript entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageOrigin {
    /// Shown optimistically on send, before the server assigned an id.
    LocalEcho,
    /// Discovered through a history poll.
    Server,
    /// Produced by the client itself (e.g. the generic failure note).
    Synthetic,
}

/// A single entry of the canonical transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Server-assigned id; `None` for local echoes and synthetic entries.
    pub id: Option<MessageId>,
    pub role: MessageRole,
    pub content: String,
    /// Monotonic sequence number assigned in arrival order.
    pub arrival_order: u64,
    pub origin: MessageOrigin,
    /// When the client received or created the entry.
    pub received_at: DateTime<Utc>,
}

impl Message {
    /// Creates the optimistic copy of a message the user just sent.
    pub fn local_echo(content: impl Into<String>, arrival_order: u64) -> Self {
        Self {
            id: None,
            role: MessageRole::User,
            content: content.into(),
            arrival_order,
            origin: MessageOrigin::LocalEcho,
            received_at: Utc::now(),
        }
    }

    /// Creates a client-generated assistant entry.
    pub fn synthetic(content: impl Into<String>, arrival_order: u64) -> Self {
        Self {
            id: None,
            role: MessageRole::Assistant,
            content: content.into(),
            arrival_order,
            origin: MessageOrigin::Synthetic,
            received_at: Utc::now(),
        }
    }

    /// Creates an entry discovered in the server history.
    pub fn from_server(
        id: MessageId,
        role: MessageRole,
        content: impl Into<String>,
        arrival_order: u64,
    ) -> Self {
        Self {
            id: Some(id),
            role,
            content: content.into(),
            arrival_order,
            origin: MessageOrigin::Server,
            received_at: Utc::now(),
        }
    }
}
