//! The conversational backend as seen by the client.
//!
//! This module provides the request/response types of the support backend and
//! the `ChatBackend` trait that abstracts the transport, so the synchronizer
//! can run against the HTTP client or an in-process fake.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::MessageId;

/// Body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The text the customer typed
    pub message: String,
    /// Email identifying the customer the conversation is about
    pub customer_email: String,
    /// Conversation session the turn belongs to
    pub session_id: String,
}

/// Body returned by `POST /chat`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Assistant answer; absent or empty is a soft failure
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

impl ChatReply {
    /// Returns the answer text if the backend produced a non-blank one.
    pub fn answer(&self) -> Option<&str> {
        self.response
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

/// One row of `GET /chat/history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: MessageId,
    /// Raw wire role (`user`, `assistant`, `human`, `system`, `tool`, ...)
    pub role: String,
    /// Assistant rows carrying only tool calls have no content
    #[serde(default)]
    pub content: Option<String>,
}

/// Credentials posted to `POST /login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body returned by a successful `POST /login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginReply {
    pub access_token: String,
}

/// Transport to the support backend.
///
/// Every method reports transport and protocol failures (unreachable host,
/// non-success status, malformed body) as `HelplineError::Backend`; callers
/// treat them all the same way.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Probes `GET /health`. `Ok(())` iff the backend answered with a 2xx.
    async fn health(&self) -> Result<()>;

    /// Sends one customer turn.
    ///
    /// # Arguments
    ///
    /// * `request` - The chat payload
    /// * `token` - Bearer token, omitted from the request when `None`
    async fn send_chat(&self, request: &ChatRequest, token: Option<&str>) -> Result<ChatReply>;

    /// Fetches the full stored history for a session/customer pair, in
    /// backend order.
    async fn fetch_history(
        &self,
        session_id: &str,
        customer_email: &str,
        token: Option<&str>,
    ) -> Result<Vec<HistoryEntry>>;

    /// Exchanges credentials for an access token.
    ///
    /// Returns `HelplineError::Auth` when the backend rejects the credentials.
    async fn login(&self, request: &LoginRequest) -> Result<String>;
}
