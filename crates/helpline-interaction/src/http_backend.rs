//! HttpChatBackend - REST implementation of `ChatBackend`.
//!
//! Endpoints:
//! - `GET  /health`
//! - `POST /login`          `{email, password}` -> `{access_token}`
//! - `POST /chat`           `{message, customer_email, session_id}` -> `{response}`
//! - `GET  /chat/history`   `?session_id=&email=` -> `[{id, role, content}]`

use async_trait::async_trait;
use helpline_core::backend::{
    ChatBackend, ChatReply, ChatRequest, HistoryEntry, LoginReply, LoginRequest,
};
use helpline_core::error::{HelplineError, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::BackendError;

/// Longest error body kept in logs and error messages.
const MAX_ERROR_BODY: usize = 512;

#[derive(Clone)]
pub struct HttpChatBackend {
    client: Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl HttpChatBackend {
    /// Creates a backend client rooted at `base_url` (e.g. `http://localhost:8000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: None,
        }
    }

    /// Sets a per-request deadline. `None` keeps the transport default.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Adds the bearer header when a token is present and the deadline when configured.
    fn prepare(&self, request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        let request = match self.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        };
        if let Some(token) = token {
            request.header("Authorization", format!("Bearer {}", token))
        } else {
            request
        }
    }

    /// Sends the request and decodes a success body as `T`.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> std::result::Result<T, BackendError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: truncate(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
    }
}

fn truncate(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn health(&self) -> Result<()> {
        let request = self.prepare(self.client.get(self.url("/health")), None);
        let response = request.send().await.map_err(BackendError::from)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(BackendError::Status {
                status: response.status().as_u16(),
                body: String::new(),
            }
            .into())
        }
    }

    async fn send_chat(&self, request: &ChatRequest, token: Option<&str>) -> Result<ChatReply> {
        tracing::debug!(
            "[HttpBackend] POST /chat session_id={} authenticated={}",
            request.session_id,
            token.is_some()
        );
        let builder = self.prepare(self.client.post(self.url("/chat")).json(request), token);

        self.execute(builder).await.map_err(|e| {
            tracing::warn!("[HttpBackend] /chat failed: {}", e);
            e.into()
        })
    }

    async fn fetch_history(
        &self,
        session_id: &str,
        customer_email: &str,
        token: Option<&str>,
    ) -> Result<Vec<HistoryEntry>> {
        let builder = self.prepare(
            self.client
                .get(self.url("/chat/history"))
                .query(&[("session_id", session_id), ("email", customer_email)]),
            token,
        );

        Ok(self.execute(builder).await?)
    }

    async fn login(&self, request: &LoginRequest) -> Result<String> {
        let builder = self.prepare(self.client.post(self.url("/login")).json(request), None);

        match self.execute::<LoginReply>(builder).await {
            Ok(reply) if !reply.access_token.trim().is_empty() => Ok(reply.access_token),
            Ok(_) => Err(HelplineError::auth("backend returned an empty access token")),
            Err(BackendError::Status { status, .. })
                if status == StatusCode::UNAUTHORIZED.as_u16()
                    || status == StatusCode::FORBIDDEN.as_u16()
                    || status == StatusCode::BAD_REQUEST.as_u16() =>
            {
                tracing::info!("[HttpBackend] Login rejected with status {}", status);
                Err(HelplineError::auth("invalid email or password"))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let backend = HttpChatBackend::new("http://localhost:8000/");
        assert_eq!(backend.base_url(), "http://localhost:8000");
        assert_eq!(backend.url("/health"), "http://localhost:8000/health");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let body = "é".repeat(MAX_ERROR_BODY);
        let truncated = truncate(&body);
        assert!(truncated.ends_with("..."));
        assert!(truncated.len() <= MAX_ERROR_BODY + 3);
        assert_eq!(truncate("short"), "short");
    }
}
