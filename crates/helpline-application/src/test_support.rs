//! Scripted `ChatBackend` shared by the application tests.

use async_trait::async_trait;
use helpline_core::backend::{ChatBackend, ChatReply, ChatRequest, HistoryEntry, LoginRequest};
use helpline_core::error::{HelplineError, Result};
use helpline_core::event::{EventReceiver, SyncEvent};
use helpline_core::message::MessageId;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub fn entry(id: &str, role: &str, content: &str) -> HistoryEntry {
    HistoryEntry {
        id: MessageId::new(id),
        role: role.to_string(),
        content: Some(content.to_string()),
    }
}

pub fn drain(rx: &mut EventReceiver) -> Vec<SyncEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Holds the next history request open until released.
#[derive(Default)]
pub struct HistoryGate {
    entered: Notify,
    release: Notify,
}

impl HistoryGate {
    /// Resolves once the gated request has reached the backend.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[derive(Default)]
pub struct ScriptedBackend {
    unhealthy: AtomicBool,
    history_fails: AtomicBool,
    chat_replies: Mutex<VecDeque<Result<ChatReply>>>,
    login_results: Mutex<VecDeque<Result<String>>>,
    history: Mutex<Vec<HistoryEntry>>,
    chat_requests: Mutex<Vec<ChatRequest>>,
    tokens: Mutex<Vec<Option<String>>>,
    gate: Mutex<Option<Arc<HistoryGate>>>,
    health_calls: AtomicUsize,
    chat_calls: AtomicUsize,
    history_calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.unhealthy.store(!healthy, Ordering::SeqCst);
    }

    pub fn fail_history(&self, fail: bool) {
        self.history_fails.store(fail, Ordering::SeqCst);
    }

    pub fn push_chat_reply(&self, reply: Result<ChatReply>) {
        self.chat_replies.lock().unwrap().push_back(reply);
    }

    pub fn push_login_result(&self, result: Result<String>) {
        self.login_results.lock().unwrap().push_back(result);
    }

    pub fn set_history(&self, entries: Vec<HistoryEntry>) {
        *self.history.lock().unwrap() = entries;
    }

    /// Gates the next `fetch_history` call.
    pub fn hold_history(&self) -> Arc<HistoryGate> {
        let gate = Arc::new(HistoryGate::default());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn health_calls(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }

    pub fn chat_calls(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    pub fn last_chat_request(&self) -> Option<ChatRequest> {
        self.chat_requests.lock().unwrap().last().cloned()
    }

    pub fn tokens_seen(&self) -> Vec<Option<String>> {
        self.tokens.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn health(&self) -> Result<()> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        if self.unhealthy.load(Ordering::SeqCst) {
            Err(HelplineError::backend("health check failed"))
        } else {
            Ok(())
        }
    }

    async fn send_chat(&self, request: &ChatRequest, token: Option<&str>) -> Result<ChatReply> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        self.chat_requests.lock().unwrap().push(request.clone());
        self.tokens.lock().unwrap().push(token.map(str::to_string));
        self.chat_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(HelplineError::backend("no scripted reply")))
    }

    async fn fetch_history(
        &self,
        _session_id: &str,
        _customer_email: &str,
        token: Option<&str>,
    ) -> Result<Vec<HistoryEntry>> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.tokens.lock().unwrap().push(token.map(str::to_string));

        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        if self.history_fails.load(Ordering::SeqCst) {
            return Err(HelplineError::backend("history unavailable"));
        }
        Ok(self.history.lock().unwrap().clone())
    }

    async fn login(&self, _request: &LoginRequest) -> Result<String> {
        self.login_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(HelplineError::auth("invalid email or password")))
    }
}
