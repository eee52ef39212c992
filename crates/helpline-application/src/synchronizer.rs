//! MessageSynchronizer - reconciles sends and history polls into one transcript.
//!
//! Messages reach the transcript through two independent channels: the local
//! echo emitted when the user sends, and the history poll that discovers
//! server-stored assistant/human turns. The synchronizer owns the
//! deduplication ledger (`seen_ids`) and the single poll guard, and emits
//! `SyncEvent`s for the renderer.
//!
//! # Guarantees
//!
//! - A server id is rendered at most once for the life of the session.
//! - At most one poll runs at a time; a poll attempted while another is in
//!   flight performs no request and touches no state.
//! - Within one poll, entries are emitted in backend order.

use helpline_core::backend::{ChatBackend, ChatRequest, HistoryEntry};
use helpline_core::credential::CredentialStore;
use helpline_core::event::{EventSender, SyncEvent, TurnId};
use helpline_core::identity::Session;
use helpline_core::message::{Message, MessageId, MessageRole};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Text of the synthetic assistant entry shown when a send fails.
pub const FAILURE_MESSAGE: &str =
    "Sorry, I couldn't reach the support service. Please try again in a moment.";

/// Result of [`MessageSynchronizer::send`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Empty text or recipient; nothing was emitted or sent.
    Skipped,
    /// The backend answered; a poll was triggered to pick up the stored turn.
    Delivered,
    /// The backend answered without a usable `response`.
    EmptyResponse,
    /// Transport, status, or decode failure.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollSkip {
    EmptyRecipient,
    InFlight,
}

/// Result of [`MessageSynchronizer::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Skipped(PollSkip),
    Completed { rendered: usize },
    /// The history request failed; the next tick retries.
    Failed,
}

/// Holds the poll guard; releasing it on drop covers every exit path.
struct PollGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> PollGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for PollGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct MessageSynchronizer {
    backend: Arc<dyn ChatBackend>,
    credentials: Arc<dyn CredentialStore>,
    session: Session,
    events: EventSender,
    seen_ids: Mutex<HashSet<MessageId>>,
    poll_in_flight: AtomicBool,
    next_arrival: AtomicU64,
    next_turn: AtomicU64,
}

impl MessageSynchronizer {
    /// Creates the synchronizer for one session.
    ///
    /// # Arguments
    ///
    /// * `backend` - Transport to the support backend
    /// * `credentials` - Read on every request for the bearer token
    /// * `session` - Conversation identity sent with every request
    /// * `events` - Channel to the renderer
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        credentials: Arc<dyn CredentialStore>,
        session: Session,
        events: EventSender,
    ) -> Self {
        Self {
            backend,
            credentials,
            session,
            events,
            seen_ids: Mutex::new(HashSet::new()),
            poll_in_flight: AtomicBool::new(false),
            next_arrival: AtomicU64::new(0),
            next_turn: AtomicU64::new(0),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_polling(&self) -> bool {
        self.poll_in_flight.load(Ordering::Acquire)
    }

    /// Number of server ids absorbed so far.
    pub fn seen_count(&self) -> usize {
        self.seen().len()
    }

    pub fn has_seen(&self, id: &MessageId) -> bool {
        self.seen().contains(id)
    }

    /// Sends one customer message.
    ///
    /// The local echo and the typing placeholder are emitted before the
    /// request goes out. On a non-empty answer the assistant turn is not
    /// rendered from the reply; a triggered poll picks up the stored entry so
    /// its id is recorded and later polls skip it.
    pub async fn send(&self, text: &str, recipient: &str) -> SendOutcome {
        let text = text.trim();
        let recipient = recipient.trim();
        if text.is_empty() || recipient.is_empty() {
            tracing::debug!(
                "[MessageSync] send() skipped: empty_text={}, empty_recipient={}",
                text.is_empty(),
                recipient.is_empty()
            );
            return SendOutcome::Skipped;
        }

        self.emit(SyncEvent::MessageAppended {
            message: Message::local_echo(text, self.arrival()),
        });

        let turn = self.turn();
        self.emit(SyncEvent::TypingStarted { turn });

        let token = self.credentials.get_token().await;
        let request = ChatRequest {
            message: text.to_string(),
            customer_email: recipient.to_string(),
            session_id: self.session.id().to_string(),
        };
        let result = self.backend.send_chat(&request, token.as_deref()).await;

        self.emit(SyncEvent::TypingStopped { turn });

        match result {
            Err(e) => {
                tracing::warn!("[MessageSync] Turn {} failed: {}", turn, e);
                self.emit_failure();
                SendOutcome::Failed
            }
            Ok(reply) if reply.answer().is_none() => {
                tracing::warn!("[MessageSync] Turn {} returned an empty response", turn);
                self.emit_failure();
                SendOutcome::EmptyResponse
            }
            Ok(_) => {
                let outcome = self.poll(recipient).await;
                tracing::debug!("[MessageSync] Turn {} triggered poll: {:?}", turn, outcome);
                SendOutcome::Delivered
            }
        }
    }

    /// Fetches the history and renders every unseen assistant/human entry.
    ///
    /// Failures are logged and swallowed; the server stays the source of
    /// truth and the next poll picks up whatever this one missed.
    pub async fn poll(&self, recipient: &str) -> PollOutcome {
        let recipient = recipient.trim();
        if recipient.is_empty() {
            return PollOutcome::Skipped(PollSkip::EmptyRecipient);
        }

        let Some(_guard) = PollGuard::try_acquire(&self.poll_in_flight) else {
            tracing::trace!("[MessageSync] poll() skipped: another poll is in flight");
            return PollOutcome::Skipped(PollSkip::InFlight);
        };

        let token = self.credentials.get_token().await;
        let entries = match self
            .backend
            .fetch_history(self.session.id(), recipient, token.as_deref())
            .await
        {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("[MessageSync] History poll failed: {}", e);
                return PollOutcome::Failed;
            }
        };

        let rendered = self.absorb(entries);
        if rendered > 0 {
            tracing::debug!("[MessageSync] Poll rendered {} new entries", rendered);
        }
        PollOutcome::Completed { rendered }
    }

    fn absorb(&self, entries: Vec<HistoryEntry>) -> usize {
        let mut seen = self.seen();
        let mut rendered = 0;

        for entry in entries {
            if seen.contains(&entry.id) {
                continue;
            }
            // User turns are already on screen as local echoes; system and
            // tool rows are never shown.
            let Some(role) = MessageRole::from_wire(&entry.role).filter(|r| r.is_remote_author())
            else {
                continue;
            };

            seen.insert(entry.id.clone());

            match entry.content.filter(|c| !c.trim().is_empty()) {
                Some(content) => {
                    let message = Message::from_server(entry.id, role, content, self.arrival());
                    self.emit(SyncEvent::MessageAppended { message });
                    rendered += 1;
                }
                None => tracing::debug!(
                    "[MessageSync] Entry {} has no content, marked seen without rendering",
                    entry.id
                ),
            }
        }

        rendered
    }

    fn emit_failure(&self) {
        self.emit(SyncEvent::MessageAppended {
            message: Message::synthetic(FAILURE_MESSAGE, self.arrival()),
        });
    }

    fn emit(&self, event: SyncEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("[MessageSync] Renderer is gone, event dropped");
        }
    }

    fn seen(&self) -> MutexGuard<'_, HashSet<MessageId>> {
        self.seen_ids
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn arrival(&self) -> u64 {
        self.next_arrival.fetch_add(1, Ordering::Relaxed)
    }

    fn turn(&self) -> TurnId {
        self.next_turn.fetch_add(1, Ordering::Relaxed)
    }
}
