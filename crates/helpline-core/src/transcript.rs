//! Transcript projection.
//!
//! `TranscriptRenderer` is the display surface: an append-only list of
//! entries, one transient "assistant is typing" placeholder, and a
//! connectivity badge. `Transcript` is the in-memory implementation; terminal
//! front ends wrap it. `EventProjector` turns the engine's `SyncEvent`s into
//! renderer calls.

use std::collections::{BTreeSet, HashMap};

use crate::connectivity::ConnectivityState;
use crate::event::{EventReceiver, SyncEvent, TurnId};
use crate::message::Message;

/// Handle to one outstanding typing placeholder request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypingToken(u64);

/// Display surface for the canonical transcript.
///
/// Implementations are pure projections: no validation, no deduplication.
pub trait TranscriptRenderer {
    /// Adds an entry at the end of the transcript.
    fn append(&mut self, message: Message);

    /// Shows the typing placeholder and returns the token that removes it.
    fn show_typing(&mut self) -> TypingToken;

    /// Releases `token`.
    ///
    /// Returns `false` if the token was unknown or already released; that is
    /// not an error.
    fn hide_typing(&mut self, token: TypingToken) -> bool;

    /// Reflects the latest connectivity state.
    fn set_connectivity_badge(&mut self, state: ConnectivityState);
}

/// In-memory transcript.
///
/// The placeholder is a single visual element: it is visible while at least
/// one token is outstanding.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<Message>,
    outstanding: BTreeSet<TypingToken>,
    next_token: u64,
    connectivity: ConnectivityState,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Message] {
        &self.entries
    }

    pub fn is_typing(&self) -> bool {
        !self.outstanding.is_empty()
    }

    pub fn connectivity(&self) -> ConnectivityState {
        self.connectivity
    }
}

impl TranscriptRenderer for Transcript {
    fn append(&mut self, message: Message) {
        self.entries.push(message);
    }

    fn show_typing(&mut self) -> TypingToken {
        let token = TypingToken(self.next_token);
        self.next_token += 1;
        self.outstanding.insert(token);
        token
    }

    fn hide_typing(&mut self, token: TypingToken) -> bool {
        self.outstanding.remove(&token)
    }

    fn set_connectivity_badge(&mut self, state: ConnectivityState) {
        self.connectivity = state;
    }
}

/// Applies `SyncEvent`s to a renderer.
///
/// The engine identifies typing intervals by turn; the renderer hands out its
/// own tokens. The projector keeps the mapping so every token it obtained is
/// released exactly once.
pub struct EventProjector<R> {
    renderer: R,
    typing_by_turn: HashMap<TurnId, TypingToken>,
}

impl<R: TranscriptRenderer> EventProjector<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            typing_by_turn: HashMap::new(),
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn apply(&mut self, event: SyncEvent) {
        match event {
            SyncEvent::MessageAppended { message } => self.renderer.append(message),
            SyncEvent::TypingStarted { turn } => {
                let token = self.renderer.show_typing();
                if let Some(previous) = self.typing_by_turn.insert(turn, token) {
                    // Turn ids are unique; a repeat only replaces a stale placeholder.
                    self.renderer.hide_typing(previous);
                }
            }
            SyncEvent::TypingStopped { turn } => {
                if let Some(token) = self.typing_by_turn.remove(&turn) {
                    self.renderer.hide_typing(token);
                }
            }
            SyncEvent::ConnectivityChanged { state } => {
                self.renderer.set_connectivity_badge(state)
            }
        }
    }

    /// Applies events until every sender is dropped, then hands the renderer back.
    pub async fn run(mut self, mut events: EventReceiver) -> R {
        while let Some(event) = events.recv().await {
            self.apply(event);
        }
        self.renderer
    }
}
