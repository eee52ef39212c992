//! Events flowing from the synchronization engine to the renderer.
//!
//! The renderer never calls back into the engine; this enum is the whole
//! interface between them.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::connectivity::ConnectivityState;
use crate::message::Message;

/// Identifies one send round trip, from request to resolution.
pub type TurnId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEvent {
    /// A new entry belongs at the end of the transcript.
    MessageAppended { message: Message },
    /// A send request for `turn` is in flight.
    TypingStarted { turn: TurnId },
    /// The send request for `turn` resolved (successfully or not).
    TypingStopped { turn: TurnId },
    /// The health probe observed a different state than before.
    ConnectivityChanged { state: ConnectivityState },
}

pub type EventSender = mpsc::UnboundedSender<SyncEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<SyncEvent>;

/// Creates the channel connecting the engine to a renderer.
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
