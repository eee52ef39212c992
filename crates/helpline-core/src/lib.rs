pub mod backend;
pub mod config;
pub mod connectivity;
pub mod credential;
pub mod error;
pub mod event;
pub mod identity;
pub mod message;
pub mod transcript;

// Re-export common types
pub use connectivity::ConnectivityState;
pub use error::HelplineError;
pub use event::SyncEvent;
pub use identity::Session;
pub use message::{Message, MessageId, MessageOrigin, MessageRole};
