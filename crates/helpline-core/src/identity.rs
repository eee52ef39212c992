//! Per-process conversation identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The conversation session shared with the backend.
///
/// Generated once at startup and never changed; every chat request and
/// history poll carries its id so the backend can group the turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    session_id: String,
}

impl Session {
    /// Creates a session with a fresh UUID v4 identifier.
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
        }
    }

    /// Creates a session with a known identifier (tests pin the id this way).
    pub fn with_id(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.session_id
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sessions_are_distinct() {
        let a = Session::new();
        let b = Session::new();
        assert_ne!(a.id(), b.id());
        assert!(!a.id().is_empty());
    }

    #[test]
    fn test_with_id() {
        let session = Session::with_id("fixed");
        assert_eq!(session.id(), "fixed");
        assert_eq!(session.to_string(), "fixed");
    }
}
