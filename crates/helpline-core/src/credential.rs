//! Bearer credential storage trait.
//!
//! Defines the interface for reading and replacing the access token used to
//! authenticate requests to the support backend.

use std::sync::RwLock;

/// Store for the bearer token.
///
/// Absence of a token is a normal state (anonymous customer); requests are
/// still attempted without it and the backend decides whether that is
/// acceptable.
///
/// # Contract
///
/// Implementations never fail towards the caller. Storage problems are logged
/// and surface as "no token" on read or as a non-persisted write.
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the current token, if any.
    async fn get_token(&self) -> Option<String>;

    /// Replaces the stored token.
    async fn set_token(&self, token: String);

    /// Forgets the stored token.
    async fn clear_token(&self);
}

/// A credential store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    token: RwLock<Option<String>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

#[async_trait::async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn get_token(&self) -> Option<String> {
        match self.token.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    async fn set_token(&self, token: String) {
        match self.token.write() {
            Ok(mut guard) => *guard = Some(token),
            Err(poisoned) => *poisoned.into_inner() = Some(token),
        }
    }

    async fn clear_token(&self) {
        match self.token.write() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }
}
