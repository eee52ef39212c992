//! AuthService - exchanges credentials for a bearer token.

use helpline_core::backend::{ChatBackend, LoginRequest};
use helpline_core::credential::CredentialStore;
use helpline_core::error::{HelplineError, Result};
use std::sync::Arc;

pub struct AuthService {
    backend: Arc<dyn ChatBackend>,
    credentials: Arc<dyn CredentialStore>,
}

impl AuthService {
    pub fn new(backend: Arc<dyn ChatBackend>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            backend,
            credentials,
        }
    }

    /// Logs in and stores the returned token.
    ///
    /// The stored token is left untouched when the backend rejects the
    /// credentials or cannot be reached.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(HelplineError::auth("email and password are required"));
        }

        let token = self
            .backend
            .login(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;

        self.credentials.set_token(token).await;
        tracing::info!("[Auth] Logged in as {}", email);
        Ok(())
    }

    pub async fn logout(&self) {
        self.credentials.clear_token().await;
        tracing::info!("[Auth] Logged out");
    }

    pub async fn is_logged_in(&self) -> bool {
        self.credentials.get_token().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedBackend;
    use helpline_core::credential::InMemoryCredentialStore;

    fn service(backend: Arc<ScriptedBackend>) -> (AuthService, Arc<InMemoryCredentialStore>) {
        let credentials = Arc::new(InMemoryCredentialStore::new());
        (AuthService::new(backend, credentials.clone()), credentials)
    }

    #[tokio::test]
    async fn test_login_stores_token() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_login_result(Ok("jwt-abc".to_string()));
        let (auth, credentials) = service(backend);

        auth.login(" user@example.com ", "secret").await.unwrap();

        assert_eq!(credentials.get_token().await, Some("jwt-abc".to_string()));
        assert!(auth.is_logged_in().await);
    }

    #[tokio::test]
    async fn test_rejected_login_keeps_existing_token() {
        let backend = Arc::new(ScriptedBackend::new());
        let credentials = Arc::new(InMemoryCredentialStore::with_token("old"));
        let auth = AuthService::new(backend, credentials.clone());

        let err = auth.login("user@example.com", "wrong").await.unwrap_err();

        assert!(err.is_auth());
        assert_eq!(credentials.get_token().await, Some("old".to_string()));
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let backend = Arc::new(ScriptedBackend::new());
        let (auth, _) = service(backend);

        assert!(auth.login("", "secret").await.unwrap_err().is_auth());
        assert!(auth.login("user@example.com", "").await.unwrap_err().is_auth());
    }

    #[tokio::test]
    async fn test_logout_clears_token() {
        let backend = Arc::new(ScriptedBackend::new());
        let credentials = Arc::new(InMemoryCredentialStore::with_token("jwt"));
        let auth = AuthService::new(backend, credentials.clone());

        auth.logout().await;

        assert!(!auth.is_logged_in().await);
        assert_eq!(credentials.get_token().await, None);
    }
}
