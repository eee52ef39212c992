//! File-backed credential store.
//!
//! Keeps the bearer token in `credential.toml` so a restarted client is still
//! logged in. The token is cached after the first read to avoid file I/O on
//! every request.

use crate::storage::AtomicTomlFile;
use helpline_core::credential::CredentialStore;
use helpline_core::error::HelplineError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::RwLock;

/// On-disk document. The key name is part of the persisted format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CredentialFile {
    #[serde(default)]
    access_token: Option<String>,
}

/// Cache states: not yet read, or the value last read/written.
type Cached = Option<Option<String>>;

pub struct FileCredentialStore {
    file: AtomicTomlFile<CredentialFile>,
    cached: RwLock<Cached>,
}

impl FileCredentialStore {
    /// Creates a store backed by `path`, normally `HelplinePaths::credential_file`.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path).private(),
            cached: RwLock::new(None),
        }
    }

    fn read_through(&self) -> Option<String> {
        if let Ok(guard) = self.cached.read() {
            if let Some(cached) = guard.as_ref() {
                return cached.clone();
            }
        }

        let token = match self.file.load() {
            Ok(doc) => doc.and_then(|doc| doc.access_token),
            Err(e) => {
                tracing::warn!(
                    "[CredentialStore] Failed to read {}: {}; continuing without a token",
                    self.file.path().display(),
                    e
                );
                None
            }
        };
        let token = token.filter(|t| !t.trim().is_empty());

        if let Ok(mut guard) = self.cached.write() {
            *guard = Some(token.clone());
        }
        token
    }

    fn write_through(&self, token: Option<String>) {
        let persisted = match self
            .file
            .update(CredentialFile::default(), |doc| doc.access_token = token.clone())
        {
            // An unreadable document is replaced rather than kept forever.
            Err(HelplineError::Serialization { .. }) => self.file.save(&CredentialFile {
                access_token: token.clone(),
            }),
            other => other,
        };

        match persisted {
            Ok(()) => tracing::debug!(
                "[CredentialStore] Token {} in {}",
                if token.is_some() { "stored" } else { "cleared" },
                self.file.path().display()
            ),
            Err(e) => tracing::warn!(
                "[CredentialStore] Failed to persist token to {}: {}",
                self.file.path().display(),
                e
            ),
        }

        // The in-process value follows the caller even if the disk write failed.
        if let Ok(mut guard) = self.cached.write() {
            *guard = Some(token);
        }
    }
}

#[async_trait::async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get_token(&self) -> Option<String> {
        self.read_through()
    }

    async fn set_token(&self, token: String) {
        self.write_through(Some(token));
    }

    async fn clear_token(&self) {
        self.write_through(None);
    }
}
