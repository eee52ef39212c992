//! Unified path management for helpline configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/helpline/          # Config directory
//! ├── config.toml              # Client configuration (read-only for the client)
//! ├── credential.toml          # Persisted access token
//! └── logs/
//!     └── helpline.log         # Tracing output of the terminal client
//! ```

use std::path::{Path, PathBuf};

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolves every file the client reads or writes.
#[derive(Debug, Clone)]
pub struct HelplinePaths {
    config_dir: PathBuf,
}

impl HelplinePaths {
    /// Creates a resolver rooted at `base_path`, or at `~/.config/helpline`
    /// when `None`.
    ///
    /// # Returns
    ///
    /// - `Ok(HelplinePaths)`: Root directory determined
    /// - `Err(PathError::HomeDirNotFound)`: No base given and no home directory
    pub fn new(base_path: Option<&Path>) -> Result<Self, PathError> {
        let config_dir = match base_path {
            Some(base) => base.to_path_buf(),
            None => dirs::home_dir()
                .ok_or(PathError::HomeDirNotFound)?
                .join(".config")
                .join("helpline"),
        };
        Ok(Self { config_dir })
    }

    /// Returns the path to `config.toml`.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Returns the path to the persisted credential.
    ///
    /// # Security Note
    ///
    /// The file holds a bearer token in plain text; it is written with mode
    /// 600 on Unix.
    pub fn credential_file(&self) -> PathBuf {
        self.config_dir.join("credential.toml")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.config_dir.join("logs")
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir().join("helpline.log")
    }
}
