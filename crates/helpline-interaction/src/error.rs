use helpline_core::error::HelplineError;
use thiserror::Error;

/// Failure talking to the support backend.
///
/// The variants exist for logging; callers above the transport treat them
/// all as "the backend is unavailable right now".
#[derive(Error, Debug)]
pub enum BackendError {
    /// The request never produced a response (DNS, refused, timeout, TLS)
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The body could not be decoded into the expected shape
    #[error("malformed response body: {0}")]
    Decode(String),
}

impl From<BackendError> for HelplineError {
    fn from(err: BackendError) -> Self {
        HelplineError::backend(err.to_string())
    }
}
