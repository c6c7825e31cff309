//! Error types for Cysim
//!
//! The interpreter itself never fails: every non-empty input maps to an
//! [`crate::Outcome`]. These errors cover the collaborators around it
//! (session gate, captcha, run trigger, configuration).

use thiserror::Error;

/// Result type alias using Cysim Error
pub type Result<T> = std::result::Result<T, Error>;

/// Cysim error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Nothing to run: the command input is empty")]
    EmptyInput,

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Captcha verification required")]
    CaptchaRequired,

    #[error("Incorrect answer, please try again.")]
    CaptchaIncorrect,

    #[error("Unknown consent choice: {0}")]
    InvalidConsent(String),

    #[error("Unknown captcha challenge: {0}")]
    UnknownChallenge(String),

    #[error("A command is already running")]
    RunInProgress,

    #[error("Session ended before the result was delivered")]
    SessionEnded,

    #[error("Run was aborted")]
    RunAborted,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for errors caused by the caller rather than the system.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::EmptyInput
                | Error::NotLoggedIn
                | Error::CaptchaRequired
                | Error::CaptchaIncorrect
                | Error::InvalidConsent(_)
                | Error::UnknownChallenge(_)
                | Error::RunInProgress
                | Error::SessionEnded
        )
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(e: tokio::task::JoinError) -> Self {
        if e.is_cancelled() {
            Error::RunAborted
        } else {
            Error::Internal(e.to_string())
        }
    }
}
