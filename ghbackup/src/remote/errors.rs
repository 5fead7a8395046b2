//! Errors encountered talking to the remote service or cloning from it.

use std::path::PathBuf;
use std::result;
use std::time::Duration;

/// `Result` type for `Error`.
pub type Result<T, E = Error> = result::Result<T, E>;

/// Errors encountered by [`RemoteClient`](super::RemoteClient).
///
/// Only [`Error::AlreadyExists`] is an expected outcome; see
/// [`Error::is_expected()`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The access token can’t be used in an HTTP header.
    #[error("Invalid access token: {0}")]
    InvalidToken(#[from] reqwest::header::InvalidHeaderValue),

    /// The page size is outside of what the API accepts.
    #[error("Page size must be between 1 and 100, got {0}")]
    InvalidPageSize(u8),

    /// The request could not be completed, or the response body could not
    /// be decoded.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// The API answered with something other than `200 OK`.
    #[error("Unexpected response from {url}. Status code: {code}")]
    UnexpectedStatus {
        /// The URL that was requested.
        url: String,
        /// The HTTP status code received.
        code: u16,
    },

    /// The name can’t be used as a directory name under the clone path.
    #[error("Refusing to clone into unsafe name {0:?}")]
    InvalidName(String),

    /// The clone target already contains this repository.
    #[error("{path:?} already exists")]
    AlreadyExists {
        /// The clone target.
        path: PathBuf,
    },

    /// The clone target exists, but it’s not a clone of the repository.
    #[error("{path:?} exists and is not a clone of {url}")]
    TargetOccupied {
        /// The clone target.
        path: PathBuf,
        /// The URL we were asked to clone.
        url: String,
    },

    /// An IO error while preparing the clone target.
    #[error("Could not prepare {path:?}: {source}")]
    Io {
        /// The path being prepared.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// `git2` failed to clone the repository.
    #[error("Could not clone {name}: {source}")]
    CloneFailure {
        /// The name of the repository.
        name: String,
        /// The underlying error.
        source: git2::Error,
    },

    /// The clone took longer than the configured timeout.
    #[error("Cloning {name} timed out after {}s", .timeout.as_secs())]
    CloneTimedOut {
        /// The name of the repository.
        name: String,
        /// The timeout that was exceeded.
        timeout: Duration,
    },

    /// The blocking clone task panicked or was cancelled.
    #[error(transparent)]
    Task(#[from] tokio::task::JoinError),
}

impl Error {
    /// Whether this is an expected outcome rather than a failure.
    ///
    /// Re-running a backup against existing clones produces
    /// [`Error::AlreadyExists`] for each of them; that should not abort the
    /// run.
    #[must_use]
    pub const fn is_expected(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// The HTTP status code, if this error came from an unexpected status.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { code, .. } => Some(*code),
            _ => None,
        }
    }
}
