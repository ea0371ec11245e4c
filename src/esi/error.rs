//! Error types for the ESI fetchers and the CSV export.

use reqwest::StatusCode;
use thiserror::Error;

/// Coarse failure class, independent of which endpoint failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Non-2xx status, transport failure or cancellation.
    Fetch,
    /// Response body was not the expected JSON.
    Decode,
    /// A response header was missing or malformed.
    Parse,
    /// The output sink rejected a write or flush.
    Write,
}

#[derive(Debug, Error)]
pub enum EsiError {
    #[error("{endpoint}: HTTP {status}: {body}")]
    Fetch {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("{endpoint}: request failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint}: request cancelled")]
    Cancelled { endpoint: &'static str },

    #[error("{endpoint}: malformed response body: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{endpoint}: {reason}")]
    Parse {
        endpoint: &'static str,
        reason: String,
    },

    #[error("writing output: {0}")]
    Write(#[from] csv::Error),
}

impl EsiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EsiError::Fetch { .. } | EsiError::Transport { .. } | EsiError::Cancelled { .. } => {
                ErrorKind::Fetch
            }
            EsiError::Decode { .. } => ErrorKind::Decode,
            EsiError::Parse { .. } => ErrorKind::Parse,
            EsiError::Write(_) => ErrorKind::Write,
        }
    }

    /// True when the run was aborted by its cancellation token rather than by
    /// the server or the network.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, EsiError::Cancelled { .. })
    }
}

pub type EsiResult<T> = Result<T, EsiError>;

#[derive(Debug, Error)]
#[error("invalid base url {url:?}: {reason}")]
pub struct InvalidEndpoint {
    pub url: String,
    pub reason: String,
}
