use thiserror::Error;

/// Failure taxonomy for a run.
///
/// Every fatal variant propagates out of `main` and exits non-zero.
/// `Fetch` is fatal for the list and starter-pack lookups the
/// reconciliation depends on, but per-search-term candidate fetches are
/// logged and skipped. `RemoteWrite` only aborts the current candidate.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to resolve {handle}: {message}")]
    Resolution { handle: String, message: String },

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("failed to fetch {what}: {message}")]
    Fetch { what: String, message: String },

    #[error("failed to decode {what}: {source}")]
    Decode {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to add {handle}: {message}")]
    RemoteWrite { handle: String, message: String },

    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Fetch error tagged with what was being retrieved.
    pub fn fetch(what: impl Into<String>, message: impl ToString) -> Self {
        Error::Fetch {
            what: what.into(),
            message: message.to_string(),
        }
    }

    /// Decode error tagged with what was being parsed.
    pub fn decode(what: impl Into<String>, source: serde_json::Error) -> Self {
        Error::Decode {
            what: what.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
