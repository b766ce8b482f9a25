use thiserror::Error;

/// Failure of the startup load. Any of these aborts the whole load; no
/// partial question set is ever returned.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("manifest {location} could not be loaded: {reason}")]
    Manifest { location: String, reason: String },

    #[error("source `{id}` ({path}) could not be fetched: {source}")]
    SourceFetch {
        id: String,
        path: String,
        #[source]
        source: FetchError,
    },

    #[error("source `{id}` is invalid{}: {reason}", position_suffix(.position))]
    Validation {
        id: String,
        /// 1-based index of the offending element, `None` when the source as
        /// a whole has the wrong shape.
        position: Option<usize>,
        reason: String,
    },
}

fn position_suffix(position: &Option<usize>) -> String {
    match position {
        Some(p) => format!(" at question {p}"),
        None => String::new(),
    }
}

impl LoadError {
    pub(crate) fn validation(id: &str, position: Option<usize>, reason: impl Into<String>) -> Self {
        LoadError::Validation {
            id: id.to_string(),
            position,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP status {0}")]
    Status(u16),

    #[error("{location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("unsupported location: {0}")]
    Location(String),
}

/// Persisted ledger content could not be decoded. Always recovered by
/// treating the ledger as empty.
#[derive(Debug, Error)]
#[error("stored ledger is unreadable: {0}")]
pub struct StorageDecodeError(#[from] pub serde_json::Error);
