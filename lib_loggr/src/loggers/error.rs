use std::path::PathBuf;
use thiserror::Error;

/// # Loggr Error
///
/// Everything that can go wrong inside the logger. None of these are fatal:
/// usage errors make a call return `false`, filesystem errors leave the
/// previous sinks in place.
#[derive(Debug, Error)]
pub enum LoggrError {
    /// The format token was neither omitted nor one of `json` / `pretty`.
    #[error("Invalid format \"{0}\". Use \"json\" or \"pretty\".")]
    InvalidFormat(String),

    /// The call carried no payload.
    #[error("Nothing to log.")]
    MissingPayload,

    /// A custom severity name that cannot be used as a file name.
    #[error("Invalid log name \"{0}\". Use letters, digits, '-' or '_'.")]
    InvalidSinkName(String),

    /// A directory or sink file could not be created, opened or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path being operated on.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// The payload could not be encoded as JSON.
    #[error("Failed to render payload: {0}")]
    Render(#[from] serde_json::Error),
}

impl LoggrError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LoggrError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for caller mistakes (as opposed to environment failures).
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            LoggrError::InvalidFormat(_) | LoggrError::MissingPayload | LoggrError::InvalidSinkName(_)
        )
    }
}
