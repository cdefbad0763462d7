//! Error types for qpr-contrib

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while preparing or running a contribution
#[derive(Debug, Error)]
pub enum Error {
    /// Form-level validation failed before any network activity
    #[error("{0}")]
    Validation(String),

    /// A single file was refused by the selection policy
    #[error("{name}: {reason}")]
    Rejected {
        /// File name as selected
        name: String,
        /// Human-readable reason
        reason: String,
    },

    /// The remote side refused a request; message is passed through as-is
    #[error("{0}")]
    Remote(String),

    /// A batch round trip failed, aborting the session
    #[error("{message}")]
    BatchFailed {
        /// Zero-based index of the failing batch
        batch: usize,
        /// Number of batches in the session
        total: usize,
        /// Remote message, unwrapped
        message: String,
    },

    /// GitHub API error
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to parse user input (repository spec, group spec, ...)
    #[error("Parse error: {0}")]
    Parse(String),

    /// A remote call did not complete within the configured bound
    #[error("{0} timed out")]
    Timeout(String),

    /// Local I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invariant violation inside the crate
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Message suitable for showing to the contributor unchanged
    pub fn user_message(&self) -> String {
        match self {
            Self::Remote(msg) | Self::Validation(msg) => msg.clone(),
            Self::BatchFailed { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        match err {
            // GitHub's own message is what the contributor needs to see
            octocrab::Error::GitHub { source, .. } => Self::Remote(source.message),
            other => Self::GitHubApi(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_failed_displays_message_verbatim() {
        let err = Error::BatchFailed {
            batch: 2,
            total: 3,
            message: "Reference does not exist".to_string(),
        };
        assert_eq!(err.to_string(), "Reference does not exist");
    }

    #[test]
    fn test_rejected_names_file() {
        let err = Error::Rejected {
            name: "notes.exe".to_string(),
            reason: "Unsupported file type".to_string(),
        };
        assert_eq!(err.to_string(), "notes.exe: Unsupported file type");
    }

    #[test]
    fn test_user_message_unwraps_remote() {
        let err = Error::Remote("Bad credentials".to_string());
        assert_eq!(err.user_message(), "Bad credentials");
        assert_eq!(Error::Timeout("create PR".into()).user_message(), "create PR timed out");
    }
}
