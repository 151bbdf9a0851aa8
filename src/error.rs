//! Library error type.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by the fallible helpers in this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// A caller-supplied argument is outside the accepted domain.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A required setting is missing from both the environment and the
    /// settings file.
    #[error("Setting not found: {0}")]
    MissingSetting(String),

    /// Posting to a Discord webhook failed.
    #[error("Failed to send Discord notification: {reason}")]
    Notification {
        /// Human-readable description of the failure.
        reason: String,
        /// Underlying transport or HTTP status error, if any.
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Standard output could not be captured or restored.
    #[error("Failed to capture standard output: {0}")]
    StdoutCapture(#[source] std::io::Error),

    /// A log file or its parent directory could not be prepared.
    #[error("Failed to set up log file {}: {source}", .path.display())]
    LogSetup {
        /// Path of the log file being opened.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_display() {
        let err = Error::invalid_argument("batch size must be at least 1");
        assert_eq!(
            err.to_string(),
            "Invalid argument: batch size must be at least 1"
        );
    }

    #[test]
    fn notification_display_without_source() {
        let err = Error::Notification {
            reason: "HTTP 500 Internal Server Error".to_string(),
            source: None,
        };
        assert_eq!(
            err.to_string(),
            "Failed to send Discord notification: HTTP 500 Internal Server Error"
        );
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn stdout_capture_display() {
        let err = Error::StdoutCapture(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            "Redirect already exists.",
        ));
        assert_eq!(
            err.to_string(),
            "Failed to capture standard output: Redirect already exists."
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn log_setup_keeps_io_source() {
        let err = Error::LogSetup {
            path: PathBuf::from("/nowhere/app.log"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/nowhere/app.log"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
