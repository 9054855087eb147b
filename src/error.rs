//! Error types for the soloist scaffold.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Successful process termination.
pub const SUCCESS: i32 = 0;

/// Failed process termination: construction errors, fatal runtime errors,
/// and signal-driven stops all map here.
pub const FAILURE: i32 = 1;

/// Main error type for soloist operations.
///
/// These cover everything that can go wrong while a lifecycle is being
/// constructed or torn down. Errors produced by the application's own
/// `run()` body stay application-side (`anyhow`) and are logged by the
/// lifecycle rather than modeled here.
#[derive(Error, Debug)]
pub enum SoloistError {
    /// The command line could not be parsed.
    #[error("{0}")]
    Argument(String),

    /// An explicitly requested configuration file does not exist.
    #[error("Failed to read configuration from \"{}\"", path.display())]
    ConfigNotFound { path: PathBuf },

    /// A configuration file exists but its content could not be parsed.
    #[error("Failed to parse configuration from \"{}\": {detail}", path.display())]
    ConfigParse { path: PathBuf, detail: String },

    /// The process must run in a console and is not attached to one.
    #[error("{0}")]
    Environment(String),

    /// Another live process holds the lock.
    #[error("Could not lock {}", path.display())]
    LockHeld { path: PathBuf },

    /// Reading or writing the lock file itself failed.
    #[error("Could not access lock file {}: {source}", path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A configured lock or log directory does not exist.
    #[error("\"{}\" is not a directory", path.display())]
    DirectoryNotFound { path: PathBuf },

    /// The log file sink could not be opened.
    #[error("Could not open log file {}: {source}", path.display())]
    Logging {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SoloistError {
    /// Returns the process exit code for this error.
    ///
    /// Every failure class terminates with the generic failure status;
    /// the distinction between them lives in the message.
    pub fn exit_code(&self) -> i32 {
        FAILURE
    }
}

/// Result type alias for soloist operations.
pub type Result<T> = std::result::Result<T, SoloistError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_error_maps_to_failure_exit_code() {
        let errors = [
            SoloistError::Argument("option --config requires a value".to_string()),
            SoloistError::ConfigNotFound {
                path: PathBuf::from("missing.ini"),
            },
            SoloistError::Environment("This application must be run from a console".to_string()),
            SoloistError::LockHeld {
                path: PathBuf::from("/tmp/app.lock"),
            },
            SoloistError::DirectoryNotFound {
                path: PathBuf::from("/nonexistent"),
            },
        ];
        for err in errors {
            assert_eq!(err.exit_code(), FAILURE);
        }
    }

    #[test]
    fn exit_codes_are_distinct() {
        assert_ne!(SUCCESS, FAILURE);
        assert_eq!(SUCCESS, 0);
        assert_eq!(FAILURE, 1);
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = SoloistError::LockHeld {
            path: PathBuf::from("/tmp/my-app.lock"),
        };
        assert_eq!(err.to_string(), "Could not lock /tmp/my-app.lock");

        let err = SoloistError::ConfigNotFound {
            path: PathBuf::from("custom.ini"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to read configuration from \"custom.ini\""
        );

        let err = SoloistError::DirectoryNotFound {
            path: PathBuf::from("/no/such/dir"),
        };
        assert_eq!(err.to_string(), "\"/no/such/dir\" is not a directory");
    }

    #[test]
    fn lock_io_error_preserves_source() {
        let err = SoloistError::Lock {
            path: PathBuf::from("/tmp/app.lock"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/tmp/app.lock"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
