//! Infrastructure-level errors around a classification run

use thiserror::Error;

use crate::application::ApplicationError;

/// Failures outside the classification itself: loading and parsing rule sets
/// and record files (via [`ApplicationError`]) or touching the filesystem
/// for settings and working directories.
#[derive(Error, Debug)]
pub enum InfraError {
    /// Rule-set, record or settings failure reported by the application layer
    #[error("{0}")]
    Application(#[from] ApplicationError),

    /// Filesystem access that is not part of loading a rule set or record file
    #[error("I/O error while trying to {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl InfraError {
    /// I/O failure; `context` completes "while trying to ...".
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_io_failure_when_displayed_then_reads_as_action() {
        let err = InfraError::io(
            "read the current directory",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(
            err.to_string(),
            "I/O error while trying to read the current directory"
        );
    }
}
