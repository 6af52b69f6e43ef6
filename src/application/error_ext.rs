//! Error conversion helpers for file loading
//!
//! Provides extension traits for attaching the path being read or parsed.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    ///
    /// # Example
    /// ```ignore
    /// fs.read_to_string(&rules)
    ///     .with_path_context("read rule set", &rules)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }
}

/// Extension trait for deserializer results (`toml`, `serde_json`).
pub trait ParseResultExt<T> {
    fn with_parse_context(self, what: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T, E> ParseResultExt<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_parse_context(self, what: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("parse {} {}", what, path.display()),
            source: Box::new(e),
        })
    }
}
