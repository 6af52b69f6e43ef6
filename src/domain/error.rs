//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent classification logic violations.
/// These are independent of file and CLI concerns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("attribute not found: {0}")]
    AttributeNotFound(String),

    #[error("rule {rule} produced a value that cannot be used as a node label: {value}")]
    UnlabelableValue { rule: String, value: String },

    #[error("invalid rule {rule}: {message}")]
    InvalidRule { rule: String, message: String },

    #[error("node '{label}' could not be attached to the tree")]
    DetachedNode { label: String },
}
