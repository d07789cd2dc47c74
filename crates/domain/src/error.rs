//! Unified error type for the value layer
//!
//! Value objects validate on construction and report failures through
//! `DomainError`, so the engine never has to fall back to `String` errors.

use thiserror::Error;

/// Unified error type for domain value construction and parsing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., zero-sized level, empty name)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Parse error (for enums parsed from configuration strings)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    /// Creates a validation error for rejected values.
    ///
    /// # Example
    /// ```ignore
    /// if width == 0 {
    ///     return Err(DomainError::validation("level width must be positive"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a parse error for string-to-type conversion failures.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
