//! Document Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A document error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for document operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The Markdown source could not be read.
    #[display("cannot read document: {}", _0.display())]
    Unreadable(#[error(not(source))] PathBuf),
    /// The Mermaid runtime script could not be located; the page cannot render its own diagrams.
    #[display("mermaid runtime not found (searched: {_0})")]
    RuntimeNotFound(#[error(not(source))] String),
    /// A builtin stylesheet name does not match any embedded asset.
    #[display("unknown builtin stylesheet: {_0}")]
    AssetNotFound(#[error(not(source))] String),
    /// A diagram option value was not recognised.
    #[display("unsupported {_0}: {_1}")]
    UnsupportedOption(#[error(not(source))] &'static str, #[error(not(source))] String),
    /// The page template failed to compile or render.
    #[display("page template error")]
    Template,
    /// Reading or writing a file failed.
    #[display("I/O error on {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(
            ErrorKind::RuntimeNotFound("/a, /b".to_string()).to_string(),
            "mermaid runtime not found (searched: /a, /b)"
        );
        assert_eq!(
            ErrorKind::UnsupportedOption("theme", "sepia".to_string()).to_string(),
            "unsupported theme: sepia"
        );
        assert!(!ErrorKind::Io(PathBuf::from("mermaid.min.js")).is_retryable());
    }
}
