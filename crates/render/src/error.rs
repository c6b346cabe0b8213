//! Render Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;
use std::time::Duration;

/// A render error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for render operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("chrome/chromium not detected on your system")]
    ChromeNotFound,
    /// The configured browser executable does not exist or is not executable.
    #[display("browser executable not found: {}", _0.display())]
    BrowserNotFound(#[error(not(source))] PathBuf),
    /// The browser process could not be started or connected to.
    #[display("failed to launch browser: {_0}")]
    BrowserLaunch(#[error(not(source))] String),
    /// The page could not be opened or driven.
    #[display("browser automation failed: {_0}")]
    Browser(#[error(not(source))] String),
    /// Diagrams never signalled completion within the allotted time.
    #[display("timed out after {}ms waiting for diagrams to render", _0.as_millis())]
    Timeout(#[error(not(source))] Duration),
    /// The page published a completion signal that could not be understood.
    #[display("malformed completion signal: {_0}")]
    Signal(#[error(not(source))] String),
    /// A paper format name was not recognised.
    #[display("unsupported paper format: {_0}")]
    UnsupportedPaper(#[error(not(source))] String),
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
