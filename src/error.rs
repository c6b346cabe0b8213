//! Pipeline Error Types
//!
//! Errors from the document, render and config crates are wrapped here with
//! their own error trees preserved as children.

use derive_more::{Display, Error};
use mdmermaid_config::error::{Error as ConfigError, ErrorKind as ConfigErrorKind};
use mdmermaid_document::error::{Error as DocumentError, ErrorKind as DocumentErrorKind};
use mdmermaid_render::error::{Error as RenderError, ErrorKind as RenderErrorKind};
use std::path::PathBuf;

/// A pipeline error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The input document does not exist.
    #[display("input file not found: {}", _0.display())]
    InputNotFound(#[error(not(source))] PathBuf),
    /// The output would replace the input document.
    #[display("refusing to overwrite input file: {}", _0.display())]
    OutputIsInput(#[error(not(source))] PathBuf),
    #[display("{_0}")]
    Config(ConfigErrorKind),
    #[display("{_0}")]
    Document(DocumentErrorKind),
    #[display("{_0}")]
    Render(RenderErrorKind),
    /// Reading or writing a file failed.
    #[display("I/O error on {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
}
impl ErrorKind {
    #[track_caller]
    pub fn config(err: ConfigError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Config(inner))
    }

    #[track_caller]
    pub fn document(err: DocumentError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Document(inner))
    }

    #[track_caller]
    pub fn render(err: RenderError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Render(inner))
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

/// An error tree flattened into a `source()` chain, outermost first.
///
/// Wrapping frames that only repeat their child's message are collapsed, so
/// the chain reads top-level failure, then each underlying cause (down to the
/// operating system error for I/O failures).
#[derive(Debug, Display)]
#[display("{message}")]
pub struct ErrorChain {
    message: String,
    source: Option<Box<ErrorChain>>,
}
impl ErrorChain {
    pub fn new<E: std::error::Error + Send + Sync + 'static>(err: &exn::Exn<E>) -> Self {
        let mut messages = Vec::new();
        collect_messages(err.frame(), &mut messages);
        messages.dedup();
        let mut chain: Option<ErrorChain> = None;
        for message in messages.into_iter().rev() {
            chain = Some(ErrorChain { message, source: chain.map(Box::new) });
        }
        chain.unwrap_or_else(|| ErrorChain { message: err.to_string(), source: None })
    }

    /// Every message in the chain, outermost first.
    pub fn messages(&self) -> Vec<&str> {
        let mut messages = vec![self.message.as_str()];
        let mut next = self.source.as_deref();
        while let Some(link) = next {
            messages.push(link.message.as_str());
            next = link.source.as_deref();
        }
        messages
    }
}
impl std::error::Error for ErrorChain {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_deref().map(|link| link as &(dyn std::error::Error + 'static))
    }
}

fn collect_messages(frame: &exn::Frame, messages: &mut Vec<String>) {
    messages.push(frame.error().to_string());
    if frame.children().is_empty() {
        // Foreign errors at the leaves may carry their own cause chain.
        let mut source = std::error::Error::source(frame.error());
        while let Some(cause) = source {
            messages.push(cause.to_string());
            source = cause.source();
        }
    }
    for child in frame.children() {
        collect_messages(child, messages);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exn::ResultExt;
    use std::time::Duration;

    #[test]
    fn wrapped_errors_display_their_cause() {
        let err = ErrorKind::render(exn::Exn::from(RenderErrorKind::Timeout(Duration::from_secs(2))));
        assert_eq!((*err).to_string(), "timed out after 2000ms waiting for diagrams to render");
        let err = ErrorKind::document(exn::Exn::from(DocumentErrorKind::RuntimeNotFound("/x".into())));
        assert!(matches!(&*err, ErrorKind::Document(DocumentErrorKind::RuntimeNotFound(_))));
    }

    #[test]
    fn chain_keeps_path_and_os_cause() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing/out.html");
        let err = std::fs::write(&path, "x").or_raise(|| ErrorKind::Io(path.clone())).unwrap_err();
        let chain = ErrorChain::new(&err);
        let messages = chain.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], format!("I/O error on {}", path.display()));
        assert_eq!(messages[1], std::fs::write(&path, "x").unwrap_err().to_string());
        assert!(std::error::Error::source(&chain).is_some());
    }

    #[test]
    fn chain_collapses_repeated_wrappers() {
        let err = ErrorKind::render(exn::Exn::from(RenderErrorKind::Timeout(Duration::from_secs(2))));
        assert_eq!(ErrorChain::new(&err).messages(), vec!["timed out after 2000ms waiting for diagrams to render"]);
    }
}
