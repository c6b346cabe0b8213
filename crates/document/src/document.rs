use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::fs;
use std::path::{Path, PathBuf};

/// A Markdown source document.
///
/// Holds the text together with the directory that relative links and images
/// in the text are resolved against. Never modified after it is read.
#[derive(Debug, Clone)]
pub struct Document {
    source: String,
    title: String,
    base_dir: Option<PathBuf>,
}
impl Document {
    /// Wraps Markdown text that has no location on disk.
    pub fn new(source: impl Into<String>) -> Self {
        Self { source: source.into(), title: String::new(), base_dir: None }
    }

    /// Reads a UTF-8 Markdown file.
    ///
    /// The title defaults to the file stem, and the base directory is the
    /// canonicalized parent directory of the file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).or_raise(|| ErrorKind::Unreadable(path.to_path_buf()))?;
        let base_dir = path
            .canonicalize()
            .or_raise(|| ErrorKind::Unreadable(path.to_path_buf()))?
            .parent()
            .map(Path::to_path_buf);
        let title = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
        tracing::debug!(path = %path.display(), bytes = source.len(), "Read document");
        Ok(Self { source, title, base_dir })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }
}
