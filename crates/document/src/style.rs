//! CSS style management for assembled pages.
//!
//! Styles are assembled through [`StyleConfig`]'s builder API, combining
//! compile-time embedded builtins (see [`StyleConfig::list_builtins`]) with
//! user-provided files or raw CSS content. Builtins are validated eagerly, but
//! user files are cosmetic: one that cannot be read is skipped, never fatal.

mod assets;

use crate::error::{ErrorKind, Result};
use crate::style::assets::Builtins;
use std::borrow::Cow;
use std::fs;
use std::io::Write;
use std::path::Path;

enum Style {
    Builtin(String),
    UserContent(String),
}
impl Style {
    fn write_all_to(&self, w: &mut impl Write) -> std::io::Result<()> {
        let content = match self {
            Self::Builtin(name) => match Builtins::load(name) {
                Ok(content) => content,
                // Builtins are validated in `with_builtin()`; nothing to inline otherwise.
                Err(_) => return Ok(()),
            },
            Self::UserContent(content) => Cow::Borrowed(content.as_bytes()),
        };
        w.write_all(b"<style>\n")?;
        w.write_all(&content)?;
        w.write_all(b"\n</style>\n")
    }
}

/// An ordered collection of CSS stylesheets to inline into assembled pages.
///
/// Styles are applied in insertion order: later styles override earlier ones.
///
/// # Example
///
/// ```no_run
/// use mdmermaid_document::StyleConfig;
/// # use mdmermaid_document::error::Result;
///
/// # fn get_styles() -> Result<StyleConfig> {
/// let styles = StyleConfig::new()
///     .with_builtin("github.css")?
///     .with_builtin("print.css")?
///     .with_optional_file("/path/to/custom.css");
/// # Ok(styles)
/// # }
/// ```
#[derive(Default)]
pub struct StyleConfig {
    styles: Vec<Style>,
}
impl StyleConfig {
    /// Creates an empty style configuration with no stylesheets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the names of all embedded builtin stylesheets (e.g. `"github.css"`).
    pub fn list_builtins() -> Vec<Cow<'static, str>> {
        Builtins::list()
    }

    /// Appends a builtin stylesheet by name.
    ///
    /// Returns [`ErrorKind::AssetNotFound`] if `name` does not match any
    /// embedded asset. Use [`list_builtins()`](Self::list_builtins) to discover
    /// available names.
    pub fn with_builtin(mut self, name: impl AsRef<str>) -> Result<Self> {
        let name = name.as_ref().trim().trim_start_matches("builtin:");
        if !Builtins::exists(name) {
            exn::bail!(ErrorKind::AssetNotFound(Builtins::identifier(name)));
        }
        self.styles.push(Style::Builtin(name.to_string()));
        Ok(self)
    }

    /// Appends a stylesheet read from a file on disk, if it can be read.
    ///
    /// Styling is cosmetic, so a missing or unreadable file only drops the
    /// stylesheet from the page.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => self.styles.push(Style::UserContent(content)),
            Err(error) => tracing::debug!(path = %path.display(), %error, "Stylesheet skipped"),
        }
        self
    }

    /// Appends raw CSS content as a stylesheet.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.styles.push(Style::UserContent(content.into()));
        self
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub(crate) fn write_all_to(&self, w: &mut impl Write) -> std::io::Result<usize> {
        for style in &self.styles {
            style.write_all_to(w)?;
        }
        Ok(self.styles.len())
    }
}
