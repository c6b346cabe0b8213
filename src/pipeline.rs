//! The single conversion flow shared by every entry point.
//!
//! read input → render Markdown → inline assets → write HTML →
//! (PDF only) open in browser → wait for diagrams → print → clean up.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use mdmermaid_config::Settings;
use mdmermaid_document::{Assembler, Document, MermaidRuntime, Page, StyleConfig};
use mdmermaid_render::Printer;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// What to produce.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Format {
    /// A self-contained HTML page.
    #[default]
    Html,
    /// A PDF printed by headless Chrome.
    Pdf,
}
impl Format {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Pdf => "pdf",
        }
    }

    /// The input path with its extension replaced by this format's.
    pub fn derive_path(&self, input: impl AsRef<Path>) -> PathBuf {
        input.as_ref().with_extension(self.extension())
    }
}

/// One conversion, as resolved by an entry point.
#[derive(Clone, Debug)]
pub struct Request {
    pub input: PathBuf,
    /// Defaults to [`Format::derive_path`] of the input.
    pub output: Option<PathBuf>,
    pub format: Format,
    /// Defaults to the input file stem.
    pub title: Option<String>,
}
impl Request {
    pub fn new(input: impl Into<PathBuf>, format: Format) -> Self {
        Self { input: input.into(), output: None, format, title: None }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| self.format.derive_path(&self.input))
    }
}

/// What a successful conversion produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub output: PathBuf,
    /// The HTML file left on disk: the output itself for HTML, or the retained
    /// intermediate page for PDF.
    pub html: Option<PathBuf>,
    pub diagrams: usize,
    /// Non-fatal problems. The output was still produced.
    pub warnings: Vec<String>,
}

/// Converts one document.
///
/// `printer` is only called for PDF output, and before any file is written,
/// so that a missing browser is reported without leaving partial output.
#[instrument(skip_all, fields(input = %request.input.display(), format = ?request.format))]
pub fn convert<F>(request: &Request, settings: &Settings, printer: F) -> Result<Outcome>
where
    F: FnOnce(&Settings) -> mdmermaid_render::error::Result<Printer>,
{
    if !request.input.is_file() {
        exn::bail!(ErrorKind::InputNotFound(request.input.clone()));
    }
    let output = request.output_path();
    refuse_overwrite(&request.input, &output)?;
    let printer = match request.format {
        Format::Html => None,
        Format::Pdf => Some(printer(settings).map_err(ErrorKind::render)?),
    };

    let mut document = Document::read(&request.input).map_err(ErrorKind::document)?;
    if let Some(title) = &request.title {
        document = document.with_title(title.clone());
    }
    let page = assembler(settings, &document)?
        .assemble(&document, &settings.diagram_options())
        .map_err(ErrorKind::document)?;

    let Some(printer) = printer else {
        write_file(&output, &page.html)?;
        tracing::info!(path = %output.display(), diagrams = page.diagrams, "HTML written");
        return Ok(Outcome { html: Some(output.clone()), output, diagrams: page.diagrams, warnings: Vec::new() });
    };
    let (printed, html) = if settings.keep_html {
        let html = Format::Html.derive_path(&request.input);
        refuse_overwrite(&request.input, &html)?;
        write_file(&html, &page.html)?;
        let printed = printer.print(&html, &output, &settings.print_options()).map_err(ErrorKind::render)?;
        (printed, Some(html))
    } else {
        (print_staged(&printer, &page, &output, settings)?, None)
    };
    let warnings = printed.diagram_error.into_iter().map(|e| format!("diagram rendering failed: {e}")).collect();
    Ok(Outcome { output: printed.path, html, diagrams: page.diagrams, warnings })
}

/// Prints `page` through a temporary HTML file that is removed whether or not printing succeeds.
fn print_staged(printer: &Printer, page: &Page, output: &Path, settings: &Settings) -> Result<mdmermaid_render::Printed> {
    let mut staged = tempfile::Builder::new()
        .prefix("mdmermaid-")
        .suffix(".html")
        .tempfile()
        .or_raise(|| ErrorKind::Io(std::env::temp_dir()))?;
    let path = staged.path().to_path_buf();
    staged.write_all(page.html.as_bytes()).or_raise(|| ErrorKind::Io(path.clone()))?;
    staged.flush().or_raise(|| ErrorKind::Io(path.clone()))?;
    let printed = printer.print(&path, output, &settings.print_options());
    if let Err(error) = staged.close() {
        tracing::warn!(path = %path.display(), %error, "Failed to remove temporary HTML file");
    }
    printed.map_err(ErrorKind::render)
}

fn assembler(settings: &Settings, document: &Document) -> Result<Assembler> {
    let runtime =
        MermaidRuntime::locate(settings.mermaid_script.as_deref(), document.base_dir()).map_err(ErrorKind::document)?;
    let mut styles = StyleConfig::new();
    for name in &settings.styles {
        styles = styles.with_builtin(name).map_err(ErrorKind::document)?;
    }
    if let Some(path) = &settings.stylesheet {
        styles = styles.with_optional_file(path);
    }
    tracing::debug!(runtime = ?runtime.origin(), styles = styles.len(), "Assembling page");
    Assembler::new(runtime, styles).map_err(ErrorKind::document)
}

fn refuse_overwrite(input: &Path, output: &Path) -> Result<()> {
    let same = match (input.canonicalize(), output.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => input == output,
    };
    if same {
        exn::bail!(ErrorKind::OutputIsInput(output.to_path_buf()));
    }
    Ok(())
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).or_raise(|| ErrorKind::Io(parent.to_path_buf()))?;
    }
    fs::write(path, content).or_raise(|| ErrorKind::Io(path.to_path_buf()))
}
