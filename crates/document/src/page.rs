//! Page assembly.
//!
//! Renders a [`Document`] into a single self-contained HTML page: body markup,
//! inlined stylesheets, the inlined Mermaid runtime, and a bootstrap script
//! that runs the runtime and publishes the completion signal.

use crate::document::Document;
use crate::error::{ErrorKind, Result};
use crate::markdown::{self, DIAGRAM_CLASS};
use crate::options::DiagramOptions;
use crate::runtime::MermaidRuntime;
use crate::style::StyleConfig;
use exn::ResultExt;
use tracing::instrument;
use upon::{Engine, Template};
use url::Url;

const PAGE_TEMPLATE: &str = include_str!("../../../assets/templates/page.html");
const BOOTSTRAP_SCRIPT: &str = include_str!("../../../assets/templates/bootstrap.js");

/// Name of the global object the bootstrap script publishes once diagrams settle.
///
/// The object has the shape `{ done: boolean, error: string | null }`.
pub const SIGNAL_GLOBAL: &str = "__mdmermaid";

/// An assembled HTML page.
#[derive(Debug, Clone)]
pub struct Page {
    pub html: String,
    /// Number of diagram containers in the page body.
    pub diagrams: usize,
}

/// Assembles [`Document`]s into self-contained [`Page`]s.
///
/// The page template is compiled once at construction and reused for every
/// document.
pub struct Assembler {
    engine: Engine<'static>,
    template: Template<'static>,
    runtime: MermaidRuntime,
    styles: StyleConfig,
}
impl Assembler {
    pub fn new(runtime: MermaidRuntime, styles: StyleConfig) -> Result<Self> {
        let engine = Engine::new();
        let template = engine.compile(PAGE_TEMPLATE).or_raise(|| ErrorKind::Template)?;
        Ok(Self { engine, template, runtime, styles })
    }

    #[instrument(skip_all, fields(title = document.title()))]
    pub fn assemble(&self, document: &Document, options: &DiagramOptions) -> Result<Page> {
        let body = markdown::render(document.source());
        let mut styles = Vec::new();
        let blocks = self.styles.write_all_to(&mut styles).or_raise(|| ErrorKind::Template)?;
        let styles = String::from_utf8(styles).or_raise(|| ErrorKind::Template)?;
        let base = document.base_dir().and_then(|dir| match Url::from_directory_path(dir) {
            Ok(url) => Some(htmlize::escape_attribute(url.as_str()).into_owned()),
            Err(()) => {
                tracing::warn!(dir = %dir.display(), "Base directory is not absolute; relative links will not resolve");
                None
            },
        });
        let html = self
            .template
            .render(
                &self.engine,
                upon::value! {
                    title: htmlize::escape_text(document.title()).into_owned(),
                    base: base,
                    styles: styles,
                    body: body.html,
                    runtime: script_safe(self.runtime.script()),
                    bootstrap: BOOTSTRAP_SCRIPT.trim().to_string(),
                    config: script_safe(&bootstrap_config(options)),
                },
            )
            .to_string()
            .or_raise(|| ErrorKind::Template)?;
        tracing::debug!(diagrams = body.diagrams, styles = blocks, bytes = html.len(), "Page assembled");
        Ok(Page { html, diagrams: body.diagrams })
    }
}

/// JSON configuration handed to the bootstrap script.
fn bootstrap_config(options: &DiagramOptions) -> String {
    serde_json::json!({
        "signal": SIGNAL_GLOBAL,
        "selector": format!("pre.{DIAGRAM_CLASS}"),
        "theme": options.theme.as_str(),
        "securityLevel": options.security_level.as_str(),
    })
    .to_string()
}

/// Keeps inlined script text from terminating its `<script>` element early.
fn script_safe(script: &str) -> String {
    script.replace("</script", "<\\/script").replace("</SCRIPT", "<\\/SCRIPT")
}
