//! Assembles Markdown documents containing Mermaid diagrams into a single
//! self-contained HTML page.
//!
//! - **Markdown** is rendered with [`pulldown_cmark`]; fenced blocks tagged
//!   `mermaid` become `<pre class="mermaid">` containers instead of code.
//! - **Styles** are inlined from embedded builtins or user files ([`StyleConfig`]).
//! - **Runtime**: the Mermaid browser bundle is located on disk
//!   ([`MermaidRuntime`]) and inlined, along with a bootstrap script that
//!   publishes a completion signal ([`SIGNAL_GLOBAL`]) once every diagram has
//!   rendered or failed.
//!
//! ```no_run
//! use mdmermaid_document::{Assembler, DiagramOptions, Document, MermaidRuntime, StyleConfig};
//! # fn main() -> mdmermaid_document::error::Result<()> {
//! let document = Document::read("README.md")?;
//! let runtime = MermaidRuntime::locate(None, document.base_dir())?;
//! let assembler = Assembler::new(runtime, StyleConfig::new().with_builtin("github.css")?)?;
//! let page = assembler.assemble(&document, &DiagramOptions::default())?;
//! std::fs::write("README.html", page.html).unwrap();
//! # Ok(())
//! # }
//! ```

mod document;
pub mod error;
pub mod markdown;
mod options;
mod page;
mod runtime;
mod style;

pub use crate::document::Document;
pub use crate::options::{DiagramOptions, SecurityLevel, Theme};
pub use crate::page::{Assembler, Page, SIGNAL_GLOBAL};
pub use crate::runtime::MermaidRuntime;
pub use crate::style::StyleConfig;
