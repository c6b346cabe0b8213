//! Convert Markdown documents containing Mermaid diagrams into self-contained
//! HTML pages or PDFs.
//!
//! The heavy lifting lives in the workspace crates:
//!
//! - [`mdmermaid_document`] renders Markdown and assembles the HTML page.
//! - [`mdmermaid_render`] prints that page to PDF once its diagrams have settled.
//! - [`mdmermaid_config`] loads [`Settings`](mdmermaid_config::Settings).
//!
//! [`convert`] ties them together and is what every entry point calls.

pub mod error;
mod pipeline;

pub use mdmermaid_config as config;
pub use mdmermaid_document as document;
pub use mdmermaid_render as render;
pub use pipeline::{Format, Outcome, Request, convert};
