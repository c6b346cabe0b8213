//! mdmermaid - Markdown with Mermaid diagrams to HTML or PDF.
//!
//! # Usage
//!
//! ```bash
//! mdmermaid notes.md
//! mdmermaid --format pdf --paper letter --keep-html notes.md
//! mdmermaid --list-styles
//! ```

use clap::{ArgAction, Parser};
use mdmermaid::config::{Overrides, Settings};
use mdmermaid::document::StyleConfig;
use mdmermaid::error::ErrorChain;
use mdmermaid::render::Printer;
use mdmermaid::{Format, Request, convert};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Convert Markdown with Mermaid diagrams into self-contained HTML or PDF
#[derive(Parser, Debug)]
#[command(name = "mdmermaid", version, about, long_about = None)]
struct Cli {
    /// Markdown file to convert
    #[arg(value_name = "INPUT", required_unless_present = "list_styles")]
    input: Option<PathBuf>,

    /// Where to write the result [default: INPUT with the format's extension]
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Html)]
    format: Format,

    /// Document title [default: INPUT file stem]
    #[arg(long)]
    title: Option<String>,

    /// Mermaid theme (default, dark, forest, neutral)
    #[arg(long)]
    theme: Option<String>,

    /// Mermaid security level (strict, loose, antiscript)
    #[arg(long)]
    security_level: Option<String>,

    /// Paper size for PDF output (a3, a4, a5, legal, letter, tabloid)
    #[arg(long)]
    paper: Option<String>,

    /// Page margin in millimetres
    #[arg(long, value_name = "MM")]
    margin: Option<f64>,

    /// Print in landscape orientation
    #[arg(long, overrides_with = "portrait")]
    landscape: bool,

    /// Print in portrait orientation, even if configured otherwise
    #[arg(long, overrides_with = "landscape")]
    portrait: bool,

    /// How long to wait for diagrams to render, in milliseconds
    #[arg(long, value_name = "MS")]
    timeout: Option<u64>,

    /// Keep the intermediate HTML file next to INPUT when producing a PDF
    #[arg(long, overrides_with = "discard_html")]
    keep_html: bool,

    /// Remove the intermediate HTML file, even if configured to keep it
    #[arg(long, overrides_with = "keep_html")]
    discard_html: bool,

    /// Chrome or Chromium executable [default: search PATH]
    #[arg(long, value_name = "PATH")]
    browser: Option<PathBuf>,

    /// Launch the browser without its sandbox
    #[arg(long, overrides_with = "sandbox")]
    no_sandbox: bool,

    /// Launch the browser with its sandbox, even if configured otherwise
    #[arg(long, overrides_with = "no_sandbox")]
    sandbox: bool,

    /// Mermaid runtime to inline [default: search for mermaid.min.js]
    #[arg(long, value_name = "PATH")]
    mermaid_script: Option<PathBuf>,

    /// Builtin stylesheet to apply; repeat to apply several, in order
    #[arg(long = "style", value_name = "NAME")]
    styles: Vec<String>,

    /// Additional stylesheet applied after the builtins
    #[arg(long, value_name = "PATH")]
    stylesheet: Option<PathBuf>,

    /// Configuration file [default: config.{toml,yaml,json} in the user config directory]
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// List builtin stylesheets and exit
    #[arg(long)]
    list_styles: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}
impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            theme: self.theme.clone(),
            security_level: self.security_level.clone(),
            paper: self.paper.clone(),
            margin_mm: self.margin,
            landscape: switch(self.landscape, self.portrait),
            timeout_ms: self.timeout,
            keep_html: switch(self.keep_html, self.discard_html),
            browser: self.browser.clone(),
            sandbox: switch(self.sandbox, self.no_sandbox),
            mermaid_script: self.mermaid_script.clone(),
            styles: (!self.styles.is_empty()).then(|| self.styles.clone()),
            stylesheet: self.stylesheet.clone(),
        }
    }

    fn log_filter(&self) -> EnvFilter {
        let level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    }
}

/// A pair of opposing flags: `Some` only when one of them was given.
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt().with_env_filter(cli.log_filter()).with_writer(std::io::stderr).init();

    if cli.list_styles {
        for name in StyleConfig::list_builtins() {
            println!("{name}");
        }
        return Ok(());
    }
    let Some(input) = cli.input.clone() else {
        miette::bail!("no input file given");
    };

    let settings = Settings::load(cli.config.as_deref(), &cli.overrides())
        .map_err(|err| miette::Report::from_err(ErrorChain::new(&err)))?;
    let request = Request { input, output: cli.output.clone(), format: cli.format, title: cli.title.clone() };
    let outcome = convert(&request, &settings, |settings| Printer::chrome(settings.browser.as_deref(), settings.sandbox))
        .map_err(|err| miette::Report::from_err(ErrorChain::new(&err)))?;

    for warning in &outcome.warnings {
        tracing::warn!("{warning}");
    }
    tracing::info!(output = %outcome.output.display(), diagrams = outcome.diagrams, "Conversion complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_unsupported_format_is_rejected() {
        assert!(Cli::try_parse_from(["mdmermaid", "--format", "docx", "doc.md"]).is_err());
    }

    #[rstest]
    #[case(&["mdmermaid", "doc.md"], Format::Html)]
    #[case(&["mdmermaid", "-f", "pdf", "doc.md"], Format::Pdf)]
    #[case(&["mdmermaid", "--format=html", "doc.md"], Format::Html)]
    fn test_format(#[case] args: &[&str], #[case] expected: Format) {
        assert_eq!(Cli::try_parse_from(args).unwrap().format, expected);
    }

    #[test]
    fn test_input_required_unless_listing_styles() {
        assert!(Cli::try_parse_from(["mdmermaid"]).is_err());
        assert!(Cli::try_parse_from(["mdmermaid", "--list-styles"]).is_ok());
    }

    #[rstest]
    #[case(&["mdmermaid", "doc.md"], None)]
    #[case(&["mdmermaid", "--keep-html", "doc.md"], Some(true))]
    #[case(&["mdmermaid", "--discard-html", "doc.md"], Some(false))]
    #[case(&["mdmermaid", "--keep-html", "--discard-html", "doc.md"], Some(false))]
    #[case(&["mdmermaid", "--discard-html", "--keep-html", "doc.md"], Some(true))]
    fn test_keep_html_can_be_turned_off(#[case] args: &[&str], #[case] expected: Option<bool>) {
        assert_eq!(Cli::try_parse_from(args).unwrap().overrides().keep_html, expected);
    }

    #[test]
    fn test_config_flags_can_be_reverted() {
        let cli = Cli::try_parse_from(["mdmermaid", "--portrait", "--sandbox", "doc.md"]).unwrap();
        let overrides = cli.overrides();
        assert_eq!(overrides.landscape, Some(false));
        assert_eq!(overrides.sandbox, Some(true));
    }

    #[test]
    fn test_only_given_flags_override() {
        let cli = Cli::try_parse_from(["mdmermaid", "--no-sandbox", "--style", "print.css", "--margin", "5", "doc.md"])
            .unwrap();
        let overrides = cli.overrides();
        assert_eq!(overrides.sandbox, Some(false));
        assert_eq!(overrides.styles, Some(vec!["print.css".to_string()]));
        assert_eq!(overrides.margin_mm, Some(5.0));
        assert_eq!(overrides.keep_html, None);
        assert_eq!(overrides.landscape, None);
        assert_eq!(overrides.theme, None);
    }
}
