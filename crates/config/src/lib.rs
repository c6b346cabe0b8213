//! Layered configuration for mdmermaid.
//!
//! [`Settings`] are assembled with [figment], later layers overriding earlier ones:
//!
//! 1. Built-in defaults ([`Settings::default`])
//! 2. A configuration file: either the one given explicitly, or any of
//!    `config.toml`, `config.yaml`, `config.json` in the user configuration
//!    directory (see [`Settings::default_files`])
//! 3. Environment variables prefixed with `MDMERMAID_` (e.g. `MDMERMAID_THEME=dark`)
//! 4. Command-line [`Overrides`]
//!
//! Values are validated after extraction so that a bad margin or timeout is
//! reported before any document is touched.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use mdmermaid_document::{DiagramOptions, SecurityLevel, Theme};
use mdmermaid_render::{PaperFormat, PrintOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::instrument;

/// Prefix for configuration environment variables.
pub const ENV_PREFIX: &str = "MDMERMAID_";

/// Everything that controls a conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,
    pub security_level: SecurityLevel,
    pub paper: PaperFormat,
    /// Margin applied to all four page edges, in millimetres.
    pub margin_mm: f64,
    pub landscape: bool,
    /// Render timeout in milliseconds.
    pub timeout_ms: u64,
    /// Keep the intermediate HTML file when producing a PDF.
    pub keep_html: bool,
    /// Browser executable to use instead of searching `PATH`.
    pub browser: Option<PathBuf>,
    /// Run Chrome with its sandbox enabled. Containers usually need this off.
    pub sandbox: bool,
    /// Mermaid runtime to inline instead of searching for `mermaid.min.js`.
    pub mermaid_script: Option<PathBuf>,
    /// Builtin stylesheets, in the order they are applied.
    pub styles: Vec<String>,
    /// User stylesheet applied after the builtins. Skipped if it cannot be read.
    pub stylesheet: Option<PathBuf>,
}
impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Default,
            security_level: SecurityLevel::Strict,
            paper: PaperFormat::A4,
            margin_mm: 10.0,
            landscape: false,
            timeout_ms: 30_000,
            keep_html: false,
            browser: None,
            sandbox: true,
            mermaid_script: None,
            styles: vec!["github.css".to_string(), "print.css".to_string()],
            stylesheet: None,
        }
    }
}

/// Values given on the command line. Only fields that are set override other layers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_mm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landscape: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_html: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mermaid_script: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub styles: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stylesheet: Option<PathBuf>,
}

impl Settings {
    /// Loads settings from every layer. An `explicit` file must exist.
    #[instrument(skip_all)]
    pub fn load(explicit: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        match explicit {
            Some(path) => {
                if !path.is_file() {
                    exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
                }
                figment = merge_file(figment, path);
            },
            None => {
                for path in Self::default_files() {
                    if path.is_file() {
                        tracing::debug!(path = %path.display(), "Loading configuration file");
                        figment = merge_file(figment, &path);
                    }
                }
            },
        }
        let figment = figment.merge(Env::prefixed(ENV_PREFIX)).merge(Serialized::defaults(overrides));
        let settings: Settings = match figment.extract() {
            Ok(settings) => settings,
            Err(error) => exn::bail!(ErrorKind::Invalid(error.to_string())),
        };
        settings.validate()?;
        tracing::debug!(?settings, "Configuration loaded");
        Ok(settings)
    }

    /// Configuration files looked for when none is given explicitly.
    pub fn default_files() -> Vec<PathBuf> {
        ProjectDirs::from("", "", "mdmermaid")
            .map(|dirs| ["config.toml", "config.yaml", "config.json"].map(|name| dirs.config_dir().join(name)).to_vec())
            .unwrap_or_default()
    }

    pub fn validate(&self) -> Result<()> {
        if !self.margin_mm.is_finite() || self.margin_mm < 0.0 {
            exn::bail!(ErrorKind::Invalid(format!("margin must be a non-negative number of millimetres, got {}", self.margin_mm)));
        }
        if self.timeout_ms == 0 {
            exn::bail!(ErrorKind::Invalid("timeout must be greater than zero".to_string()));
        }
        Ok(())
    }

    pub fn diagram_options(&self) -> DiagramOptions {
        DiagramOptions { theme: self.theme, security_level: self.security_level }
    }

    pub fn print_options(&self) -> PrintOptions {
        PrintOptions {
            paper: self.paper,
            margin_mm: self.margin_mm,
            landscape: self.landscape,
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

fn merge_file(figment: Figment, path: &Path) -> Figment {
    match path.extension().and_then(|ext| ext.to_str()).map(str::to_lowercase).as_deref() {
        Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
        Some("json") => figment.merge(Json::file(path)),
        _ => figment.merge(Toml::file(path)),
    }
}
