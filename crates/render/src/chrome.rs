use crate::error::{ErrorKind, Result};
use crate::options::PrintOptions;
use crate::page::{Completion, Deadline, Driver, Page, Signal};
use derive_more::Display;
use exn::ResultExt;
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::util::Timeout;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::error::Error as StdError;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

/// Represents a Chrome/Chromium executable.
pub(crate) struct Chrome {
    path: PathBuf,
    sandbox: bool,
}
impl Chrome {
    /// Resolves the browser executable, preferring an explicit override.
    pub(crate) fn discover(executable: Option<&Path>, sandbox: bool) -> Result<Self> {
        if let Some(executable) = executable {
            // `which` accepts both bare names looked up in PATH and paths to files.
            let path = which::which(executable).or_raise(|| ErrorKind::BrowserNotFound(executable.to_path_buf()))?;
            tracing::debug!(path = %path.display(), "Using configured browser executable");
            return Ok(Self { path, sandbox });
        }
        // TODO: Search the standard install locations on Windows and macOS, which are rarely in PATH.
        let executables = ["google-chrome", "google-chrome-stable", "chromium", "chromium-browser", "chrome", "msedge"];
        for exe in executables {
            if let Ok(path) = which::which(exe) {
                tracing::debug!(path = %path.display(), "Discovered browser executable");
                return Ok(Self { path, sandbox });
            }
        }
        tracing::info!("Chrome executable not found in PATH");
        exn::bail!(ErrorKind::ChromeNotFound);
    }

    fn launch_options(&self, options: &PrintOptions) -> Result<LaunchOptions<'static>> {
        LaunchOptions::default_builder()
            .headless(true)
            .sandbox(self.sandbox)
            .path(Some(self.path.clone()))
            .idle_browser_timeout(options.timeout.max(std::time::Duration::from_secs(30)))
            .args(vec![OsStr::new("--disable-gpu"), OsStr::new("--hide-scrollbars")])
            .build()
            .map_err(automation)
            .or_raise(|| ErrorKind::BrowserLaunch(self.path.display().to_string()))
    }
}
impl Driver for Chrome {
    fn open(&self, html: &Path, options: &PrintOptions, deadline: Deadline) -> Result<Box<dyn Page>> {
        let absolute = html.canonicalize().or_raise(|| ErrorKind::Io(html.to_path_buf()))?;
        let url = match Url::from_file_path(&absolute) {
            Ok(url) => url,
            Err(()) => exn::bail!(ErrorKind::Browser(format!("not a file path: {}", absolute.display()))),
        };
        let browser = Browser::new(self.launch_options(options)?)
            .map_err(automation)
            .or_raise(|| ErrorKind::BrowserLaunch(self.path.display().to_string()))?;
        tracing::debug!(executable = %self.path.display(), "Browser launched");
        let tab = browser.new_tab().map_err(automation).or_raise(|| ErrorKind::Browser("open tab".to_string()))?;
        // Navigation only gets what is left of the print deadline.
        tab.set_default_timeout(deadline.remaining());
        match tab.navigate_to(url.as_str()).and_then(|tab| tab.wait_until_navigated()) {
            Ok(_) => {},
            Err(error) if error.is::<Timeout>() => {
                tracing::debug!(%url, "Page did not finish loading in time");
                return Err(deadline.exceeded());
            },
            Err(error) => {
                return Err(automation(error)).or_raise(|| ErrorKind::Browser(format!("navigate to {url}")));
            },
        }
        tracing::debug!(%url, "Page loaded");
        Ok(Box::new(ChromePage { tab, _browser: browser }))
    }
}

/// A loaded tab. Dropping it shuts the browser process down.
struct ChromePage {
    tab: Arc<Tab>,
    // Owned so the process lives exactly as long as the page.
    _browser: Browser,
}
impl Page for ChromePage {
    fn completion(&self) -> Result<Option<Completion>> {
        let result = self
            .tab
            .evaluate(&Signal::expression(), false)
            .map_err(automation)
            .or_raise(|| ErrorKind::Browser("read completion signal".to_string()))?;
        match result.value {
            Some(serde_json::Value::String(json)) => Signal::parse(&json),
            other => exn::bail!(ErrorKind::Signal(format!("{other:?}"))),
        }
    }

    fn print_pdf(&self, options: &PrintOptions) -> Result<Vec<u8>> {
        let (paper_width, paper_height) = options.paper_inches();
        let margin = options.margin_inches();
        let pdf = PrintToPdfOptions {
            // Orientation is already applied to the paper dimensions.
            landscape: Some(false),
            display_header_footer: Some(false),
            print_background: Some(true),
            scale: Some(1.0),
            paper_width: Some(paper_width),
            paper_height: Some(paper_height),
            margin_top: Some(margin),
            margin_bottom: Some(margin),
            margin_left: Some(margin),
            margin_right: Some(margin),
            prefer_css_page_size: Some(false),
            ..Default::default()
        };
        self.tab
            .print_to_pdf(Some(pdf))
            .map_err(automation)
            .or_raise(|| ErrorKind::Browser("print to PDF".to_string()))
    }
}

/// An error from the browser automation library, kept as a cause in the error tree.
#[derive(Debug, Display)]
#[display("{_0}")]
struct Automation(Box<dyn StdError + Send + Sync>);
impl StdError for Automation {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

fn automation(error: impl Into<Box<dyn StdError + Send + Sync>>) -> Automation {
    Automation(error.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_override_is_reported() {
        let missing = Path::new("/definitely/not/a/browser");
        let err = Chrome::discover(Some(missing), true).err().unwrap();
        assert_eq!(*err, ErrorKind::BrowserNotFound(missing.to_path_buf()));
    }

    #[test]
    fn test_automation_error_keeps_its_cause() {
        #[derive(Debug, Display)]
        #[display("connection lost")]
        struct Disconnected(std::io::Error);
        impl StdError for Disconnected {
            fn source(&self) -> Option<&(dyn StdError + 'static)> {
                Some(&self.0)
            }
        }

        let error = automation(Disconnected(std::io::Error::other("broken pipe")));
        assert_eq!(error.to_string(), "connection lost");
        assert_eq!(error.source().unwrap().to_string(), "broken pipe");

        let err: exn::Exn<ErrorKind> = Err::<(), _>(error).or_raise(|| ErrorKind::Browser("print to PDF".into())).unwrap_err();
        assert_eq!(*err, ErrorKind::Browser("print to PDF".into()));
        assert_eq!(err.frame().children().len(), 1);
    }
}
