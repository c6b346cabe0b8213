use crate::chrome::Chrome;
use crate::error::{ErrorKind, Result};
use crate::options::PrintOptions;
use crate::page::{Completion, Deadline, Driver, await_completion};
use exn::ResultExt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::instrument;

/// A successfully written PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Printed {
    pub path: PathBuf,
    /// Set when the diagram runtime reported an error. The PDF was still
    /// written, but some diagrams may be missing or broken.
    pub diagram_error: Option<String>,
}

/// Prints assembled HTML pages to PDF.
pub struct Printer {
    driver: Box<dyn Driver>,
}
impl Printer {
    pub fn new(driver: impl Driver + 'static) -> Self {
        Self { driver: Box::new(driver) }
    }

    /// A printer backed by headless Chrome/Chromium.
    ///
    /// The executable is resolved now (so a missing browser is reported before
    /// any work is done) but only launched when a page is printed.
    pub fn chrome(executable: Option<&Path>, sandbox: bool) -> Result<Self> {
        Ok(Self::new(Chrome::discover(executable, sandbox)?))
    }

    /// Loads `html`, waits for its diagrams to settle, and writes a PDF to `save_to`.
    ///
    /// Loading and waiting share one [`PrintOptions::timeout`]. The PDF is
    /// staged next to `save_to` and only moved into place once complete, so a
    /// failed print never leaves a partial file behind. The page (and any
    /// browser process behind it) is released before returning, on every path.
    #[instrument(skip_all, fields(html = %html.as_ref().display()))]
    pub fn print(&self, html: impl AsRef<Path>, save_to: impl Into<PathBuf>, options: &PrintOptions) -> Result<Printed> {
        let save_to = save_to.into();
        let (pdf, completion) = {
            let deadline = Deadline::after(options.timeout);
            let page = self.driver.open(html.as_ref(), options, deadline)?;
            let completion = await_completion(page.as_ref(), deadline)?;
            (page.print_pdf(options)?, completion)
        };
        let diagram_error = match completion {
            Completion::Rendered => None,
            Completion::Failed(error) => {
                tracing::warn!(%error, "Diagram rendering failed; printing anyway");
                Some(error)
            },
        };
        persist(&pdf, &save_to)?;
        tracing::info!(path = %save_to.display(), bytes = pdf.len(), "PDF written");
        Ok(Printed { path: save_to, diagram_error })
    }
}

fn persist(pdf: &[u8], save_to: &Path) -> Result<()> {
    let dir = match save_to.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).or_raise(|| ErrorKind::Io(dir.to_path_buf()))?;
    let mut staged = NamedTempFile::new_in(dir).or_raise(|| ErrorKind::Io(dir.to_path_buf()))?;
    staged.write_all(pdf).or_raise(|| ErrorKind::Io(staged.path().to_path_buf()))?;
    staged.as_file().sync_all().or_raise(|| ErrorKind::Io(staged.path().to_path_buf()))?;
    staged.persist(save_to).or_raise(|| ErrorKind::Io(save_to.to_path_buf()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MOCK_PDF, MockDriver};
    use std::time::Duration;

    fn html_file(dir: &Path) -> PathBuf {
        let path = dir.join("page.html");
        std::fs::write(&path, "<!DOCTYPE html><html></html>").unwrap();
        path
    }

    #[test]
    fn test_prints_rendered_page() {
        let dir = tempfile::tempdir().unwrap();
        let driver = MockDriver::completing_after(2, Completion::Rendered);
        let save_to = dir.path().join("out/doc.pdf");
        let printed = Printer::new(driver.clone()).print(html_file(dir.path()), &save_to, &PrintOptions::default()).unwrap();
        assert_eq!(printed, Printed { path: save_to.clone(), diagram_error: None });
        assert_eq!(std::fs::read(&save_to).unwrap(), MOCK_PDF);
        assert_eq!(driver.live_pages(), 0);
    }

    #[test]
    fn test_diagram_failure_still_prints() {
        let dir = tempfile::tempdir().unwrap();
        let driver = MockDriver::diagram_failure("Parse error on line 2");
        let save_to = dir.path().join("doc.pdf");
        let printed = Printer::new(driver.clone()).print(html_file(dir.path()), &save_to, &PrintOptions::default()).unwrap();
        assert_eq!(printed.diagram_error.as_deref(), Some("Parse error on line 2"));
        assert!(save_to.is_file());
        assert_eq!(driver.live_pages(), 0);
    }

    #[test]
    fn test_timeout_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let driver = MockDriver::hanging();
        let save_to = dir.path().join("doc.pdf");
        let options = PrintOptions { timeout: Duration::from_millis(100), ..Default::default() };
        let err = Printer::new(driver.clone()).print(html_file(dir.path()), &save_to, &options).unwrap_err();
        assert_eq!(*err, ErrorKind::Timeout(Duration::from_millis(100)));
        assert!(!save_to.exists());
        assert_eq!(driver.live_pages(), 0);
        // Only the source page remains; nothing was staged.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_timeout_keeps_existing_destination_intact() {
        let dir = tempfile::tempdir().unwrap();
        let save_to = dir.path().join("doc.pdf");
        std::fs::write(&save_to, b"previous").unwrap();
        let options = PrintOptions { timeout: Duration::ZERO, ..Default::default() };
        assert!(Printer::new(MockDriver::hanging()).print(html_file(dir.path()), &save_to, &options).is_err());
        assert_eq!(std::fs::read(&save_to).unwrap(), b"previous");
    }

    #[test]
    fn test_load_and_wait_share_one_timeout() {
        let dir = tempfile::tempdir().unwrap();
        // Either phase fits the timeout on its own; together they do not.
        let driver = MockDriver::completing_after(4, Completion::Rendered).loading_for(Duration::from_millis(150));
        let save_to = dir.path().join("doc.pdf");
        let options = PrintOptions { timeout: Duration::from_millis(250), ..Default::default() };
        let err = Printer::new(driver.clone()).print(html_file(dir.path()), &save_to, &options).unwrap_err();
        assert_eq!(*err, ErrorKind::Timeout(Duration::from_millis(250)));
        assert!(!save_to.exists());
        assert_eq!(driver.live_pages(), 0);
    }

    #[test]
    fn test_slow_load_is_a_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let driver = MockDriver::rendered().loading_for(Duration::from_secs(5));
        let options = PrintOptions { timeout: Duration::from_millis(100), ..Default::default() };
        let err = Printer::new(driver.clone()).print(html_file(dir.path()), dir.path().join("doc.pdf"), &options);
        assert_eq!(*err.unwrap_err(), ErrorKind::Timeout(Duration::from_millis(100)));
        assert_eq!(driver.opened().len(), 1);
        assert_eq!(driver.live_pages(), 0);
    }

    #[test]
    fn test_slow_load_within_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let driver = MockDriver::rendered().loading_for(Duration::from_millis(100));
        let options = PrintOptions { timeout: Duration::from_secs(5), ..Default::default() };
        let printed = Printer::new(driver).print(html_file(dir.path()), dir.path().join("doc.pdf"), &options).unwrap();
        assert!(printed.path.is_file());
    }

    #[test]
    fn test_launch_failure() {
        let dir = tempfile::tempdir().unwrap();
        let driver = MockDriver::launch_failure("no display");
        let err = Printer::new(driver).print(html_file(dir.path()), dir.path().join("doc.pdf"), &PrintOptions::default());
        assert_eq!(*err.unwrap_err(), ErrorKind::BrowserLaunch("no display".to_string()));
    }
}
