//! In-process page driver for testing.

use crate::error::{ErrorKind, Result};
use crate::options::PrintOptions;
use crate::page::{Completion, Deadline, Driver, Page};
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Bytes every mock page prints.
pub const MOCK_PDF: &[u8] = b"%PDF-1.7\n% mdmermaid mock\n%%EOF\n";

/// What a [`MockDriver`] page does once opened.
#[derive(Clone, Debug)]
enum Behaviour {
    /// Report `completion` after the signal has been polled `after` times.
    Complete { after: u32, completion: Completion },
    /// Never set the completion signal.
    Hang,
    /// Fail to open at all, as if the browser could not start.
    LaunchFailure(String),
}

/// A [`Driver`] that never starts a browser.
///
/// Every page opened is recorded (path, and whether the file existed at the
/// time) so tests can assert on temporary file handling. Open page counts are
/// tracked so tests can assert every page was released.
///
/// # Examples
///
/// ```ignore
/// use mdmermaid_render::{MockDriver, Printer, PrintOptions};
///
/// let driver = MockDriver::rendered();
/// let printer = Printer::new(driver.clone());
/// # let dir = tempfile::tempdir().unwrap();
/// # let html = dir.path().join("page.html");
/// # std::fs::write(&html, "<html></html>").unwrap();
/// let printed = printer.print(&html, dir.path().join("out.pdf"), &PrintOptions::default()).unwrap();
/// assert!(printed.diagram_error.is_none());
/// assert_eq!(driver.opened().len(), 1);
/// assert_eq!(driver.live_pages(), 0);
/// ```
#[derive(Clone)]
pub struct MockDriver {
    behaviour: Behaviour,
    load_time: Duration,
    opened: Arc<Mutex<Vec<(PathBuf, bool)>>>,
    live: Arc<Mutex<usize>>,
}
impl MockDriver {
    fn with_behaviour(behaviour: Behaviour) -> Self {
        Self { behaviour, load_time: Duration::ZERO, opened: Arc::default(), live: Arc::default() }
    }

    /// Pages render every diagram successfully on the first poll.
    pub fn rendered() -> Self {
        Self::with_behaviour(Behaviour::Complete { after: 0, completion: Completion::Rendered })
    }

    /// Pages report `completion` after `polls` unsuccessful polls.
    pub fn completing_after(polls: u32, completion: Completion) -> Self {
        Self::with_behaviour(Behaviour::Complete { after: polls, completion })
    }

    /// Pages report that the diagram runtime failed with `message`.
    pub fn diagram_failure(message: impl Into<String>) -> Self {
        Self::completing_after(0, Completion::Failed(message.into()))
    }

    /// Pages never report completion.
    pub fn hanging() -> Self {
        Self::with_behaviour(Behaviour::Hang)
    }

    /// Opening any page fails like a browser that will not start.
    pub fn launch_failure(message: impl Into<String>) -> Self {
        Self::with_behaviour(Behaviour::LaunchFailure(message.into()))
    }

    /// Pages take `load_time` to finish loading, counted against the print deadline.
    pub fn loading_for(mut self, load_time: Duration) -> Self {
        self.load_time = load_time;
        self
    }

    /// Every HTML path opened so far, and whether it existed when opened.
    pub fn opened(&self) -> Vec<(PathBuf, bool)> {
        self.opened.lock().map(|o| o.clone()).unwrap_or_default()
    }

    /// Number of pages opened and not yet dropped.
    pub fn live_pages(&self) -> usize {
        self.live.lock().map(|l| *l).unwrap_or_default()
    }
}
impl Driver for MockDriver {
    fn open(&self, html: &Path, _options: &PrintOptions, deadline: Deadline) -> Result<Box<dyn Page>> {
        if let Ok(mut opened) = self.opened.lock() {
            opened.push((html.to_path_buf(), html.is_file()));
        }
        let (remaining, completion) = match &self.behaviour {
            Behaviour::LaunchFailure(message) => exn::bail!(ErrorKind::BrowserLaunch(message.clone())),
            Behaviour::Complete { after, completion } => (Some(*after), completion.clone()),
            Behaviour::Hang => (None, Completion::Rendered),
        };
        if self.load_time >= deadline.remaining() {
            thread::sleep(deadline.remaining());
            return Err(deadline.exceeded());
        }
        thread::sleep(self.load_time);
        if let Ok(mut live) = self.live.lock() {
            *live += 1;
        }
        Ok(Box::new(MockPage { remaining: Cell::new(remaining), completion, live: Arc::clone(&self.live) }))
    }
}

struct MockPage {
    /// Polls left before completing; `None` never completes.
    remaining: Cell<Option<u32>>,
    completion: Completion,
    live: Arc<Mutex<usize>>,
}
impl Page for MockPage {
    fn completion(&self) -> Result<Option<Completion>> {
        match self.remaining.get() {
            None => Ok(None),
            Some(0) => Ok(Some(self.completion.clone())),
            Some(n) => {
                self.remaining.set(Some(n - 1));
                Ok(None)
            },
        }
    }

    fn print_pdf(&self, _options: &PrintOptions) -> Result<Vec<u8>> {
        Ok(MOCK_PDF.to_vec())
    }
}
impl Drop for MockPage {
    fn drop(&mut self) {
        if let Ok(mut live) = self.live.lock() {
            *live = live.saturating_sub(1);
        }
    }
}
