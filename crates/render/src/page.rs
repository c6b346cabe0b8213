//! The seam between the printer and whatever actually loads pages.
//!
//! A [`Driver`] opens an assembled HTML file as a [`Page`]. The page reports
//! the completion signal published by the bootstrap script and prints itself.
//! Chrome is the production driver; tests substitute the `mock` driver.

use crate::error::{Error, ErrorKind, Result};
use crate::options::PrintOptions;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

/// Name of the global object the page publishes once diagrams settle.
pub const SIGNAL_GLOBAL: &str = "__mdmermaid";

/// How often the completion signal is checked.
pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Outcome of the page's diagram rendering pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Completion {
    /// Every diagram rendered.
    Rendered,
    /// The Mermaid runtime reported an error. Diagrams may be missing or broken.
    Failed(String),
}

/// The instant by which a page must have loaded and settled.
///
/// One deadline covers the whole print, so loading and waiting for diagrams
/// share a single [`PrintOptions::timeout`] budget.
#[derive(Clone, Copy, Debug)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
}
impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self { at: Instant::now() + budget, budget }
    }

    /// Time left before the deadline, zero once it has passed.
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub fn has_passed(&self) -> bool {
        Instant::now() >= self.at
    }

    /// The error reported once the deadline has passed.
    pub fn exceeded(&self) -> Error {
        exn::Exn::from(ErrorKind::Timeout(self.budget))
    }
}

/// Loads HTML files into printable pages.
pub trait Driver {
    /// Opens the HTML file at `html`, returning once it has finished loading.
    ///
    /// Loading that does not finish before `deadline` fails with
    /// [`ErrorKind::Timeout`]. Any resources the page holds (such as a browser
    /// process) must be released when the returned page is dropped.
    fn open(&self, html: &Path, options: &PrintOptions, deadline: Deadline) -> Result<Box<dyn Page>>;
}

/// A loaded page.
pub trait Page {
    /// Reads the completion signal. `None` while diagrams are still rendering.
    fn completion(&self) -> Result<Option<Completion>>;

    /// Prints the page to PDF bytes.
    fn print_pdf(&self, options: &PrintOptions) -> Result<Vec<u8>>;
}

/// Polls `page` until it reports completion or `deadline` passes.
pub(crate) fn await_completion(page: &dyn Page, deadline: Deadline) -> Result<Completion> {
    let mut polls: u32 = 0;
    loop {
        polls += 1;
        if let Some(completion) = page.completion()? {
            tracing::debug!(polls, ?completion, "Completion signal received");
            return Ok(completion);
        }
        if deadline.has_passed() {
            tracing::debug!(polls, "Completion signal never set");
            return Err(deadline.exceeded());
        }
        thread::sleep(POLL_INTERVAL.min(deadline.remaining()));
    }
}

/// The signal object exactly as the bootstrap script publishes it.
#[derive(Debug)]
pub(crate) struct Signal {
    pub(crate) done: bool,
    pub(crate) error: Option<String>,
}
impl Signal {
    /// JavaScript expression that evaluates to the signal serialized as JSON, or `"null"`.
    pub(crate) fn expression() -> String {
        format!("JSON.stringify(window.{SIGNAL_GLOBAL} || null)")
    }

    /// Parses the JSON produced by [`expression()`](Self::expression).
    pub(crate) fn parse(json: &str) -> Result<Option<Completion>> {
        let value: serde_json::Value = match serde_json::from_str(json) {
            Ok(value) => value,
            Err(_) => exn::bail!(ErrorKind::Signal(json.to_string())),
        };
        let signal = match value {
            serde_json::Value::Null => return Ok(None),
            serde_json::Value::Object(map) => Signal {
                done: map.get("done").and_then(serde_json::Value::as_bool).unwrap_or(false),
                error: map.get("error").and_then(serde_json::Value::as_str).map(str::to_string),
            },
            _ => exn::bail!(ErrorKind::Signal(json.to_string())),
        };
        Ok(signal.into_completion())
    }

    fn into_completion(self) -> Option<Completion> {
        match (self.done, self.error) {
            (false, _) => None,
            (true, None) => Some(Completion::Rendered),
            (true, Some(error)) => Some(Completion::Failed(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::cell::Cell;

    struct Countdown {
        remaining: Cell<u32>,
        result: Completion,
    }
    impl Page for Countdown {
        fn completion(&self) -> Result<Option<Completion>> {
            match self.remaining.get() {
                0 => Ok(Some(self.result.clone())),
                n => {
                    self.remaining.set(n - 1);
                    Ok(None)
                },
            }
        }
        fn print_pdf(&self, _: &PrintOptions) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }
    }

    #[rstest]
    #[case("null", None)]
    #[case(r#"{"done":false,"error":null}"#, None)]
    #[case(r#"{"done":true,"error":null}"#, Some(Completion::Rendered))]
    #[case(r#"{"done":true}"#, Some(Completion::Rendered))]
    #[case(r#"{"done":true,"error":"Parse error on line 2"}"#, Some(Completion::Failed("Parse error on line 2".into())))]
    #[case(r#"{"done":false,"error":"pending"}"#, None)]
    fn test_parse_signal(#[case] json: &str, #[case] expected: Option<Completion>) {
        assert_eq!(Signal::parse(json).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("true")]
    #[case("{not json")]
    fn test_parse_malformed_signal(#[case] json: &str) {
        assert!(matches!(&*Signal::parse(json).unwrap_err(), ErrorKind::Signal(_)));
    }

    #[test]
    fn test_expression_reads_shared_global() {
        assert_eq!(Signal::expression(), "JSON.stringify(window.__mdmermaid || null)");
    }

    #[test]
    fn test_await_completion_after_polls() {
        let page = Countdown { remaining: Cell::new(3), result: Completion::Rendered };
        assert_eq!(await_completion(&page, Deadline::after(Duration::from_secs(5))).unwrap(), Completion::Rendered);
    }

    #[test]
    fn test_await_completion_times_out() {
        let page = Countdown { remaining: Cell::new(u32::MAX), result: Completion::Rendered };
        let timeout = Duration::from_millis(120);
        let started = Instant::now();
        let err = await_completion(&page, Deadline::after(timeout)).unwrap_err();
        assert_eq!(*err, ErrorKind::Timeout(timeout));
        assert!(started.elapsed() >= timeout);
    }

    #[test]
    fn test_signal_checked_even_with_zero_timeout() {
        let page = Countdown { remaining: Cell::new(0), result: Completion::Failed("boom".into()) };
        assert_eq!(await_completion(&page, Deadline::after(Duration::ZERO)).unwrap(), Completion::Failed("boom".into()));
    }

    #[test]
    fn test_wait_only_gets_what_is_left_of_the_deadline() {
        let timeout = Duration::from_millis(200);
        let deadline = Deadline::after(timeout);
        thread::sleep(Duration::from_millis(150));
        let page = Countdown { remaining: Cell::new(u32::MAX), result: Completion::Rendered };
        let started = Instant::now();
        let err = await_completion(&page, deadline).unwrap_err();
        assert_eq!(*err, ErrorKind::Timeout(timeout));
        assert!(started.elapsed() < timeout);
    }
}
