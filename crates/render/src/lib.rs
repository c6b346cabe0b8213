//! Prints assembled HTML pages to PDF with a headless Chrome/Chromium.
//!
//! Pages are expected to publish a completion signal (the global object named
//! [`SIGNAL_GLOBAL`]) once their diagrams have rendered. The [`Printer`] waits
//! for it, bounded by [`PrintOptions::timeout`], before printing.

mod chrome;
pub mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod options;
mod page;
mod render;

#[cfg(any(test, feature = "mock"))]
pub use crate::mock::{MOCK_PDF, MockDriver};
pub use crate::options::{PaperFormat, PrintOptions};
pub use crate::page::{Completion, Deadline, Driver, Page, SIGNAL_GLOBAL};
pub use crate::render::{Printed, Printer};
