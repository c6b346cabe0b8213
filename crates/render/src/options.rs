use crate::error::{Error, ErrorKind};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use std::time::Duration;

const MM_PER_INCH: f64 = 25.4;

/// Paper sizes understood by the printer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "&'static str")
)]
pub enum PaperFormat {
    A3,
    #[default]
    A4,
    A5,
    Legal,
    Letter,
    Tabloid,
}
impl PaperFormat {
    pub const ALL: [PaperFormat; 6] = [Self::A3, Self::A4, Self::A5, Self::Legal, Self::Letter, Self::Tabloid];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A3 => "A3",
            Self::A4 => "A4",
            Self::A5 => "A5",
            Self::Legal => "Legal",
            Self::Letter => "Letter",
            Self::Tabloid => "Tabloid",
        }
    }

    /// Portrait `(width, height)` in inches.
    pub fn size_inches(&self) -> (f64, f64) {
        match self {
            Self::A3 => (11.69, 16.54),
            Self::A4 => (8.27, 11.69),
            Self::A5 => (5.83, 8.27),
            Self::Legal => (8.5, 14.0),
            Self::Letter => (8.5, 11.0),
            Self::Tabloid => (11.0, 17.0),
        }
    }
}
impl FromStr for PaperFormat {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| exn::Exn::from(ErrorKind::UnsupportedPaper(s.to_string())))
    }
}
impl TryFrom<String> for PaperFormat {
    type Error = ErrorKind;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse().map_err(|err: Error| (*err).clone())
    }
}
impl From<PaperFormat> for &'static str {
    fn from(paper: PaperFormat) -> Self {
        paper.as_str()
    }
}
impl Display for PaperFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// How a page is printed, and how long it may take to become printable.
#[derive(Clone, Debug, PartialEq)]
pub struct PrintOptions {
    pub paper: PaperFormat,
    /// Margin applied equally to all four edges, in millimetres.
    pub margin_mm: f64,
    pub landscape: bool,
    /// Upper bound on loading the page and waiting for diagrams to settle.
    pub timeout: Duration,
}
impl Default for PrintOptions {
    fn default() -> Self {
        Self { paper: PaperFormat::A4, margin_mm: 10.0, landscape: false, timeout: Duration::from_secs(30) }
    }
}
impl PrintOptions {
    pub fn margin_inches(&self) -> f64 {
        self.margin_mm.max(0.0) / MM_PER_INCH
    }

    /// Paper `(width, height)` in inches, honouring orientation.
    pub fn paper_inches(&self) -> (f64, f64) {
        let (width, height) = self.paper.size_inches();
        if self.landscape { (height, width) } else { (width, height) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("A4", PaperFormat::A4)]
    #[case("a4", PaperFormat::A4)]
    #[case("letter", PaperFormat::Letter)]
    #[case("LEGAL", PaperFormat::Legal)]
    #[case(" Tabloid ", PaperFormat::Tabloid)]
    fn test_parse_paper(#[case] input: &str, #[case] expected: PaperFormat) {
        assert_eq!(input.parse::<PaperFormat>().unwrap(), expected);
    }

    #[test]
    fn test_parse_invalid_paper() {
        let err = "B5".parse::<PaperFormat>().unwrap_err();
        assert_eq!(*err, ErrorKind::UnsupportedPaper("B5".to_string()));
    }

    #[test]
    fn test_margin_conversion() {
        let options = PrintOptions { margin_mm: 25.4, ..Default::default() };
        assert!((options.margin_inches() - 1.0).abs() < f64::EPSILON);
        let options = PrintOptions { margin_mm: -3.0, ..Default::default() };
        assert_eq!(options.margin_inches(), 0.0);
    }

    #[test]
    fn test_landscape_swaps_dimensions() {
        let options = PrintOptions { paper: PaperFormat::Letter, landscape: true, ..Default::default() };
        assert_eq!(options.paper_inches(), (11.0, 8.5));
    }
}
