//! Display options passed through to the Mermaid runtime.

use crate::error::{Error, ErrorKind};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Mermaid colour theme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "&'static str")
)]
pub enum Theme {
    #[default]
    Default,
    Dark,
    Forest,
    Neutral,
}
impl Theme {
    pub const ALL: [Theme; 4] = [Self::Default, Self::Dark, Self::Forest, Self::Neutral];

    /// The name Mermaid expects in its `theme` option.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Dark => "dark",
            Self::Forest => "forest",
            Self::Neutral => "neutral",
        }
    }
}
impl FromStr for Theme {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| exn::Exn::from(ErrorKind::UnsupportedOption("theme", s.to_string())))
    }
}
impl TryFrom<String> for Theme {
    type Error = ErrorKind;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse().map_err(|err: Error| (*err).clone())
    }
}
impl From<Theme> for &'static str {
    fn from(t: Theme) -> Self {
        t.as_str()
    }
}
impl Display for Theme {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Mermaid `securityLevel`, controlling how much markup diagrams may contain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "&'static str")
)]
pub enum SecurityLevel {
    #[default]
    Strict,
    Loose,
    Antiscript,
}
impl SecurityLevel {
    pub const ALL: [SecurityLevel; 3] = [Self::Strict, Self::Loose, Self::Antiscript];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Loose => "loose",
            Self::Antiscript => "antiscript",
        }
    }
}
impl FromStr for SecurityLevel {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| exn::Exn::from(ErrorKind::UnsupportedOption("security level", s.to_string())))
    }
}
impl TryFrom<String> for SecurityLevel {
    type Error = ErrorKind;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse().map_err(|err: Error| (*err).clone())
    }
}
impl From<SecurityLevel> for &'static str {
    fn from(l: SecurityLevel) -> Self {
        l.as_str()
    }
}
impl Display for SecurityLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Options handed to `mermaid.initialize()` by the page bootstrap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiagramOptions {
    pub theme: Theme,
    pub security_level: SecurityLevel,
}
