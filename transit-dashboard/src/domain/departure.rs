//! Live departure estimates.

use std::fmt;

use serde::Serialize;

/// Line colour used when a feed omits one.
pub const DEFAULT_LINE_HEX: &str = "#4a90d9";

/// Estimated time until a train departs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", content = "minutes", rename_all = "snake_case")]
pub enum Eta {
    /// The train is at the platform.
    Now,
    /// Minutes until departure.
    Minutes(u32),
}

impl Eta {
    /// Parse a wire ETA: `"Leaving"`/`"Now"` (any case) or a whole number of minutes.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("leaving") || s.eq_ignore_ascii_case("now") {
            return Some(Eta::Now);
        }
        s.parse().ok().map(Eta::Minutes)
    }
}

impl fmt::Display for Eta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eta::Now => f.write_str("NOW"),
            Eta::Minutes(m) => write!(f, "{m} min"),
        }
    }
}

/// A line name with its display colour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineColor {
    pub name: String,
    pub hex: String,
}

impl LineColor {
    /// Create a line colour, falling back to the default hex when absent.
    pub fn new(name: impl Into<String>, hex: Option<String>) -> Self {
        Self {
            name: name.into(),
            hex: hex
                .filter(|h| !h.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LINE_HEX.to_string()),
        }
    }
}

/// One estimated departure from a station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Departure {
    pub destination: String,
    pub eta: Eta,
    /// Train length in cars; 0 when the feed omits it.
    pub cars: u16,
    pub platform: String,
    pub line: LineColor,
    pub direction: Option<String>,
    pub delay_secs: u32,
}
