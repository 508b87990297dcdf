/// Byte-offset schemes for the PIC hex payload
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::error::ConfigError;

/// Where each header field lives in the hex string, in hex-character offsets
///
/// Both known layouts place a two-character `00` pad between the device id
/// and the date fields; it is never read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutSpec {
    pub id_width: usize,
    pub header_len: usize,
    pub day: Range<usize>,
    pub month: Range<usize>,
    pub year: Range<usize>,
    pub hour: Range<usize>,
    pub minute: Range<usize>,
    pub second: Range<usize>,
    /// Reject months outside 1..=12 with a dedicated error before the
    /// calendar date is built
    pub validate_month_range: bool,
}

/// V1: `PPPP 00 DD MM YYYY hh mm ss`
pub const LAYOUT_V1: LayoutSpec = LayoutSpec {
    id_width: 4,
    header_len: 20,
    day: 6..8,
    month: 8..10,
    year: 10..14,
    hour: 14..16,
    minute: 16..18,
    second: 18..20,
    validate_month_range: false,
};

/// V2: `PPPPPPPP 00 YYYY MM DD hh mm ss`
pub const LAYOUT_V2: LayoutSpec = LayoutSpec {
    id_width: 8,
    header_len: 24,
    year: 10..14,
    month: 14..16,
    day: 16..18,
    hour: 18..20,
    minute: 20..22,
    second: 22..24,
    validate_month_range: true,
};

/// Deployed payload variant, chosen by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    #[default]
    V1,
    V2,
}

impl Layout {
    pub fn spec(&self) -> &'static LayoutSpec {
        match self {
            Layout::V1 => &LAYOUT_V1,
            Layout::V2 => &LAYOUT_V2,
        }
    }
}

impl FromStr for Layout {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" => Ok(Layout::V1),
            "v2" => Ok(Layout::V2),
            _ => Err(ConfigError::UnknownLayout(s.to_string())),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::V1 => write!(f, "v1"),
            Layout::V2 => write!(f, "v2"),
        }
    }
}
