//! Quarter labels such as `23Q1`.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid quarter label '{0}' (expected e.g. 23Q1)")]
pub struct QuarterParseError(pub String);

/// A `<2-digit-year>Q<quarter>` reporting period.
///
/// Field order makes the derived `Ord` chronological, which matches the
/// lexicographic order of the labels themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuarterLabel {
    year: u8,
    quarter: u8,
}

impl QuarterLabel {
    pub fn new(year: u8, quarter: u8) -> Option<Self> {
        if year > 99 || !(1..=4).contains(&quarter) {
            return None;
        }
        Some(Self { year, quarter })
    }

    pub fn year(&self) -> u8 {
        self.year
    }

    pub fn quarter(&self) -> u8 {
        self.quarter
    }
}

impl FromStr for QuarterLabel {
    type Err = QuarterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || QuarterParseError(s.to_string());
        let bytes = s.as_bytes();
        if bytes.len() != 4 || bytes[2] != b'Q' {
            return Err(err());
        }
        if !bytes[0].is_ascii_digit() || !bytes[1].is_ascii_digit() || !bytes[3].is_ascii_digit()
        {
            return Err(err());
        }
        let year = (bytes[0] - b'0') * 10 + (bytes[1] - b'0');
        let quarter = bytes[3] - b'0';
        Self::new(year, quarter).ok_or_else(err)
    }
}

impl fmt::Display for QuarterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}Q{}", self.year, self.quarter)
    }
}
