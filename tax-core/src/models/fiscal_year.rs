use std::fmt;

use serde::{Deserialize, Serialize};

/// An Indian financial year (April to March), identified by its starting
/// calendar year and written as `2023-24`.
///
/// The start year is a `u16`, so the following year always fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FiscalYear {
    start_year: u16,
}

impl FiscalYear {
    pub const fn new(start_year: u16) -> Self {
        Self { start_year }
    }

    pub fn end_year(&self) -> u32 {
        u32::from(self.start_year) + 1
    }

    /// Parses `2023-24` or `2023-2024`. The second year must follow the first.
    pub fn parse(s: &str) -> Option<Self> {
        let (start, end) = s.trim().split_once('-')?;
        if start.len() != 4 || !start.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let year = Self::new(start.parse().ok()?);
        let end_year: u32 = end.parse().ok()?;

        let follows = match end.len() {
            2 => end_year == year.end_year() % 100,
            4 => end_year == year.end_year(),
            _ => false,
        };
        follows.then_some(year)
    }
}

impl fmt::Display for FiscalYear {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}-{:02}", self.start_year, self.end_year() % 100)
    }
}

impl TryFrom<String> for FiscalYear {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid fiscal year '{value}'"))
    }
}

impl From<FiscalYear> for String {
    fn from(year: FiscalYear) -> Self {
        year.to_string()
    }
}
