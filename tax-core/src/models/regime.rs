use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TaxRegime {
    #[serde(rename = "NEW", alias = "new")]
    New,
    #[serde(rename = "OLD", alias = "old")]
    Old,
}

impl TaxRegime {
    pub const ALL: [TaxRegime; 2] = [TaxRegime::New, TaxRegime::Old];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Old => "OLD",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::New => "New Tax Regime",
            Self::Old => "Old Tax Regime",
        }
    }

    /// Parses a regime name, ignoring case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|regime| regime.as_str().eq_ignore_ascii_case(s))
    }

    /// Only the old regime honours itemized deductions.
    pub fn allows_deductions(&self) -> bool {
        matches!(self, Self::Old)
    }
}

impl fmt::Display for TaxRegime {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
