use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::{InvalidReason, TaxEngineError};

/// The deduction categories the calculator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DeductionKey {
    #[serde(rename = "SECTION_80C", alias = "section80C")]
    Section80C,
    #[serde(rename = "SECTION_80D", alias = "section80D")]
    Section80D,
    #[serde(rename = "HOME_LOAN_INTEREST", alias = "homeLoanInterest")]
    HomeLoanInterest,
    #[serde(rename = "SECTION_80E", alias = "section80E")]
    Section80E,
    #[serde(rename = "SECTION_80G", alias = "section80G")]
    Section80G,
}

impl DeductionKey {
    pub const ALL: [DeductionKey; 5] = [
        DeductionKey::Section80C,
        DeductionKey::Section80D,
        DeductionKey::HomeLoanInterest,
        DeductionKey::Section80E,
        DeductionKey::Section80G,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Section80C => "SECTION_80C",
            Self::Section80D => "SECTION_80D",
            Self::HomeLoanInterest => "HOME_LOAN_INTEREST",
            Self::Section80E => "SECTION_80E",
            Self::Section80G => "SECTION_80G",
        }
    }

    /// Field name used by the calculator form.
    pub fn form_field(&self) -> &'static str {
        match self {
            Self::Section80C => "section80C",
            Self::Section80D => "section80D",
            Self::HomeLoanInterest => "homeLoanInterest",
            Self::Section80E => "section80E",
            Self::Section80G => "section80G",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Section80C => "Section 80C (PPF, ELSS, etc.)",
            Self::Section80D => "Section 80D (Health Insurance)",
            Self::HomeLoanInterest => "Home Loan Interest",
            Self::Section80E => "Section 80E (Education Loan)",
            Self::Section80G => "Section 80G (Donations)",
        }
    }

    /// Accepts the canonical name (any case) or the form field name.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s) || key.form_field() == s)
    }
}

impl fmt::Display for DeductionKey {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-category deduction limits. A key without a cap is unlimited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeductionCaps {
    caps: BTreeMap<DeductionKey, Decimal>,
}

impl DeductionCaps {
    /// Caps with every category unlimited.
    pub fn uncapped() -> Self {
        Self::default()
    }

    pub fn with_cap(
        mut self,
        key: DeductionKey,
        cap: Decimal,
    ) -> Self {
        self.caps.insert(key, cap);
        self
    }

    /// Sets or removes (`None`) the cap for `key`.
    pub fn set_cap(
        &mut self,
        key: DeductionKey,
        cap: Option<Decimal>,
    ) {
        match cap {
            Some(cap) => self.caps.insert(key, cap),
            None => self.caps.remove(&key),
        };
    }

    pub fn cap(
        &self,
        key: DeductionKey,
    ) -> Option<Decimal> {
        self.caps.get(&key).copied()
    }

    /// Clamps `amount` to `[0, cap]`, or to `[0, ∞)` for uncapped keys.
    pub fn clamp(
        &self,
        key: DeductionKey,
        amount: Decimal,
    ) -> Decimal {
        let amount = amount.max(Decimal::ZERO);
        match self.cap(key) {
            Some(cap) => amount.min(cap.max(Decimal::ZERO)),
            None => amount,
        }
    }
}

/// Deduction amounts claimed by the taxpayer, keyed by category.
///
/// Amounts are never negative when inserted through [`DeductionSet::insert`].
/// Sets built by deserialization are re-checked by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeductionSet {
    amounts: BTreeMap<DeductionKey, Decimal>,
}

impl DeductionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `amount` for `key`, replacing any earlier claim.
    ///
    /// # Errors
    ///
    /// Returns [`TaxEngineError::InvalidInput`] if `amount` is negative.
    pub fn insert(
        &mut self,
        key: DeductionKey,
        amount: Decimal,
    ) -> Result<Option<Decimal>, TaxEngineError> {
        if amount < Decimal::ZERO {
            return Err(TaxEngineError::invalid(key.as_str(), InvalidReason::Negative));
        }
        Ok(self.amounts.insert(key, amount))
    }

    /// Builder form of [`DeductionSet::insert`].
    pub fn with(
        mut self,
        key: DeductionKey,
        amount: Decimal,
    ) -> Result<Self, TaxEngineError> {
        self.insert(key, amount)?;
        Ok(self)
    }

    pub fn get(
        &self,
        key: DeductionKey,
    ) -> Option<Decimal> {
        self.amounts.get(&key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeductionKey, Decimal)> + '_ {
        self.amounts.iter().map(|(&key, &amount)| (key, amount))
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }
}
