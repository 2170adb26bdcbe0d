//! Slab-based income tax for the new and old regimes, and the comparison
//! between them.
//!
//! # Steps
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Validate income (must not be negative) |
//! | 2    | Old regime only: clamp each deduction to its cap and total them, rounded to paise |
//! | 3    | Taxable income = income - total deductions, minimum 0, rounded to paise |
//! | 4    | Walk the regime's slabs, taxing each slice at its own rate |
//! | 5    | Round tax to paise; effective rate = tax / income (0 if no income) |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::{DeductionKey, DeductionSet, TaxEngine, TaxPolicy, TaxRegime};
//!
//! let policy = TaxPolicy::fy_2023_24();
//! let engine = TaxEngine::new(&policy);
//!
//! let deductions = DeductionSet::new()
//!     .with(DeductionKey::Section80C, dec!(150000))
//!     .unwrap()
//!     .with(DeductionKey::Section80D, dec!(25000))
//!     .unwrap();
//!
//! let old = engine
//!     .compute_tax(dec!(1200000), TaxRegime::Old, Some(&deductions))
//!     .unwrap();
//! assert_eq!(old.taxable_income, dec!(1025000));
//! assert_eq!(old.tax_payable, dec!(120000));
//!
//! let comparison = engine.compare_regimes(dec!(1200000), Some(&deductions)).unwrap();
//! assert_eq!(comparison.new_regime_tax, dec!(90000));
//! assert_eq!(comparison.recommended_regime, TaxRegime::New);
//! assert_eq!(comparison.savings_amount, dec!(30000));
//! ```

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use super::common::{max, round_half_up, round_rate};
use super::deductions::aggregate_deductions;
use super::slabs::{marginal_rate, slab_breakdown, total_tax};
use crate::{ComparisonResult, DeductionSet, TaxPolicy, TaxRegime, TaxResult};

/// Why a caller-supplied value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidReason {
    #[error("must not be negative")]
    Negative,

    #[error("must be a finite number")]
    NonFinite,

    #[error("is too large to calculate with")]
    OutOfRange,

    #[error("is not a recognised tax regime")]
    UnknownRegime,

    #[error("is not a recognised deduction")]
    UnknownDeduction,
}

/// Errors returned by the tax engine.
///
/// Every failure is a malformed input that the caller can correct; the engine
/// performs no I/O and has no other way to fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxEngineError {
    #[error("invalid input: {field} {reason}")]
    InvalidInput { field: String, reason: InvalidReason },
}

impl TaxEngineError {
    pub fn invalid(
        field: impl Into<String>,
        reason: InvalidReason,
    ) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason,
        }
    }

    /// Name of the rejected field, for pointing a form at it.
    pub fn field(&self) -> &str {
        match self {
            Self::InvalidInput { field, .. } => field,
        }
    }

    pub fn reason(&self) -> InvalidReason {
        match self {
            Self::InvalidInput { reason, .. } => *reason,
        }
    }
}

/// Calculator bound to one fiscal year's [`TaxPolicy`].
///
/// Holds no state beyond the borrowed policy, so one engine (or one policy)
/// can serve any number of concurrent callers.
#[derive(Debug, Clone, Copy)]
pub struct TaxEngine<'a> {
    policy: &'a TaxPolicy,
}

impl<'a> TaxEngine<'a> {
    pub fn new(policy: &'a TaxPolicy) -> Self {
        Self { policy }
    }

    /// Computes tax on `income` under `regime`.
    ///
    /// `deductions` are applied under [`TaxRegime::Old`] only and are ignored
    /// entirely under [`TaxRegime::New`].
    ///
    /// # Errors
    ///
    /// Returns [`TaxEngineError::InvalidInput`] if `income` is negative, or
    /// (old regime) if a deduction is negative or the deductions overflow.
    pub fn compute_tax(
        &self,
        income: Decimal,
        regime: TaxRegime,
        deductions: Option<&DeductionSet>,
    ) -> Result<TaxResult, TaxEngineError> {
        if income < Decimal::ZERO {
            return Err(TaxEngineError::invalid("income", InvalidReason::Negative));
        }

        let total_deductions = self.total_deductions(regime, deductions)?;
        let taxable_income = self.taxable_income(income, total_deductions);

        let table = self.policy.slabs(regime);
        let slab_breakdown = slab_breakdown(table, taxable_income);
        let tax_payable = round_half_up(total_tax(&slab_breakdown));
        let effective_rate = self.effective_rate(tax_payable, income);

        debug!(
            %regime,
            fiscal_year = %self.policy.fiscal_year,
            %income,
            %total_deductions,
            %taxable_income,
            %tax_payable,
            "tax computed"
        );

        Ok(TaxResult {
            regime,
            gross_income: income,
            total_deductions,
            taxable_income,
            tax_payable,
            effective_rate,
            marginal_rate: marginal_rate(table, taxable_income),
            slab_breakdown,
        })
    }

    /// Computes tax under both regimes for the same inputs and recommends the
    /// cheaper one, preferring the new regime on a tie.
    ///
    /// # Errors
    ///
    /// Same as [`TaxEngine::compute_tax`].
    pub fn compare_regimes(
        &self,
        income: Decimal,
        deductions: Option<&DeductionSet>,
    ) -> Result<ComparisonResult, TaxEngineError> {
        let (new_regime, old_regime) = self.compute_both(income, deductions)?;
        let comparison = ComparisonResult::new(new_regime.tax_payable, old_regime.tax_payable);

        debug!(
            %income,
            recommended = %comparison.recommended_regime,
            savings = %comparison.savings_amount,
            "regimes compared"
        );

        Ok(comparison)
    }

    /// Full results for both regimes, new regime first.
    ///
    /// # Errors
    ///
    /// Same as [`TaxEngine::compute_tax`]; no result is returned if either
    /// regime fails.
    pub fn compute_both(
        &self,
        income: Decimal,
        deductions: Option<&DeductionSet>,
    ) -> Result<(TaxResult, TaxResult), TaxEngineError> {
        let new_regime = self.compute_tax(income, TaxRegime::New, deductions)?;
        let old_regime = self.compute_tax(income, TaxRegime::Old, deductions)?;
        Ok((new_regime, old_regime))
    }

    fn total_deductions(
        &self,
        regime: TaxRegime,
        deductions: Option<&DeductionSet>,
    ) -> Result<Decimal, TaxEngineError> {
        match deductions {
            Some(deductions) if regime.allows_deductions() => {
                aggregate_deductions(deductions, &self.policy.deduction_caps).map(round_half_up)
            }
            _ => Ok(Decimal::ZERO),
        }
    }

    fn taxable_income(
        &self,
        income: Decimal,
        total_deductions: Decimal,
    ) -> Decimal {
        round_half_up(max(income - total_deductions, Decimal::ZERO))
    }

    fn effective_rate(
        &self,
        tax_payable: Decimal,
        income: Decimal,
    ) -> Decimal {
        if income > Decimal::ZERO {
            round_rate(tax_payable / income)
        } else {
            Decimal::ZERO
        }
    }
}
