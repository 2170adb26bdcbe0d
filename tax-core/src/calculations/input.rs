//! Entry points for loosely typed callers such as forms and sliders.
//!
//! Values arrive as `f64` and strings. Everything is validated here before
//! any calculation starts; a rejected value never produces a partial result
//! and is never silently replaced by zero.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

use super::tax_engine::{InvalidReason, TaxEngine, TaxEngineError};
use crate::{ComparisonResult, DeductionKey, DeductionSet, TaxPolicy, TaxRegime, TaxResult};

/// Converts a non-negative, finite `f64` amount into a [`Decimal`].
///
/// # Errors
///
/// [`InvalidReason::NonFinite`] for NaN or infinities,
/// [`InvalidReason::Negative`] below zero, and [`InvalidReason::OutOfRange`]
/// for magnitudes `Decimal` cannot hold.
pub fn validate_amount(
    field: &str,
    value: f64,
) -> Result<Decimal, TaxEngineError> {
    if !value.is_finite() {
        return Err(TaxEngineError::invalid(field, InvalidReason::NonFinite));
    }
    if value < 0.0 {
        return Err(TaxEngineError::invalid(field, InvalidReason::Negative));
    }
    // -0.0 lands here too
    if value == 0.0 {
        return Ok(Decimal::ZERO);
    }
    Decimal::from_f64(value)
        .ok_or_else(|| TaxEngineError::invalid(field, InvalidReason::OutOfRange))
}

pub fn parse_regime(value: &str) -> Result<TaxRegime, TaxEngineError> {
    TaxRegime::parse(value)
        .ok_or_else(|| TaxEngineError::invalid("regime", InvalidReason::UnknownRegime))
}

/// Builds a [`DeductionSet`] from form field names and amounts.
///
/// Keys may use the canonical (`SECTION_80C`) or form (`section80C`) names.
/// If both spellings of one key are present the later one in map order wins.
pub fn parse_deductions(raw: &BTreeMap<String, f64>) -> Result<DeductionSet, TaxEngineError> {
    let mut set = DeductionSet::new();
    for (name, &amount) in raw {
        let key = DeductionKey::parse(name)
            .ok_or_else(|| TaxEngineError::invalid(name.as_str(), InvalidReason::UnknownDeduction))?;
        let amount = validate_amount(key.as_str(), amount)?;
        set.insert(key, amount)?;
    }
    Ok(set)
}

/// Computes tax with the built-in FY 2023-24 policy.
///
/// Deductions are only read (and validated) for the old regime.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::compute_tax;
///
/// let result = compute_tax(800000.0, "NEW", None).unwrap();
/// assert_eq!(result.tax_payable, dec!(35000));
///
/// assert!(compute_tax(-5000.0, "NEW", None).is_err());
/// ```
pub fn compute_tax(
    income: f64,
    regime: &str,
    deductions: Option<&BTreeMap<String, f64>>,
) -> Result<TaxResult, TaxEngineError> {
    let income = validate_amount("income", income)?;
    let regime = parse_regime(regime)?;
    let deductions = match deductions {
        Some(raw) if regime.allows_deductions() => Some(parse_deductions(raw)?),
        _ => None,
    };

    TaxEngine::new(TaxPolicy::builtin()).compute_tax(income, regime, deductions.as_ref())
}

/// Compares both regimes with the built-in FY 2023-24 policy.
pub fn compare_regimes(
    income: f64,
    deductions: Option<&BTreeMap<String, f64>>,
) -> Result<ComparisonResult, TaxEngineError> {
    let income = validate_amount("income", income)?;
    let deductions = deductions.map(parse_deductions).transpose()?;

    TaxEngine::new(TaxPolicy::builtin()).compare_regimes(income, deductions.as_ref())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn raw(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
        entries
            .iter()
            .map(|&(name, amount)| (name.to_string(), amount))
            .collect()
    }

    // =========================================================================
    // validate_amount tests
    // =========================================================================

    #[test]
    fn validate_amount_accepts_whole_and_fractional_values() {
        assert_eq!(validate_amount("income", 800000.0), Ok(dec!(800000)));
        assert_eq!(validate_amount("income", 1234.5), Ok(dec!(1234.5)));
    }

    #[test]
    fn validate_amount_normalizes_negative_zero() {
        assert_eq!(validate_amount("income", -0.0), Ok(Decimal::ZERO));
    }

    #[test]
    fn validate_amount_rejects_nan_and_infinity() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(
                validate_amount("income", value),
                Err(TaxEngineError::invalid("income", InvalidReason::NonFinite))
            );
        }
    }

    #[test]
    fn validate_amount_rejects_negative() {
        assert_eq!(
            validate_amount("income", -5000.0),
            Err(TaxEngineError::invalid("income", InvalidReason::Negative))
        );
    }

    #[test]
    fn validate_amount_rejects_values_beyond_decimal_range() {
        assert_eq!(
            validate_amount("income", 1e300),
            Err(TaxEngineError::invalid("income", InvalidReason::OutOfRange))
        );
    }

    // =========================================================================
    // parse tests
    // =========================================================================

    #[test]
    fn parse_regime_rejects_unknown_names() {
        assert_eq!(
            parse_regime("flat"),
            Err(TaxEngineError::invalid("regime", InvalidReason::UnknownRegime))
        );
    }

    #[test]
    fn parse_deductions_rejects_unknown_key() {
        let result = parse_deductions(&raw(&[("section80TTA", 10000.0)]));

        assert_eq!(
            result,
            Err(TaxEngineError::invalid("section80TTA", InvalidReason::UnknownDeduction))
        );
    }

    #[test]
    fn parse_deductions_accepts_form_names() {
        let set = parse_deductions(&raw(&[("section80C", 50000.0), ("homeLoanInterest", 1.0)]))
            .unwrap();

        assert_eq!(set.get(DeductionKey::Section80C), Some(dec!(50000)));
        assert_eq!(set.get(DeductionKey::HomeLoanInterest), Some(dec!(1)));
    }

    #[test]
    fn parse_deductions_later_spelling_of_same_key_wins() {
        // "SECTION_80C" sorts before "section80C"
        let set = parse_deductions(&raw(&[("section80C", 90000.0), ("SECTION_80C", 40000.0)]))
            .unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(set.get(DeductionKey::Section80C), Some(dec!(90000)));
    }

    // =========================================================================
    // compute_tax tests
    // =========================================================================

    #[test]
    fn compute_tax_new_regime_at_800000() {
        let result = compute_tax(800000.0, "NEW", None).unwrap();

        assert_eq!(result.tax_payable, dec!(35000));
    }

    #[test]
    fn compute_tax_old_regime_with_deductions() {
        let claims = raw(&[("SECTION_80C", 150000.0), ("SECTION_80D", 25000.0)]);

        let result = compute_tax(1200000.0, "OLD", Some(&claims)).unwrap();

        assert_eq!(result.taxable_income, dec!(1025000));
        assert_eq!(result.tax_payable, dec!(120000));
    }

    #[test]
    fn compute_tax_clamps_rather_than_rejects_over_cap_claim() {
        let claims = raw(&[("SECTION_80C", 999999.0)]);

        let result = compute_tax(500000.0, "OLD", Some(&claims)).unwrap();

        assert_eq!(result.total_deductions, dec!(150000));
        assert_eq!(result.tax_payable, dec!(5000));
    }

    #[test]
    fn compute_tax_rejects_negative_income() {
        let result = compute_tax(-5000.0, "NEW", None);

        assert_eq!(
            result,
            Err(TaxEngineError::invalid("income", InvalidReason::Negative))
        );
    }

    #[test]
    fn compute_tax_rejects_nan_income() {
        let result = compute_tax(f64::NAN, "OLD", None);

        assert_eq!(
            result,
            Err(TaxEngineError::invalid("income", InvalidReason::NonFinite))
        );
    }

    #[test]
    fn compute_tax_rejects_unknown_regime() {
        let result = compute_tax(500000.0, "flat", None);

        assert_eq!(
            result,
            Err(TaxEngineError::invalid("regime", InvalidReason::UnknownRegime))
        );
    }

    #[test]
    fn compute_tax_rejects_negative_deduction_under_old_regime() {
        let claims = raw(&[("SECTION_80D", -1.0)]);

        let result = compute_tax(500000.0, "OLD", Some(&claims));

        assert_eq!(
            result,
            Err(TaxEngineError::invalid("SECTION_80D", InvalidReason::Negative))
        );
    }

    #[test]
    fn compute_tax_rejects_infinite_deduction_under_old_regime() {
        let claims = raw(&[("section80E", f64::INFINITY)]);

        let result = compute_tax(500000.0, "old", Some(&claims));

        assert_eq!(
            result,
            Err(TaxEngineError::invalid("SECTION_80E", InvalidReason::NonFinite))
        );
    }

    #[test]
    fn compute_tax_new_regime_does_not_read_deductions() {
        let claims = raw(&[("bogus", f64::NAN)]);

        let with = compute_tax(900000.0, "new", Some(&claims)).unwrap();
        let without = compute_tax(900000.0, "new", None).unwrap();

        assert_eq!(with, without);
    }

    // =========================================================================
    // compare_regimes tests
    // =========================================================================

    #[test]
    fn compare_regimes_at_500000() {
        let result = compare_regimes(500000.0, None).unwrap();

        assert_eq!(result.new_regime_tax, dec!(10000));
        assert_eq!(result.old_regime_tax, dec!(12500));
        assert_eq!(result.recommended_regime, TaxRegime::New);
        assert_eq!(result.savings_amount, dec!(2500));
    }

    #[test]
    fn compare_regimes_validates_deductions() {
        let claims = raw(&[("SECTION_80C", -10.0)]);

        assert!(compare_regimes(500000.0, Some(&claims)).is_err());
    }
}
