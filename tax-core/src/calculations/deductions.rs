//! Old-regime deduction aggregation.
//!
//! Malformed claims (negative amounts) are rejected. Claims above a
//! category's cap are well-formed and are clamped to the cap instead.

use rust_decimal::Decimal;
use tracing::warn;

use super::tax_engine::{InvalidReason, TaxEngineError};
use crate::{DeductionCaps, DeductionSet};

/// Clamps every claim in `deductions` to its cap and returns the total.
///
/// # Errors
///
/// Returns [`TaxEngineError::InvalidInput`] if any claim is negative, or if
/// the total cannot be represented.
pub fn aggregate_deductions(
    deductions: &DeductionSet,
    caps: &DeductionCaps,
) -> Result<Decimal, TaxEngineError> {
    if let Some((key, _)) = deductions.iter().find(|(_, amount)| *amount < Decimal::ZERO) {
        return Err(TaxEngineError::invalid(key.as_str(), InvalidReason::Negative));
    }

    deductions
        .iter()
        .try_fold(Decimal::ZERO, |total, (key, claimed)| {
            let allowed = caps.clamp(key, claimed);
            if allowed < claimed {
                warn!(deduction = %key, %claimed, %allowed, "deduction clamped to cap");
            }
            total
                .checked_add(allowed)
                .ok_or_else(|| TaxEngineError::invalid("deductions", InvalidReason::OutOfRange))
        })
}
