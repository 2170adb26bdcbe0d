//! Marginal-bracket walk over a [`SlabTable`].
//!
//! Each bracket taxes only the part of income that lies inside it, so moving
//! income across a threshold changes tax by at most the new bracket's rate
//! times the amount moved.

use rust_decimal::Decimal;
use tracing::trace;

use crate::{SlabTable, SlabTax};

/// Splits `taxable_income` across the brackets of `table`.
///
/// Brackets the income never reaches are omitted. Per-bracket tax is exact
/// (unrounded); rounding is applied once to the total by the caller.
pub fn slab_breakdown(
    table: &SlabTable,
    taxable_income: Decimal,
) -> Vec<SlabTax> {
    table
        .brackets()
        .iter()
        .map(|bracket| (bracket, bracket.portion_of(taxable_income)))
        .take_while(|(_, taxed_amount)| *taxed_amount > Decimal::ZERO)
        .map(|(bracket, taxed_amount)| {
            let tax = taxed_amount * bracket.rate;
            trace!(
                lower = %bracket.lower_bound,
                rate = %bracket.rate,
                %taxed_amount,
                %tax,
                "slab applied"
            );
            SlabTax {
                lower_bound: bracket.lower_bound,
                upper_bound: bracket.upper_bound,
                rate: bracket.rate,
                taxed_amount,
                tax,
            }
        })
        .collect()
}

/// Total tax across a breakdown.
pub fn total_tax(breakdown: &[SlabTax]) -> Decimal {
    breakdown.iter().map(|slab| slab.tax).sum()
}

/// Rate applied to the last unit of `taxable_income`; zero for no income.
pub fn marginal_rate(
    table: &SlabTable,
    taxable_income: Decimal,
) -> Decimal {
    table
        .brackets()
        .iter()
        .find(|bracket| bracket.holds_last_unit_of(taxable_income))
        .map(|bracket| bracket.rate)
        .unwrap_or(Decimal::ZERO)
}
