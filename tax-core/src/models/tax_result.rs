use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::TaxRegime;

/// Tax owed under one regime for one income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxResult {
    pub regime: TaxRegime,
    pub gross_income: Decimal,

    /// Sum of capped deductions, rounded to paise. Always zero under the new
    /// regime.
    pub total_deductions: Decimal,

    /// `gross_income - total_deductions`, floored at zero and rounded to paise.
    pub taxable_income: Decimal,

    /// Rounded to two decimal places.
    pub tax_payable: Decimal,

    /// `tax_payable / gross_income`, or zero when there is no income.
    pub effective_rate: Decimal,

    /// Rate applied to the last unit of taxable income.
    pub marginal_rate: Decimal,

    /// Brackets that received part of the taxable income, lowest first.
    pub slab_breakdown: Vec<SlabTax>,
}

/// The share of taxable income that fell in one bracket and the tax on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlabTax {
    pub lower_bound: Decimal,
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
    pub taxed_amount: Decimal,
    pub tax: Decimal,
}

/// Outcome of running both regimes on the same income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub new_regime_tax: Decimal,
    pub old_regime_tax: Decimal,
    pub recommended_regime: TaxRegime,
    pub savings_amount: Decimal,
}

impl ComparisonResult {
    /// Picks the regime with strictly lower tax; a tie goes to the new regime.
    pub fn new(
        new_regime_tax: Decimal,
        old_regime_tax: Decimal,
    ) -> Self {
        let recommended_regime = if old_regime_tax < new_regime_tax {
            TaxRegime::Old
        } else {
            TaxRegime::New
        };

        Self {
            new_regime_tax,
            old_regime_tax,
            recommended_regime,
            savings_amount: (new_regime_tax - old_regime_tax).abs(),
        }
    }
}
