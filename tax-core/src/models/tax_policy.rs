use std::sync::OnceLock;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{DeductionCaps, DeductionKey, FiscalYear, SlabBracket, SlabTable, TaxRegime};

/// Slab tables and deduction limits in force for one fiscal year.
///
/// This is policy data, not logic: revising rates for a new year means
/// building a new `TaxPolicy`, never touching the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxPolicy {
    pub fiscal_year: FiscalYear,
    pub new_regime: SlabTable,
    pub old_regime: SlabTable,
    pub deduction_caps: DeductionCaps,
}

static BUILTIN: OnceLock<TaxPolicy> = OnceLock::new();

impl TaxPolicy {
    pub fn slabs(
        &self,
        regime: TaxRegime,
    ) -> &SlabTable {
        match regime {
            TaxRegime::New => &self.new_regime,
            TaxRegime::Old => &self.old_regime,
        }
    }

    /// The FY 2023-24 policy shared by callers that do not supply their own.
    pub fn builtin() -> &'static TaxPolicy {
        BUILTIN.get_or_init(Self::fy_2023_24)
    }

    /// FY 2023-24 slabs for both regimes with the standard deduction limits.
    pub fn fy_2023_24() -> Self {
        Self {
            fiscal_year: FiscalYear::new(2023),
            new_regime: steps(&[
                (0, 0),
                (300_000, 5),
                (600_000, 10),
                (900_000, 15),
                (1_200_000, 20),
                (1_500_000, 30),
            ]),
            old_regime: steps(&[(0, 0), (250_000, 5), (500_000, 20), (1_000_000, 30)]),
            deduction_caps: Self::default_deduction_caps(),
        }
    }

    /// 80C ₹1.5L, 80D ₹25K, home-loan interest ₹2L; 80E and 80G unlimited.
    pub fn default_deduction_caps() -> DeductionCaps {
        DeductionCaps::uncapped()
            .with_cap(DeductionKey::Section80C, Decimal::from(150_000))
            .with_cap(DeductionKey::Section80D, Decimal::from(25_000))
            .with_cap(DeductionKey::HomeLoanInterest, Decimal::from(200_000))
    }
}

impl Default for TaxPolicy {
    fn default() -> Self {
        Self::fy_2023_24()
    }
}

// (lower bound in rupees, rate in percent). The built-in steps satisfy the
// table invariants, which the tests below check through `SlabTable::new`.
fn steps(rows: &[(i64, i64)]) -> SlabTable {
    let brackets = rows
        .iter()
        .enumerate()
        .map(|(i, &(lower, percent))| {
            SlabBracket::new(
                Decimal::from(lower),
                rows.get(i + 1).map(|&(next, _)| Decimal::from(next)),
                Decimal::new(percent, 2),
            )
        })
        .collect();

    SlabTable::from_trusted(brackets)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn builtin_tables_pass_validation() {
        let policy = TaxPolicy::fy_2023_24();

        for regime in TaxRegime::ALL {
            let brackets = policy.slabs(regime).brackets().to_vec();
            assert!(SlabTable::new(brackets).is_ok(), "{regime} table is invalid");
        }
    }

    #[test]
    fn new_regime_has_six_slabs() {
        let policy = TaxPolicy::fy_2023_24();
        let rates: Vec<_> = policy.new_regime.brackets().iter().map(|b| b.rate).collect();

        assert_eq!(
            rates,
            vec![dec!(0), dec!(0.05), dec!(0.10), dec!(0.15), dec!(0.20), dec!(0.30)]
        );
    }

    #[test]
    fn old_regime_thresholds_match_fy_2023_24() {
        let policy = TaxPolicy::fy_2023_24();
        let thresholds: Vec<_> = policy.old_regime.thresholds().collect();

        assert_eq!(thresholds, vec![dec!(250000), dec!(500000), dec!(1000000)]);
    }

    #[test]
    fn slabs_looks_up_table_by_regime() {
        let policy = TaxPolicy::fy_2023_24();

        assert_eq!(policy.slabs(TaxRegime::New), &policy.new_regime);
        assert_eq!(policy.slabs(TaxRegime::Old), &policy.old_regime);
    }

    #[test]
    fn default_caps_leave_80e_and_80g_unlimited() {
        let caps = TaxPolicy::default_deduction_caps();

        assert_eq!(caps.cap(DeductionKey::Section80C), Some(dec!(150000)));
        assert_eq!(caps.cap(DeductionKey::Section80D), Some(dec!(25000)));
        assert_eq!(caps.cap(DeductionKey::HomeLoanInterest), Some(dec!(200000)));
        assert_eq!(caps.cap(DeductionKey::Section80E), None);
        assert_eq!(caps.cap(DeductionKey::Section80G), None);
    }

    #[test]
    fn builtin_is_shared() {
        assert!(std::ptr::eq(TaxPolicy::builtin(), TaxPolicy::builtin()));
        assert_eq!(TaxPolicy::builtin().fiscal_year.to_string(), "2023-24");
    }
}
