use std::fmt;

use rust_decimal::Decimal;
use tax_core::{SlabTax, TaxResult};

use crate::app::Report;
use crate::utils::{format_inr, format_percent};

fn slab_range(slab: &SlabTax) -> String {
    match slab.upper_bound {
        Some(upper) => format!("{} - {}", format_inr(slab.lower_bound), format_inr(upper)),
        None => format!("above {}", format_inr(slab.lower_bound)),
    }
}

fn write_regime(
    f: &mut fmt::Formatter<'_>,
    result: &TaxResult,
) -> fmt::Result {
    writeln!(f, "{}", result.regime.label())?;
    if result.total_deductions > Decimal::ZERO {
        writeln!(f, "  {:<28}{:>16}", "Total Deductions", format_inr(result.total_deductions))?;
    }
    writeln!(f, "  {:<28}{:>16}", "Taxable Income", format_inr(result.taxable_income))?;
    for slab in &result.slab_breakdown {
        let label = format!("{} @ {}", slab_range(slab), format_percent(slab.rate));
        writeln!(f, "    {:<42}{:>16}", label, format_inr(slab.tax))?;
    }
    writeln!(f, "  {:<28}{:>16}", "Income Tax", format_inr(result.tax_payable))?;
    writeln!(
        f,
        "  {:<28}{:>16}",
        "Effective Rate",
        format_percent(result.effective_rate)
    )?;
    writeln!(
        f,
        "  {:<28}{:>16}",
        "Marginal Rate",
        format_percent(result.marginal_rate)
    )
}

impl fmt::Display for Report {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(
            f,
            "Tax comparison for FY {} on gross income {}",
            self.fiscal_year,
            format_inr(self.new_regime.gross_income)
        )?;
        writeln!(f)?;
        write_regime(f, &self.new_regime)?;
        writeln!(f)?;
        write_regime(f, &self.old_regime)?;
        writeln!(f)?;

        let comparison = &self.comparison;
        if comparison.savings_amount.is_zero() {
            writeln!(
                f,
                "Both regimes cost the same; {} recommended",
                comparison.recommended_regime.label()
            )?;
        } else {
            writeln!(
                f,
                "{} Better: saves {}",
                comparison.recommended_regime.label(),
                format_inr(comparison.savings_amount)
            )?;
        }

        let selected = self.selected();
        write!(
            f,
            "Total Tax ({}): {} (Effective Rate: {})",
            selected.regime.label(),
            format_inr(selected.tax_payable),
            format_percent(selected.effective_rate)
        )
    }
}
