use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result, bail};
use rust_decimal::Decimal;
use serde::Serialize;
use tax_core::{
    ComparisonResult, DeductionKey, DeductionSet, FiscalYear, TaxEngine, TaxEngineError,
    TaxPolicy, TaxRegime, TaxResult,
};
use tax_data::PolicyLoader;
use thiserror::Error;
use tracing::{debug, info};

use crate::utils::parse_decimal;

/// Validation failures collected from a [`CalculatorForm`].
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{}", .errors.join("; "))]
pub struct FormError {
    pub errors: Vec<String>,
}

/// Raw calculator input as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct CalculatorForm {
    pub income: String,
    pub regime: String,
    /// `KEY=AMOUNT` entries, e.g. `section80C=1,50,000`.
    pub deductions: Vec<String>,
}

/// Calculator input after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculatorInput {
    pub income: Decimal,
    pub regime: TaxRegime,
    pub deductions: DeductionSet,
}

impl CalculatorForm {
    /// Parses every field, reporting all problems at once.
    pub fn validate(&self) -> Result<CalculatorInput, FormError> {
        let mut errors = Vec::new();

        let income = self.parse_income(&mut errors);
        let regime = TaxRegime::parse(&self.regime);
        if regime.is_none() {
            errors.push(format!("Tax Regime '{}' must be NEW or OLD", self.regime));
        }
        let deductions = self.parse_deductions(&mut errors);

        match (income, regime) {
            (Some(income), Some(regime)) if errors.is_empty() => Ok(CalculatorInput {
                income,
                regime,
                deductions,
            }),
            _ => Err(FormError { errors }),
        }
    }

    fn parse_income(
        &self,
        errors: &mut Vec<String>,
    ) -> Option<Decimal> {
        if self.income.trim().is_empty() {
            errors.push("Annual Income is required".to_string());
            return None;
        }
        match parse_decimal(&self.income) {
            Ok(income) if income < Decimal::ZERO => {
                errors.push("Annual Income must not be negative".to_string());
                None
            }
            Ok(income) => Some(income),
            Err(_) => {
                errors.push("Annual Income must be a valid number".to_string());
                None
            }
        }
    }

    fn parse_deductions(
        &self,
        errors: &mut Vec<String>,
    ) -> DeductionSet {
        let mut set = DeductionSet::new();

        for entry in &self.deductions {
            let Some((name, amount)) = entry.split_once('=') else {
                errors.push(format!("Deduction '{entry}' must look like KEY=AMOUNT"));
                continue;
            };
            let Some(key) = DeductionKey::parse(name) else {
                errors.push(format!("Deduction '{}' is not recognised", name.trim()));
                continue;
            };
            let amount = match parse_decimal(amount) {
                Ok(amount) => amount,
                Err(_) => {
                    errors.push(format!("{} must be a valid number", key.label()));
                    continue;
                }
            };
            if set.insert(key, amount).is_err() {
                errors.push(format!("{} must not be negative", key.label()));
            }
        }

        set
    }
}

/// Everything the calculator shows for one income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub fiscal_year: FiscalYear,
    pub selected_regime: TaxRegime,
    pub new_regime: TaxResult,
    pub old_regime: TaxResult,
    pub comparison: ComparisonResult,
}

impl Report {
    pub fn selected(&self) -> &TaxResult {
        match self.selected_regime {
            TaxRegime::New => &self.new_regime,
            TaxRegime::Old => &self.old_regime,
        }
    }
}

/// Runs both regimes through the engine and assembles a [`Report`].
pub fn calculate(
    policy: &TaxPolicy,
    input: &CalculatorInput,
) -> Result<Report, TaxEngineError> {
    let engine = TaxEngine::new(policy);
    let deductions = (!input.deductions.is_empty()).then_some(&input.deductions);

    let (new_regime, old_regime) = engine.compute_both(input.income, deductions)?;
    let comparison = ComparisonResult::new(new_regime.tax_payable, old_regime.tax_payable);

    debug!(
        income = %input.income,
        selected = %input.regime,
        recommended = %comparison.recommended_regime,
        "report calculated"
    );

    Ok(Report {
        fiscal_year: policy.fiscal_year,
        selected_regime: input.regime,
        new_regime,
        old_regime,
        comparison,
    })
}

/// Chooses the policy to calculate with.
///
/// Without `slabs` the built-in FY 2023-24 policy is used. With `slabs`, the
/// file (and optional `caps` file) is loaded and the requested fiscal year,
/// or the latest year in the file, is selected.
pub fn load_policy(
    slabs: Option<&Path>,
    caps: Option<&Path>,
    fiscal_year: Option<&str>,
) -> Result<TaxPolicy> {
    let fiscal_year = fiscal_year
        .map(|s| FiscalYear::parse(s).with_context(|| format!("invalid fiscal year '{s}'")))
        .transpose()?;

    let Some(slabs) = slabs else {
        if caps.is_some() {
            bail!("a deduction cap file needs a slab file");
        }
        let builtin = TaxPolicy::builtin();
        if let Some(year) = fiscal_year.filter(|year| *year != builtin.fiscal_year) {
            bail!(
                "no built-in policy for {year}; only {} is built in",
                builtin.fiscal_year
            );
        }
        return Ok(builtin.clone());
    };

    let slab_file =
        File::open(slabs).with_context(|| format!("Failed to open: {}", slabs.display()))?;
    let cap_file = caps
        .map(|path| File::open(path).with_context(|| format!("Failed to open: {}", path.display())))
        .transpose()?;

    let mut policies = PolicyLoader::load(slab_file, cap_file)
        .with_context(|| format!("Failed to load policy from: {}", slabs.display()))?;

    let year = match fiscal_year {
        Some(year) => year,
        None => *policies
            .keys()
            .next_back()
            .with_context(|| format!("{} contains no slabs", slabs.display()))?,
    };
    let policy = policies
        .remove(&year)
        .with_context(|| format!("{} has no slabs for {year}", slabs.display()))?;

    info!(fiscal_year = %year, file = %slabs.display(), "loaded tax policy");
    Ok(policy)
}
