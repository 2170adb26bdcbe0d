//! Integration tests that load policies from the CSV fixtures on disk and
//! run the full form-to-report path.

use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use tax_cli::app::{self, CalculatorForm};
use tax_core::{FiscalYear, TaxPolicy, TaxRegime};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("tax-data")
        .join("test-data")
        .join(name)
}

fn form(
    income: &str,
    regime: &str,
    deductions: &[&str],
) -> CalculatorForm {
    CalculatorForm {
        income: income.to_string(),
        regime: regime.to_string(),
        deductions: deductions.iter().map(|d| d.to_string()).collect(),
    }
}

#[test]
fn test_load_policy_picks_latest_year() {
    let policy = app::load_policy(Some(&fixture("slabs.csv")), None, None)
        .expect("fixture slabs should load");

    assert_eq!(policy.fiscal_year, FiscalYear::new(2024));
}

#[test]
fn test_load_policy_selects_requested_year() {
    let policy = app::load_policy(Some(&fixture("slabs.csv")), None, Some("2023-2024")).unwrap();

    assert_eq!(&policy, TaxPolicy::builtin());
}

#[test]
fn test_load_policy_missing_year_is_error() {
    let err = app::load_policy(Some(&fixture("slabs.csv")), None, Some("2030-31")).unwrap_err();

    assert!(err.to_string().contains("has no slabs for 2030-31"));
}

#[test]
fn test_report_from_loaded_policy() {
    let policy = app::load_policy(
        Some(&fixture("slabs.csv")),
        Some(&fixture("deduction_caps.csv")),
        Some("2024-25"),
    )
    .unwrap();
    let input = form("10,00,000", "old", &["section80C=150000", "section80D=60000"])
        .validate()
        .unwrap();

    let report = app::calculate(&policy, &input).unwrap();

    // new: 400000 * 5% + 300000 * 10%
    assert_eq!(report.new_regime.tax_payable, dec!(50000));
    assert_eq!(report.old_regime.total_deductions, dec!(200000));
    assert_eq!(report.old_regime.tax_payable, dec!(72500));
    assert_eq!(report.selected().regime, TaxRegime::Old);
    assert_eq!(report.comparison.recommended_regime, TaxRegime::New);
    assert_eq!(report.comparison.savings_amount, dec!(22500));
}

#[test]
fn test_report_serializes_to_json() {
    let input = form("800000", "new", &[]).validate().unwrap();
    let report = app::calculate(TaxPolicy::builtin(), &input).unwrap();

    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["fiscalYear"], "2023-24");
    assert_eq!(json["selectedRegime"], "NEW");
    assert_eq!(json["comparison"]["recommendedRegime"], "NEW");
    assert_eq!(json["newRegime"]["slabBreakdown"].as_array().map(Vec::len), Some(3));
}
