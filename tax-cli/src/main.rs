use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tax_cli::app::{self, CalculatorForm};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Indian income tax calculator.
///
/// Computes tax under the selected regime, compares it with the other
/// regime, and recommends the cheaper one.
#[derive(Debug, Parser)]
#[command(name = "tax-compare", version, about)]
struct Cli {
    /// Annual gross income, e.g. `12,00,000`.
    #[arg(long)]
    income: String,

    /// Regime to report as selected: `new` or `old`.
    #[arg(long, default_value = "new")]
    regime: String,

    /// Deduction claim for the old regime. Repeatable.
    /// Keys: section80C, section80D, homeLoanInterest, section80E, section80G.
    #[arg(long = "deduction", value_name = "KEY=AMOUNT")]
    deductions: Vec<String>,

    /// CSV of slab schedules (`fiscal_year,regime,min_income,max_income,rate`).
    #[arg(long)]
    policy_slabs: Option<PathBuf>,

    /// CSV of deduction caps (`fiscal_year,deduction,cap`). Needs `--policy-slabs`.
    #[arg(long)]
    policy_caps: Option<PathBuf>,

    /// Fiscal year to use, e.g. `2024-25`. Defaults to the latest available.
    #[arg(long)]
    fiscal_year: Option<String>,

    /// Print the report as JSON instead of text.
    #[arg(long)]
    json: bool,
}

// ─── tracing ─────────────────────────────────────────────────────────────────

/// Initialise the tracing subscriber.
///
/// * Honours `RUST_LOG` when set.
/// * Falls back to `info`.
/// * Writes to stderr so `--json` output stays clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let policy = app::load_policy(
        cli.policy_slabs.as_deref(),
        cli.policy_caps.as_deref(),
        cli.fiscal_year.as_deref(),
    )?;

    let form = CalculatorForm {
        income: cli.income,
        regime: cli.regime,
        deductions: cli.deductions,
    };
    let input = form.validate()?;
    debug!(?input, "validated input");

    let report = app::calculate(&policy, &input).context("Failed to calculate tax")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_collects_repeated_deductions() {
        let cli = Cli::parse_from([
            "tax-compare",
            "--income",
            "1200000",
            "--regime",
            "old",
            "--deduction",
            "section80C=150000",
            "--deduction",
            "section80D=25000",
        ]);

        assert_eq!(cli.deductions, vec!["section80C=150000", "section80D=25000"]);
        assert!(!cli.json);
        assert!(cli.policy_slabs.is_none());
    }
}
