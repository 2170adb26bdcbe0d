use std::collections::BTreeMap;
use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{
    DeductionCaps, DeductionKey, FiscalYear, SlabBracket, SlabTable, SlabTableError, TaxPolicy,
    TaxRegime,
};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when loading policy data.
#[derive(Debug, Error)]
pub enum PolicyLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid fiscal year: {0}")]
    InvalidFiscalYear(String),

    #[error("Invalid regime: {0}")]
    InvalidRegime(String),

    #[error("Invalid deduction: {0}")]
    InvalidDeduction(String),

    #[error("Negative cap {cap} for {deduction} in {fiscal_year}")]
    NegativeCap {
        fiscal_year: FiscalYear,
        deduction: DeductionKey,
        cap: Decimal,
    },

    #[error("Fiscal year {0} has no {1} regime slabs")]
    MissingRegime(FiscalYear, TaxRegime),

    #[error("Deduction caps given for fiscal year {0}, which has no slabs")]
    CapsWithoutSlabs(FiscalYear),

    #[error("Invalid {regime} slab table for {fiscal_year}: {source}")]
    InvalidSlabTable {
        fiscal_year: FiscalYear,
        regime: TaxRegime,
        #[source]
        source: SlabTableError,
    },
}

impl From<csv::Error> for PolicyLoaderError {
    fn from(err: csv::Error) -> Self {
        PolicyLoaderError::CsvParse(err.to_string())
    }
}

fn parse_fiscal_year(s: &str) -> Result<FiscalYear, PolicyLoaderError> {
    FiscalYear::parse(s).ok_or_else(|| PolicyLoaderError::InvalidFiscalYear(s.to_string()))
}

/// A single row of the slab CSV file.
///
/// - `fiscal_year`: e.g. `2023-24`
/// - `regime`: `NEW` or `OLD`
/// - `min_income`: lower bound of the slab
/// - `max_income`: upper bound of the slab (empty for the top slab)
/// - `rate`: marginal rate as a decimal (e.g. 0.05 for 5%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SlabRecord {
    pub fiscal_year: String,
    pub regime: String,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub rate: Decimal,
}

/// A single row of the deduction cap CSV file. An empty `cap` means the
/// deduction is unlimited for that year.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DeductionCapRecord {
    pub fiscal_year: String,
    pub deduction: String,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub cap: Option<Decimal>,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

fn parse_csv<R, T>(reader: R) -> Result<Vec<T>, PolicyLoaderError>
where
    R: Read,
    T: for<'de> Deserialize<'de>,
{
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();

    for result in csv_reader.deserialize() {
        let record: T = result?;
        records.push(record);
    }

    Ok(records)
}

/// Reader for slab table CSV files.
pub struct SlabScheduleLoader;

impl SlabScheduleLoader {
    /// Parse slab records from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or a
    /// byte slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<SlabRecord>, PolicyLoaderError> {
        let records = parse_csv(reader)?;
        debug!(count = records.len(), "parsed slab records");
        Ok(records)
    }
}

/// Reader for deduction cap CSV files.
pub struct DeductionCapLoader;

impl DeductionCapLoader {
    pub fn parse<R: Read>(reader: R) -> Result<Vec<DeductionCapRecord>, PolicyLoaderError> {
        let records = parse_csv(reader)?;
        debug!(count = records.len(), "parsed deduction cap records");
        Ok(records)
    }
}

/// Assembles parsed records into one [`TaxPolicy`] per fiscal year.
pub struct PolicyLoader;

impl PolicyLoader {
    /// Builds policies from slab and cap records.
    ///
    /// For each fiscal year in `slabs`:
    /// 1. Group the rows by regime; both regimes must be present
    /// 2. Sort each regime's rows by `min_income`
    /// 3. Validate them as a [`SlabTable`]
    /// 4. Start from the default deduction caps and apply that year's cap rows
    ///
    /// Row order in the file does not matter.
    pub fn build(
        slabs: &[SlabRecord],
        caps: &[DeductionCapRecord],
    ) -> Result<BTreeMap<FiscalYear, TaxPolicy>, PolicyLoaderError> {
        let mut grouped: BTreeMap<FiscalYear, BTreeMap<TaxRegime, Vec<SlabBracket>>> =
            BTreeMap::new();

        for record in slabs {
            let fiscal_year = parse_fiscal_year(&record.fiscal_year)?;
            let regime = TaxRegime::parse(&record.regime)
                .ok_or_else(|| PolicyLoaderError::InvalidRegime(record.regime.clone()))?;

            grouped
                .entry(fiscal_year)
                .or_default()
                .entry(regime)
                .or_default()
                .push(SlabBracket::new(
                    record.min_income,
                    record.max_income,
                    record.rate,
                ));
        }

        let caps_by_year = Self::caps_by_year(caps, &grouped)?;

        let mut policies = BTreeMap::new();
        for (fiscal_year, mut regimes) in grouped {
            let mut table_for = |regime: TaxRegime| -> Result<SlabTable, PolicyLoaderError> {
                let mut brackets = regimes
                    .remove(&regime)
                    .ok_or(PolicyLoaderError::MissingRegime(fiscal_year, regime))?;
                brackets.sort_by(|a, b| a.lower_bound.cmp(&b.lower_bound));

                SlabTable::new(brackets).map_err(|source| PolicyLoaderError::InvalidSlabTable {
                    fiscal_year,
                    regime,
                    source,
                })
            };

            let policy = TaxPolicy {
                fiscal_year,
                new_regime: table_for(TaxRegime::New)?,
                old_regime: table_for(TaxRegime::Old)?,
                deduction_caps: caps_by_year
                    .get(&fiscal_year)
                    .cloned()
                    .unwrap_or_else(TaxPolicy::default_deduction_caps),
            };
            debug!(%fiscal_year, "policy built");
            policies.insert(fiscal_year, policy);
        }

        Ok(policies)
    }

    /// Parses and builds in one step. Pass `None` for `caps` to use the
    /// default deduction caps for every year.
    pub fn load<S: Read, C: Read>(
        slabs: S,
        caps: Option<C>,
    ) -> Result<BTreeMap<FiscalYear, TaxPolicy>, PolicyLoaderError> {
        let slab_records = SlabScheduleLoader::parse(slabs)?;
        let cap_records = match caps {
            Some(reader) => DeductionCapLoader::parse(reader)?,
            None => Vec::new(),
        };

        Self::build(&slab_records, &cap_records)
    }

    fn caps_by_year<V>(
        records: &[DeductionCapRecord],
        slab_years: &BTreeMap<FiscalYear, V>,
    ) -> Result<BTreeMap<FiscalYear, DeductionCaps>, PolicyLoaderError> {
        let mut caps_by_year = BTreeMap::new();

        for record in records {
            let fiscal_year = parse_fiscal_year(&record.fiscal_year)?;
            let deduction = DeductionKey::parse(&record.deduction)
                .ok_or_else(|| PolicyLoaderError::InvalidDeduction(record.deduction.clone()))?;

            if !slab_years.contains_key(&fiscal_year) {
                return Err(PolicyLoaderError::CapsWithoutSlabs(fiscal_year));
            }
            if let Some(cap) = record.cap.filter(|cap| *cap < Decimal::ZERO) {
                return Err(PolicyLoaderError::NegativeCap {
                    fiscal_year,
                    deduction,
                    cap,
                });
            }

            caps_by_year
                .entry(fiscal_year)
                .or_insert_with(TaxPolicy::default_deduction_caps)
                .set_cap(deduction, record.cap);
        }

        Ok(caps_by_year)
    }
}
