use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A contiguous income range taxed at a single marginal rate.
///
/// The range is half-open: `[lower_bound, upper_bound)`. An `upper_bound` of
/// `None` means the bracket extends without limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlabBracket {
    pub lower_bound: Decimal,
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
}

impl SlabBracket {
    pub fn new(
        lower_bound: Decimal,
        upper_bound: Option<Decimal>,
        rate: Decimal,
    ) -> Self {
        Self {
            lower_bound,
            upper_bound,
            rate,
        }
    }

    /// Returns the part of `income` that falls inside this bracket.
    pub fn portion_of(
        &self,
        income: Decimal,
    ) -> Decimal {
        if income <= self.lower_bound {
            return Decimal::ZERO;
        }
        let top = match self.upper_bound {
            Some(upper) => income.min(upper),
            None => income,
        };
        top - self.lower_bound
    }

    /// True when the last unit of `income` is taxed in this bracket,
    /// i.e. `lower_bound < income <= upper_bound`.
    pub fn holds_last_unit_of(
        &self,
        income: Decimal,
    ) -> bool {
        income > self.lower_bound && self.upper_bound.is_none_or(|upper| income <= upper)
    }
}

/// Reasons a bracket list cannot be used as a slab table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlabTableError {
    #[error("slab table has no brackets")]
    Empty,

    #[error("first bracket must start at 0, got {0}")]
    NonZeroStart(Decimal),

    #[error("bracket {index} starts at {found}, expected {expected}")]
    Discontinuous {
        index: usize,
        expected: Decimal,
        found: Decimal,
    },

    #[error("bracket {index} upper bound {upper} is not above its lower bound {lower}")]
    EmptyRange {
        index: usize,
        lower: Decimal,
        upper: Decimal,
    },

    #[error("bracket {0} is unbounded but is not the last bracket")]
    UnboundedBeforeEnd(usize),

    #[error("last bracket must be unbounded, got upper bound {0}")]
    BoundedFinalBracket(Decimal),

    #[error("bracket {index} rate must be in [0, 1), got {rate}")]
    InvalidRate { index: usize, rate: Decimal },
}

/// An ordered, gap-free sequence of brackets starting at zero whose final
/// bracket is unbounded.
///
/// The invariants are checked once in [`SlabTable::new`]; every other method
/// relies on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SlabBracket>", into = "Vec<SlabBracket>")]
pub struct SlabTable {
    brackets: Vec<SlabBracket>,
}

impl SlabTable {
    /// Validates `brackets` and wraps them in a table.
    ///
    /// # Errors
    ///
    /// Returns [`SlabTableError`] if the list is empty, does not start at 0,
    /// has gaps or overlaps, has a bounded final bracket, or carries a rate
    /// outside `[0, 1)`.
    pub fn new(brackets: Vec<SlabBracket>) -> Result<Self, SlabTableError> {
        let first = brackets.first().ok_or(SlabTableError::Empty)?;
        if !first.lower_bound.is_zero() {
            return Err(SlabTableError::NonZeroStart(first.lower_bound));
        }

        let last_index = brackets.len() - 1;
        let mut expected_lower = Decimal::ZERO;

        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.lower_bound != expected_lower {
                return Err(SlabTableError::Discontinuous {
                    index,
                    expected: expected_lower,
                    found: bracket.lower_bound,
                });
            }
            if bracket.rate < Decimal::ZERO || bracket.rate >= Decimal::ONE {
                return Err(SlabTableError::InvalidRate {
                    index,
                    rate: bracket.rate,
                });
            }

            match bracket.upper_bound {
                Some(upper) if index == last_index => {
                    return Err(SlabTableError::BoundedFinalBracket(upper));
                }
                Some(upper) if upper <= bracket.lower_bound => {
                    return Err(SlabTableError::EmptyRange {
                        index,
                        lower: bracket.lower_bound,
                        upper,
                    });
                }
                Some(upper) => expected_lower = upper,
                None if index != last_index => {
                    return Err(SlabTableError::UnboundedBeforeEnd(index));
                }
                None => {}
            }
        }

        Ok(Self { brackets })
    }

    /// Builds a table from `(lower_bound, rate)` steps. Upper bounds are taken
    /// from the next step's lower bound.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use tax_core::SlabTable;
    ///
    /// let table = SlabTable::from_steps(&[
    ///     (dec!(0), dec!(0)),
    ///     (dec!(250000), dec!(0.05)),
    ///     (dec!(500000), dec!(0.20)),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(table.brackets()[1].upper_bound, Some(dec!(500000)));
    /// assert_eq!(table.brackets()[2].upper_bound, None);
    /// ```
    pub fn from_steps(steps: &[(Decimal, Decimal)]) -> Result<Self, SlabTableError> {
        let brackets = steps
            .iter()
            .enumerate()
            .map(|(i, &(lower, rate))| {
                let upper = steps.get(i + 1).map(|&(next_lower, _)| next_lower);
                SlabBracket::new(lower, upper, rate)
            })
            .collect();

        Self::new(brackets)
    }

    /// Wraps brackets already known to satisfy the table invariants.
    pub(crate) fn from_trusted(brackets: Vec<SlabBracket>) -> Self {
        debug_assert!(Self::new(brackets.clone()).is_ok());
        Self { brackets }
    }

    pub fn brackets(&self) -> &[SlabBracket] {
        &self.brackets
    }

    /// The rate of the final, unbounded bracket.
    pub fn top_rate(&self) -> Decimal {
        self.brackets
            .last()
            .map(|b| b.rate)
            .unwrap_or(Decimal::ZERO)
    }

    /// Boundaries between consecutive brackets, in ascending order.
    pub fn thresholds(&self) -> impl Iterator<Item = Decimal> + '_ {
        self.brackets.iter().filter_map(|b| b.upper_bound)
    }
}

impl TryFrom<Vec<SlabBracket>> for SlabTable {
    type Error = SlabTableError;

    fn try_from(brackets: Vec<SlabBracket>) -> Result<Self, Self::Error> {
        Self::new(brackets)
    }
}

impl From<SlabTable> for Vec<SlabBracket> {
    fn from(table: SlabTable) -> Self {
        table.brackets
    }
}
