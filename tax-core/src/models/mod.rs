mod deduction;
mod fiscal_year;
mod regime;
mod slab_table;
mod tax_policy;
mod tax_result;

pub use deduction::{DeductionCaps, DeductionKey, DeductionSet};
pub use fiscal_year::FiscalYear;
pub use regime::TaxRegime;
pub use slab_table::{SlabBracket, SlabTable, SlabTableError};
pub use tax_policy::TaxPolicy;
pub use tax_result::{ComparisonResult, SlabTax, TaxResult};
