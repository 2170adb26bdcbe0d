pub mod calculations;
pub mod models;

pub use calculations::{InvalidReason, TaxEngine, TaxEngineError, compare_regimes, compute_tax};
pub use models::*;
