//! Income tax calculations for the new and old regimes.
//!
//! Policy data (slabs, caps) lives in [`crate::models`]; this module holds
//! only the algorithms that walk it.

pub mod common;
pub mod deductions;
pub mod input;
pub mod slabs;
pub mod tax_engine;

pub use input::{compare_regimes, compute_tax};
pub use tax_engine::{InvalidReason, TaxEngine, TaxEngineError};
