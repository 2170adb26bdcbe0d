//! Loads tax policy data (slab tables and deduction caps) from CSV files.

mod loader;

pub use loader::{
    DeductionCapLoader, DeductionCapRecord, PolicyLoader, PolicyLoaderError, SlabRecord,
    SlabScheduleLoader,
};
