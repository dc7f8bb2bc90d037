//! A Rust library for loading cross-sectional tax-filing-unit microdata,
//! validating split-earnings consistency, and advancing the sample through
//! calendar years with blowup-factor extrapolation and sample reweighting.

pub mod columns;
pub mod error;
pub mod factors;
pub mod loader;
pub mod records;
pub mod schema;
pub mod validate;
pub mod weights;

// Re-export the most common types for easier use
// Core types
pub use columns::{Column, ColumnStore};
pub use error::{RecordsError, Result};
pub use records::Records;

// Table loading
pub use factors::{FACTORS_FILENAME, FactorTable, PUF_YEAR};
pub use loader::TableSource;
pub use weights::{WEIGHTS_FILENAME, WeightTable};

// Arrow types
pub use arrow::record_batch::RecordBatch;
