//! Per-record sample-weight table
//!
//! One column per representable target year, named `WT<year>`, holding raw
//! population weights in hundredths (the active per-record weight is the raw
//! value times 0.01).

use arrow::record_batch::RecordBatch;
use rustc_hash::FxHashMap;

use crate::error::{RecordsError, Result};
use crate::loader::{self, TableSource};

/// Conventional file name for the bundled sample weights
pub const WEIGHTS_FILENAME: &str = "WEIGHTS.csv";

/// Row-aligned table of raw per-record population weights
#[derive(Debug, Clone, Default)]
pub struct WeightTable {
    rows: usize,
    columns: FxHashMap<String, Vec<f64>>,
}

impl WeightTable {
    /// Load a weight table from an in-memory batch, a file path (with the
    /// packaged-data fallback), or [`TableSource::Empty`] for an empty table
    pub fn load(source: TableSource) -> Result<Self> {
        match source {
            TableSource::Empty => Ok(Self::default()),
            TableSource::Batch(batch) => Self::from_batch(&batch),
            TableSource::Path(path) => {
                let resolved = loader::resolve_resource(&path)?;
                log::info!("reading sample weights from {}", resolved.display());
                Self::from_batch(&loader::read_csv(&resolved)?)
            }
        }
    }

    fn from_batch(batch: &RecordBatch) -> Result<Self> {
        let batch_schema = batch.schema();
        let mut columns = FxHashMap::default();
        for (field, array) in batch_schema.fields().iter().zip(batch.columns()) {
            columns.insert(
                field.name().clone(),
                loader::float64_values(field.name(), array)?,
            );
        }
        Ok(Self {
            rows: batch.num_rows(),
            columns,
        })
    }

    /// Whether the table holds no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Number of weight rows
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Raw weights for one target year, if that year is represented
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Subset the table to the sample's rows and rescale
    ///
    /// Every value is divided by `sample_rows / self.rows`, so the aggregate
    /// population weight is preserved under sample restriction.
    pub fn rescale(&mut self, index: &[usize], sample_rows: usize) -> Result<()> {
        if self.is_empty() || self.rows == sample_rows {
            return Ok(());
        }
        let frac = sample_rows as f64 / self.rows as f64;
        let rows = self.rows;
        for column in self.columns.values_mut() {
            let mut subset = Vec::with_capacity(index.len());
            for &row in index {
                let value = column.get(row).copied().ok_or_else(|| {
                    RecordsError::InvalidInput(format!(
                        "sample row {row} is outside the {rows}-row weight table"
                    ))
                })?;
                subset.push(value / frac);
            }
            *column = subset;
        }
        self.rows = sample_rows;
        Ok(())
    }
}
