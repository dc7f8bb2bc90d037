//! Yearly blowup-factor table
//!
//! Loads the raw stage-one aggregate series, divides them by their population
//! denominators, and converts the whole table into year-over-year growth
//! multipliers. The first year of the table is left undefined by that
//! transform and must be filled by the base-year bootstrap before use.

use arrow::record_batch::RecordBatch;
use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::error::{RecordsError, Result};
use crate::loader::{self, TableSource};

/// Calendar year of the merged IRS-PUF/Census-CPS base data
pub const PUF_YEAR: i64 = 2009;

/// Conventional file name for the bundled stage-one blowup factors
pub const FACTORS_FILENAME: &str = "StageIFactors.csv";

/// Raw aggregate columns divided by the general-population denominator APOPN
const POPN_NORMALIZED: [&str; 12] = [
    "AGDPN", "ATXPY", "AWAGE", "ASCHCI", "ASCHCL", "ASCHF", "AINTS", "ADIVS", "ASCHEI", "ASCHEL",
    "ACGNS", "ABOOK",
];

/// Initial-year factors for the 2009 IRS-PUF/Census-CPS merged data
///
/// Written into the base-year row before the base-year blowup runs; factors
/// with no year-over-year source data for 2009 are identity multipliers.
pub(crate) const PUF_2009_FACTORS: [(&str, f64); 21] = [
    ("AGDPN", 1.0),
    ("ATXPY", 1.0),
    ("AWAGE", 1.0053),
    ("ASCHCI", 1.0041),
    ("ASCHCL", 1.1629),
    ("ASCHF", 1.0),
    ("AINTS", 1.0357),
    ("ADIVS", 1.0606),
    ("ASCHEI", 1.1089),
    ("ASCHEL", 1.2953),
    ("ACGNS", 1.1781),
    ("ABOOK", 1.0),
    ("ARETS", 1.0026),
    ("APOPN", 1.0),
    ("ACPIU", 1.0),
    ("APOPDEP", 1.0),
    ("ASOCSEC", 0.9941),
    ("ACPIM", 1.0),
    ("AUCOMP", 1.0034),
    ("APOPSNR", 1.0),
    ("AIPD", 1.0),
];

/// Year-indexed table of multiplicative growth factors
#[derive(Debug, Clone, Default)]
pub struct FactorTable {
    years: Vec<i64>,
    columns: FxHashMap<String, Vec<f64>>,
}

impl FactorTable {
    /// Load a factor table and normalize it into growth multipliers
    ///
    /// Accepts an in-memory batch, a file path (resolved against the
    /// filesystem and then the packaged data directory), or
    /// [`TableSource::Empty`] for an empty table.
    pub fn load(source: TableSource) -> Result<Self> {
        let mut table = match source {
            TableSource::Empty => return Ok(Self::default()),
            TableSource::Batch(batch) => Self::from_batch(&batch)?,
            TableSource::Path(path) => {
                let resolved = loader::resolve_resource(&path)?;
                log::info!("reading blowup factors from {}", resolved.display());
                Self::from_batch(&loader::read_csv(&resolved)?)?
            }
        };
        table.normalize()?;
        Ok(table)
    }

    fn from_batch(batch: &RecordBatch) -> Result<Self> {
        let batch_schema = batch.schema();
        let mut years = None;
        let mut columns = FxHashMap::default();
        for (field, array) in batch_schema.fields().iter().zip(batch.columns()) {
            if field.name() == "YEAR" {
                years = Some(loader::int64_values("YEAR", array)?);
            } else {
                columns.insert(field.name().clone(), loader::float64_values(field.name(), array)?);
            }
        }
        let years = years.ok_or_else(|| {
            RecordsError::InvalidInput("factor table has no YEAR column".to_string())
        })?;
        Ok(Self { years, columns })
    }

    /// Divide the aggregate series by their population denominators and
    /// replace every column with its ratio of consecutive years
    fn normalize(&mut self) -> Result<()> {
        // a zero-row table stays empty; the ratio transform below would
        // otherwise give every column one more entry than there are years
        if self.years.is_empty() {
            return Ok(());
        }
        let apopn = self.require("APOPN")?.to_vec();
        let apopsnr = self.require("APOPSNR")?.to_vec();
        for name in POPN_NORMALIZED {
            let column = self.require_mut(name)?;
            for (value, denom) in column.iter_mut().zip(&apopn) {
                *value /= denom;
            }
        }
        let socsec = self.require_mut("ASOCSEC")?;
        for (value, denom) in socsec.iter_mut().zip(&apopsnr) {
            *value /= denom;
        }
        // one plus percent change; the first year has no predecessor
        for column in self.columns.values_mut() {
            *column = std::iter::once(f64::NAN)
                .chain(column.iter().tuple_windows().map(|(prev, next)| next / prev))
                .collect();
        }
        Ok(())
    }

    fn require(&self, name: &str) -> Result<&[f64]> {
        self.columns
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| {
                RecordsError::InvalidInput(format!("factor table has no {name} column"))
            })
    }

    fn require_mut(&mut self, name: &str) -> Result<&mut Vec<f64>> {
        self.columns
            .get_mut(name)
            .ok_or_else(|| {
                RecordsError::InvalidInput(format!("factor table has no {name} column"))
            })
    }

    /// Whether the table holds no years at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// The calendar years covered by the table
    #[must_use]
    pub fn years(&self) -> &[i64] {
        &self.years
    }

    /// Growth multiplier for `name` in calendar year `year`
    pub fn factor(&self, name: &str, year: i64) -> Result<f64> {
        let row = self.year_row(name, year)?;
        let column = self.columns.get(name).ok_or_else(|| {
            RecordsError::MissingFactor {
                name: name.to_string(),
                year,
            }
        })?;
        Ok(column[row])
    }

    /// Overwrite the multiplier for `name` in `year`, creating an all-NaN
    /// column first when the name is new
    pub fn set(&mut self, name: &str, year: i64, value: f64) -> Result<()> {
        let row = self.year_row(name, year)?;
        let n_years = self.years.len();
        let column = self
            .columns
            .entry(name.to_string())
            .or_insert_with(|| vec![f64::NAN; n_years]);
        column[row] = value;
        Ok(())
    }

    fn year_row(&self, name: &str, year: i64) -> Result<usize> {
        self.years
            .iter()
            .position(|&y| y == year)
            .ok_or_else(|| RecordsError::MissingFactor {
                name: name.to_string(),
                year,
            })
    }
}
