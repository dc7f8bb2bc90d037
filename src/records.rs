//! Tax-filing-unit record sample
//!
//! The central entity: typed columns for every registry variable, the blowup
//! factor table, and the sample-weight table, together with the year
//! controller that advances the sample through calendar years.

use rustc_hash::FxHashSet;

use crate::columns::ColumnStore;
use crate::error::{RecordsError, Result};
use crate::factors::{FactorTable, PUF_2009_FACTORS, PUF_YEAR};
use crate::loader::{self, LoadedSample, TableSource};
use crate::schema;
use crate::validate;
use crate::weights::WeightTable;

/// Variables extrapolated by the aggregate-price-index factor ATXPY
const ATXPY_VARS: [&str; 32] = [
    "e00700", "e00800", "e01400", "e01500", "e01700", "e03150", "e03210", "e03220", "e03230",
    "e03300", "e03400", "e03500", "e07240", "e07260", "p08000", "e09700", "e09800", "e09900",
    "e11200", "e18400", "e18500", "e19800", "e20100", "e20400", "e20500", "e07600", "e32800",
    "e58990", "e62900", "e87530", "p87521", "cmbtp",
];

/// A cross-sectional sample of tax-filing-unit records
///
/// Constructed once from raw data, then mutated in place as the current year
/// advances; the sample is never replaced, only mutated or rescaled.
#[derive(Debug)]
pub struct Records {
    dim: usize,
    index: Vec<usize>,
    columns: ColumnStore,
    ignored_vars: FxHashSet<String>,
    factors: FactorTable,
    weights: WeightTable,
    current_year: i64,
}

impl Records {
    /// Construct a record sample
    ///
    /// # Arguments
    /// * `data` - raw records, an in-memory batch or a CSV path (`.gz` ok);
    ///   [`TableSource::Empty`] is rejected
    /// * `exact_calculations` - whether downstream calculations skip the
    ///   smoothing of stair-step provisions (fills the `_exact` flag)
    /// * `blowup_factors` - blowup-factor source; `Empty` for no factors
    /// * `weights` - sample-weight source; `Empty` for no weights
    /// * `base_year` - calendar year of the raw data
    ///
    /// Loads and classifies the data, checks the split-earnings identities,
    /// loads and normalizes the factor table, rescales the weight table when
    /// its row count differs from the sample's, and, when `base_year` is the
    /// factor table's designated base year, bootstraps and applies the
    /// base-year factors. Any failure aborts construction.
    ///
    /// Records are assumed to sit at weight-table rows `0..dim`; for a
    /// filtered subsample use [`Records::with_index`].
    pub fn new(
        data: TableSource,
        exact_calculations: bool,
        blowup_factors: TableSource,
        weights: TableSource,
        base_year: i64,
    ) -> Result<Self> {
        Self::build(
            data,
            exact_calculations,
            blowup_factors,
            weights,
            base_year,
            None,
        )
    }

    /// Construct a record sample that is a subsample of the weight table
    ///
    /// `index` gives each record's row position in the original weight
    /// table, so weight rescaling picks the matching rows rather than the
    /// table's prefix. Must have one entry per record.
    pub fn with_index(
        data: TableSource,
        exact_calculations: bool,
        blowup_factors: TableSource,
        weights: TableSource,
        base_year: i64,
        index: Vec<usize>,
    ) -> Result<Self> {
        Self::build(
            data,
            exact_calculations,
            blowup_factors,
            weights,
            base_year,
            Some(index),
        )
    }

    fn build(
        data: TableSource,
        exact_calculations: bool,
        blowup_factors: TableSource,
        weights: TableSource,
        base_year: i64,
        index: Option<Vec<usize>>,
    ) -> Result<Self> {
        let batch = match data {
            TableSource::Batch(batch) => batch,
            TableSource::Path(path) => loader::read_csv(&path)?,
            TableSource::Empty => {
                return Err(RecordsError::InvalidInput(
                    "record data must be an in-memory table or a file path".to_string(),
                ));
            }
        };
        let LoadedSample {
            columns,
            ignored,
            dim,
            index: row_index,
        } = loader::load_sample(&batch, exact_calculations)?;
        let index = match index {
            Some(index) => {
                if index.len() != dim {
                    return Err(RecordsError::InvalidInput(format!(
                        "index has {} entries for a {dim}-record sample",
                        index.len()
                    )));
                }
                index
            }
            None => row_index,
        };
        log::info!("loaded {dim} records");
        validate::check_consistency(&columns)?;

        let factors = FactorTable::load(blowup_factors)?;
        let mut weights = WeightTable::load(weights)?;
        if !weights.is_empty() && weights.rows() != dim {
            log::info!(
                "rescaling weight table from {} to {dim} rows",
                weights.rows()
            );
            weights.rescale(&index, dim)?;
        }

        let mut records = Self {
            dim,
            index,
            columns,
            ignored_vars: ignored,
            factors,
            weights,
            current_year: base_year,
        };
        records.columns.int_mut("FLPDYR")?.fill(base_year);
        if !records.factors.is_empty() && base_year == PUF_YEAR {
            records.bootstrap_base_year()?;
        }
        records.reweight()?;
        Ok(records)
    }

    /// Current calendar year of the sample
    #[must_use]
    pub fn current_year(&self) -> i64 {
        self.current_year
    }

    /// Number of records in the sample
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Row positions retained for weight-table alignment
    #[must_use]
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    /// Names of source columns that were not recognized by the registry
    #[must_use]
    pub fn ignored_vars(&self) -> &FxHashSet<String> {
        &self.ignored_vars
    }

    /// Borrow a floating-point variable
    pub fn float(&self, name: &str) -> Result<&[f64]> {
        self.columns.float(name)
    }

    /// Mutably borrow a floating-point variable (for downstream calculators)
    pub fn float_mut(&mut self, name: &str) -> Result<&mut [f64]> {
        self.columns.float_mut(name)
    }

    /// Borrow an integer variable
    pub fn int(&self, name: &str) -> Result<&[i64]> {
        self.columns.int(name)
    }

    /// Mutably borrow an integer variable
    pub fn int_mut(&mut self, name: &str) -> Result<&mut [i64]> {
        self.columns.int_mut(name)
    }

    /// Advance the sample one calendar year
    ///
    /// Applies the new year's blowup factors and then replaces the active
    /// per-record weight `s006` from the weight table's column for that year,
    /// when it exists. Must be invoked exactly once per year transition;
    /// calling it twice for the same year compounds the factors twice.
    pub fn increment_year(&mut self) -> Result<()> {
        self.current_year += 1;
        self.blowup(self.current_year)?;
        self.reweight()
    }

    /// Set the current year directly and refill the filing-year variable
    ///
    /// Unlike [`Records::increment_year`], blowup and reweighting are
    /// skipped; this is the escape hatch for non-standard data usage.
    pub fn set_current_year(&mut self, year: i64) -> Result<()> {
        self.current_year = year;
        self.columns.int_mut("FLPDYR")?.fill(year);
        Ok(())
    }

    /// Reset every changing calculated variable to zero
    ///
    /// Read columns, the integer bookkeeping scalars `_num`/`_sep`/`_exact`,
    /// and the casualty-floor constant are left untouched, so a calculation
    /// can be re-run from a clean state in the same year.
    pub fn zero_out_changing_calculated_vars(&mut self) -> Result<()> {
        for &name in schema::CHANGING_CALCULATED_VARS.iter() {
            self.columns.float_mut(name)?.fill(0.0);
        }
        Ok(())
    }

    /// Write the fixed base-year factors into the factor table and apply them
    fn bootstrap_base_year(&mut self) -> Result<()> {
        for (name, value) in PUF_2009_FACTORS {
            self.factors.set(name, PUF_YEAR, value)?;
        }
        self.blowup(PUF_YEAR)
    }

    /// Apply the blowup factors for `year` to every extrapolated variable
    ///
    /// Mutates the monetary columns in place; the self-employment and
    /// passive-income fields pick their gain or loss multiplier per element.
    fn blowup(&mut self, year: i64) -> Result<()> {
        let awage = self.factors.factor("AWAGE", year)?;
        let aints = self.factors.factor("AINTS", year)?;
        let adivs = self.factors.factor("ADIVS", year)?;
        let atxpy = self.factors.factor("ATXPY", year)?;
        let aschci = self.factors.factor("ASCHCI", year)?;
        let aschcl = self.factors.factor("ASCHCL", year)?;
        let acgns = self.factors.factor("ACGNS", year)?;
        let aschei = self.factors.factor("ASCHEI", year)?;
        let aschel = self.factors.factor("ASCHEL", year)?;
        let aschf = self.factors.factor("ASCHF", year)?;
        let aucomp = self.factors.factor("AUCOMP", year)?;
        let asocsec = self.factors.factor("ASOCSEC", year)?;
        let acpim = self.factors.factor("ACPIM", year)?;
        let agdpn = self.factors.factor("AGDPN", year)?;
        let abook = self.factors.factor("ABOOK", year)?;
        let aipd = self.factors.factor("AIPD", year)?;

        for name in ["e00200", "e00200p", "e00200s"] {
            self.columns.scale(name, awage)?;
        }
        for name in ["e00300", "e00400"] {
            self.columns.scale(name, aints)?;
        }
        for name in ["e00600", "e00650"] {
            self.columns.scale(name, adivs)?;
        }
        for name in ATXPY_VARS {
            self.columns.scale(name, atxpy)?;
        }
        for name in ["e00900", "e00900p", "e00900s"] {
            self.columns.scale_signed(name, aschci, aschcl)?;
        }
        self.columns.scale_signed("e02000", aschei, aschel)?;
        // capital gains
        for name in ["e01100", "e01200", "p22250", "p23250", "e24515", "e24518"] {
            self.columns.scale(name, acgns)?;
        }
        // schedule F
        for name in ["e02100", "e02100p", "e02100s"] {
            self.columns.scale(name, aschf)?;
        }
        self.columns.scale("e02300", aucomp)?;
        self.columns.scale("e02400", asocsec)?;
        for name in ["e03270", "e03290", "e17500"] {
            self.columns.scale(name, acpim)?;
        }
        self.columns.scale("e03240", agdpn)?;
        for name in ["e07300", "e07400"] {
            self.columns.scale(name, abook)?;
        }
        self.columns.scale("e19200", aipd)?;
        // schedule E totals have no loss branch
        for name in ["p25470", "e26270", "e27200"] {
            self.columns.scale(name, aschei)?;
        }
        Ok(())
    }

    /// Replace the active sample weight from the current year's weight column
    ///
    /// A missing `WT<year>` column leaves `s006` unchanged.
    fn reweight(&mut self) -> Result<()> {
        let colname = format!("WT{}", self.current_year);
        let Some(raw) = self.weights.column(&colname) else {
            return Ok(());
        };
        if raw.len() != self.dim {
            return Err(RecordsError::InvalidInput(format!(
                "weight column {colname} has {} rows, sample has {}",
                raw.len(),
                self.dim
            )));
        }
        let scaled: Vec<f64> = raw.iter().map(|weight| weight * 0.01).collect();
        self.columns.float_mut("s006")?.copy_from_slice(&scaled);
        Ok(())
    }
}
