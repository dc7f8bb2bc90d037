//! Tabular input loading
//!
//! Turns a tabular source (an in-memory Arrow record batch or a delimited
//! text file, optionally gzip-compressed) into typed column arrays,
//! partitioning the source's columns into read, zeroed, and ignored
//! variables per the schema registry.

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, Int64Array};
use arrow::compute::{cast, concat_batches};
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use rustc_hash::FxHashSet;

use crate::columns::{Column, ColumnStore};
use crate::error::{RecordsError, Result};
use crate::factors::PUF_YEAR;
use crate::schema;

/// Reform year for the casualty-loss floor rate; 9999 means no reform
const CASUALTY_FRT_REFORM_YEAR: i64 = 9999;
/// Casualty-loss floor rate from the reform year onward
const CASUALTY_FRT_REFORM_VALUE: f64 = 0.0;

/// A tabular data source accepted by the loaders
#[derive(Debug, Clone)]
pub enum TableSource {
    /// Data already in memory as an Arrow record batch
    Batch(RecordBatch),
    /// Path to a delimited text file, gzip-compressed when it ends in `.gz`
    Path(PathBuf),
    /// No data; loaders that allow it produce an empty table
    Empty,
}

impl From<RecordBatch> for TableSource {
    fn from(batch: RecordBatch) -> Self {
        Self::Batch(batch)
    }
}

impl From<PathBuf> for TableSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for TableSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<&str> for TableSource {
    fn from(path: &str) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl From<String> for TableSource {
    fn from(path: String) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

/// Read a delimited text file into a single record batch
///
/// The file must carry a header row; a `.gz` suffix triggers gzip decoding.
/// Column types are inferred from the content.
pub fn read_csv(path: &Path) -> Result<RecordBatch> {
    let mut raw = Vec::new();
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        flate2::read::GzDecoder::new(file).read_to_end(&mut raw)?;
    } else {
        let mut file = file;
        file.read_to_end(&mut raw)?;
    }
    let format = Format::default().with_header(true);
    let (inferred, _) = format.infer_schema(Cursor::new(raw.as_slice()), None)?;
    let inferred = Arc::new(inferred);
    let reader = ReaderBuilder::new(inferred.clone())
        .with_format(format)
        .build(Cursor::new(raw.as_slice()))?;
    let mut batches = Vec::new();
    for batch in reader {
        batches.push(batch?);
    }
    if batches.is_empty() {
        return Ok(RecordBatch::new_empty(inferred));
    }
    Ok(concat_batches(&inferred, &batches)?)
}

/// Resolve a file path, falling back to the data directory packaged with the
/// crate when the path does not exist on the filesystem
pub fn resolve_resource(path: &Path) -> Result<PathBuf> {
    if path.is_file() {
        return Ok(path.to_path_buf());
    }
    if let Some(name) = path.file_name() {
        let packaged = Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join(name);
        if packaged.is_file() {
            log::info!("resolved {} to packaged {}", path.display(), packaged.display());
            return Ok(packaged);
        }
    }
    Err(RecordsError::ResourceNotFound(path.to_path_buf()))
}

/// Extract a batch column as `i64` values, casting where needed
pub(crate) fn int64_values(name: &str, array: &ArrayRef) -> Result<Vec<i64>> {
    let cast_array = cast(array.as_ref(), &DataType::Int64)?;
    let values = cast_array
        .as_any()
        .downcast_ref::<Int64Array>()
        .ok_or_else(|| RecordsError::InvalidInput(format!("column {name} is not numeric")))?;
    if values.null_count() > 0 {
        return Err(RecordsError::InvalidInput(format!(
            "column {name} contains null values"
        )));
    }
    Ok(values.values().to_vec())
}

/// Extract a batch column as `f64` values, casting where needed
pub(crate) fn float64_values(name: &str, array: &ArrayRef) -> Result<Vec<f64>> {
    let cast_array = cast(array.as_ref(), &DataType::Float64)?;
    let values = cast_array
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| RecordsError::InvalidInput(format!("column {name} is not numeric")))?;
    if values.null_count() > 0 {
        return Err(RecordsError::InvalidInput(format!(
            "column {name} contains null values"
        )));
    }
    Ok(values.values().to_vec())
}

/// A raw sample classified against the schema registry
#[derive(Debug)]
pub struct LoadedSample {
    /// Typed columns for every registry variable
    pub columns: ColumnStore,
    /// Source columns outside the registry, kept by name only
    pub ignored: FxHashSet<String>,
    /// Number of records
    pub dim: usize,
    /// Row positions, retained for alignment with the weight table
    pub index: Vec<usize>,
}

/// Classify a record batch against the schema registry and materialize a
/// typed column for every registry variable
///
/// Recognized source columns are read with their registry type; recognized
/// but absent variables and all calculated variables are zero-initialized.
/// The derived filing-unit variables (`_num`, `_sep`, `_exact`, and the
/// casualty-loss floor) are written before returning.
pub fn load_sample(batch: &RecordBatch, exact_calculations: bool) -> Result<LoadedSample> {
    let dim = batch.num_rows();
    let batch_schema = batch.schema();
    let mut columns = ColumnStore::default();
    let mut ignored = FxHashSet::default();
    let mut read: FxHashSet<&'static str> = FxHashSet::default();

    for (field, array) in batch_schema.fields().iter().zip(batch.columns()) {
        let name = field.name().as_str();
        match schema::USABLE_READ_VARS.get(name).copied() {
            Some(canonical) => {
                let column = if schema::INTEGER_READ_VARS.contains(name) {
                    Column::Int(int64_values(name, array)?)
                } else {
                    Column::Float(float64_values(name, array)?)
                };
                columns.insert(canonical, column);
                read.insert(canonical);
            }
            None => {
                ignored.insert(name.to_string());
            }
        }
    }
    if !ignored.is_empty() {
        log::debug!("ignoring {} unrecognized column(s)", ignored.len());
    }

    let mut missing: Vec<&str> = schema::MUST_READ_VARS
        .iter()
        .filter(|name| !read.contains(*name))
        .copied()
        .collect();
    if !missing.is_empty() {
        missing.sort_unstable();
        return Err(RecordsError::Schema(format!(
            "input data is missing required variable(s): {}",
            missing.join(", ")
        )));
    }

    for &name in schema::USABLE_READ_VARS.iter() {
        if !read.contains(name) {
            columns.insert(name, zeroed(name, dim));
        }
    }
    for &name in schema::CALCULATED_VARS.iter() {
        columns.insert(name, zeroed(name, dim));
    }

    derive_filing_unit_vars(&mut columns, exact_calculations)?;

    Ok(LoadedSample {
        columns,
        ignored,
        dim,
        index: (0..dim).collect(),
    })
}

fn zeroed(name: &str, dim: usize) -> Column {
    if schema::is_integer_var(name) {
        Column::Int(vec![0; dim])
    } else {
        Column::Float(vec![0.0; dim])
    }
}

/// Fill the variables derived once at load time from the filing-status code
fn derive_filing_unit_vars(columns: &mut ColumnStore, exact_calculations: bool) -> Result<()> {
    let mars = columns.int("MARS")?.to_vec();
    for (num, code) in columns.int_mut("_num")?.iter_mut().zip(&mars) {
        *num = if *code == 2 { 2 } else { 1 };
    }
    for (sep, code) in columns.int_mut("_sep")?.iter_mut().zip(&mars) {
        *sep = if *code == 3 || *code == 6 { 2 } else { 1 };
    }
    columns
        .int_mut("_exact")?
        .fill(i64::from(exact_calculations));
    let casualty_frt = if PUF_YEAR < CASUALTY_FRT_REFORM_YEAR {
        0.10
    } else {
        CASUALTY_FRT_REFORM_VALUE
    };
    columns
        .float_mut("ID_Casualty_frt_in_pufcsv_year")?
        .fill(casualty_frt);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_batch() -> RecordBatch {
        let recid = Arc::new(Int64Array::from(vec![1, 2, 3])) as ArrayRef;
        let mars = Arc::new(Int64Array::from(vec![1, 2, 3])) as ArrayRef;
        let wage = Arc::new(Float64Array::from(vec![1000.0, 0.0, 0.0])) as ArrayRef;
        let junk = Arc::new(Float64Array::from(vec![9.0, 9.0, 9.0])) as ArrayRef;
        RecordBatch::try_from_iter(vec![
            ("RECID", recid),
            ("MARS", mars),
            ("e00200", wage),
            ("not_a_var", junk),
        ])
        .unwrap()
    }

    #[test]
    fn test_load_sample_classification() {
        let loaded = load_sample(&sample_batch(), false).unwrap();
        assert_eq!(loaded.dim, 3);
        assert_eq!(loaded.index, vec![0, 1, 2]);
        // read column keeps its values
        assert_eq!(loaded.columns.float("e00200").unwrap(), &[1000.0, 0.0, 0.0]);
        // recognized-but-absent variables are zeroed with the registry type
        assert_eq!(loaded.columns.float("e00300").unwrap(), &[0.0; 3]);
        assert_eq!(loaded.columns.int("XTOT").unwrap(), &[0; 3]);
        // calculated variables are zeroed
        assert_eq!(loaded.columns.float("c00100").unwrap(), &[0.0; 3]);
        // unrecognized columns are ignored, not materialized
        assert!(loaded.ignored.contains("not_a_var"));
        assert!(!loaded.columns.contains("not_a_var"));
    }

    #[test]
    fn test_load_sample_derived_vars() {
        let loaded = load_sample(&sample_batch(), true).unwrap();
        assert_eq!(loaded.columns.int("_num").unwrap(), &[1, 2, 1]);
        assert_eq!(loaded.columns.int("_sep").unwrap(), &[1, 1, 2]);
        assert_eq!(loaded.columns.int("_exact").unwrap(), &[1, 1, 1]);
        assert_eq!(
            loaded
                .columns
                .float("ID_Casualty_frt_in_pufcsv_year")
                .unwrap(),
            &[0.10; 3]
        );
    }

    #[test]
    fn test_load_sample_missing_required_var() {
        let mars = Arc::new(Int64Array::from(vec![1, 2])) as ArrayRef;
        let batch = RecordBatch::try_from_iter(vec![("MARS", mars)]).unwrap();
        let err = load_sample(&batch, false).unwrap_err();
        assert!(matches!(err, RecordsError::Schema(_)));
        assert!(err.to_string().contains("RECID"));
    }

    #[test]
    fn test_resolve_resource_not_found() {
        let err = resolve_resource(Path::new("no/such/file.csv")).unwrap_err();
        assert!(matches!(err, RecordsError::ResourceNotFound(_)));
    }
}
