//! Shared fixtures for the integration tests
#![allow(dead_code)]

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array};
use arrow::record_batch::RecordBatch;

/// Initialize test logging once; later calls are no-ops
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Years covered by the fixture factor table
pub const FACTOR_YEARS: [i64; 4] = [2009, 2010, 2011, 2012];

/// A 3-record sample: filing-status codes [1, 2, 3], wages [1000, 0, 0]
/// split evenly between primary and secondary earners, and a mixed-sign
/// self-employment column
pub fn sample_batch() -> RecordBatch {
    let mut columns: Vec<(String, ArrayRef)> = Vec::new();
    let int_cols: &[(&str, [i64; 3])] = &[("RECID", [1, 2, 3]), ("MARS", [1, 2, 3])];
    for (name, values) in int_cols {
        columns.push((
            (*name).to_string(),
            Arc::new(Int64Array::from(values.to_vec())) as ArrayRef,
        ));
    }
    let float_cols: &[(&str, [f64; 3])] = &[
        ("e00200", [1000.0, 0.0, 0.0]),
        ("e00200p", [500.0, 0.0, 0.0]),
        ("e00200s", [500.0, 0.0, 0.0]),
        ("e00900", [100.0, -50.0, 0.0]),
        ("e00900p", [100.0, -50.0, 0.0]),
        ("e00900s", [0.0, 0.0, 0.0]),
        ("e00600", [10.0, 0.0, 0.0]),
        ("e00650", [4.0, 0.0, 0.0]),
    ];
    for (name, values) in float_cols {
        columns.push((
            (*name).to_string(),
            Arc::new(Float64Array::from(values.to_vec())) as ArrayRef,
        ));
    }
    RecordBatch::try_from_iter(columns).unwrap()
}

/// Raw factor table over [`FACTOR_YEARS`] built from constant-growth series
///
/// The population denominators are held at 1.0, so after normalization each
/// column's growth multiplier equals its raw year-over-year ratio: AWAGE
/// 1.04, ASCHCI 1.02, ASCHCL 1.10, ADIVS 1.06, ASCHEI 1.05, ASCHEL 1.20, and
/// 1.0 for everything else.
pub fn factor_batch() -> RecordBatch {
    let series: &[(&str, f64, f64)] = &[
        ("AGDPN", 14700.0, 1.0),
        ("ATXPY", 1210.0, 1.0),
        ("AWAGE", 6277.1, 1.04),
        ("ASCHCI", 244.8, 1.02),
        ("ASCHCL", 29.8, 1.10),
        ("ASCHF", 8.8, 1.0),
        ("AINTS", 168.6, 1.0),
        ("ADIVS", 163.7, 1.06),
        ("ASCHEI", 498.4, 1.05),
        ("ASCHEL", 121.7, 1.20),
        ("ACGNS", 263.5, 1.0),
        ("ABOOK", 254.1, 1.0),
        ("ARETS", 791.4, 1.0),
        ("APOPN", 1.0, 1.0),
        ("ACPIU", 214.5, 1.0),
        ("APOPDEP", 94.2, 1.0),
        ("ASOCSEC", 551.2, 1.0),
        ("ACPIM", 375.6, 1.0),
        ("AUCOMP", 131.3, 1.0),
        ("APOPSNR", 1.0, 1.0),
        ("AIPD", 456.8, 1.0),
    ];
    let mut columns: Vec<(String, ArrayRef)> = vec![(
        "YEAR".to_string(),
        Arc::new(Int64Array::from(FACTOR_YEARS.to_vec())) as ArrayRef,
    )];
    for (name, base, ratio) in series {
        let values: Vec<f64> = (0..FACTOR_YEARS.len())
            .map(|k| base * ratio.powi(k as i32))
            .collect();
        columns.push((
            (*name).to_string(),
            Arc::new(Float64Array::from(values)) as ArrayRef,
        ));
    }
    RecordBatch::try_from_iter(columns).unwrap()
}

/// Weight table with `WT2009`..`WT2012` columns over the given row count
///
/// Row `i` of `WT<year>` is `(year - 2000) * 1000 + i * 100`, so the 2009
/// weights start at 9000 and each year's column is distinct.
pub fn weight_batch(rows: usize) -> RecordBatch {
    let mut columns: Vec<(String, ArrayRef)> = Vec::new();
    for year in 2009..=2012 {
        let values: Vec<f64> = (0..rows)
            .map(|i| (year - 2000) as f64 * 1000.0 + i as f64 * 100.0)
            .collect();
        columns.push((
            format!("WT{year}"),
            Arc::new(Float64Array::from(values)) as ArrayRef,
        ));
    }
    RecordBatch::try_from_iter(columns).unwrap()
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "{actual} is not close to {expected}"
    );
}
