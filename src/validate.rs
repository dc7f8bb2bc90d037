//! Cross-field consistency checks on loaded samples
//!
//! These identities must hold before any computation proceeds. They are
//! checked once at load and never re-run after extrapolation: paired fields
//! share a single multiplier, so extrapolation preserves them by
//! construction.

use crate::columns::ColumnStore;
use crate::error::{RecordsError, Result};

/// Absolute tolerance for the identities; no relative tolerance is applied
const ATOL: f64 = 0.001;

fn allclose(left: &[f64], right: &[f64]) -> bool {
    left.iter()
        .zip(right)
        .all(|(a, b)| (a - b).abs() <= ATOL)
}

/// Verify the split-earnings and dividend identities for every record
///
/// For the wage, self-employment, and farm-income families the total must
/// equal the primary-earner share plus the secondary-earner share; ordinary
/// dividends must be no less than qualified dividends.
pub fn check_consistency(columns: &ColumnStore) -> Result<()> {
    for family in ["e00200", "e00900", "e02100"] {
        let total = columns.float(family)?;
        let primary = columns.float(&format!("{family}p"))?;
        let secondary = columns.float(&format!("{family}s"))?;
        let split_sum: Vec<f64> = primary
            .iter()
            .zip(secondary)
            .map(|(p, s)| p + s)
            .collect();
        if !allclose(total, &split_sum) {
            return Err(RecordsError::DataConsistency(format!(
                "expression \"{family} == {family}p + {family}s\" is not true for every record"
            )));
        }
    }
    let ordinary = columns.float("e00600")?;
    let qualified = columns.float("e00650")?;
    let dividends_ok = ordinary.iter().zip(qualified).all(|(ord, qual)| {
        let other = (ord - qual).max(0.0);
        (ord - (qual + other)).abs() <= ATOL
    });
    if !dividends_ok {
        return Err(RecordsError::DataConsistency(
            "expression \"e00600 >= e00650\" is not true for every record".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::Column;

    fn store_with(entries: &[(&'static str, Vec<f64>)]) -> ColumnStore {
        let families = [
            "e00200", "e00200p", "e00200s",
            "e00900", "e00900p", "e00900s",
            "e02100", "e02100p", "e02100s",
            "e00600", "e00650",
        ];
        let mut columns = ColumnStore::default();
        for name in families {
            columns.insert(name, Column::Float(vec![0.0; 2]));
        }
        for (name, values) in entries {
            columns.insert(name, Column::Float(values.clone()));
        }
        columns
    }

    #[test]
    fn test_valid_splits_pass() {
        let columns = store_with(&[
            ("e00200", vec![1000.0, 40.0]),
            ("e00200p", vec![600.0, 40.0]),
            ("e00200s", vec![400.0, 0.0]),
            ("e00600", vec![10.0, 0.0]),
            ("e00650", vec![4.0, 0.0]),
        ]);
        assert!(check_consistency(&columns).is_ok());
    }

    #[test]
    fn test_tolerance_is_absolute() {
        let columns = store_with(&[
            ("e00900", vec![100.0005, 0.0]),
            ("e00900p", vec![100.0, 0.0]),
        ]);
        assert!(check_consistency(&columns).is_ok());
    }

    #[test]
    fn test_mismatched_split_fails() {
        let columns = store_with(&[
            ("e00200", vec![1000.0, 0.0]),
            ("e00200p", vec![1000.0, 0.0]),
            ("e00200s", vec![1.0, 0.0]),
        ]);
        let err = check_consistency(&columns).unwrap_err();
        assert!(matches!(err, RecordsError::DataConsistency(_)));
        assert!(err.to_string().contains("e00200"));
    }

    #[test]
    fn test_qualified_dividends_above_ordinary_fails() {
        let columns = store_with(&[
            ("e00600", vec![5.0, 0.0]),
            ("e00650", vec![10.0, 0.0]),
        ]);
        let err = check_consistency(&columns).unwrap_err();
        assert!(err.to_string().contains("e00600"));
    }
}
