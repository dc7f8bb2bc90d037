//! Typed column storage for the record sample
//!
//! Columns are materialized as an explicit mapping from variable name to a
//! homogeneous numeric array, accessed through lookup methods rather than
//! dynamically-named attributes. Names come from the schema registry, so keys
//! are `&'static str`.

use rustc_hash::FxHashMap;

use crate::error::{RecordsError, Result};

/// A homogeneous per-record column
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Integer-typed variable
    Int(Vec<i64>),
    /// Floating-point variable
    Float(Vec<f64>),
}

impl Column {
    /// Number of records in the column
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Column::Int(values) => values.len(),
            Column::Float(values) => values.len(),
        }
    }

    /// Whether the column holds no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Mapping from variable name to typed column
#[derive(Debug, Clone, Default)]
pub struct ColumnStore {
    columns: FxHashMap<&'static str, Column>,
}

impl ColumnStore {
    /// Insert or replace a column under the given registry name
    pub fn insert(&mut self, name: &'static str, column: Column) {
        self.columns.insert(name, column);
    }

    /// Whether a column with this name exists
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Iterate over the stored column names
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.keys().copied()
    }

    /// Borrow a floating-point column
    pub fn float(&self, name: &str) -> Result<&[f64]> {
        match self.columns.get(name) {
            Some(Column::Float(values)) => Ok(values),
            Some(Column::Int(_)) => Err(RecordsError::Schema(format!(
                "variable {name} is integer-typed, expected float"
            ))),
            None => Err(RecordsError::UnknownVariable(name.to_string())),
        }
    }

    /// Mutably borrow a floating-point column
    pub fn float_mut(&mut self, name: &str) -> Result<&mut [f64]> {
        match self.columns.get_mut(name) {
            Some(Column::Float(values)) => Ok(values),
            Some(Column::Int(_)) => Err(RecordsError::Schema(format!(
                "variable {name} is integer-typed, expected float"
            ))),
            None => Err(RecordsError::UnknownVariable(name.to_string())),
        }
    }

    /// Borrow an integer column
    pub fn int(&self, name: &str) -> Result<&[i64]> {
        match self.columns.get(name) {
            Some(Column::Int(values)) => Ok(values),
            Some(Column::Float(_)) => Err(RecordsError::Schema(format!(
                "variable {name} is float-typed, expected integer"
            ))),
            None => Err(RecordsError::UnknownVariable(name.to_string())),
        }
    }

    /// Mutably borrow an integer column
    pub fn int_mut(&mut self, name: &str) -> Result<&mut [i64]> {
        match self.columns.get_mut(name) {
            Some(Column::Int(values)) => Ok(values),
            Some(Column::Float(_)) => Err(RecordsError::Schema(format!(
                "variable {name} is float-typed, expected integer"
            ))),
            None => Err(RecordsError::UnknownVariable(name.to_string())),
        }
    }

    /// Multiply every value of a float column in place
    pub fn scale(&mut self, name: &str, factor: f64) -> Result<()> {
        for value in self.float_mut(name)? {
            *value *= factor;
        }
        Ok(())
    }

    /// Elementwise sign-dependent multiply of a float column
    ///
    /// Each value independently picks its multiplier based on its own sign:
    /// `gain` when the value is non-negative, `loss` when negative.
    pub fn scale_signed(&mut self, name: &str, gain: f64, loss: f64) -> Result<()> {
        for value in self.float_mut(name)? {
            *value *= if *value >= 0.0 { gain } else { loss };
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ColumnStore {
        let mut columns = ColumnStore::default();
        columns.insert("e00900", Column::Float(vec![100.0, -50.0, 0.0]));
        columns.insert("MARS", Column::Int(vec![1, 2, 3]));
        columns
    }

    #[test]
    fn test_scale() {
        let mut columns = store();
        columns.scale("e00900", 2.0).unwrap();
        assert_eq!(columns.float("e00900").unwrap(), &[200.0, -100.0, 0.0]);
    }

    #[test]
    fn test_scale_signed_is_elementwise() {
        let mut columns = store();
        columns.scale_signed("e00900", 2.0, 3.0).unwrap();
        // zero counts as non-negative
        assert_eq!(columns.float("e00900").unwrap(), &[200.0, -150.0, 0.0]);
    }

    #[test]
    fn test_lookup_errors() {
        let mut columns = store();
        assert!(matches!(
            columns.float("nope"),
            Err(RecordsError::UnknownVariable(_))
        ));
        assert!(matches!(
            columns.float("MARS"),
            Err(RecordsError::Schema(_))
        ));
        assert!(matches!(
            columns.int_mut("e00900"),
            Err(RecordsError::Schema(_))
        ));
    }
}
