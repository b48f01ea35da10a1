//! Named-column rows returned by the store gateway

use std::sync::Arc;

use rusqlite::types::Value;

use crate::error::{Error, Result};

/// A single result row with named columns
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Build a row from `(column, value)` pairs
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let (columns, values): (Vec<String>, Vec<Value>) =
            pairs.into_iter().map(|(c, v)| (c.into(), v)).unzip();
        Self {
            columns: columns.into(),
            values,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at a column position
    pub fn value_at(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Raw value for a named column
    pub fn get(&self, column: &str) -> Result<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
            .ok_or_else(|| Error::RowMapping(format!("Missing column: {}", column)))
    }

    /// Numeric column as f64, with NULL read as zero
    pub fn f64_or_zero(&self, column: &str) -> Result<f64> {
        match self.get(column)? {
            Value::Null => Ok(0.0),
            Value::Integer(i) => Ok(*i as f64),
            Value::Real(r) => Ok(*r),
            // Decimal aggregates can come back as text
            Value::Text(t) => t.trim().parse::<f64>().map_err(|_| {
                Error::RowMapping(format!("Column {} is not numeric: {}", column, t))
            }),
            Value::Blob(_) => Err(Error::RowMapping(format!(
                "Column {} is a blob, expected a number",
                column
            ))),
        }
    }

    /// Integer column, with NULL read as zero
    pub fn i64_or_zero(&self, column: &str) -> Result<i64> {
        match self.get(column)? {
            Value::Null => Ok(0),
            Value::Integer(i) => Ok(*i),
            Value::Real(r) if r.fract() == 0.0 => Ok(*r as i64),
            Value::Text(t) => t.trim().parse::<i64>().map_err(|_| {
                Error::RowMapping(format!("Column {} is not an integer: {}", column, t))
            }),
            other => Err(Error::RowMapping(format!(
                "Column {} is not an integer: {:?}",
                column, other
            ))),
        }
    }

    /// Required text column
    pub fn string(&self, column: &str) -> Result<String> {
        self.opt_string(column)?
            .ok_or_else(|| Error::RowMapping(format!("Column {} is NULL", column)))
    }

    /// Nullable text column
    pub fn opt_string(&self, column: &str) -> Result<Option<String>> {
        match self.get(column)? {
            Value::Null => Ok(None),
            Value::Text(t) => Ok(Some(t.clone())),
            Value::Integer(i) => Ok(Some(i.to_string())),
            Value::Real(r) => Ok(Some(r.to_string())),
            Value::Blob(_) => Err(Error::RowMapping(format!(
                "Column {} is a blob, expected text",
                column
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Row {
        Row::from_pairs([
            ("merchant", Value::Text("Kopi Kenangan".into())),
            ("spend_total_rp", Value::Integer(45_000)),
            ("tx_count", Value::Null),
            ("notes", Value::Null),
            ("ratio", Value::Real(2.5)),
            ("decimal", Value::Text("1250.50".into())),
        ])
    }

    #[test]
    fn test_missing_column() {
        let row = sample();
        assert!(matches!(row.get("nope"), Err(Error::RowMapping(_))));
    }

    #[test]
    fn test_f64_coalesces_null() {
        let row = sample();
        assert_eq!(row.f64_or_zero("spend_total_rp").unwrap(), 45_000.0);
        assert_eq!(row.f64_or_zero("tx_count").unwrap(), 0.0);
        assert_eq!(row.f64_or_zero("ratio").unwrap(), 2.5);
        assert_eq!(row.f64_or_zero("decimal").unwrap(), 1250.5);
        assert!(row.f64_or_zero("merchant").is_err());
    }

    #[test]
    fn test_i64_coalesces_null() {
        let row = sample();
        assert_eq!(row.i64_or_zero("tx_count").unwrap(), 0);
        assert_eq!(row.i64_or_zero("spend_total_rp").unwrap(), 45_000);
        assert!(row.i64_or_zero("ratio").is_err());
    }

    #[test]
    fn test_strings() {
        let row = sample();
        assert_eq!(row.string("merchant").unwrap(), "Kopi Kenangan");
        assert_eq!(row.opt_string("notes").unwrap(), None);
        assert!(row.string("notes").is_err());
    }

    #[test]
    fn test_columns_and_positions() {
        let row = sample();
        assert_eq!(row.len(), 6);
        assert_eq!(row.columns()[0], "merchant");
        assert_eq!(row.value_at(1), Some(&Value::Integer(45_000)));
        assert_eq!(row.value_at(10), None);
    }
}
