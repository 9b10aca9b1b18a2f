//! Minimal in-memory row/column table.
//!
//! A [`Table`] holds an ordered header and ordered rows; every row has exactly one cell per
//! column. It supports column lookup, ordered iteration and per-cell equality against a
//! [`PartitionValue`], which is all the partitioner needs.

use std::fmt;

use serde::Serialize;

use crate::config::PartitionValue;

/// A single scalar cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// Value equality against the partition value.
    ///
    /// Numbers compare to integers numerically, strings compare to strings exactly, and
    /// `Null` or a type mismatch is never equal.
    #[must_use]
    pub fn matches(&self, value: &PartitionValue) -> bool {
        match (self, value) {
            (Value::Int(a), PartitionValue::Int(b)) => a == b,
            (Value::Float(a), PartitionValue::Int(b)) => *a == *b as f64,
            (Value::Str(a), PartitionValue::Str(b)) => a == b,
            _ => false,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
        }
    }
}

/// One row; cells are stored in header order.
///
/// Next to each typed cell the row keeps the text it was read from, so a value like `0001`
/// can be used verbatim even though its column was inferred as integer.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    cells: Vec<Value>,
    text: Vec<String>,
}

impl Row {
    /// Row built from typed cells; the text of each cell is its display form.
    #[must_use]
    pub fn new(cells: Vec<Value>) -> Self {
        let text = cells.iter().map(Value::to_string).collect();
        Self { cells, text }
    }

    /// Row built from typed cells and the source text each was parsed from.
    #[must_use]
    pub fn with_text(cells: Vec<Value>, text: Vec<String>) -> Self {
        Self { cells, text }
    }

    /// Cell at column index `idx`.
    #[must_use]
    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.cells.get(idx)
    }

    /// Source text of the cell at column index `idx`.
    #[must_use]
    pub fn text(&self, idx: usize) -> Option<&str> {
        self.text.get(idx).map(String::as_str)
    }
}

/// Ordered rows sharing one column set. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Build a table, rejecting rows whose width differs from the header.
    ///
    /// # Errors
    /// Returns an error naming the first offending row.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> anyhow::Result<Self> {
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.cells.len() != columns.len() || r.text.len() != columns.len())
        {
            anyhow::bail!(
                "row #{} has {} fields, header has {}",
                i + 1,
                row.cells.len(),
                columns.len()
            );
        }
        Ok(Self { columns, rows })
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of `name` in the header.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub fn row(&self, idx: usize) -> Option<&Row> {
        self.rows.get(idx)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell of row `row` in column `column`, if both exist.
    #[must_use]
    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }
}
