//! Splitting a table into target and non-target rows.
//!
//! [`partition`] is a stable, total partition: every row lands in exactly one of the two
//! [`RowSubset`]s and keeps its relative order. Subsets are index views into the borrowed
//! [`Table`]; no row is copied.

use std::path::Path;

use crate::config::{Config, PartitionValue};
use crate::error::{PartitionError, Result};
use crate::io::table::{LoadOptions, load_with};
use crate::table::{Row, Table, Value};

/// Load the table at `path`, wrapping any failure in [`PartitionError::Load`].
///
/// # Errors
/// See above.
pub fn load_table(path: impl AsRef<Path>, opts: &LoadOptions) -> Result<Table> {
    let path = path.as_ref();
    load_with(path, opts).map_err(|source| PartitionError::Load {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the source table named by `cfg` with its delimiter.
///
/// # Errors
/// See [`load_table`].
pub fn load_configured(cfg: &Config) -> Result<Table> {
    let opts = LoadOptions::default().with_delimiter(cfg.delimiter());
    load_table(cfg.source_table_path(), &opts)
}

/// Fail with [`PartitionError::UnknownColumn`] if `column` is not in `table`'s header.
///
/// # Errors
/// See above.
pub fn validate_column(table: &Table, column: &str) -> Result<()> {
    if table.has_column(column) {
        Ok(())
    } else {
        Err(PartitionError::UnknownColumn {
            column: column.to_string(),
            available: table.columns().to_vec(),
        })
    }
}

/// Ordered view over a subset of a table's rows.
#[derive(Debug, Clone)]
pub struct RowSubset<'a> {
    table: &'a Table,
    indices: Vec<usize>,
}

impl<'a> RowSubset<'a> {
    /// Subset of `table` made of the rows at `indices`, in that order.
    ///
    /// Out-of-range indices are dropped.
    #[must_use]
    pub fn new(table: &'a Table, indices: Vec<usize>) -> Self {
        let indices = indices.into_iter().filter(|&i| i < table.len()).collect();
        Self { table, indices }
    }

    /// Every row of `table`.
    #[must_use]
    pub fn all(table: &'a Table) -> Self {
        Self {
            table,
            indices: (0..table.len()).collect(),
        }
    }

    #[must_use]
    pub fn table(&self) -> &'a Table {
        self.table
    }

    /// Positions in the source table, in subset order.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Rows in subset order.
    pub fn rows(&self) -> impl Iterator<Item = &'a Row> + '_ {
        self.indices.iter().filter_map(|&i| self.table.row(i))
    }

    /// `(source row index, cell)` for `column`, in subset order.
    ///
    /// Yields nothing if the column does not exist.
    pub fn column_values(&self, column: &str) -> impl Iterator<Item = (usize, &'a Value)> + '_ {
        let idx = self.table.column_index(column);
        self.indices.iter().filter_map(move |&i| {
            let c = idx?;
            Some((i, self.table.row(i)?.get(c)?))
        })
    }
}

/// The two halves of a partitioned table.
#[derive(Debug, Clone)]
pub struct Partitioned<'a> {
    pub matching: RowSubset<'a>,
    pub non_matching: RowSubset<'a>,
}

/// Split `table` on `column == value`.
///
/// Null cells and type mismatches go to `non_matching`. A missing column yields an empty
/// `matching` subset; call [`validate_column`] first to reject it instead.
///
/// ```
/// use csv_dataset_manager::partition::partition;
/// use csv_dataset_manager::{PartitionValue, Row, Table, Value};
///
/// let table = Table::new(
///     vec!["label".into()],
///     vec![
///         Row::new(vec![Value::Str("cat".into())]),
///         Row::new(vec![Value::Str("dog".into())]),
///         Row::new(vec![Value::Str("cat".into())]),
///     ],
/// )
/// .unwrap();
/// let parts = partition(&table, "label", &PartitionValue::Str("cat".into()));
/// assert_eq!(parts.matching.indices(), &[0, 2]);
/// assert_eq!(parts.non_matching.indices(), &[1]);
/// ```
#[must_use]
pub fn partition<'a>(table: &'a Table, column: &str, value: &PartitionValue) -> Partitioned<'a> {
    let idx = table.column_index(column);
    let (matching, non_matching): (Vec<usize>, Vec<usize>) = (0..table.len()).partition(|&i| {
        idx.and_then(|c| table.row(i)?.get(c))
            .is_some_and(|cell| cell.matches(value))
    });
    Partitioned {
        matching: RowSubset {
            table,
            indices: matching,
        },
        non_matching: RowSubset {
            table,
            indices: non_matching,
        },
    }
}
