//! Delimited-text loader for [`Table`].
//!
//! The first record is the header. Cell types are inferred per column, the way a dataframe
//! reader does it:
//! - cells matching a null marker (empty, `NA`, `NaN`, `null`, ...) are [`Value::Null`];
//! - a column whose remaining cells all parse as `i64` is an integer column;
//! - otherwise, a column whose remaining cells all parse as `f64` is a float column
//!   (integers in it are widened);
//! - anything else is a string column, and every non-null cell stays text, even `"42"`.
//!
//! Every row also keeps the exact text of each cell (see [`Row::text`]), so columns such as
//! file paths are never rewritten by inference: `0001` stays `0001`.
//!
//! Ragged rows, duplicate header names and invalid UTF-8 are load errors, annotated with the
//! record number.

use anyhow::{Context, Result, bail};
use std::collections::HashSet;
use std::path::Path;

use crate::io::compression::open_decompressed;
use crate::table::{Row, Table, Value};

/// Cell texts read as null by default.
pub const DEFAULT_NULL_MARKERS: &[&str] = &[
    "", "#N/A", "#NA", "<NA>", "N/A", "NA", "NULL", "NaN", "-NaN", "nan", "-nan", "None", "n/a",
    "null",
];

/// Parser settings for [`load_with`].
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Field delimiter byte.
    pub delimiter: u8,
    /// Exact cell texts that become [`Value::Null`].
    pub null_markers: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            null_markers: DEFAULT_NULL_MARKERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl LoadOptions {
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// Load a comma-delimited table with default options.
///
/// # Errors
/// See [`load_with`].
pub fn load(path: impl AsRef<Path>) -> Result<Table> {
    load_with(path, &LoadOptions::default())
}

/// Load a delimited table from `path`, decompressing it first if needed.
///
/// # Errors
/// Returns an error if the file cannot be opened or decompressed, the header is missing or
/// has duplicate names, or a record is malformed.
pub fn load_with(path: impl AsRef<Path>, opts: &LoadOptions) -> Result<Table> {
    let path = path.as_ref();
    let rdr = open_decompressed(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(opts.delimiter)
        .flexible(false)
        .from_reader(rdr);

    let header = rdr
        .headers()
        .with_context(|| format!("read CSV header of {}", path.display()))?
        .clone();
    if header.is_empty() {
        bail!("{} has no header row", path.display());
    }
    let columns: Vec<String> = header.iter().map(str::to_string).collect();
    let mut seen = HashSet::with_capacity(columns.len());
    for name in &columns {
        if !seen.insert(name.as_str()) {
            bail!("duplicate column name '{name}' in header");
        }
    }

    let mut raw: Vec<Vec<String>> = Vec::new();
    for (i, rec) in rdr.records().enumerate() {
        let rec = rec.with_context(|| format!("parse CSV record #{}", i + 1))?;
        raw.push(rec.iter().map(str::to_string).collect());
    }

    let kinds: Vec<ColumnKind> = (0..columns.len())
        .map(|c| infer_kind(raw.iter().map(|r| r[c].as_str()), &opts.null_markers))
        .collect();

    let rows = raw
        .into_iter()
        .map(|text: Vec<String>| {
            let cells = text
                .iter()
                .zip(&kinds)
                .map(|(cell, kind)| convert(cell, *kind, &opts.null_markers))
                .collect();
            Row::with_text(cells, text)
        })
        .collect();

    Table::new(columns, rows)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Int,
    Float,
    Str,
}

fn is_null(cell: &str, markers: &[String]) -> bool {
    markers.iter().any(|m| m == cell)
}

fn infer_kind<'a>(cells: impl Iterator<Item = &'a str>, markers: &[String]) -> ColumnKind {
    let mut kind = ColumnKind::Int;
    for cell in cells.filter(|c| !is_null(c, markers)) {
        let t = cell.trim();
        match kind {
            ColumnKind::Int if t.parse::<i64>().is_ok() => {}
            ColumnKind::Int | ColumnKind::Float if t.parse::<f64>().is_ok() => {
                kind = ColumnKind::Float;
            }
            _ => return ColumnKind::Str,
        }
    }
    kind
}

fn convert(cell: &str, kind: ColumnKind, markers: &[String]) -> Value {
    if is_null(cell, markers) {
        return Value::Null;
    }
    match kind {
        ColumnKind::Int => match cell.trim().parse() {
            Ok(n) => Value::Int(n),
            Err(_) => Value::Str(cell.to_string()),
        },
        ColumnKind::Float => match cell.trim().parse() {
            Ok(x) => Value::Float(x),
            Err(_) => Value::Str(cell.to_string()),
        },
        ColumnKind::Str => Value::Str(cell.to_string()),
    }
}
