//! Run configuration.
//!
//! [`SplitArgs`] is the clap surface; [`Config`] is the immutable value built from it once at
//! startup and passed by reference into every component.

use std::fmt;
use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;

use crate::error::{PartitionError, Result};

/// Column holding each row's file path when `--image-path-column-name` is not given.
pub const DEFAULT_FILE_PATH_COLUMN: &str = "image_path";

/// The value rows are compared against.
///
/// Built from the raw command-line string by [`PartitionValue::from_raw`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PartitionValue {
    Int(i64),
    Str(String),
}

impl PartitionValue {
    /// Coerce a raw argument: all ASCII digits becomes an integer, anything else stays a string.
    ///
    /// ```
    /// use csv_dataset_manager::PartitionValue;
    ///
    /// assert_eq!(PartitionValue::from_raw("5"), PartitionValue::Int(5));
    /// assert_eq!(PartitionValue::from_raw("5a"), PartitionValue::Str("5a".into()));
    /// ```
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            // digit strings too long for i64 fall through as text
            if let Ok(n) = raw.parse::<i64>() {
                return Self::Int(n);
            }
        }
        Self::Str(raw.to_string())
    }
}

impl fmt::Display for PartitionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s}"),
        }
    }
}

/// Command-line flags, usable as `#[command(flatten)]` in a clap parser.
#[derive(Args, Clone, Debug)]
pub struct SplitArgs {
    /// File path of the csv file to be referenced for extraction
    #[arg(short = 'i', long = "input-path", env = "CSV_DATASET_INPUT_PATH")]
    pub input_path: PathBuf,

    /// Output directory for extracted files (must already exist)
    #[arg(short = 'o', long = "output-path", env = "CSV_DATASET_OUTPUT_PATH")]
    pub output_path: PathBuf,

    /// Name of column to be extracted
    #[arg(short = 'c', long = "column-name", env = "CSV_DATASET_COLUMN_NAME")]
    pub column_name: String,

    /// Value to be extracted (all-digit values are compared as integers)
    #[arg(short = 'v', long = "value", env = "CSV_DATASET_VALUE")]
    pub value: String,

    /// Name of column containing image path
    #[arg(
        long = "image-path-column-name",
        default_value = DEFAULT_FILE_PATH_COLUMN,
        env = "CSV_DATASET_IMAGE_PATH_COLUMN"
    )]
    pub image_path_column_name: String,

    /// Field delimiter of the source table (defaults to tab for .tsv, comma otherwise)
    #[arg(short = 'd', long, env = "CSV_DATASET_DELIMITER")]
    pub delimiter: Option<char>,

    /// Write a JSON summary of the run to this path
    #[arg(long, env = "CSV_DATASET_REPORT")]
    pub report: Option<PathBuf>,
}

/// Immutable configuration for one partition run.
#[derive(Debug, Clone)]
pub struct Config {
    source_table_path: PathBuf,
    output_root_path: PathBuf,
    partition_column: String,
    partition_value: PartitionValue,
    file_path_column: String,
    delimiter: u8,
    report_path: Option<PathBuf>,
}

impl Config {
    /// Build a configuration with the default file-path column and delimiter.
    ///
    /// # Errors
    /// Returns [`PartitionError::Config`] if `partition_column` is empty.
    pub fn new(
        source_table_path: impl Into<PathBuf>,
        output_root_path: impl Into<PathBuf>,
        partition_column: impl Into<String>,
        raw_value: &str,
    ) -> Result<Self> {
        let partition_column = partition_column.into();
        if partition_column.is_empty() {
            return Err(PartitionError::Config(
                "partition column name must not be empty".into(),
            ));
        }
        let source_table_path = source_table_path.into();
        let delimiter = default_delimiter(&source_table_path);
        Ok(Self {
            source_table_path,
            output_root_path: output_root_path.into(),
            partition_column,
            partition_value: PartitionValue::from_raw(raw_value),
            file_path_column: DEFAULT_FILE_PATH_COLUMN.to_string(),
            delimiter,
            report_path: None,
        })
    }

    /// Build a configuration from parsed command-line flags.
    ///
    /// # Errors
    /// Returns [`PartitionError::Config`] for an empty column name or a non-ASCII delimiter.
    pub fn from_args(args: &SplitArgs) -> Result<Self> {
        let mut cfg = Self::new(
            &args.input_path,
            &args.output_path,
            &args.column_name,
            &args.value,
        )?
        .with_file_path_column(&args.image_path_column_name)?;
        if let Some(d) = args.delimiter {
            cfg = cfg.with_delimiter(d)?;
        }
        if let Some(report) = &args.report {
            cfg = cfg.with_report_path(report);
        }
        Ok(cfg)
    }

    /// Override the column holding each row's file path.
    ///
    /// # Errors
    /// Returns [`PartitionError::Config`] if `column` is empty.
    pub fn with_file_path_column(mut self, column: impl Into<String>) -> Result<Self> {
        let column = column.into();
        if column.is_empty() {
            return Err(PartitionError::Config(
                "file path column name must not be empty".into(),
            ));
        }
        self.file_path_column = column;
        Ok(self)
    }

    /// Override the field delimiter.
    ///
    /// # Errors
    /// Returns [`PartitionError::Config`] if `delimiter` is not a single ASCII byte.
    pub fn with_delimiter(mut self, delimiter: char) -> Result<Self> {
        if !delimiter.is_ascii() {
            return Err(PartitionError::Config(format!(
                "delimiter must be a single ASCII character, got {delimiter:?}"
            )));
        }
        self.delimiter = delimiter as u8;
        Ok(self)
    }

    /// Write a JSON run report to `path` when the run finishes.
    #[must_use]
    pub fn with_report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = Some(path.into());
        self
    }

    pub fn source_table_path(&self) -> &Path {
        &self.source_table_path
    }

    pub fn output_root_path(&self) -> &Path {
        &self.output_root_path
    }

    pub fn partition_column(&self) -> &str {
        &self.partition_column
    }

    pub fn partition_value(&self) -> &PartitionValue {
        &self.partition_value
    }

    pub fn file_path_column(&self) -> &str {
        &self.file_path_column
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    pub fn report_path(&self) -> Option<&Path> {
        self.report_path.as_deref()
    }
}

fn default_delimiter(path: &Path) -> u8 {
    let name = path.to_string_lossy().to_lowercase();
    let tsv = [".tsv", ".tsv.gz", ".tsv.zst", ".tsv.bz2", ".tsv.xz", ".tab"]
        .iter()
        .any(|ext| name.ends_with(ext));
    if tsv { b'\t' } else { b',' }
}
