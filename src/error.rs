//! Error taxonomy for a partition run.
//!
//! Every failure the pipeline can hit maps to one [`PartitionError`] variant. Lower-level
//! I/O and parsing code keeps returning [`anyhow::Result`] with context attached; those
//! errors are wrapped into a variant at the component boundary so the binary can print a
//! single human-readable line and exit non-zero.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used by the public component API.
pub type Result<T, E = PartitionError> = std::result::Result<T, E>;

/// Failures surfaced by the validator, partitioner, materializer and pipeline.
#[derive(Debug, Error)]
pub enum PartitionError {
    /// The source table path is missing or is not a regular file.
    #[error("The file '{}' does not exist.", .path.display())]
    NotFound { path: PathBuf },

    /// The output root is missing or is not a directory.
    #[error("The directory '{}' does not exist.", .path.display())]
    NotADirectory { path: PathBuf },

    /// The partition column is absent from the loaded table.
    #[error("Column name '{column}' does not exist in csv file (available: {})", .available.join(", "))]
    UnknownColumn {
        column: String,
        available: Vec<String>,
    },

    /// The source table could not be read or parsed.
    #[error("Failed to load table '{}': {source:#}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// A `target`/`non_target` subdirectory already exists under the output root.
    #[error("Output directory '{}' already exists; refusing to mix results from different runs.", .path.display())]
    DirectoryConflict { path: PathBuf },

    /// Creating an output subdirectory failed for a reason other than a conflict.
    #[error("Failed to create directory '{}': {source}", .path.display())]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A row's file-path cell was empty.
    #[error("Row {row} has no value in column '{column}'")]
    MissingFilePath { row: usize, column: String },

    /// Copying one referenced file failed.
    #[error("Failed to copy '{}' -> '{}': {source}", .src.display(), .dst.display())]
    Copy {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The run report could not be written.
    #[error("Failed to write run report '{}': {source:#}", .path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// The supplied configuration is unusable.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl PartitionError {
    /// Short machine-friendly name of the variant, used in logs and the run report.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::NotADirectory { .. } => "not_a_directory",
            Self::UnknownColumn { .. } => "unknown_column",
            Self::Load { .. } => "load",
            Self::DirectoryConflict { .. } => "directory_conflict",
            Self::DirectoryCreate { .. } => "directory_create",
            Self::MissingFilePath { .. } => "missing_file_path",
            Self::Copy { .. } => "copy",
            Self::Report { .. } => "report",
            Self::Config(_) => "config",
        }
    }
}
