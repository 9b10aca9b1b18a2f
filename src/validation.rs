//! Pre-flight checks on the input paths.
//!
//! Both checks are pure existence queries against the filesystem: nothing is read, created,
//! or modified, so calling them repeatedly on unchanged paths yields the same answer.
//!
//! # Example
//!
//! ```no_run
//! use csv_dataset_manager::validation::{check_output_dir_exists, check_source_exists};
//!
//! # fn main() -> csv_dataset_manager::Result<()> {
//! check_source_exists("labels.csv")?;
//! check_output_dir_exists("out")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use crate::config::Config;
use crate::error::{PartitionError, Result};

/// Fail with [`PartitionError::NotFound`] unless `path` is an existing regular file.
///
/// Symlinks are followed.
///
/// # Errors
/// See above.
pub fn check_source_exists(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.is_file() {
        Ok(())
    } else {
        Err(PartitionError::NotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Fail with [`PartitionError::NotADirectory`] unless `path` is an existing directory.
///
/// # Errors
/// See above.
pub fn check_output_dir_exists(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.is_dir() {
        Ok(())
    } else {
        Err(PartitionError::NotADirectory {
            path: path.to_path_buf(),
        })
    }
}

/// Run both checks for `cfg`, source first.
///
/// # Errors
/// The first failing check.
pub fn validate_inputs(cfg: &Config) -> Result<()> {
    check_source_exists(cfg.source_table_path())?;
    check_output_dir_exists(cfg.output_root_path())
}
