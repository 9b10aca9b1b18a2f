//! # csv-dataset-manager
//!
//! Split a labeled dataset by the value of one column and copy the files each row references
//! into two output directories.
//!
//! Given a delimited table with a header row, a **partition column**, a **partition value**
//! and a column holding one file path per row, a run:
//!
//! 1. checks that the table exists and the output root is a directory;
//! 2. creates `<root>/target` and `<root>/non_target` (both must not exist yet);
//! 3. loads the table and checks the partition column is present;
//! 4. splits rows into those whose cell equals the value and everything else;
//! 5. copies each row's file into the matching directory under its base name.
//!
//! If no row matches, step 5 is skipped and the run reports it without failing.
//!
//! ## Quick Start
//!
//! ```no_run
//! use csv_dataset_manager::*;
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let cfg = Config::new("labels.csv", "out", "label", "cat")?
//!     .with_file_path_column("image_path")?;
//!
//! let outcome = PartitionPipeline::new(&cfg).run()?;
//! if let Some(msg) = outcome.message() {
//!     println!("{msg}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Value coercion
//!
//! The partition value arrives as text. An all-digit value becomes an integer and only matches
//! numeric cells; anything else stays a string and only matches text cells. See
//! [`PartitionValue::from_raw`].
//!
//! ## Components
//!
//! - [`validation`] - existence checks on the input paths
//! - [`io`] - delimited table loading with transparent decompression
//! - [`table`] - the in-memory [`Table`]
//! - [`partition`] - column validation and the stable two-way split
//! - [`materialize`] - copying one subset's files into a directory
//! - [`layout`] - the `target`/`non_target` directories
//! - [`pipeline`] - the orchestrating state machine
//! - [`testing`] - temporary dataset fixtures
//!
//! ## Feature Flags
//!
//! - `compression-gzip`, `compression-zstd`, `compression-bzip2`, `compression-xz` - read
//!   compressed source tables (all on by default)

pub mod config;
pub mod error;
pub mod io;
pub mod layout;
pub mod materialize;
pub mod partition;
pub mod pipeline;
pub mod table;
pub mod testing;
pub mod validation;

pub use config::{Config, DEFAULT_FILE_PATH_COLUMN, PartitionValue, SplitArgs};
pub use error::{PartitionError, Result};
pub use io::table::{LoadOptions, load, load_with};
pub use layout::{NON_TARGET_DIR, OutputLayout, TARGET_DIR};
pub use materialize::{
    Collision, FileCopier, FileMaterializer, MaterializeReport, PreservingCopier, materialize,
};
pub use partition::{Partitioned, RowSubset, partition, validate_column};
pub use pipeline::{Outcome, PartitionPipeline, PipelineFailure, RunReport, Stage};
pub use table::{Row, Table, Value};
pub use validation::{check_output_dir_exists, check_source_exists};
