//! Copying the files a subset references into a destination directory.
//!
//! Each row's file-path cell names a source file; it is copied to
//! `<destination>/<basename(source)>`. Rows are processed in subset order and the first
//! failure aborts the rest (files already copied stay where they are). When two rows share
//! a basename the later copy overwrites the earlier one; every such collision is logged and
//! recorded in the [`MaterializeReport`].

use std::collections::HashMap;
use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{PartitionError, Result};
use crate::partition::RowSubset;
use crate::table::Value;

/// The primitive that copies one file.
pub trait FileCopier {
    /// Copy `src` to `dst`, replacing `dst` if present. Returns the number of bytes copied.
    ///
    /// # Errors
    /// Any I/O failure from the underlying filesystem.
    fn copy(&self, src: &Path, dst: &Path) -> io::Result<u64>;
}

/// Copies contents and permissions, then carries over access and modification times.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreservingCopier;

impl FileCopier for PreservingCopier {
    fn copy(&self, src: &Path, dst: &Path) -> io::Result<u64> {
        let bytes = fs::copy(src, dst)?;
        let meta = fs::metadata(src)?;
        let mut times = FileTimes::new();
        if let Ok(t) = meta.accessed() {
            times = times.set_accessed(t);
        }
        if let Ok(t) = meta.modified() {
            times = times.set_modified(t);
        }
        // a read-only copy can still have its times set by its owner
        let f = File::options()
            .write(true)
            .open(dst)
            .or_else(|_| File::open(dst))?;
        f.set_times(times)?;
        Ok(bytes)
    }
}

/// A destination name written more than once within one materialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub file_name: String,
    /// Source that was overwritten.
    pub previous: PathBuf,
    /// Source whose contents remain.
    pub replacement: PathBuf,
}

/// Summary of one successful materialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MaterializeReport {
    pub files_copied: usize,
    pub bytes_copied: u64,
    pub collisions: Vec<Collision>,
}

/// Copies each row's referenced file into a destination directory.
#[derive(Debug, Clone, Default)]
pub struct FileMaterializer<C = PreservingCopier> {
    copier: C,
}

impl FileMaterializer<PreservingCopier> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: FileCopier> FileMaterializer<C> {
    /// Use a custom copy primitive.
    pub fn with_copier(copier: C) -> Self {
        Self { copier }
    }

    /// Copy the file referenced by `file_path_column` of every row in `subset` into
    /// `destination_dir`, which must already exist.
    ///
    /// # Errors
    /// - [`PartitionError::MissingFilePath`] for a row with a null path cell;
    /// - [`PartitionError::Copy`] for the first copy that fails, or for a path without a
    ///   final component.
    pub fn materialize(
        &self,
        subset: &RowSubset<'_>,
        file_path_column: &str,
        destination_dir: &Path,
    ) -> Result<MaterializeReport> {
        let Some(col) = subset.table().column_index(file_path_column) else {
            if subset.is_empty() {
                return Ok(MaterializeReport::default());
            }
            return Err(PartitionError::UnknownColumn {
                column: file_path_column.to_string(),
                available: subset.table().columns().to_vec(),
            });
        };

        let mut report = MaterializeReport::default();
        let mut written: HashMap<String, PathBuf> = HashMap::new();

        for (&row_idx, row) in subset.indices().iter().zip(subset.rows()) {
            // the cell's source text, not its inferred value: `0001` must not become `1`
            let src = match (row.get(col), row.text(col)) {
                (Some(Value::Null) | None, _) | (_, None) => {
                    return Err(PartitionError::MissingFilePath {
                        row: row_idx + 1,
                        column: file_path_column.to_string(),
                    });
                }
                (Some(_), Some(text)) => PathBuf::from(text),
            };
            let dst = destination_for(&src, destination_dir)?;
            let file_name = dst
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let bytes = self
                .copier
                .copy(&src, &dst)
                .map_err(|source| PartitionError::Copy {
                    src: src.clone(),
                    dst: dst.clone(),
                    source,
                })?;
            debug!(src = %src.display(), dst = %dst.display(), bytes, "copied");

            if let Some(previous) = written.insert(file_name.clone(), src.clone()) {
                warn!(
                    file = %file_name,
                    previous = %previous.display(),
                    replacement = %src.display(),
                    "basename collision; earlier copy overwritten"
                );
                report.collisions.push(Collision {
                    file_name,
                    previous,
                    replacement: src,
                });
            }
            report.files_copied += 1;
            report.bytes_copied += bytes;
        }

        Ok(report)
    }
}

/// `destination_dir` joined with the final component of `src`.
///
/// # Errors
/// [`PartitionError::Copy`] with [`io::ErrorKind::InvalidInput`] if `src` has no file name.
pub fn destination_for(src: &Path, destination_dir: &Path) -> Result<PathBuf> {
    match src.file_name() {
        Some(name) => Ok(destination_dir.join(name)),
        None => Err(PartitionError::Copy {
            src: src.to_path_buf(),
            dst: destination_dir.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "source path has no file name"),
        }),
    }
}

/// Materialize with the default copier.
///
/// # Errors
/// See [`FileMaterializer::materialize`].
pub fn materialize(
    subset: &RowSubset<'_>,
    file_path_column: &str,
    destination_dir: &Path,
) -> Result<MaterializeReport> {
    FileMaterializer::new().materialize(subset, file_path_column, destination_dir)
}
