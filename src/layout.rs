//! The two output directories of a run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{PartitionError, Result};

/// Subdirectory receiving the rows that match the partition value.
pub const TARGET_DIR: &str = "target";
/// Subdirectory receiving every other row.
pub const NON_TARGET_DIR: &str = "non_target";

/// `<root>/target` and `<root>/non_target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub target: PathBuf,
    pub non_target: PathBuf,
}

impl OutputLayout {
    /// Derive the layout for `root` without touching the filesystem.
    #[must_use]
    pub fn for_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            target: root.join(TARGET_DIR),
            non_target: root.join(NON_TARGET_DIR),
        }
    }

    /// Create both directories, `target` first.
    ///
    /// Neither may exist beforehand. If `target` is created and `non_target` then conflicts,
    /// `target` is left in place.
    ///
    /// # Errors
    /// [`PartitionError::DirectoryConflict`] if a directory already exists,
    /// [`PartitionError::DirectoryCreate`] for any other failure.
    pub fn create(&self) -> Result<()> {
        create_fresh(&self.target)?;
        create_fresh(&self.non_target)?;
        info!(
            target_dir = %self.target.display(),
            non_target_dir = %self.non_target.display(),
            "created output directories"
        );
        Ok(())
    }
}

fn create_fresh(path: &Path) -> Result<()> {
    fs::create_dir(path).map_err(|source| {
        if source.kind() == io::ErrorKind::AlreadyExists {
            PartitionError::DirectoryConflict {
                path: path.to_path_buf(),
            }
        } else {
            PartitionError::DirectoryCreate {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}
