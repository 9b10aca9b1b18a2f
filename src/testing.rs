//! Test fixtures for partition runs.
//!
//! [`DatasetFixture`] lays out a throwaway dataset in a temporary directory: an `images/`
//! folder with small files, a labels table describing them, and an empty `out/` root ready to
//! receive `target/` and `non_target/`.
//!
//! ```
//! use csv_dataset_manager::testing::DatasetFixture;
//!
//! # fn main() -> anyhow::Result<()> {
//! let fx = DatasetFixture::builder()
//!     .image("1.png", "cat")
//!     .image("2.png", "dog")
//!     .build()?;
//! assert!(fx.table_path().is_file());
//! assert!(fx.output_root().is_dir());
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::Config;

/// One row of a fixture: the image to create and the label it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureRow {
    /// Path of the image relative to the fixture's `images/` directory.
    pub relative_path: String,
    pub label: String,
    /// Bytes written to the image file.
    pub contents: Vec<u8>,
}

/// Builder for [`DatasetFixture`].
#[derive(Debug, Clone, Default)]
pub struct DatasetFixtureBuilder {
    rows: Vec<FixtureRow>,
    label_column: Option<String>,
    path_column: Option<String>,
}

impl DatasetFixtureBuilder {
    /// Add an image with contents derived from its path.
    #[must_use]
    pub fn image(self, relative_path: &str, label: &str) -> Self {
        let contents = format!("image:{relative_path}").into_bytes();
        self.image_with(relative_path, label, contents)
    }

    /// Add an image with explicit contents.
    #[must_use]
    pub fn image_with(mut self, relative_path: &str, label: &str, contents: Vec<u8>) -> Self {
        self.rows.push(FixtureRow {
            relative_path: relative_path.to_string(),
            label: label.to_string(),
            contents,
        });
        self
    }

    /// Header of the label column (default `label`).
    #[must_use]
    pub fn label_column(mut self, name: &str) -> Self {
        self.label_column = Some(name.to_string());
        self
    }

    /// Header of the file-path column (default `image_path`).
    #[must_use]
    pub fn path_column(mut self, name: &str) -> Self {
        self.path_column = Some(name.to_string());
        self
    }

    /// Create the files on disk.
    ///
    /// # Errors
    /// Returns an error if the temporary directory or any file cannot be created.
    pub fn build(self) -> Result<DatasetFixture> {
        let dir = tempfile::tempdir().context("create fixture tempdir")?;
        let images = dir.path().join("images");
        let out = dir.path().join("out");
        fs::create_dir_all(&images).with_context(|| format!("mkdir {}", images.display()))?;
        fs::create_dir_all(&out).with_context(|| format!("mkdir {}", out.display()))?;

        let label_column = self.label_column.unwrap_or_else(|| "label".to_string());
        let path_column = self
            .path_column
            .unwrap_or_else(|| crate::config::DEFAULT_FILE_PATH_COLUMN.to_string());
        let table_path = dir.path().join("labels.csv");

        let mut wtr = csv::Writer::from_path(&table_path)
            .with_context(|| format!("create {}", table_path.display()))?;
        wtr.write_record([label_column.as_str(), path_column.as_str()])?;
        for row in &self.rows {
            let path = images.join(&row.relative_path);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("mkdir {}", parent.display()))?;
            }
            fs::write(&path, &row.contents)
                .with_context(|| format!("write {}", path.display()))?;
            let path_text = path.to_string_lossy();
            wtr.write_record([row.label.as_str(), path_text.as_ref()])?;
        }
        wtr.flush()?;

        Ok(DatasetFixture {
            dir,
            table_path,
            images,
            out,
            label_column,
            path_column,
            rows: self.rows,
        })
    }
}

/// A dataset living in a temporary directory that is removed on drop.
#[derive(Debug)]
pub struct DatasetFixture {
    dir: TempDir,
    table_path: PathBuf,
    images: PathBuf,
    out: PathBuf,
    label_column: String,
    path_column: String,
    rows: Vec<FixtureRow>,
}

impl DatasetFixture {
    #[must_use]
    pub fn builder() -> DatasetFixtureBuilder {
        DatasetFixtureBuilder::default()
    }

    /// The three-row cat/dog/cat dataset.
    ///
    /// # Errors
    /// See [`DatasetFixtureBuilder::build`].
    pub fn cats_and_dogs() -> Result<Self> {
        Self::builder()
            .image("1.png", "cat")
            .image("2.png", "dog")
            .image("3.png", "cat")
            .build()
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    #[must_use]
    pub fn table_path(&self) -> &Path {
        &self.table_path
    }

    #[must_use]
    pub fn images_dir(&self) -> &Path {
        &self.images
    }

    #[must_use]
    pub fn output_root(&self) -> &Path {
        &self.out
    }

    #[must_use]
    pub fn target_dir(&self) -> PathBuf {
        self.out.join(crate::layout::TARGET_DIR)
    }

    #[must_use]
    pub fn non_target_dir(&self) -> PathBuf {
        self.out.join(crate::layout::NON_TARGET_DIR)
    }

    #[must_use]
    pub fn rows(&self) -> &[FixtureRow] {
        &self.rows
    }

    /// Configuration partitioning this fixture's label column on `value`.
    ///
    /// # Errors
    /// See [`Config::new`].
    pub fn config(&self, value: &str) -> Result<Config> {
        let cfg = Config::new(&self.table_path, &self.out, &self.label_column, value)?
            .with_file_path_column(&self.path_column)?;
        Ok(cfg)
    }
}

/// Sorted file names directly inside `dir`.
///
/// # Errors
/// Returns an error if `dir` cannot be read.
pub fn list_file_names(dir: impl AsRef<Path>) -> Result<Vec<String>> {
    let dir = dir.as_ref();
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read_dir {}", dir.display()))? {
        names.push(entry?.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}
