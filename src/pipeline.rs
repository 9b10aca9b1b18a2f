//! The partition-and-materialize run.
//!
//! A [`PartitionPipeline`] walks a fixed sequence of [`Stage`]s:
//!
//! ```text
//! Init -> Validated -> TableLoaded -> Partitioned -> MaterializedTarget
//!      -> MaterializedNonTarget -> Done
//! ```
//!
//! Any failure stops the run where it happened and is returned as a [`PipelineFailure`]
//! naming that stage. Nothing is retried or rolled back: output directories created before a
//! failure stay on disk. If no row matches the partition value the run ends right after
//! partitioning with [`Outcome::NoMatches`] and nothing is copied.
//!
//! # Example
//!
//! ```no_run
//! use csv_dataset_manager::{Config, Outcome, PartitionPipeline};
//!
//! # fn main() -> anyhow::Result<()> {
//! let cfg = Config::new("labels.csv", "out", "label", "cat")?;
//! match PartitionPipeline::new(&cfg).run()? {
//!     Outcome::Completed(report) => println!("copied {} files", report.files_copied()),
//!     Outcome::NoMatches(_) => println!("nothing to do"),
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use serde::Serialize;
use tracing::{error, info};

use crate::config::{Config, PartitionValue};
use crate::error::PartitionError;
use crate::layout::OutputLayout;
use crate::materialize::{FileCopier, FileMaterializer, MaterializeReport, PreservingCopier};
use crate::partition::{load_configured, partition, validate_column};
use crate::validation::validate_inputs;

/// Position of a run in its state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Init,
    Validated,
    TableLoaded,
    Partitioned,
    MaterializedTarget,
    MaterializedNonTarget,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Validated => "validated",
            Stage::TableLoaded => "table_loaded",
            Stage::Partitioned => "partitioned",
            Stage::MaterializedTarget => "materialized_target",
            Stage::MaterializedNonTarget => "materialized_non_target",
            Stage::Done => "done",
        };
        f.write_str(s)
    }
}

/// A run that stopped with an error; `stage` is the last stage reached.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct PipelineFailure {
    pub stage: Stage,
    #[source]
    pub error: PartitionError,
}

/// Summary of a finished run, serialised by `--report`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub source: PathBuf,
    pub column: String,
    pub value: PartitionValue,
    pub total_rows: usize,
    pub matched_rows: usize,
    pub non_matched_rows: usize,
    pub target: MaterializeReport,
    pub non_target: MaterializeReport,
    pub elapsed_ms: u128,
}

impl RunReport {
    #[must_use]
    pub fn files_copied(&self) -> usize {
        self.target.files_copied + self.non_target.files_copied
    }

    #[must_use]
    pub fn bytes_copied(&self) -> u64 {
        self.target.bytes_copied + self.non_target.bytes_copied
    }

    /// Pretty-printed JSON form.
    ///
    /// # Errors
    /// Returns an error if serialisation fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write [`Self::to_json`] to `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or written.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let json = self.to_json().context("serialise run report")?;
        let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
        f.write_all(json.as_bytes())
            .with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }
}

/// How a run without errors ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Both subsets were materialized.
    Completed(RunReport),
    /// No row matched; the output directories exist but are empty.
    NoMatches(RunReport),
}

impl Outcome {
    #[must_use]
    pub fn report(&self) -> &RunReport {
        match self {
            Outcome::Completed(r) | Outcome::NoMatches(r) => r,
        }
    }

    /// Informational line for the no-match case.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self {
            Outcome::Completed(_) => None,
            Outcome::NoMatches(r) => Some(format!(
                "There is no data in file {} with {} = {}",
                r.source.display(),
                r.column,
                r.value
            )),
        }
    }
}

/// Orchestrates validation, layout creation, loading, partitioning and both copies.
pub struct PartitionPipeline<'c, C = PreservingCopier> {
    cfg: &'c Config,
    materializer: FileMaterializer<C>,
    stage: Stage,
}

impl<'c> PartitionPipeline<'c, PreservingCopier> {
    #[must_use]
    pub fn new(cfg: &'c Config) -> Self {
        Self::with_materializer(cfg, FileMaterializer::new())
    }
}

impl<'c, C: FileCopier> PartitionPipeline<'c, C> {
    /// Use a materializer with a custom copy primitive.
    pub fn with_materializer(cfg: &'c Config, materializer: FileMaterializer<C>) -> Self {
        Self {
            cfg,
            materializer,
            stage: Stage::Init,
        }
    }

    /// Last stage reached.
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn advance(&mut self, next: Stage) {
        info!(from = %self.stage, to = %next, "pipeline stage");
        self.stage = next;
    }

    fn fail(&self, error: PartitionError) -> PipelineFailure {
        error!(stage = %self.stage, kind = error.kind(), %error, "pipeline failed");
        PipelineFailure {
            stage: self.stage,
            error,
        }
    }

    /// Run to completion.
    ///
    /// # Errors
    /// The first failure, tagged with the stage it interrupted.
    pub fn run(&mut self) -> Result<Outcome, PipelineFailure> {
        let started = Instant::now();
        let cfg = self.cfg;

        validate_inputs(cfg).map_err(|e| self.fail(e))?;
        self.advance(Stage::Validated);

        let layout = OutputLayout::for_root(cfg.output_root_path());
        layout.create().map_err(|e| self.fail(e))?;
        let table = load_configured(cfg).map_err(|e| self.fail(e))?;
        validate_column(&table, cfg.partition_column()).map_err(|e| self.fail(e))?;
        info!(
            rows = table.len(),
            columns = table.columns().len(),
            source = %cfg.source_table_path().display(),
            "table loaded"
        );
        self.advance(Stage::TableLoaded);

        let parts = partition(&table, cfg.partition_column(), cfg.partition_value());
        info!(
            matched = parts.matching.len(),
            non_matched = parts.non_matching.len(),
            column = cfg.partition_column(),
            value = %cfg.partition_value(),
            "table partitioned"
        );
        self.advance(Stage::Partitioned);

        let mut report = RunReport {
            source: cfg.source_table_path().to_path_buf(),
            column: cfg.partition_column().to_string(),
            value: cfg.partition_value().clone(),
            total_rows: table.len(),
            matched_rows: parts.matching.len(),
            non_matched_rows: parts.non_matching.len(),
            target: MaterializeReport::default(),
            non_target: MaterializeReport::default(),
            elapsed_ms: 0,
        };

        if parts.matching.is_empty() {
            report.elapsed_ms = started.elapsed().as_millis();
            self.write_report(&report)?;
            self.advance(Stage::Done);
            return Ok(Outcome::NoMatches(report));
        }

        report.target = self
            .materializer
            .materialize(&parts.matching, cfg.file_path_column(), &layout.target)
            .map_err(|e| self.fail(e))?;
        self.advance(Stage::MaterializedTarget);

        report.non_target = self
            .materializer
            .materialize(&parts.non_matching, cfg.file_path_column(), &layout.non_target)
            .map_err(|e| self.fail(e))?;
        self.advance(Stage::MaterializedNonTarget);

        report.elapsed_ms = started.elapsed().as_millis();
        self.write_report(&report)?;
        info!(
            files = report.files_copied(),
            bytes = report.bytes_copied(),
            elapsed_ms = report.elapsed_ms as u64,
            "materialization finished"
        );
        self.advance(Stage::Done);
        Ok(Outcome::Completed(report))
    }

    fn write_report(&self, report: &RunReport) -> Result<(), PipelineFailure> {
        let Some(path) = self.cfg.report_path() else {
            return Ok(());
        };
        report
            .save_to_file(path)
            .map_err(|source| {
                self.fail(PartitionError::Report {
                    path: path.to_path_buf(),
                    source,
                })
            })
    }
}

/// Build and run a pipeline for `cfg` with the default copier.
///
/// # Errors
/// See [`PartitionPipeline::run`].
pub fn run(cfg: &Config) -> Result<Outcome, PipelineFailure> {
    PartitionPipeline::new(cfg).run()
}
