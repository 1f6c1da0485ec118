//! Split report types.
//!
//! Mirrors what a split did (or, for a dry run, would do) so the CLI can
//! print it as text or JSON.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// A report generated by a dataset split.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SplitReport {
    /// Canonical source dataset root.
    pub source: PathBuf,
    /// Output dataset root (`<source>_split`).
    pub output: PathBuf,
    /// Requested fraction of pairs assigned to training.
    pub train_ratio: f64,
    /// Seed used for the shuffle, if one was supplied.
    pub seed: Option<u64>,
    /// True when nothing was written to disk.
    pub dry_run: bool,
    /// Whether a `data.yaml` was generated at the output root.
    pub data_yaml: bool,
    pub counts: SplitCounts,
    /// Image file names assigned to training, sorted.
    pub train: Vec<String>,
    /// Image file names assigned to validation, sorted.
    pub val: Vec<String>,
}

/// Pair counts per subset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SplitCounts {
    pub total: usize,
    pub train: usize,
    pub val: usize,
}

impl SplitReport {
    /// Serialize as pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for SplitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dry_run {
            writeln!(f, "Dry run: nothing was written.")?;
        }
        writeln!(f, "Source: {}", self.source.display())?;
        writeln!(f, "Output: {}", self.output.display())?;
        writeln!(
            f,
            "  {} pairs: {} train, {} val (ratio {})",
            self.counts.total, self.counts.train, self.counts.val, self.train_ratio
        )?;
        if let Some(seed) = self.seed {
            writeln!(f, "  seed: {}", seed)?;
        }
        if self.data_yaml {
            writeln!(f, "  wrote data.yaml")?;
        }
        Ok(())
    }
}
