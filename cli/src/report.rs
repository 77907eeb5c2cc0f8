//! Text and JSON rendering of split results.

use std::io::Write;

use groupfold::{Dtype, GroupSplits, GroupedOrdinalSplitter, Split};
use serde::Serialize;

use crate::config::OutputFormat;
use crate::error::Result;

/// Fold geometry of one split run, optionally with the index lists.
#[derive(Debug, Clone, Serialize)]
pub struct SplitReport {
    pub n_samples: usize,
    pub n_groups: usize,
    /// Configured split count.
    pub n_splits: usize,
    pub window: usize,
    pub thresholds: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub splits: Option<Vec<Split>>,
}

impl SplitReport {
    /// Geometry only; the iterator is not consumed.
    pub fn plan(splitter: &GroupedOrdinalSplitter, splits: &GroupSplits) -> Self {
        Self {
            n_samples: splits.n_samples(),
            n_groups: splits.n_groups(),
            n_splits: splitter.get_n_splits(),
            window: splits.window(),
            thresholds: splits.thresholds().collect(),
            splits: None,
        }
    }

    /// Geometry plus every split.
    pub fn full(splitter: &GroupedOrdinalSplitter, splits: GroupSplits) -> Self {
        let mut report = Self::plan(splitter, &splits);
        report.splits = Some(splits.collect());
        report
    }

    /// Number of splits the run yields.
    pub fn n_yielded(&self) -> usize {
        self.thresholds.len()
    }
}

/// Write `report` in the requested format.
pub fn write_report<W: Write>(out: &mut W, report: &SplitReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            writeln!(
                out,
                "samples: {}  groups: {}  n_splits: {}  window: {}",
                report.n_samples, report.n_groups, report.n_splits, report.window
            )?;
            let thresholds: Vec<String> = report.thresholds.iter().map(|t| t.to_string()).collect();
            writeln!(
                out,
                "thresholds: {} ({} splits)",
                thresholds.join(", "),
                report.n_yielded()
            )?;
            for (i, split) in report.splits.iter().flatten().enumerate() {
                writeln!(
                    out,
                    "split {i}  T={}  train={}  test={}",
                    split.threshold,
                    format_indices(&split.train),
                    format_indices(&split.test)
                )?;
            }
        }
    }
    Ok(())
}

/// Render ascending indices, collapsing consecutive runs to `a-b`.
fn format_indices(indices: &[usize]) -> String {
    let mut parts = Vec::new();
    let mut iter = indices.iter().copied().peekable();
    while let Some(start) = iter.next() {
        let mut end = start;
        while iter.peek() == Some(&(end + 1)) {
            end += 1;
            iter.next();
        }
        if end == start {
            parts.push(start.to_string());
        } else {
            parts.push(format!("{start}-{end}"));
        }
    }
    parts.join(",")
}

// ---------------------------------------------------------------------------
// Downcast
// ---------------------------------------------------------------------------

/// Dtype of one column before and after a downcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnChange {
    pub name: String,
    pub before: Dtype,
    pub after: Dtype,
}

/// Write the dtype table of a downcast.
pub fn write_dtype_changes<W: Write>(
    out: &mut W,
    changes: &[ColumnChange],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, changes)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            let width = changes.iter().map(|c| c.name.len()).max().unwrap_or(0);
            for change in changes {
                let marker = if change.before == change.after { "" } else { "  *" };
                writeln!(
                    out,
                    "{:<width$}  {:>7} -> {:<7}{marker}",
                    change.name, change.before.to_string(), change.after.to_string()
                )?;
            }
        }
    }
    Ok(())
}
