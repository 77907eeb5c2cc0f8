//! Command implementations shared by the binary and the integration tests.

use std::io::Write;
use std::path::PathBuf;

use groupfold::{GroupedOrdinalSplitter, downcast_dtypes};
use log::{info, warn};

use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::input::{GroupLabels, load_csv};
use crate::report::{ColumnChange, SplitReport, write_dtype_changes, write_report};

/// Options for `split` and `plan`. `None` fields fall back to the config.
#[derive(Debug, Clone, Default)]
pub struct SplitOptions {
    pub input: PathBuf,
    pub n_splits: Option<String>,
    pub group_column: Option<String>,
    pub format: Option<OutputFormat>,
}

/// Options for `downcast`.
#[derive(Debug, Clone)]
pub struct DowncastOptions {
    pub input: PathBuf,
    pub from_bits: u32,
    pub to_bits: u32,
    pub format: Option<OutputFormat>,
}

fn resolve_splitter(config: &Config, opts: &SplitOptions) -> Result<GroupedOrdinalSplitter> {
    let splitter = match &opts.n_splits {
        Some(text) => text.parse::<GroupedOrdinalSplitter>()?,
        None => config.split.splitter()?,
    };
    Ok(splitter)
}

fn build_report(config: &Config, opts: &SplitOptions, with_indices: bool) -> Result<SplitReport> {
    let splitter = resolve_splitter(config, opts)?;
    let frame = load_csv(&opts.input)?;
    let column = opts
        .group_column
        .as_deref()
        .or(config.split.group_column.as_deref());
    let labels = GroupLabels::from_frame(&frame, column)?;

    let splits = labels.split(&splitter, &frame)?;
    let report = if with_indices {
        SplitReport::full(&splitter, splits)
    } else {
        SplitReport::plan(&splitter, &splits)
    };

    info!(
        "{} samples in {} groups -> {} splits (window {})",
        report.n_samples,
        report.n_groups,
        report.n_yielded(),
        report.window
    );
    if report.n_yielded() != report.n_splits {
        warn!(
            "configured n_splits={} but {} splits were produced",
            report.n_splits,
            report.n_yielded()
        );
    }
    Ok(report)
}

/// Print every split of the input.
pub fn run_split<W: Write>(config: &Config, opts: &SplitOptions, out: &mut W) -> Result<()> {
    let report = build_report(config, opts, true)?;
    write_report(out, &report, opts.format.unwrap_or(config.output.format))
}

/// Print the fold geometry of the input without index lists.
pub fn run_plan<W: Write>(config: &Config, opts: &SplitOptions, out: &mut W) -> Result<()> {
    let report = build_report(config, opts, false)?;
    write_report(out, &report, opts.format.unwrap_or(config.output.format))
}

/// Print how each column of the input is retyped by a downcast.
pub fn run_downcast<W: Write>(config: &Config, opts: &DowncastOptions, out: &mut W) -> Result<()> {
    let frame = load_csv(&opts.input)?;
    let before: Vec<(String, _)> = frame
        .dtypes()
        .into_iter()
        .map(|(name, dtype)| (name.to_string(), dtype))
        .collect();

    let frame = downcast_dtypes(frame, opts.from_bits, opts.to_bits)?;
    let changes: Vec<ColumnChange> = before
        .into_iter()
        .zip(frame.dtypes())
        .map(|((name, before), (_, after))| ColumnChange {
            name,
            before,
            after,
        })
        .collect();

    let changed = changes.iter().filter(|c| c.before != c.after).count();
    info!(
        "downcast {} -> {} bits: {changed} of {} columns retyped",
        opts.from_bits,
        opts.to_bits,
        changes.len()
    );
    write_dtype_changes(out, &changes, opts.format.unwrap_or(config.output.format))
}
