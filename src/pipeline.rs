//! Full run: per-folder reports, then the optional master PDF

use std::path::Path;
use tracing::info;
use crate::config::ReportConfig;
use crate::error::Result;
use crate::pdf::merge::{merge_tree, MergeOutcome};
use crate::walker::{process_tree, ProgressSink, WalkSummary};

/// Message passed to [`ProgressSink::finish`] after a completed run
pub const SUCCESS_MESSAGE: &str = "Success!";

/// What a run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub walk: WalkSummary,
    /// `None` when merging was not requested
    pub merge: Option<MergeOutcome>,
}

/// Build every folder report under `root`, then merge them when `merge` is set.
///
/// The merge only starts after the whole tree has been processed, so it
/// sees every report written by this run.
pub fn run(
    root: &Path,
    config: &ReportConfig,
    progress: &mut dyn ProgressSink,
    merge: bool,
) -> Result<RunSummary> {
    let walk = process_tree(root, config, progress)?;
    info!(
        "Processed {} folders, wrote {} reports",
        walk.visited,
        walk.reports.len()
    );

    let merge = if merge {
        Some(merge_tree(root, config)?)
    } else {
        None
    };

    progress.finish(SUCCESS_MESSAGE);

    Ok(RunSummary { walk, merge })
}
