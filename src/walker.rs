//! Directory tree traversal
//!
//! Visits the directories below a root, writes a report for each one that
//! directly contains JPEGs, and reports progress through a [`ProgressSink`].

use std::path::{Path, PathBuf};
use tracing::{debug, error};
use crate::config::ReportConfig;
use crate::error::Result;
use crate::pdf::report::{build_folder_report, output_path, FolderReport, ReportOptions};
use crate::scan::{count_directories, folders_to_visit};
use crate::title::resolver_for;

/// Receives progress updates; implemented by whatever front end drives the run
pub trait ProgressSink {
    /// Total number of steps expected
    fn set_maximum(&mut self, maximum: usize);
    /// One directory has been handled
    fn advance(&mut self, folder: &Path);
    /// The run is over
    fn finish(&mut self, message: &str);
}

/// Ignores every update
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn set_maximum(&mut self, _maximum: usize) {}
    fn advance(&mut self, _folder: &Path) {}
    fn finish(&mut self, _message: &str) {}
}

/// Outcome of one traversal
#[derive(Debug, Clone, Default)]
pub struct WalkSummary {
    /// Directories visited, with or without images
    pub visited: usize,
    /// Reports written, in visit order
    pub reports: Vec<FolderReport>,
    /// Directories whose report could not be written
    pub failed: Vec<PathBuf>,
}

/// Write a report for every directory under `root` that holds JPEGs.
///
/// The progress maximum is the number of directories below `root`; the
/// counter advances once per visited directory whether or not it produced
/// a PDF. With the nested walk strategy deeper directories are counted but
/// never visited, so the counter can stop short of the maximum.
pub fn process_tree(
    root: &Path,
    config: &ReportConfig,
    progress: &mut dyn ProgressSink,
) -> Result<WalkSummary> {
    let resolver = resolver_for(config, root)?;
    let options = ReportOptions::from_config(config);

    progress.set_maximum(count_directories(root)?);

    let mut summary = WalkSummary::default();
    for folder in folders_to_visit(root, config.walk)? {
        let titles = resolver.resolve(&folder);
        let output = output_path(&folder, &titles, config.naming);

        match build_folder_report(&folder, &output, &titles, &options) {
            Ok(Some(report)) => summary.reports.push(report),
            Ok(None) => debug!("No images in {}", folder.display()),
            Err(e) => {
                error!("Failed to build report for {}: {}", folder.display(), e);
                summary.failed.push(folder.clone());
            }
        }

        summary.visited += 1;
        progress.advance(&folder);
    }

    Ok(summary)
}
