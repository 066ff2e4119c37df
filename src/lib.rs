//! Photo Reports Library
//!
//! Turns a directory tree of photographs into PDF reports.
//! This library provides functionality to:
//! - Infer a main title and subtitle for a folder from its path
//! - Lay out a folder's JPEGs, four per page, under a title block
//! - Walk a tree and write one report per folder that holds images
//! - Merge every report under a root into a master PDF with a cover page
//!
//! # Example
//!
//! ```no_run
//! use photo_reports::config::ReportConfig;
//! use photo_reports::pipeline;
//! use photo_reports::walker::NullProgress;
//! use std::path::Path;
//!
//! let config = ReportConfig::default();
//! let summary = pipeline::run(Path::new("Photos"), &config, &mut NullProgress, true)
//!     .expect("Failed to build reports");
//! println!("{} reports written", summary.walk.reports.len());
//! ```

pub mod config;
pub mod error;
pub mod layout;
pub mod logging;
pub mod pdf;
pub mod pipeline;
pub mod scan;
pub mod title;
pub mod walker;

// Re-export commonly used items
pub use config::ReportConfig;
pub use error::{Error, Result};
pub use title::{TitlePair, TitleResolver};
pub use walker::{NullProgress, ProgressSink};
