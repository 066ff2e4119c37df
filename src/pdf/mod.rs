//! PDF generation and merging

pub mod cover;
pub mod document;
pub mod merge;
pub mod metadata;
pub mod report;
pub mod text;
pub mod xobject;

// Re-export commonly used items
pub use cover::{create_cover_pdf, CoverOptions};
pub use merge::{master_path, merge_tree, MergeOutcome};
pub use metadata::{count_pages, extract_metadata, PdfMetadata};
pub use report::{build_folder_report, output_path, FolderReport, ReportOptions};
