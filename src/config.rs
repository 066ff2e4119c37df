//! Report configuration
//!
//! Every component takes its settings from a [`ReportConfig`] instead of
//! global constants. The defaults reproduce the school/district photo
//! collections the tool was written for; a TOML file can override any field.

use std::fs;
use std::path::{Path, PathBuf};
use serde::Deserialize;
use crate::error::{Error, Result};
use crate::layout::PageDimensions;

/// Institution vocabulary used by the keyword title resolver
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "Ele", "HS", "MS", "Independent School District", "District",
    "ISD", "Elementary", "High School", "Intermediate", "Junior High", "Middle School", "Admin",
    "Transport", "Stadium", "Center", "Training", "1st", "2nd", "3rd", "4th", "5th", "6th", "7th", "8th",
    "9th", "10th", "11th", "12th",
];

/// How a folder's main title and subtitle are derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TitlePolicy {
    /// Climb one or two levels depending on keyword matches
    Keywords,
    /// Always use the grandparent folder as the main title
    FixedDepth,
}

/// How per-folder PDFs are named
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputNaming {
    /// `<folder>/<folder_name>.pdf`
    FolderName,
    /// `<folder>/<main_title> - <sub_title>.pdf`
    Titles,
}

/// Which directories the tree walker visits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum WalkStrategy {
    /// Children of the root and their children only
    Nested,
    /// Every directory below the root
    Recursive,
}

/// Page size of generated reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PageSize {
    A4,
    Letter,
}

impl PageSize {
    pub fn dimensions(self) -> PageDimensions {
        match self {
            PageSize::A4 => PageDimensions::a4(),
            PageSize::Letter => PageDimensions::letter(),
        }
    }
}

/// Settings shared by the title resolver, layout engine, walker and merger
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Substrings marking a folder name as an institution or leaf descriptor
    pub keywords: Vec<String>,
    /// Regular expressions with the same meaning as `keywords`
    pub patterns: Vec<String>,
    /// Logo placed in the title block; missing files are skipped
    pub logo_path: Option<PathBuf>,
    pub title_policy: TitlePolicy,
    pub naming: OutputNaming,
    pub walk: WalkStrategy,
    pub page_size: PageSize,
    /// File-name prefix marking master PDFs, which are never merged again
    pub master_prefix: String,
    /// Prepend a generated cover page to the master PDF
    pub cover_page: bool,
    /// Title used in the master PDF name; defaults to the root folder name
    pub master_title: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            patterns: vec!["(?i)torium".to_string()],
            logo_path: Some(PathBuf::from("img/logo.png")),
            title_policy: TitlePolicy::Keywords,
            naming: OutputNaming::FolderName,
            walk: WalkStrategy::Recursive,
            page_size: PageSize::A4,
            master_prefix: "TNCG".to_string(),
            cover_page: true,
            master_title: None,
        }
    }
}

impl ReportConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
