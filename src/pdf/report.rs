//! Per-folder photo reports
//!
//! Page 1 opens with a title block (logo, main title, subtitle and a
//! caption taken from the output file name). The folder's JPEGs follow in
//! file-name order, four per page in a 2×2 grid.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use crate::config::{OutputNaming, ReportConfig};
use crate::error::Result;
use crate::layout::{ImageGrid, Length, Margins, PageDimensions, Rect};
use crate::scan::list_images;
use crate::title::TitlePair;
use super::document::{PageContent, ReportDocument};
use super::text::StandardFont;
use super::xobject::{embed_jpeg, embed_raster};

/// Page margin on every side, in millimetres
pub const MARGIN_MM: f64 = 10.0;
/// Top of the image grid on every page, in millimetres
pub const GRID_TOP_MM: f64 = 60.0;

const MAIN_TITLE_BASELINE_MM: f64 = 32.0;
const SUB_TITLE_BASELINE_MM: f64 = 41.0;
const CAPTION_BASELINE_MM: f64 = 51.0;

/// Settings for report rendering
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub page: PageDimensions,
    /// Logo for the title block; skipped when the file does not exist
    pub logo: Option<PathBuf>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            page: PageDimensions::a4(),
            logo: None,
        }
    }
}

impl ReportOptions {
    pub fn from_config(config: &ReportConfig) -> Self {
        Self {
            page: config.page_size.dimensions(),
            logo: config.logo_path.clone(),
        }
    }
}

/// What was written for one folder
#[derive(Debug, Clone)]
pub struct FolderReport {
    pub output: PathBuf,
    pub titles: TitlePair,
    /// Images placed in the grid, in placement order
    pub placed: Vec<PathBuf>,
    /// Images that could not be decoded
    pub skipped: Vec<PathBuf>,
    pub pages: usize,
}

/// Where the report for `folder` is written
pub fn output_path(folder: &Path, titles: &TitlePair, naming: OutputNaming) -> PathBuf {
    let stem = match naming {
        OutputNaming::FolderName => folder
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| titles.sub_title.clone()),
        OutputNaming::Titles => titles.joined(),
    };
    let stem = stem.replace(['/', '\\'], "_");
    let stem = if stem.is_empty() { "report".to_string() } else { stem };
    folder.join(format!("{}.pdf", stem))
}

/// Place the logo in the top-left corner, if one is configured and readable
pub(crate) fn draw_logo(report: &mut ReportDocument, page: &mut PageContent, logo: Option<&Path>) {
    let Some(logo) = logo else {
        return;
    };
    if !logo.exists() {
        debug!("No logo at {}, skipping", logo.display());
        return;
    }
    match embed_raster(report.document_mut(), logo) {
        Ok(image) => {
            let slot = Rect::new(MARGIN_MM, MARGIN_MM, 50.0, 18.0);
            page.image(&image, slot.fit_top_left(image.width, image.height));
        }
        Err(e) => warn!("Could not load logo {}: {}", logo.display(), e),
    }
}

fn draw_title_block(
    report: &mut ReportDocument,
    page: &mut PageContent,
    titles: &TitlePair,
    caption: &str,
    options: &ReportOptions,
) {
    draw_logo(report, page, options.logo.as_deref());

    let mm = Length::from_mm;
    page.centered_text(StandardFont::HelveticaBold, 16.0, mm(MAIN_TITLE_BASELINE_MM), &titles.main_title);
    page.centered_text(StandardFont::Helvetica, 14.0, mm(SUB_TITLE_BASELINE_MM), &titles.sub_title);
    page.centered_text(StandardFont::Helvetica, 12.0, mm(CAPTION_BASELINE_MM), caption);
}

/// Render the JPEGs directly inside `folder` into a PDF at `output`.
///
/// Returns `Ok(None)` without touching the filesystem when the folder has
/// no qualifying images. Images that fail to decode are logged and left
/// out; they do not take a grid slot.
pub fn build_folder_report(
    folder: &Path,
    output: &Path,
    titles: &TitlePair,
    options: &ReportOptions,
) -> Result<Option<FolderReport>> {
    let images = list_images(folder)?;
    if images.is_empty() {
        return Ok(None);
    }

    let caption = output
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut report = ReportDocument::new(options.page);
    let mut page = report.new_page();
    draw_title_block(&mut report, &mut page, titles, &caption, options);

    let grid = ImageGrid::new(
        &options.page,
        &Margins::uniform(Length::from_mm(MARGIN_MM)),
        Length::from_mm(GRID_TOP_MM),
    );

    let mut placed = Vec::new();
    let mut skipped = Vec::new();
    let mut current_page = 0;

    for path in images {
        let image = match embed_jpeg(report.document_mut(), &path) {
            Ok(image) => image,
            Err(e) => {
                warn!("Error processing {}: {}", path.display(), e);
                skipped.push(path);
                continue;
            }
        };

        let placement = grid.place(placed.len());
        if placement.page != current_page {
            let finished = std::mem::replace(&mut page, report.new_page());
            report.add_page(finished);
            current_page = placement.page;
        }

        page.image(&image, placement.cell.fit(image.width, image.height));
        placed.push(path);
    }

    report.add_page(page);
    let pages = report.page_count();
    report.save(output, &titles.joined())?;

    info!("PDF created: {}", output.display());

    Ok(Some(FolderReport {
        output: output.to_path_buf(),
        titles: titles.clone(),
        placed,
        skipped,
        pages,
    }))
}
