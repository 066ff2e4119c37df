//! Cover page for the master PDF

use std::path::{Path, PathBuf};
use chrono::Local;
use crate::error::Result;
use crate::layout::{Length, PageDimensions};
use super::document::ReportDocument;
use super::report::{draw_logo, MARGIN_MM};
use super::text::{truncate_to_width, StandardFont};

const TITLE_BASELINE_MM: f64 = 34.0;
const DATE_BASELINE_MM: f64 = 44.0;
const CONTENTS_BASELINE_MM: f64 = 58.0;
const FIRST_ENTRY_MM: f64 = 68.0;
const CONTINUATION_TOP_MM: f64 = 20.0;
const LINE_HEIGHT_MM: f64 = 6.0;
const ENTRY_INDENT_MM: f64 = 20.0;
const ENTRY_FONT_SIZE: f32 = 11.0;

/// Contents of the cover page
#[derive(Debug, Clone)]
pub struct CoverOptions {
    pub title: String,
    /// Names listed, numbered, under the title
    pub entries: Vec<String>,
    pub page: PageDimensions,
    pub logo: Option<PathBuf>,
}

/// Write the cover to `output` and return its page count.
///
/// The entry list continues on extra pages when it does not fit on one.
pub fn create_cover_pdf(output: &Path, options: &CoverOptions) -> Result<usize> {
    let mut cover = ReportDocument::new(options.page);
    let mut page = cover.new_page();
    let mm = Length::from_mm;

    draw_logo(&mut cover, &mut page, options.logo.as_deref());
    page.centered_text(StandardFont::HelveticaBold, 20.0, mm(TITLE_BASELINE_MM), &options.title);
    let generated = format!("Generated {}", Local::now().format("%B %-d, %Y"));
    page.centered_text(StandardFont::Helvetica, 12.0, mm(DATE_BASELINE_MM), &generated);
    page.text(StandardFont::HelveticaBold, 14.0, mm(MARGIN_MM), mm(CONTENTS_BASELINE_MM), "Contents");

    let bottom = options.page.height.mm() - MARGIN_MM;
    let max_width = mm(options.page.width.mm() - ENTRY_INDENT_MM - MARGIN_MM).pt();
    let mut baseline = FIRST_ENTRY_MM;

    for (i, entry) in options.entries.iter().enumerate() {
        if baseline > bottom {
            let finished = std::mem::replace(&mut page, cover.new_page());
            cover.add_page(finished);
            baseline = CONTINUATION_TOP_MM;
        }
        let line = truncate_to_width(
            &format!("{}. {}", i + 1, entry),
            StandardFont::Helvetica,
            ENTRY_FONT_SIZE,
            max_width as f32,
        );
        page.text(StandardFont::Helvetica, ENTRY_FONT_SIZE, mm(ENTRY_INDENT_MM), mm(baseline), &line);
        baseline += LINE_HEIGHT_MM;
    }

    cover.add_page(page);
    let pages = cover.page_count();
    cover.save(output, &options.title)?;

    Ok(pages)
}
