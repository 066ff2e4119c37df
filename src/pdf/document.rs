//! Building new PDF documents page by page with lopdf

use std::path::Path;
use chrono::Local;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use crate::error::Result;
use crate::layout::{Length, PageDimensions, Rect};
use super::text::{info_string, pdf_literal, StandardFont};
use super::xobject::ImageXObject;

const PRODUCER: &str = concat!("photo-reports ", env!("CARGO_PKG_VERSION"));

/// Content stream and image resources of one page.
///
/// Positions are given in millimetres from the top-left corner and
/// converted to PDF user space here.
#[derive(Debug, Clone)]
pub struct PageContent {
    page: PageDimensions,
    operations: Vec<u8>,
    xobjects: Dictionary,
}

impl PageContent {
    pub fn new(page: PageDimensions) -> Self {
        Self {
            page,
            operations: Vec::new(),
            xobjects: Dictionary::new(),
        }
    }

    fn to_pdf_y(&self, y: Length) -> f64 {
        self.page.height.pt() - y.pt()
    }

    /// Text with its baseline at `baseline`, starting at `x`
    pub fn text(&mut self, font: StandardFont, size: f32, x: Length, baseline: Length, text: &str) {
        if text.is_empty() {
            return;
        }
        self.write_text(font, size, x.pt(), self.to_pdf_y(baseline), text);
    }

    /// Text centred horizontally on the page
    pub fn centered_text(&mut self, font: StandardFont, size: f32, baseline: Length, text: &str) {
        if text.is_empty() {
            return;
        }
        let width = font.text_width(text, size) as f64;
        let x = ((self.page.width.pt() - width) / 2.0).max(0.0);
        self.write_text(font, size, x, self.to_pdf_y(baseline), text);
    }

    fn write_text(&mut self, font: StandardFont, size: f32, x: f64, y: f64, text: &str) {
        let ops = &mut self.operations;
        ops.extend_from_slice(b"BT\n");
        ops.extend_from_slice(format!("/{} {} Tf\n", font.resource_name(), size).as_bytes());
        ops.extend_from_slice(format!("1 0 0 1 {:.2} {:.2} Tm\n", x, y).as_bytes());
        ops.extend_from_slice(&pdf_literal(text));
        ops.extend_from_slice(b" Tj\nET\n");
    }

    /// Draw `image` stretched to `rect`
    pub fn image(&mut self, image: &ImageXObject, rect: Rect) {
        let name = format!("Im{}", self.xobjects.len() + 1);
        self.xobjects.set(name.as_bytes().to_vec(), Object::Reference(image.id));

        let y = self.to_pdf_y(Length::from_mm(rect.y.mm() + rect.height.mm()));
        self.operations.extend_from_slice(
            format!(
                "q\n{:.2} 0 0 {:.2} {:.2} {:.2} cm\n/{} Do\nQ\n",
                rect.width.pt(),
                rect.height.pt(),
                rect.x.pt(),
                y,
                name
            )
            .as_bytes(),
        );
    }
}

/// A new document whose pages all share one size and the standard fonts
pub struct ReportDocument {
    doc: Document,
    page: PageDimensions,
    pages_id: ObjectId,
    fonts: Dictionary,
    page_ids: Vec<ObjectId>,
}

impl ReportDocument {
    pub fn new(page: PageDimensions) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut fonts = Dictionary::new();
        for font in StandardFont::ALL {
            let font_id = doc.add_object(Object::Dictionary(font.dictionary()));
            fonts.set(font.resource_name(), Object::Reference(font_id));
        }

        Self {
            doc,
            page,
            pages_id,
            fonts,
            page_ids: Vec::new(),
        }
    }

    /// Underlying document, for adding image objects
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// A blank page of this document's size
    pub fn new_page(&self) -> PageContent {
        PageContent::new(self.page)
    }

    /// Append a finished page
    pub fn add_page(&mut self, content: PageContent) {
        let content_id = self.doc.add_object(Stream::new(Dictionary::new(), content.operations));

        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(self.fonts.clone()));
        if !content.xobjects.is_empty() {
            resources.set("XObject", Object::Dictionary(content.xobjects));
        }

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(self.pages_id));
        page.set("MediaBox", Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(self.page.width.pt() as f32),
            Object::Real(self.page.height.pt() as f32),
        ]));
        page.set("Resources", Object::Dictionary(resources));
        page.set("Contents", Object::Reference(content_id));

        let page_id = self.doc.add_object(Object::Dictionary(page));
        self.page_ids.push(page_id);
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Finish the page tree and write the document, replacing any file at `output`
    pub fn save(mut self, output: &Path, title: &str) -> Result<()> {
        let kids: Vec<Object> = self.page_ids
            .iter()
            .map(|&id| Object::Reference(id))
            .collect();

        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name(b"Pages".to_vec()));
        pages.set("Count", Object::Integer(self.page_ids.len() as i64));
        pages.set("Kids", Object::Array(kids));
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(self.pages_id));
        let catalog_id = self.doc.add_object(Object::Dictionary(catalog));

        let info_id = self.doc.add_object(Object::Dictionary(info_dictionary(title)));

        self.doc.trailer.set("Root", Object::Reference(catalog_id));
        self.doc.trailer.set("Info", Object::Reference(info_id));

        self.doc.compress();
        self.doc.save(output)?;

        Ok(())
    }
}

/// Document information dictionary with title, producer and creation date
pub(crate) fn info_dictionary(title: &str) -> Dictionary {
    let created = Local::now().format("D:%Y%m%d%H%M%S").to_string();

    let mut info = Dictionary::new();
    if !title.is_empty() {
        info.set("Title", info_string(title));
    }
    info.set("Producer", info_string(PRODUCER));
    info.set("CreationDate", info_string(&created));
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_centered_text_position() {
        let page = PageDimensions::a4();
        let mut content = PageContent::new(page);
        content.centered_text(StandardFont::Helvetica, 10.0, Length::from_mm(0.0), "Hi");

        let ops = String::from_utf8(content.operations.clone()).unwrap();
        let expected_x = (page.width.pt() - 9.44) / 2.0;
        assert!(ops.contains(&format!("1 0 0 1 {:.2} {:.2} Tm", expected_x, page.height.pt())));
        assert!(ops.contains("/F1 10 Tf"));
        assert!(ops.contains("(Hi) Tj"));
    }

    #[test]
    fn test_empty_text_is_skipped() {
        let mut content = PageContent::new(PageDimensions::a4());
        content.centered_text(StandardFont::HelveticaBold, 16.0, Length::from_mm(30.0), "");
        assert!(content.operations.is_empty());
    }

    #[test]
    fn test_save_writes_pages_and_title() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.pdf");

        let mut report = ReportDocument::new(PageDimensions::letter());
        let mut first = report.new_page();
        first.text(StandardFont::Helvetica, 12.0, Length::from_mm(10.0), Length::from_mm(20.0), "one");
        report.add_page(first);
        report.add_page(report.new_page());
        assert_eq!(report.page_count(), 2);
        report.save(&output, "Lincoln ISD - Gym").unwrap();

        let doc = Document::load(&output).unwrap();
        assert_eq!(doc.get_pages().len(), 2);

        let info_id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let info = doc.get_dictionary(info_id).unwrap();
        assert_eq!(info.get(b"Title").unwrap().as_str().unwrap(), b"Lincoln ISD - Gym");
    }
}
