//! Page layout calculations
//!
//! All positions here are in millimetres measured from the top-left corner
//! of the page. Conversion to PDF user space (points, bottom-left origin)
//! happens when content streams are written.

/// Simple length type in millimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Length(pub f64);

impl Length {
    /// Create a length from millimeters
    pub fn from_mm(mm: f64) -> Self {
        Length(mm)
    }

    /// Create a length from inches
    pub fn from_inches(inches: f64) -> Self {
        Length(inches * 25.4)
    }

    /// Get the value in millimeters
    pub fn mm(&self) -> f64 {
        self.0
    }

    /// Get the value in points (1/72 inch)
    pub fn pt(&self) -> f64 {
        self.0 * 72.0 / 25.4
    }
}

/// Page dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageDimensions {
    pub width: Length,
    pub height: Length,
}

impl PageDimensions {
    /// US Letter size (8.5" × 11")
    pub fn letter() -> Self {
        Self {
            width: Length::from_inches(8.5),
            height: Length::from_inches(11.0),
        }
    }

    /// A4 size (210mm × 297mm)
    pub fn a4() -> Self {
        Self {
            width: Length::from_mm(210.0),
            height: Length::from_mm(297.0),
        }
    }
}

/// Axis-aligned box, top-left origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: Length,
    pub y: Length,
    pub width: Length,
    pub height: Length,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x: Length::from_mm(x),
            y: Length::from_mm(y),
            width: Length::from_mm(width),
            height: Length::from_mm(height),
        }
    }

    /// Largest box with the given aspect ratio that fits inside `self`, centred
    pub fn fit(&self, pixel_width: u32, pixel_height: u32) -> Rect {
        if pixel_width == 0 || pixel_height == 0 {
            return *self;
        }
        let aspect = pixel_width as f64 / pixel_height as f64;
        let mut w = self.width.mm();
        let mut h = w / aspect;
        if h > self.height.mm() {
            h = self.height.mm();
            w = h * aspect;
        }
        Rect::new(
            self.x.mm() + (self.width.mm() - w) / 2.0,
            self.y.mm() + (self.height.mm() - h) / 2.0,
            w,
            h,
        )
    }

    /// Like [`Rect::fit`] but anchored to the top-left corner
    pub fn fit_top_left(&self, pixel_width: u32, pixel_height: u32) -> Rect {
        let fitted = self.fit(pixel_width, pixel_height);
        Rect { x: self.x, y: self.y, ..fitted }
    }
}

/// Margins for page content
#[derive(Debug, Clone, Copy)]
pub struct Margins {
    pub top: Length,
    pub bottom: Length,
    pub left: Length,
    pub right: Length,
}

impl Margins {
    /// Create margins with same value on all sides
    pub fn uniform(margin: Length) -> Self {
        Self {
            top: margin,
            bottom: margin,
            left: margin,
            right: margin,
        }
    }
}

/// Where one image lands: page index (0-based) and cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub page: usize,
    pub cell: Rect,
}

/// Fixed 2×2 image grid below the title block
///
/// The grid origin is the same on every page, so continuation pages keep
/// the band reserved for the title block empty.
#[derive(Debug, Clone, Copy)]
pub struct ImageGrid {
    pub origin_x: Length,
    pub origin_y: Length,
    pub column_width: Length,
    pub row_height: Length,
}

impl ImageGrid {
    pub const COLUMNS: usize = 2;
    pub const ROWS: usize = 2;
    pub const PER_PAGE: usize = Self::COLUMNS * Self::ROWS;

    /// Grid for `page`, starting at `top` and leaving `margins` around the rest
    pub fn new(page: &PageDimensions, margins: &Margins, top: Length) -> Self {
        let content_width = page.width.mm() - margins.left.mm() - margins.right.mm();
        let content_height = page.height.mm() - top.mm() - margins.bottom.mm();
        Self {
            origin_x: margins.left,
            origin_y: top,
            column_width: Length::from_mm(content_width / Self::COLUMNS as f64),
            row_height: Length::from_mm(content_height / Self::ROWS as f64),
        }
    }

    /// Placement of the `index`-th successfully loaded image.
    ///
    /// Moves right one column per image, wraps to the next row after every
    /// second image and to a new page after every fourth.
    pub fn place(&self, index: usize) -> Placement {
        let page = index / Self::PER_PAGE;
        let slot = index % Self::PER_PAGE;
        let column = slot % Self::COLUMNS;
        let row = slot / Self::COLUMNS;
        Placement {
            page,
            cell: Rect::new(
                self.origin_x.mm() + column as f64 * self.column_width.mm(),
                self.origin_y.mm() + row as f64 * self.row_height.mm(),
                self.column_width.mm(),
                self.row_height.mm(),
            ),
        }
    }

    /// Pages needed for `count` images (at least one for the title block)
    pub fn pages_for(count: usize) -> usize {
        count.div_ceil(Self::PER_PAGE).max(1)
    }
}
