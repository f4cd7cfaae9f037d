use std::path::PathBuf;

/// US Letter, portrait.
pub const PAGE_WIDTH_MM: f64 = 215.9;
pub const PAGE_HEIGHT_MM: f64 = 279.4;

/// Absolute placement in millimetres from the page's top-left corner. For
/// text blocks `h` is the line height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Single bold line.
    Heading { at: Rect, text: String },
    /// Regular text wrapped to `at.w`, one line every `at.h`.
    Text { at: Rect, text: String },
    /// Raster file scaled into `at`.
    Image { at: Rect, path: PathBuf },
}

impl Block {
    pub fn at(&self) -> Rect {
        match self {
            Block::Heading { at, .. } | Block::Text { at, .. } | Block::Image { at, .. } => *at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportLayout {
    pub pages: Vec<Page>,
}
