//! Structured text extraction
//!
//! Pulls blocks and lines with their geometry out of MuPDF's stext device.
//! Coordinates are in PDF points with the origin at the top-left corner of
//! the page, y growing downwards.

use mupdf::{Page, TextPageOptions};

use crate::error::ConvertError;

/// Axis-aligned box in page space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }

    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }
}

/// A single character with its horizontal extent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub ch: char,
    pub x0: f32,
    pub x1: f32,
}

/// One line of text
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub bbox: BBox,
    pub text: String,
    /// Average glyph size in points
    pub font_size: f32,
    pub glyphs: Vec<Glyph>,
}

/// A block of consecutive lines (roughly a paragraph)
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub bbox: BBox,
    pub lines: Vec<TextLine>,
}

/// Text content of one page
#[derive(Debug, Clone, PartialEq)]
pub struct PageText {
    pub width: f32,
    pub height: f32,
    pub blocks: Vec<TextBlock>,
}

impl PageText {
    /// All lines of the page, in reading order of the blocks
    pub fn lines(&self) -> impl Iterator<Item = &TextLine> {
        self.blocks.iter().flat_map(|block| block.lines.iter())
    }
}

/// Extract blocks and lines of a page
///
/// Lines without any character are dropped, as are blocks left empty.
pub fn extract_page_text(page: &Page) -> Result<PageText, ConvertError> {
    let text_page = page.to_text_page(TextPageOptions::PRESERVE_WHITESPACE)?;
    let bounds = page.bounds()?;

    let mut blocks = Vec::new();

    for block in text_page.blocks() {
        let b = block.bounds();
        let mut lines = Vec::new();

        for line in block.lines() {
            let lb = line.bounds();
            let mut text = String::new();
            let mut glyphs = Vec::new();
            let mut size_total = 0.0f32;

            for ch in line.chars() {
                if let Some(c) = ch.char() {
                    let quad = ch.quad();
                    let x0 = quad.ul.x.min(quad.ll.x);
                    let x1 = quad.ur.x.max(quad.lr.x);

                    text.push(c);
                    glyphs.push(Glyph { ch: c, x0, x1 });
                    size_total += ch.size();
                }
            }

            if glyphs.is_empty() {
                continue;
            }

            lines.push(TextLine {
                bbox: BBox::new(lb.x0, lb.y0, lb.x1, lb.y1),
                text,
                font_size: size_total / glyphs.len() as f32,
                glyphs,
            });
        }

        if !lines.is_empty() {
            blocks.push(TextBlock {
                bbox: BBox::new(b.x0, b.y0, b.x1, b.y1),
                lines,
            });
        }
    }

    Ok(PageText {
        width: bounds.x1 - bounds.x0,
        height: bounds.y1 - bounds.y0,
        blocks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::PdfSource;
    use crate::testing::sample_pdf;

    #[test]
    fn test_bbox_geometry() {
        let bbox = BBox::new(10.0, 20.0, 30.0, 60.0);
        assert_eq!(bbox.width(), 20.0);
        assert_eq!(bbox.height(), 40.0);
        assert_eq!(bbox.center_x(), 20.0);
        assert_eq!(bbox.center_y(), 40.0);
    }

    #[test]
    fn test_extract_label_text() {
        let data = sample_pdf(&["Hello"]);
        let doc = PdfSource::Bytes(&data).open().unwrap();
        let page = doc.load_page(0).unwrap();

        let text = extract_page_text(&page).unwrap();
        assert_eq!(text.width, 612.0);
        assert_eq!(text.height, 792.0);

        let line = text.lines().next().expect("one line");
        assert_eq!(line.text.trim(), "Hello");
        assert!(line.font_size > 20.0 && line.font_size < 28.0);
        // Label is drawn near the top of the page
        assert!(line.bbox.y0 < 100.0);
    }
}
