//! PDF engine facade
//!
//! Thin wrappers over MuPDF for the operations the tools need:
//!
//! - `pages`: merge, split, compress and reorder documents
//! - `order`: parsing of user-supplied page sequences
//! - `render`: rasterizing pages to PNG
//! - `text`: structured text with line geometry
//! - `drawing`: ruling segments and image placements
//!
//! MuPDF documents are not `Send`; everything here is synchronous and is
//! meant to run inside `spawn_blocking`, opening documents in place.

mod drawing;
mod order;
mod pages;
mod render;
mod source;
mod text;

pub use drawing::{extract_page_drawing, PageDrawing, Segment};
pub use order::parse_page_order;
pub use pages::{compress, merge, organize, page_count, split, COMPRESS_GARBAGE_LEVEL};
pub use render::{crop_region_png, render_page_image, render_page_png, RenderedPage, SLIDE_RENDER_SCALE};
pub use source::PdfSource;
pub use text::{extract_page_text, BBox, Glyph, PageText, TextBlock, TextLine};
