//! Page rasterization

use std::io::Cursor;

use image::{imageops, DynamicImage, RgbImage};
use mupdf::{Colorspace, Document, Matrix, Page};

use super::BBox;
use crate::error::ConvertError;

/// Scale used for slide images (2x = 144 dpi)
pub const SLIDE_RENDER_SCALE: f32 = 2.0;

/// A page, or part of one, rendered to PNG
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Render page `index` (0-based) at `scale` and encode it as PNG
pub fn render_page_png(doc: &Document, index: usize, scale: f32) -> Result<RenderedPage, ConvertError> {
    let page = doc.load_page(index as i32)?;
    encode_png(render_page_image(&page, scale)?)
}

/// Rasterize a page to an RGB buffer
pub fn render_page_image(page: &Page, scale: f32) -> Result<RgbImage, ConvertError> {
    let matrix = Matrix::new_scale(scale, scale);
    let pixmap = page.to_pixmap(&matrix, &Colorspace::device_rgb(), false, true)?;

    let (width, height) = (pixmap.width() as u32, pixmap.height() as u32);
    if pixmap.n() != 3 {
        return Err(ConvertError::Empty(format!(
            "Unexpected pixmap layout: {} components",
            pixmap.n()
        )));
    }

    RgbImage::from_raw(width, height, pixmap.samples().to_vec())
        .ok_or_else(|| ConvertError::Empty("Failed to create image buffer".to_string()))
}

/// Cut `region` (in page points) out of a page rendered at `scale`
///
/// The region is clamped to the page. Returns `None` when nothing of it
/// is left.
pub fn crop_region_png(
    page_image: &RgbImage,
    scale: f32,
    region: BBox,
) -> Result<Option<RenderedPage>, ConvertError> {
    let clamp = |v: f32, max: u32| ((v * scale).round().max(0.0) as u32).min(max);

    let x0 = clamp(region.x0, page_image.width());
    let y0 = clamp(region.y0, page_image.height());
    let x1 = clamp(region.x1, page_image.width());
    let y1 = clamp(region.y1, page_image.height());

    if x1 <= x0 || y1 <= y0 {
        return Ok(None);
    }

    let cropped = imageops::crop_imm(page_image, x0, y0, x1 - x0, y1 - y0).to_image();
    encode_png(cropped).map(Some)
}

fn encode_png(img: RgbImage) -> Result<RenderedPage, ConvertError> {
    let (width, height) = img.dimensions();

    let mut png = Vec::new();
    DynamicImage::ImageRgb8(img).write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;

    Ok(RenderedPage { png, width, height })
}
