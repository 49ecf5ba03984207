//! Vector drawing capture
//!
//! Runs a page through a custom MuPDF device and records the straight
//! segments of every stroked or filled path, plus the placement of every
//! image. Table detection uses the segments as ruling lines; the Word
//! converter uses the image boxes.
//!
//! Coordinates are in the same top-left page space as [`super::text`].

use std::cell::RefCell;
use std::rc::Rc;

use mupdf::{ColorParams, Colorspace, Device, Image, Matrix, NativeDevice, Page, Path, PathWalker, StrokeState};

use super::BBox;
use crate::error::ConvertError;

/// A straight piece of a drawn path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

/// Everything drawn on a page that is not text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageDrawing {
    pub segments: Vec<Segment>,
    pub images: Vec<BBox>,
}

/// Collect path segments and image placements of a page
pub fn extract_page_drawing(page: &Page) -> Result<PageDrawing, ConvertError> {
    let collected = Rc::new(RefCell::new(PageDrawing::default()));

    let device = Device::from_native(DrawingCollector {
        out: Rc::clone(&collected),
    })?;
    page.run(&device, &Matrix::IDENTITY)?;
    drop(device);

    let drawing = collected.borrow().clone();
    tracing::trace!(
        segments = drawing.segments.len(),
        images = drawing.images.len(),
        "Captured page drawing"
    );
    Ok(drawing)
}

struct DrawingCollector {
    out: Rc<RefCell<PageDrawing>>,
}

impl DrawingCollector {
    fn collect_path(&mut self, path: &Path, ctm: Matrix) {
        let mut out = self.out.borrow_mut();
        let walker = SegmentWalker {
            ctm,
            start: None,
            current: None,
            segments: &mut out.segments,
        };
        if let Err(e) = path.walk(walker) {
            tracing::debug!("Skipping unreadable path: {}", e);
        }
    }
}

impl NativeDevice for DrawingCollector {
    fn fill_path(
        &mut self,
        path: &Path,
        _even_odd: bool,
        ctm: Matrix,
        _color_space: &Colorspace,
        _color: &[f32],
        _alpha: f32,
        _cp: ColorParams,
    ) {
        self.collect_path(path, ctm);
    }

    fn stroke_path(
        &mut self,
        path: &Path,
        _stroke_state: &StrokeState,
        ctm: Matrix,
        _color_space: &Colorspace,
        _color: &[f32],
        _alpha: f32,
        _cp: ColorParams,
    ) {
        self.collect_path(path, ctm);
    }

    fn fill_image(&mut self, _image: &Image, ctm: Matrix, _alpha: f32, _cp: ColorParams) {
        // Images are drawn into the unit square
        self.out.borrow_mut().images.push(unit_square_bounds(&ctm));
    }
}

struct SegmentWalker<'a> {
    ctm: Matrix,
    start: Option<(f32, f32)>,
    current: Option<(f32, f32)>,
    segments: &'a mut Vec<Segment>,
}

impl SegmentWalker<'_> {
    fn push_to(&mut self, to: (f32, f32)) {
        if let Some(from) = self.current {
            if from != to {
                self.segments.push(Segment {
                    x0: from.0,
                    y0: from.1,
                    x1: to.0,
                    y1: to.1,
                });
            }
        }
        self.current = Some(to);
    }
}

impl PathWalker for SegmentWalker<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let point = transform(&self.ctm, x, y);
        self.start = Some(point);
        self.current = Some(point);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let point = transform(&self.ctm, x, y);
        self.push_to(point);
    }

    fn curve_to(&mut self, _cx1: f32, _cy1: f32, _cx2: f32, _cy2: f32, ex: f32, ey: f32) {
        // Curves never rule a table
        self.current = Some(transform(&self.ctm, ex, ey));
    }

    fn close(&mut self) {
        if let Some(start) = self.start {
            self.push_to(start);
        }
    }
}

fn transform(m: &Matrix, x: f32, y: f32) -> (f32, f32) {
    (m.a * x + m.c * y + m.e, m.b * x + m.d * y + m.f)
}

fn unit_square_bounds(m: &Matrix) -> BBox {
    let corners = [
        transform(m, 0.0, 0.0),
        transform(m, 1.0, 0.0),
        transform(m, 0.0, 1.0),
        transform(m, 1.0, 1.0),
    ];

    let mut bbox = BBox::new(f32::MAX, f32::MAX, f32::MIN, f32::MIN);
    for (x, y) in corners {
        bbox.x0 = bbox.x0.min(x);
        bbox.y0 = bbox.y0.min(y);
        bbox.x1 = bbox.x1.max(x);
        bbox.y1 = bbox.y1.max(y);
    }
    bbox
}
