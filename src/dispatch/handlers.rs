//! Tool handlers
//!
//! One function per catalog entry. Each reads its inputs from the [`Job`],
//! calls into the document collaborators and writes `job.output`.

use mupdf::Page;

use crate::error::ConvertError;
use crate::office::{
    self, DocxBlock, DocxDocument, DocxImage, DocxPage, DocxParagraph, DocxTable, Sheet, Slide,
};
use crate::pdf::{
    self, crop_region_png, extract_page_drawing, extract_page_text, render_page_image, render_page_png,
    PdfSource, TextLine, SLIDE_RENDER_SCALE,
};
use crate::tables::{detect_tables, Table};

use super::{Input, Job};

/// US Letter, used when a document has no pages to measure
const FALLBACK_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// Scale pictures are rasterized at for Word output (144 dpi)
const WORD_IMAGE_SCALE: f32 = 2.0;

pub const INFO_SHEET: &str = "Info";
pub const NO_TABLES_MESSAGE: &str = "No tables found in this PDF";

pub fn merge(job: &Job) -> Result<(), ConvertError> {
    let sources: Vec<PdfSource<'_>> = job.inputs.iter().map(Input::source).collect();
    let pages = pdf::merge(&sources, &job.output)?;
    tracing::debug!("Merged {} pages from {} files", pages, sources.len());
    Ok(())
}

pub fn split(job: &Job) -> Result<(), ConvertError> {
    let pages = pdf::split(job.input()?, &job.store, &job.output)?;
    tracing::debug!("Split into {} single-page documents", pages);
    Ok(())
}

pub fn compress(job: &Job) -> Result<(), ConvertError> {
    pdf::compress(job.input()?, &job.output)
}

pub fn organize(job: &Job) -> Result<(), ConvertError> {
    let order = job.options.get("order").unwrap_or("");
    let pages = pdf::organize(job.input()?, order, &job.output)?;
    tracing::debug!("Organized into {} pages", pages);
    Ok(())
}

/// Pages keep their text, ruled tables and pictures in top-to-bottom
/// order, and are kept apart with page breaks
pub fn word(job: &Job) -> Result<(), ConvertError> {
    let doc = job.input()?.open()?;
    let count = doc.page_count()?;

    let mut page_size = None;
    let mut pages = Vec::with_capacity(count.max(0) as usize);

    for index in 0..count {
        let page = doc.load_page(index)?;
        let content = word_page(&page)?;
        page_size.get_or_insert((content.width, content.height));
        pages.push(content.page);
    }

    let (page_width, page_height) = page_size.unwrap_or(FALLBACK_PAGE_SIZE);
    office::write_docx(
        &DocxDocument {
            page_width,
            page_height,
            pages,
        },
        &job.output,
    )?;
    Ok(())
}

struct WordPage {
    width: f32,
    height: f32,
    page: DocxPage,
}

fn word_page(page: &Page) -> Result<WordPage, ConvertError> {
    let text = extract_page_text(page)?;
    let drawing = extract_page_drawing(page)?;
    let tables = detect_tables(text.lines(), &drawing.segments);

    // Each block is placed by its top edge
    let mut placed: Vec<(f32, DocxBlock)> = Vec::new();

    for block in &text.blocks {
        let lines: Vec<&TextLine> = block
            .lines
            .iter()
            .filter(|line| !tables.iter().any(|table| table.contains(line)))
            .collect();
        if let Some(first) = lines.first() {
            placed.push((first.bbox.y0, DocxBlock::Paragraph(paragraph(&lines))));
        }
    }

    for table in &tables {
        placed.push((table.bbox.y0, DocxBlock::Table(docx_table(table))));
    }

    if !drawing.images.is_empty() {
        let rendered = render_page_image(page, WORD_IMAGE_SCALE)?;
        for bbox in &drawing.images {
            if let Some(picture) = crop_region_png(&rendered, WORD_IMAGE_SCALE, *bbox)? {
                placed.push((
                    bbox.y0,
                    DocxBlock::Image(DocxImage {
                        width: picture.width as f32 / WORD_IMAGE_SCALE,
                        height: picture.height as f32 / WORD_IMAGE_SCALE,
                        png: picture.png,
                    }),
                ));
            }
        }
    }

    placed.sort_by(|a, b| a.0.total_cmp(&b.0));

    tracing::trace!(
        blocks = placed.len(),
        tables = tables.len(),
        images = drawing.images.len(),
        "Converted page"
    );

    Ok(WordPage {
        width: text.width,
        height: text.height,
        page: DocxPage {
            blocks: placed.into_iter().map(|(_, block)| block).collect(),
        },
    })
}

fn paragraph(lines: &[&TextLine]) -> DocxParagraph {
    let font_size = if lines.is_empty() {
        None
    } else {
        let total: f32 = lines.iter().map(|line| line.font_size).sum();
        Some(total / lines.len() as f32)
    };

    DocxParagraph {
        lines: lines.iter().map(|line| line.text.trim_end().to_string()).collect(),
        font_size,
    }
}

fn docx_table(table: &Table) -> DocxTable {
    DocxTable {
        rows: table.rows.clone(),
        width: table.bbox.width(),
    }
}

/// One sheet per detected table, named `P<page>_T<table>`
pub fn excel(job: &Job) -> Result<(), ConvertError> {
    let doc = job.input()?.open()?;
    let count = doc.page_count()?;

    let mut sheets = Vec::new();
    for index in 0..count {
        let page = doc.load_page(index)?;
        let text = extract_page_text(&page)?;
        let drawing = extract_page_drawing(&page)?;

        for (t, table) in detect_tables(text.lines(), &drawing.segments).into_iter().enumerate() {
            sheets.push(Sheet::new(format!("P{}_T{}", index + 1, t + 1), table.rows));
        }
    }

    if sheets.is_empty() {
        tracing::debug!("No tables detected, writing info sheet");
        sheets.push(info_sheet());
    } else {
        tracing::debug!("Detected {} tables", sheets.len());
    }

    office::write_xlsx(&sheets, &job.output)?;
    Ok(())
}

fn info_sheet() -> Sheet {
    Sheet::new(
        INFO_SHEET,
        vec![vec!["Note".to_string()], vec![NO_TABLES_MESSAGE.to_string()]],
    )
}

/// Every page rendered at 2x and placed as a full-width picture
pub fn ppt(job: &Job) -> Result<(), ConvertError> {
    let doc = job.input()?.open()?;
    let count = doc.page_count()?.max(0) as usize;

    let mut slides = Vec::with_capacity(count);
    for index in 0..count {
        let rendered = render_page_png(&doc, index, SLIDE_RENDER_SCALE)?;
        slides.push(Slide {
            png: rendered.png,
            width: rendered.width,
            height: rendered.height,
        });
    }

    office::write_pptx(&slides, &job.output)?;
    Ok(())
}
