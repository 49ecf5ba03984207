//! WordprocessingML (.docx) writer
//!
//! Pages are written as sequences of paragraphs, bordered tables and
//! inline pictures, separated by hard page breaks.

use std::path::Path;

use super::{
    content_types, relationships, root_relationships, Package, Result, XmlPart, EMU_PER_POINT, NS_DRAWING,
    NS_OFFICE_DOC_RELS, REL_IMAGE,
};

const NS_WORD: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_WORD_DRAWING: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const NS_PICTURE: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
const CT_DOCUMENT: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";

/// Twentieths of a point
const TWIPS_PER_POINT: f32 = 20.0;

/// One inch margins
const MARGIN_TWIPS: &str = "1440";
const MARGIN_POINTS: f32 = 72.0;

/// Border width in eighths of a point
const TABLE_BORDER_SIZE: &str = "4";

/// A paragraph: its lines are kept apart with line breaks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocxParagraph {
    pub lines: Vec<String>,
    /// Font size in points
    pub font_size: Option<f32>,
}

/// A bordered table; multi-line cells use `\n`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocxTable {
    pub rows: Vec<Vec<String>>,
    /// Total width in points
    pub width: f32,
}

/// A PNG picture shown at `width` x `height` points
#[derive(Debug, Clone, PartialEq)]
pub struct DocxImage {
    pub png: Vec<u8>,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DocxBlock {
    Paragraph(DocxParagraph),
    Table(DocxTable),
    Image(DocxImage),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocxPage {
    pub blocks: Vec<DocxBlock>,
}

/// Document content; pages are separated by hard page breaks
#[derive(Debug, Clone, PartialEq)]
pub struct DocxDocument {
    /// Page size in points
    pub page_width: f32,
    pub page_height: f32,
    pub pages: Vec<DocxPage>,
}

impl DocxDocument {
    fn images(&self) -> impl Iterator<Item = &DocxImage> {
        self.pages.iter().flat_map(|page| page.blocks.iter()).filter_map(|block| match block {
            DocxBlock::Image(image) => Some(image),
            _ => None,
        })
    }

    /// Width available between the margins, in points
    fn text_width(&self) -> f32 {
        (self.page_width - 2.0 * MARGIN_POINTS).max(MARGIN_POINTS)
    }
}

pub fn write_docx(document: &DocxDocument, path: &Path) -> Result<()> {
    let mut package = Package::create(path)?;

    package.add_xml(
        "[Content_Types].xml",
        content_types(
            &[("png", "image/png")],
            &[("/word/document.xml".to_string(), CT_DOCUMENT)],
        )?,
    )?;
    package.add_xml("_rels/.rels", root_relationships("word/document.xml")?)?;

    let mut rels = Vec::new();
    for (index, image) in document.images().enumerate() {
        let n = index + 1;
        let target = format!("media/image{}.png", n);
        package.add(&format!("word/{}", target), &image.png)?;
        rels.push((image_rel_id(n), REL_IMAGE, target));
    }

    package.add_xml("word/_rels/document.xml.rels", relationships(&rels)?)?;
    package.add_xml("word/document.xml", document_part(document)?)?;

    package.finish()?;
    Ok(())
}

fn image_rel_id(n: usize) -> String {
    format!("rId{}", n)
}

fn document_part(document: &DocxDocument) -> Result<XmlPart> {
    let mut part = XmlPart::new()?;
    part.start(
        "w:document",
        &[
            ("xmlns:w", NS_WORD),
            ("xmlns:r", NS_OFFICE_DOC_RELS),
            ("xmlns:wp", NS_WORD_DRAWING),
        ],
    )?;
    part.start("w:body", &[])?;

    let text_width = document.text_width();
    let mut image_count = 0;

    for (index, page) in document.pages.iter().enumerate() {
        if index > 0 {
            part.start("w:p", &[])?;
            part.start("w:r", &[])?;
            part.empty("w:br", &[("w:type", "page")])?;
            part.end("w:r")?;
            part.end("w:p")?;
        }

        for block in &page.blocks {
            match block {
                DocxBlock::Paragraph(paragraph) => write_paragraph(&mut part, paragraph)?,
                DocxBlock::Table(table) => write_table(&mut part, table, text_width)?,
                DocxBlock::Image(image) => {
                    image_count += 1;
                    write_image(&mut part, image, image_count, text_width)?;
                }
            }
        }
    }

    let width = twips(document.page_width);
    let height = twips(document.page_height);

    part.start("w:sectPr", &[])?;
    part.empty("w:pgSz", &[("w:w", width.as_str()), ("w:h", height.as_str())])?;
    part.empty(
        "w:pgMar",
        &[
            ("w:top", MARGIN_TWIPS),
            ("w:right", MARGIN_TWIPS),
            ("w:bottom", MARGIN_TWIPS),
            ("w:left", MARGIN_TWIPS),
            ("w:header", "720"),
            ("w:footer", "720"),
            ("w:gutter", "0"),
        ],
    )?;
    part.end("w:sectPr")?;

    part.end("w:body")?;
    part.end("w:document")?;
    Ok(part)
}

fn write_paragraph(part: &mut XmlPart, paragraph: &DocxParagraph) -> Result<()> {
    part.start("w:p", &[])?;
    part.start("w:r", &[])?;

    if let Some(size) = paragraph.font_size {
        // w:sz is in half-points
        let half_points = ((size * 2.0).round() as u32).max(2).to_string();
        part.start("w:rPr", &[])?;
        part.empty("w:sz", &[("w:val", half_points.as_str())])?;
        part.end("w:rPr")?;
    }

    write_lines(part, paragraph.lines.iter().map(String::as_str))?;

    part.end("w:r")?;
    part.end("w:p")
}

fn write_lines<'a>(part: &mut XmlPart, lines: impl Iterator<Item = &'a str>) -> Result<()> {
    for (index, line) in lines.enumerate() {
        if index > 0 {
            part.empty("w:br", &[])?;
        }
        part.text_element("w:t", &[("xml:space", "preserve")], line)?;
    }
    Ok(())
}

fn write_table(part: &mut XmlPart, table: &DocxTable, text_width: f32) -> Result<()> {
    let columns = table.rows.iter().map(Vec::len).max().unwrap_or(0);
    if columns == 0 {
        return Ok(());
    }

    let width = table.width.min(text_width).max(columns as f32 * 12.0);
    let total = twips(width);
    let column = twips(width / columns as f32);

    part.start("w:tbl", &[])?;

    part.start("w:tblPr", &[])?;
    part.empty("w:tblW", &[("w:w", total.as_str()), ("w:type", "dxa")])?;
    part.start("w:tblBorders", &[])?;
    for side in ["w:top", "w:left", "w:bottom", "w:right", "w:insideH", "w:insideV"] {
        part.empty(
            side,
            &[("w:val", "single"), ("w:sz", TABLE_BORDER_SIZE), ("w:space", "0"), ("w:color", "auto")],
        )?;
    }
    part.end("w:tblBorders")?;
    part.end("w:tblPr")?;

    part.start("w:tblGrid", &[])?;
    for _ in 0..columns {
        part.empty("w:gridCol", &[("w:w", column.as_str())])?;
    }
    part.end("w:tblGrid")?;

    for row in &table.rows {
        part.start("w:tr", &[])?;
        for c in 0..columns {
            part.start("w:tc", &[])?;
            part.start("w:tcPr", &[])?;
            part.empty("w:tcW", &[("w:w", column.as_str()), ("w:type", "dxa")])?;
            part.end("w:tcPr")?;

            // Every cell needs a paragraph, even an empty one
            part.start("w:p", &[])?;
            if let Some(text) = row.get(c).filter(|t| !t.is_empty()) {
                part.start("w:r", &[])?;
                write_lines(part, text.split('\n'))?;
                part.end("w:r")?;
            }
            part.end("w:p")?;

            part.end("w:tc")?;
        }
        part.end("w:tr")?;
    }

    part.end("w:tbl")?;

    // Keeps adjacent tables from merging when the file is edited
    part.empty("w:p", &[])
}

fn write_image(part: &mut XmlPart, image: &DocxImage, n: usize, text_width: f32) -> Result<()> {
    let (width, height) = fit_width(image.width, image.height, text_width);
    let cx = emu(width);
    let cy = emu(height);
    let id = n.to_string();
    let name = format!("Picture {}", n);
    let rel_id = image_rel_id(n);

    part.start("w:p", &[])?;
    part.start("w:r", &[])?;
    part.start("w:drawing", &[])?;
    part.start(
        "wp:inline",
        &[("distT", "0"), ("distB", "0"), ("distL", "0"), ("distR", "0")],
    )?;
    part.empty("wp:extent", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
    part.empty("wp:docPr", &[("id", id.as_str()), ("name", name.as_str())])?;

    part.start("a:graphic", &[("xmlns:a", NS_DRAWING)])?;
    part.start("a:graphicData", &[("uri", NS_PICTURE)])?;
    part.start("pic:pic", &[("xmlns:pic", NS_PICTURE)])?;

    part.start("pic:nvPicPr", &[])?;
    part.empty("pic:cNvPr", &[("id", id.as_str()), ("name", name.as_str())])?;
    part.empty("pic:cNvPicPr", &[])?;
    part.end("pic:nvPicPr")?;

    part.start("pic:blipFill", &[])?;
    part.empty("a:blip", &[("r:embed", rel_id.as_str())])?;
    part.start("a:stretch", &[])?;
    part.empty("a:fillRect", &[])?;
    part.end("a:stretch")?;
    part.end("pic:blipFill")?;

    part.start("pic:spPr", &[])?;
    part.start("a:xfrm", &[])?;
    part.empty("a:off", &[("x", "0"), ("y", "0")])?;
    part.empty("a:ext", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
    part.end("a:xfrm")?;
    part.start("a:prstGeom", &[("prst", "rect")])?;
    part.empty("a:avLst", &[])?;
    part.end("a:prstGeom")?;
    part.end("pic:spPr")?;

    part.end("pic:pic")?;
    part.end("a:graphicData")?;
    part.end("a:graphic")?;
    part.end("wp:inline")?;
    part.end("w:drawing")?;
    part.end("w:r")?;
    part.end("w:p")
}

/// Scale down, keeping the aspect ratio, so `width` fits `max_width`
fn fit_width(width: f32, height: f32, max_width: f32) -> (f32, f32) {
    if width <= max_width || width <= 0.0 {
        (width, height)
    } else {
        (max_width, height * max_width / width)
    }
}

fn emu(points: f32) -> String {
    ((points.max(1.0) as f64 * EMU_PER_POINT as f64).round() as i64).to_string()
}

fn twips(points: f32) -> String {
    ((points * TWIPS_PER_POINT).round() as u32).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{zip_entry_names, zip_entry_text};
    use tempfile::TempDir;

    fn paragraph(lines: &[&str], size: Option<f32>) -> DocxBlock {
        DocxBlock::Paragraph(DocxParagraph {
            lines: lines.iter().map(|s| s.to_string()).collect(),
            font_size: size,
        })
    }

    fn letter(pages: Vec<DocxPage>) -> DocxDocument {
        DocxDocument {
            page_width: 612.0,
            page_height: 792.0,
            pages,
        }
    }

    fn write(document: &DocxDocument) -> Vec<u8> {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.docx");
        write_docx(document, &path).unwrap();
        std::fs::read(&path).unwrap()
    }

    #[test]
    fn test_package_parts() {
        let data = write(&letter(vec![DocxPage::default()]));

        let names = zip_entry_names(&data);
        for expected in ["[Content_Types].xml", "_rels/.rels", "word/document.xml"] {
            assert!(names.iter().any(|n| n == expected), "missing {}", expected);
        }
        assert!(!names.iter().any(|n| n.starts_with("word/media/")));

        let types = zip_entry_text(&data, "[Content_Types].xml");
        assert!(types.contains("PartName=\"/word/document.xml\""));
    }

    #[test]
    fn test_paragraphs_and_page_breaks() {
        let data = write(&letter(vec![
            DocxPage {
                blocks: vec![paragraph(&["Title"], Some(24.0)), paragraph(&["one", "two"], None)],
            },
            DocxPage {
                blocks: vec![paragraph(&["Second <page>"], Some(11.0))],
            },
        ]));

        let xml = zip_entry_text(&data, "word/document.xml");
        assert!(xml.contains("<w:sz w:val=\"48\"/>"));
        assert!(xml.contains("<w:sz w:val=\"22\"/>"));
        assert!(xml.contains("one</w:t><w:br/><w:t xml:space=\"preserve\">two"));
        assert!(xml.contains("Second &lt;page&gt;"));
        assert_eq!(xml.matches("w:type=\"page\"").count(), 1);

        // Title comes before the break, the second page after it
        let title = xml.find("Title").unwrap();
        let brk = xml.find("w:type=\"page\"").unwrap();
        let second = xml.find("Second").unwrap();
        assert!(title < brk && brk < second);
    }

    #[test]
    fn test_table() {
        let data = write(&letter(vec![DocxPage {
            blocks: vec![DocxBlock::Table(DocxTable {
                rows: vec![
                    vec!["Name".into(), "Qty".into()],
                    vec!["Apple\ngreen".into(), String::new()],
                ],
                width: 300.0,
            })],
        }]));

        let xml = zip_entry_text(&data, "word/document.xml");
        assert_eq!(xml.matches("<w:tbl>").count(), 1);
        assert_eq!(xml.matches("<w:tr>").count(), 2);
        assert_eq!(xml.matches("<w:tc>").count(), 4);
        assert_eq!(xml.matches("<w:gridCol w:w=\"3000\"/>").count(), 2);
        assert!(xml.contains("<w:tblW w:w=\"6000\" w:type=\"dxa\"/>"));
        assert!(xml.contains("Apple</w:t><w:br/><w:t xml:space=\"preserve\">green"));
        // Empty cell still holds a paragraph
        assert!(xml.contains("<w:p></w:p></w:tc>") || xml.contains("<w:p/></w:tc>"));
    }

    #[test]
    fn test_images_are_embedded() {
        let png = vec![0x89, b'P', b'N', b'G'];
        let data = write(&letter(vec![
            DocxPage {
                blocks: vec![DocxBlock::Image(DocxImage {
                    png: png.clone(),
                    width: 200.0,
                    height: 100.0,
                })],
            },
            DocxPage {
                blocks: vec![DocxBlock::Image(DocxImage {
                    png: png.clone(),
                    width: 936.0,
                    height: 400.0,
                })],
            },
        ]));

        let names = zip_entry_names(&data);
        assert!(names.iter().any(|n| n == "word/media/image1.png"));
        assert!(names.iter().any(|n| n == "word/media/image2.png"));

        let rels = zip_entry_text(&data, "word/_rels/document.xml.rels");
        assert!(rels.contains("Id=\"rId2\""));
        assert!(rels.contains("Target=\"media/image2.png\""));

        let types = zip_entry_text(&data, "[Content_Types].xml");
        assert!(types.contains("Extension=\"png\""));

        let xml = zip_entry_text(&data, "word/document.xml");
        assert_eq!(xml.matches("<w:drawing>").count(), 2);
        assert!(xml.contains("r:embed=\"rId1\""));
        // 200pt x 100pt
        assert!(xml.contains("<wp:extent cx=\"2540000\" cy=\"1270000\"/>"));
        // 936pt wide is scaled to the 468pt text width
        assert!(xml.contains("<wp:extent cx=\"5943600\" cy=\"2540000\"/>"));
    }

    #[test]
    fn test_section_uses_page_size() {
        let data = write(&DocxDocument {
            page_width: 595.0,
            page_height: 842.0,
            pages: vec![],
        });

        let xml = zip_entry_text(&data, "word/document.xml");
        assert!(xml.contains("<w:pgSz w:w=\"11900\" w:h=\"16840\"/>"));
    }
}
