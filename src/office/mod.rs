//! Office Open XML writers
//!
//! Word, Excel and PowerPoint files are ZIP packages of XML parts tied
//! together by `[Content_Types].xml` and relationship parts. Only the parts
//! each format strictly needs are written.

pub mod docx;
pub mod pptx;
pub mod xlsx;

use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Writer,
};
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub use docx::{write_docx, DocxBlock, DocxDocument, DocxImage, DocxPage, DocxParagraph, DocxTable};
pub use pptx::{write_pptx, Slide};
pub use xlsx::{write_xlsx, Sheet};

/// Errors while writing an office package
#[derive(Error, Debug)]
pub enum OfficeError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workbook has no sheets")]
    NoSheets,
}

pub type Result<T> = std::result::Result<T, OfficeError>;

pub(crate) const NS_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships";
pub(crate) const NS_CONTENT_TYPES: &str =
    "http://schemas.openxmlformats.org/package/2006/content-types";
pub(crate) const NS_OFFICE_DOC_RELS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub(crate) const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub(crate) const REL_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
pub(crate) const NS_DRAWING: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

/// English Metric Units per point
pub(crate) const EMU_PER_POINT: i64 = 12_700;

/// A ZIP package being written part by part
pub(crate) struct Package<W: Write + Seek> {
    zip: ZipWriter<W>,
    options: SimpleFileOptions,
}

impl Package<File> {
    pub fn create(path: &Path) -> Result<Self> {
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write + Seek> Package<W> {
    pub fn new(writer: W) -> Self {
        Self {
            zip: ZipWriter::new(writer),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
        }
    }

    pub fn add(&mut self, name: &str, data: &[u8]) -> Result<()> {
        self.zip.start_file(name, self.options)?;
        self.zip.write_all(data)?;
        Ok(())
    }

    pub fn add_xml(&mut self, name: &str, part: XmlPart) -> Result<()> {
        self.add(name, &part.into_bytes())
    }

    pub fn finish(self) -> Result<W> {
        Ok(self.zip.finish()?)
    }
}

/// An XML part under construction
pub(crate) struct XmlPart {
    writer: Writer<Vec<u8>>,
}

impl XmlPart {
    /// Start a part with the standalone UTF-8 declaration
    pub fn new() -> Result<Self> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(Self { writer })
    }

    pub fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.writer.write_event(Event::Start(element(name, attrs)))?;
        Ok(())
    }

    pub fn end(&mut self, name: &str) -> Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    pub fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.writer.write_event(Event::Empty(element(name, attrs)))?;
        Ok(())
    }

    /// `<name attrs>value</name>`, value escaped and stripped of characters
    /// XML cannot carry
    pub fn text_element(&mut self, name: &str, attrs: &[(&str, &str)], value: &str) -> Result<()> {
        let clean = xml_safe(value);
        self.start(name, attrs)?;
        self.writer.write_event(Event::Text(BytesText::new(&clean)))?;
        self.end(name)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

fn element<'a>(name: &'a str, attrs: &[(&'a str, &'a str)]) -> BytesStart<'a> {
    let mut elem = BytesStart::new(name);
    for &attr in attrs {
        elem.push_attribute(attr);
    }
    elem
}

/// Drop characters outside the XML 1.0 character range
pub(crate) fn xml_safe(value: &str) -> String {
    value
        .chars()
        .filter(|&c| {
            matches!(c, '\t' | '\n' | '\r')
                || ('\u{20}'..='\u{D7FF}').contains(&c)
                || ('\u{E000}'..='\u{FFFD}').contains(&c)
                || c >= '\u{10000}'
        })
        .collect()
}

/// A `[Content_Types].xml` part
pub(crate) fn content_types(defaults: &[(&str, &str)], overrides: &[(String, &str)]) -> Result<XmlPart> {
    let mut part = XmlPart::new()?;
    part.start("Types", &[("xmlns", NS_CONTENT_TYPES)])?;

    part.empty(
        "Default",
        &[
            ("Extension", "rels"),
            ("ContentType", "application/vnd.openxmlformats-package.relationships+xml"),
        ],
    )?;
    part.empty("Default", &[("Extension", "xml"), ("ContentType", "application/xml")])?;
    for &(extension, content_type) in defaults {
        part.empty("Default", &[("Extension", extension), ("ContentType", content_type)])?;
    }

    for (part_name, content_type) in overrides {
        part.empty(
            "Override",
            &[("PartName", part_name.as_str()), ("ContentType", content_type)],
        )?;
    }

    part.end("Types")?;
    Ok(part)
}

/// A relationships part; each entry is `(id, type, target)`
pub(crate) fn relationships(entries: &[(String, &str, String)]) -> Result<XmlPart> {
    let mut part = XmlPart::new()?;
    part.start("Relationships", &[("xmlns", NS_RELATIONSHIPS)])?;
    for (id, rel_type, target) in entries {
        part.empty(
            "Relationship",
            &[("Id", id.as_str()), ("Type", rel_type), ("Target", target.as_str())],
        )?;
    }
    part.end("Relationships")?;
    Ok(part)
}

/// The package-level `_rels/.rels` pointing at the main document part
pub(crate) fn root_relationships(main_part: &str) -> Result<XmlPart> {
    relationships(&[("rId1".to_string(), REL_OFFICE_DOCUMENT, main_part.to_string())])
}
