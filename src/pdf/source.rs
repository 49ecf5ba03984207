//! Where a PDF comes from

use std::path::Path;

use mupdf::pdf::PdfDocument;
use mupdf::Document;

use crate::error::ConvertError;

/// Input document, either in memory or staged on disk
#[derive(Debug, Clone, Copy)]
pub enum PdfSource<'a> {
    Bytes(&'a [u8]),
    Path(&'a Path),
}

impl<'a> PdfSource<'a> {
    /// Open as a generic document (rendering, text)
    pub fn open(&self) -> Result<Document, ConvertError> {
        match self {
            Self::Bytes(data) => Document::from_bytes(data, "application/pdf").map_err(Into::into),
            Self::Path(path) => {
                let path_str = path.to_string_lossy();
                Document::open(&*path_str).map_err(Into::into)
            }
        }
    }

    /// Open as a PDF document (page grafting, saving)
    pub fn open_pdf(&self) -> Result<PdfDocument, ConvertError> {
        match self {
            Self::Bytes(data) => PdfDocument::from_bytes(data).map_err(Into::into),
            Self::Path(path) => {
                let path_str = path.to_string_lossy();
                PdfDocument::open(&*path_str).map_err(Into::into)
            }
        }
    }

    /// Short description for logs
    pub fn describe(&self) -> String {
        match self {
            Self::Bytes(data) => format!("{} bytes in memory", data.len()),
            Self::Path(path) => path.display().to_string(),
        }
    }
}
