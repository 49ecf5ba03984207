//! Page-level document operations
//!
//! Merge, split and organize build a fresh `PdfDocument` and graft pages
//! into it, so resources of the source documents are copied as needed and
//! the originals are never modified.

use std::io::Write;
use std::path::Path;

use mupdf::pdf::{PdfDocument, PdfWriteOptions};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::order::parse_page_order;
use super::source::PdfSource;
use crate::artifacts::ArtifactStore;
use crate::error::ConvertError;

/// Append at the end of the destination document
const APPEND: i32 = -1;

/// Object garbage collection level used by compress (4 = deduplicate objects)
pub const COMPRESS_GARBAGE_LEVEL: i32 = 4;

/// Number of pages in a document
pub fn page_count(source: PdfSource<'_>) -> Result<usize, ConvertError> {
    let doc = source.open()?;
    Ok(doc.page_count()? as usize)
}

/// Concatenate all pages of `sources`, in order, into `output`
///
/// Empty or unreadable inputs are skipped. Fails only when nothing at all
/// could be merged. Returns the merged page count.
pub fn merge(sources: &[PdfSource<'_>], output: &Path) -> Result<usize, ConvertError> {
    let mut merged = PdfDocument::new();
    let mut total = 0usize;

    for (index, source) in sources.iter().enumerate() {
        if let PdfSource::Bytes(data) = source {
            if data.is_empty() {
                tracing::debug!("Skipping empty upload #{}", index + 1);
                continue;
            }
        }

        let doc = match source.open_pdf() {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!("Skipping unreadable upload #{} ({}): {}", index + 1, source.describe(), e);
                continue;
            }
        };

        let count = doc.page_count()?;
        for page in 0..count {
            merged.graft_page(APPEND, &doc, page)?;
        }
        total += count as usize;
    }

    if total == 0 {
        return Err(ConvertError::Empty("No readable PDF pages to merge".to_string()));
    }

    save(&merged, output)?;
    Ok(total)
}

/// Write every page as its own PDF into a ZIP archive at `output`
///
/// Entries are named `page_<n>.pdf`, 1-based. Returns the number of pages.
pub fn split(
    source: PdfSource<'_>,
    scratch: &ArtifactStore,
    output: &Path,
) -> Result<usize, ConvertError> {
    let doc = source.open_pdf()?;
    let count = doc.page_count()?;

    let file = std::fs::File::create(output)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for page in 0..count {
        let mut single = PdfDocument::new();
        single.graft_page(APPEND, &doc, page)?;

        // MuPDF saves to paths; round-trip each page through the scratch area
        let staged = scratch.scratch_file("pdf");
        save(&single, staged.path())?;
        let data = std::fs::read(staged.path())?;

        zip.start_file(format!("page_{}.pdf", page + 1), options)?;
        zip.write_all(&data)?;
    }

    zip.finish()?;
    Ok(count as usize)
}

/// Rewrite with garbage collection, stream deflation and content cleanup
pub fn compress(source: PdfSource<'_>, output: &Path) -> Result<(), ConvertError> {
    let doc = source.open_pdf()?;

    let mut options = PdfWriteOptions::default();
    options.set_garbage_level(COMPRESS_GARBAGE_LEVEL);
    options.set_compress(true);
    options.set_clean(true);

    let path_str = output.to_string_lossy();
    doc.save_with_options(&path_str, options)?;
    Ok(())
}

/// Reorder, subset or repeat pages following `order`
///
/// `order` is a comma-separated list of 1-based page numbers. When nothing
/// valid remains after filtering, the document is written unchanged.
/// Returns the resulting page count.
pub fn organize(source: PdfSource<'_>, order: &str, output: &Path) -> Result<usize, ConvertError> {
    let doc = source.open_pdf()?;
    let count = doc.page_count()? as usize;

    let indices = parse_page_order(order, count);
    if indices.is_empty() {
        tracing::debug!("No usable page order in {:?}, keeping all {} pages", order, count);
        save(&doc, output)?;
        return Ok(count);
    }

    let mut organized = PdfDocument::new();
    for &index in &indices {
        organized.graft_page(APPEND, &doc, index as i32)?;
    }

    save(&organized, output)?;
    Ok(indices.len())
}

fn save(doc: &PdfDocument, path: &Path) -> Result<(), ConvertError> {
    let path_str = path.to_string_lossy();
    doc.save(&path_str)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{bulky_pdf, page_labels, sample_pdf};
    use std::io::{Cursor, Read};
    use tempfile::TempDir;

    fn store_in(temp: &TempDir) -> ArtifactStore {
        let store = ArtifactStore::new(temp.path().join("up"), temp.path().join("down"));
        std::fs::create_dir_all(store.upload_dir()).unwrap();
        std::fs::create_dir_all(store.download_dir()).unwrap();
        store
    }

    #[test]
    fn test_merge_keeps_submission_order() {
        let temp = TempDir::new().unwrap();
        let first = sample_pdf(&["A", "B"]);
        let second = sample_pdf(&["C"]);
        let out = temp.path().join("merged.pdf");

        let pages = merge(&[PdfSource::Bytes(&first), PdfSource::Bytes(&second)], &out).unwrap();

        assert_eq!(pages, 3);
        assert_eq!(page_labels(&std::fs::read(&out).unwrap()), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_merge_skips_empty_and_unreadable() {
        let temp = TempDir::new().unwrap();
        let good = sample_pdf(&["A"]);
        let out = temp.path().join("merged.pdf");

        let pages = merge(
            &[
                PdfSource::Bytes(b""),
                PdfSource::Bytes(b"not a pdf at all"),
                PdfSource::Bytes(&good),
            ],
            &out,
        )
        .unwrap();

        assert_eq!(pages, 1);
        assert_eq!(page_labels(&std::fs::read(&out).unwrap()), vec!["A"]);
    }

    #[test]
    fn test_merge_with_nothing_readable_fails() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("merged.pdf");

        let err = merge(&[PdfSource::Bytes(b""), PdfSource::Bytes(b"")], &out).unwrap_err();
        assert!(matches!(err, ConvertError::Empty(_)));
        assert!(!out.exists());
    }

    #[test]
    fn test_split_one_entry_per_page() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        let input = sample_pdf(&["A", "B", "C"]);
        let out = temp.path().join("split.zip");

        assert_eq!(split(PdfSource::Bytes(&input), &store, &out).unwrap(), 3);

        let mut archive = zip::ZipArchive::new(Cursor::new(std::fs::read(&out).unwrap())).unwrap();
        assert_eq!(archive.len(), 3);

        for (index, label) in ["A", "B", "C"].iter().enumerate() {
            let mut entry = archive.by_name(&format!("page_{}.pdf", index + 1)).unwrap();
            let mut data = Vec::new();
            entry.read_to_end(&mut data).unwrap();
            assert_eq!(page_labels(&data), vec![*label]);
        }

        // Per-page scratch files are gone
        assert_eq!(std::fs::read_dir(store.upload_dir()).unwrap().count(), 0);
    }

    #[test]
    fn test_compress_keeps_pages() {
        let temp = TempDir::new().unwrap();
        let input = sample_pdf(&["A", "B"]);
        let out = temp.path().join("compressed.pdf");

        compress(PdfSource::Bytes(&input), &out).unwrap();
        let once = std::fs::read(&out).unwrap();
        assert_eq!(page_labels(&once), vec!["A", "B"]);

        // Compressing the output again stays structurally stable
        let again = temp.path().join("again.pdf");
        compress(PdfSource::Bytes(&once), &again).unwrap();
        assert_eq!(page_labels(&std::fs::read(&again).unwrap()), vec!["A", "B"]);
    }

    #[test]
    fn test_compress_shrinks_uncompressed_streams() {
        let temp = TempDir::new().unwrap();
        let input = bulky_pdf();
        let out = temp.path().join("compressed.pdf");

        compress(PdfSource::Bytes(&input), &out).unwrap();
        let once = std::fs::read(&out).unwrap();

        assert!(
            once.len() < input.len(),
            "compressed {} bytes, input {} bytes",
            once.len(),
            input.len()
        );
        assert_eq!(page_count(PdfSource::Bytes(&once)).unwrap(), 4);

        // A second pass has nothing left to gain
        let again = temp.path().join("again.pdf");
        compress(PdfSource::Bytes(&once), &again).unwrap();
        assert!(std::fs::read(&again).unwrap().len() <= once.len() + once.len() / 20);
    }

    #[test]
    fn test_organize_reorders() {
        let temp = TempDir::new().unwrap();
        let input = sample_pdf(&["A", "B", "C"]);
        let out = temp.path().join("organized.pdf");

        assert_eq!(organize(PdfSource::Bytes(&input), "3,1,2", &out).unwrap(), 3);
        assert_eq!(page_labels(&std::fs::read(&out).unwrap()), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_organize_drops_out_of_range() {
        let temp = TempDir::new().unwrap();
        let input = sample_pdf(&["A", "B", "C"]);
        let out = temp.path().join("organized.pdf");

        organize(PdfSource::Bytes(&input), "9,1", &out).unwrap();
        assert_eq!(page_labels(&std::fs::read(&out).unwrap()), vec!["A"]);
    }

    #[test]
    fn test_organize_blank_order_keeps_document() {
        let temp = TempDir::new().unwrap();
        let input = sample_pdf(&["A", "B", "C"]);

        for order in ["", "  ", "x,0,42"] {
            let out = temp.path().join("organized.pdf");
            assert_eq!(organize(PdfSource::Bytes(&input), order, &out).unwrap(), 3);
            assert_eq!(page_labels(&std::fs::read(&out).unwrap()), vec!["A", "B", "C"]);
        }
    }

    #[test]
    fn test_organize_repeats_pages() {
        let temp = TempDir::new().unwrap();
        let input = sample_pdf(&["A", "B"]);
        let out = temp.path().join("organized.pdf");

        organize(PdfSource::Bytes(&input), "2,2,1", &out).unwrap();
        let first = std::fs::read(&out).unwrap();
        assert_eq!(page_labels(&first), vec!["B", "B", "A"]);

        // Same order applied to its own output is stable
        let again = temp.path().join("again.pdf");
        organize(PdfSource::Bytes(&first), "1,2,3", &again).unwrap();
        assert_eq!(page_labels(&std::fs::read(&again).unwrap()), vec!["B", "B", "A"]);
    }

    #[test]
    fn test_page_count_from_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("doc.pdf");
        std::fs::write(&path, sample_pdf(&["A", "B", "C", "D"])).unwrap();

        assert_eq!(page_count(PdfSource::Path(&path)).unwrap(), 4);
    }
}
