//! Test helpers: synthesized PDFs and readers for checking results

use mupdf::{Document, TextPageOptions};

/// Build a PDF whose pages carry the given content streams
///
/// Pages are US Letter with Helvetica available as `/F1`.
pub fn pdf_from_contents(contents: &[String]) -> Vec<u8> {
    build_pdf(contents, None)
}

/// Build a PDF and register `image` as the XObject `/Im1` on every page
fn build_pdf(contents: &[String], image: Option<String>) -> Vec<u8> {
    let page_count = contents.len();

    let mut objects: Vec<String> = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        String::new(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    let mut resources = "/Font << /F1 3 0 R >>".to_string();
    if let Some(image) = image {
        objects.push(image);
        resources.push_str(&format!(" /XObject << /Im1 {} 0 R >>", objects.len()));
    }

    let first_page_obj = objects.len() + 1;
    let kids: Vec<String> = (0..page_count)
        .map(|i| format!("{} 0 R", first_page_obj + 2 * i))
        .collect();
    objects[1] = format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids.join(" "), page_count);

    for (i, content) in contents.iter().enumerate() {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << {} >> /Contents {} 0 R >>",
            resources,
            first_page_obj + 2 * i + 1
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ));
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());

    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        )
        .as_bytes(),
    );

    out
}

/// Content stream drawing `text` at (x, y) in PDF user space
pub fn text_op(x: f32, y: f32, size: f32, text: &str) -> String {
    format!("BT /F1 {} Tf 1 0 0 1 {} {} Tm ({}) Tj ET", size, x, y, text)
}

/// One page per label, the label drawn large near the top
pub fn sample_pdf(labels: &[&str]) -> Vec<u8> {
    let contents: Vec<String> = labels
        .iter()
        .map(|label| text_op(72.0, 720.0, 24.0, label))
        .collect();
    pdf_from_contents(&contents)
}

/// A single page holding a 3x3 grid of words with wide column gaps
pub fn table_pdf() -> Vec<u8> {
    let rows = [
        ["Name", "Qty", "Price"],
        ["Apple", "3", "1.20"],
        ["Pear", "5", "0.80"],
    ];

    let mut ops = vec![text_op(72.0, 760.0, 14.0, "Inventory")];
    for (r, row) in rows.iter().enumerate() {
        let y = 700.0 - 20.0 * r as f32;
        for (c, cell) in row.iter().enumerate() {
            let x = 72.0 + 180.0 * c as f32;
            ops.push(text_op(x, y, 12.0, cell));
        }
    }

    pdf_from_contents(&[ops.join("\n")])
}

/// The inventory grid again, this time inside drawn cell borders
///
/// Rules sit at x = 72, 222, 372, 522 and at PDF y = 712, 688, 664, 640
/// (80, 104, 128, 152 from the top of the page).
pub fn ruled_table_pdf() -> Vec<u8> {
    let rows = [
        ["Name", "Qty", "Price"],
        ["Apple", "3", "1.20"],
        ["Pear", "5", "0.80"],
    ];
    let columns = [72.0f32, 222.0, 372.0, 522.0];
    let rules = [712.0f32, 688.0, 664.0, 640.0];

    let mut ops = vec![text_op(72.0, 740.0, 14.0, "Inventory"), "0.5 w".to_string()];
    for y in rules {
        ops.push(format!("{} {} m {} {} l S", columns[0], y, columns[3], y));
    }
    for x in columns {
        ops.push(format!("{} {} m {} {} l S", x, rules[0], x, rules[3]));
    }
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            ops.push(text_op(columns[c] + 6.0, rules[r] - 17.0, 12.0, cell));
        }
    }

    pdf_from_contents(&[ops.join("\n")])
}

/// Prose in two columns and a label/value form, no drawn lines
pub fn columns_pdf() -> Vec<u8> {
    let left = ["In this paper we study", "the layout of documents", "set in two columns", "without any rules"];
    let right = ["Related work has shown", "that columns of prose", "line up like cells", "in a borderless grid"];

    let mut ops = Vec::new();
    for (i, (l, r)) in left.iter().zip(right.iter()).enumerate() {
        let y = 700.0 - 14.0 * i as f32;
        ops.push(text_op(50.0, y, 11.0, l));
        ops.push(text_op(320.0, y, 11.0, r));
    }
    for (i, (label, value)) in [("Invoice number:", "12345"), ("Date:", "2024-01-01")].iter().enumerate() {
        let y = 500.0 - 16.0 * i as f32;
        ops.push(text_op(50.0, y, 11.0, label));
        ops.push(text_op(250.0, y, 11.0, value));
    }

    pdf_from_contents(&[ops.join("\n")])
}

/// A page holding nothing but a 2x2 RGB image drawn at 200 x 100 points
///
/// The image spans PDF (100, 600) to (300, 700).
pub fn image_pdf() -> Vec<u8> {
    let hex = "FF0000 00FF00 0000FF FFFFFF>";
    let image = format!(
        "<< /Type /XObject /Subtype /Image /Width 2 /Height 2 /ColorSpace /DeviceRGB \
         /BitsPerComponent 8 /Filter /ASCIIHexDecode /Length {} >>\nstream\n{}\nendstream",
        hex.len(),
        hex
    );
    build_pdf(&["q 200 0 0 100 100 600 cm /Im1 Do Q".to_string()], Some(image))
}

/// Several pages of long, repetitive and uncompressed content streams
pub fn bulky_pdf() -> Vec<u8> {
    let contents: Vec<String> = (0..4)
        .map(|page| {
            (0..150)
                .map(|i| {
                    let y = 760.0 - 5.0 * (i % 140) as f32;
                    text_op(72.0, y, 4.0, &format!("Page {} repeated filler line", page + 1))
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect();
    pdf_from_contents(&contents)
}

/// Trimmed text of every page, in page order
pub fn page_labels(data: &[u8]) -> Vec<String> {
    let doc = Document::from_bytes(data, "application/pdf").expect("valid pdf");
    let count = doc.page_count().expect("page count");

    (0..count)
        .map(|i| {
            let page = doc.load_page(i).expect("page");
            let text_page = page
                .to_text_page(TextPageOptions::empty())
                .expect("text page");
            text_page.to_text().expect("text").trim().to_string()
        })
        .collect()
}

/// Read one entry of a ZIP container as UTF-8
pub fn zip_entry_text(data: &[u8], name: &str) -> String {
    use std::io::Read;

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(data)).expect("zip");
    let mut entry = archive.by_name(name).expect("entry");
    let mut text = String::new();
    entry.read_to_string(&mut text).expect("utf-8 entry");
    text
}

/// Names of all entries of a ZIP container
pub fn zip_entry_names(data: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(std::io::Cursor::new(data)).expect("zip");
    archive.file_names().map(|s| s.to_string()).collect()
}

/// Application state over fresh directories inside `temp`
pub fn test_state(temp: &tempfile::TempDir, legacy_status: bool) -> crate::state::AppState {
    let mut config = crate::config::Config::default();
    config.server.legacy_status = legacy_status;
    config.storage.upload_dir = temp.path().join("uploads");
    config.storage.download_dir = temp.path().join("downloads");

    std::fs::create_dir_all(&config.storage.upload_dir).expect("upload dir");
    std::fs::create_dir_all(&config.storage.download_dir).expect("download dir");

    let store = crate::artifacts::ArtifactStore::new(
        &config.storage.upload_dir,
        &config.storage.download_dir,
    );
    crate::state::AppState::new(config, store)
}
