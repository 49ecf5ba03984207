//! SpreadsheetML (.xlsx) writer
//!
//! Cells are written as inline strings, so no shared string table is needed.

use std::collections::HashSet;
use std::path::Path;

use super::{
    content_types, relationships, root_relationships, OfficeError, Package, Result, XmlPart,
    NS_OFFICE_DOC_RELS,
};

const NS_SHEET: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const CT_WORKBOOK: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
const CT_WORKSHEET: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
const CT_STYLES: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";
const REL_WORKSHEET: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
const REL_STYLES: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";

/// Excel's limit on sheet name length
const MAX_SHEET_NAME: usize = 31;

const STYLES_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    r#"<fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>"#,
    r#"<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>"#,
    r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#,
    r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
    r#"<cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs>"#,
    r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
    r#"</styleSheet>"#,
);

/// One worksheet, rows top to bottom
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

/// Write a workbook; at least one sheet is required
pub fn write_xlsx(sheets: &[Sheet], path: &Path) -> Result<()> {
    if sheets.is_empty() {
        return Err(OfficeError::NoSheets);
    }

    let names = unique_sheet_names(sheets);
    let mut package = Package::create(path)?;

    let mut overrides = vec![
        ("/xl/workbook.xml".to_string(), CT_WORKBOOK),
        ("/xl/styles.xml".to_string(), CT_STYLES),
    ];
    overrides.extend((1..=sheets.len()).map(|n| (format!("/xl/worksheets/sheet{}.xml", n), CT_WORKSHEET)));

    package.add_xml("[Content_Types].xml", content_types(&[], &overrides)?)?;
    package.add_xml("_rels/.rels", root_relationships("xl/workbook.xml")?)?;
    package.add_xml("xl/workbook.xml", workbook_part(&names)?)?;

    let mut rels: Vec<(String, &str, String)> = (1..=sheets.len())
        .map(|n| (format!("rId{}", n), REL_WORKSHEET, format!("worksheets/sheet{}.xml", n)))
        .collect();
    rels.push((format!("rId{}", sheets.len() + 1), REL_STYLES, "styles.xml".to_string()));
    package.add_xml("xl/_rels/workbook.xml.rels", relationships(&rels)?)?;

    package.add("xl/styles.xml", STYLES_XML.as_bytes())?;

    for (index, sheet) in sheets.iter().enumerate() {
        package.add_xml(&format!("xl/worksheets/sheet{}.xml", index + 1), sheet_part(sheet)?)?;
    }

    package.finish()?;
    Ok(())
}

fn workbook_part(names: &[String]) -> Result<XmlPart> {
    let mut part = XmlPart::new()?;
    part.start("workbook", &[("xmlns", NS_SHEET), ("xmlns:r", NS_OFFICE_DOC_RELS)])?;
    part.start("sheets", &[])?;

    for (index, name) in names.iter().enumerate() {
        let sheet_id = (index + 1).to_string();
        let rel_id = format!("rId{}", index + 1);
        part.empty(
            "sheet",
            &[
                ("name", name.as_str()),
                ("sheetId", sheet_id.as_str()),
                ("r:id", rel_id.as_str()),
            ],
        )?;
    }

    part.end("sheets")?;
    part.end("workbook")?;
    Ok(part)
}

fn sheet_part(sheet: &Sheet) -> Result<XmlPart> {
    let mut part = XmlPart::new()?;
    part.start("worksheet", &[("xmlns", NS_SHEET)])?;
    part.start("sheetData", &[])?;

    for (r, row) in sheet.rows.iter().enumerate() {
        let row_ref = (r + 1).to_string();
        part.start("row", &[("r", row_ref.as_str())])?;

        for (c, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let cell_ref = format!("{}{}", column_name(c), r + 1);
            part.start("c", &[("r", cell_ref.as_str()), ("t", "inlineStr")])?;
            part.start("is", &[])?;
            part.text_element("t", &[("xml:space", "preserve")], value)?;
            part.end("is")?;
            part.end("c")?;
        }

        part.end("row")?;
    }

    part.end("sheetData")?;
    part.end("worksheet")?;
    Ok(part)
}

/// Spreadsheet column letters: 0 -> A, 25 -> Z, 26 -> AA
pub fn column_name(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Make names legal for Excel and distinct (case-insensitively)
fn unique_sheet_names(sheets: &[Sheet]) -> Vec<String> {
    let mut seen = HashSet::new();

    sheets
        .iter()
        .enumerate()
        .map(|(index, sheet)| {
            let mut base: String = sheet
                .name
                .chars()
                .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
                .take(MAX_SHEET_NAME)
                .collect();
            if base.trim().is_empty() {
                base = format!("Sheet{}", index + 1);
            }

            let mut name = base.clone();
            let mut suffix = 2;
            while !seen.insert(name.to_lowercase()) {
                let tail = format!("_{}", suffix);
                let keep = MAX_SHEET_NAME.saturating_sub(tail.len());
                name = format!("{}{}", base.chars().take(keep).collect::<String>(), tail);
                suffix += 1;
            }
            name
        })
        .collect()
}
