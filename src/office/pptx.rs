//! PresentationML (.pptx) writer
//!
//! Produces a 10in x 7.5in deck with one picture per slide on a blank
//! layout. The master, layout and theme parts are fixed.

use std::path::Path;

use super::{
    content_types, relationships, root_relationships, Package, Result, XmlPart, NS_DRAWING, NS_OFFICE_DOC_RELS,
    REL_IMAGE,
};

/// English Metric Units per inch
pub const EMU_PER_INCH: i64 = 914_400;
pub const SLIDE_WIDTH_EMU: i64 = 10 * EMU_PER_INCH;
pub const SLIDE_HEIGHT_EMU: i64 = 7 * EMU_PER_INCH + EMU_PER_INCH / 2;

const NS_PRESENTATION: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const CT_SLIDE_MASTER: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
const CT_SLIDE_LAYOUT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";

const REL_SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const REL_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
const REL_THEME: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";

/// First slide id PowerPoint accepts
const FIRST_SLIDE_ID: usize = 256;

const SLIDE_MASTER_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
    r#"<p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr/></p:spTree></p:cSld>"#,
    r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" "#,
    r#"accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#,
    r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>"#,
    r#"</p:sldMaster>"#,
);

const SLIDE_LAYOUT_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="blank" preserve="1">"#,
    r#"<p:cSld name="Blank"><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr/></p:spTree></p:cSld>"#,
    r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>"#,
    r#"</p:sldLayout>"#,
);

const THEME_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme">"#,
    r#"<a:themeElements>"#,
    r#"<a:clrScheme name="Office">"#,
    r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>"#,
    r#"<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#,
    r#"<a:dk2><a:srgbClr val="44546A"/></a:dk2>"#,
    r#"<a:lt2><a:srgbClr val="E7E6E6"/></a:lt2>"#,
    r#"<a:accent1><a:srgbClr val="4472C4"/></a:accent1>"#,
    r#"<a:accent2><a:srgbClr val="ED7D31"/></a:accent2>"#,
    r#"<a:accent3><a:srgbClr val="A5A5A5"/></a:accent3>"#,
    r#"<a:accent4><a:srgbClr val="FFC000"/></a:accent4>"#,
    r#"<a:accent5><a:srgbClr val="5B9BD5"/></a:accent5>"#,
    r#"<a:accent6><a:srgbClr val="70AD47"/></a:accent6>"#,
    r#"<a:hlink><a:srgbClr val="0563C1"/></a:hlink>"#,
    r#"<a:folHlink><a:srgbClr val="954F72"/></a:folHlink>"#,
    r#"</a:clrScheme>"#,
    r#"<a:fontScheme name="Office">"#,
    r#"<a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
    r#"<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>"#,
    r#"</a:fontScheme>"#,
    r#"<a:fmtScheme name="Office">"#,
    r#"<a:fillStyleLst>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
    r#"</a:fillStyleLst>"#,
    r#"<a:lnStyleLst>"#,
    r#"<a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
    r#"<a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
    r#"<a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
    r#"</a:lnStyleLst>"#,
    r#"<a:effectStyleLst>"#,
    r#"<a:effectStyle><a:effectLst/></a:effectStyle>"#,
    r#"<a:effectStyle><a:effectLst/></a:effectStyle>"#,
    r#"<a:effectStyle><a:effectLst/></a:effectStyle>"#,
    r#"</a:effectStyleLst>"#,
    r#"<a:bgFillStyleLst>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
    r#"</a:bgFillStyleLst>"#,
    r#"</a:fmtScheme>"#,
    r#"</a:themeElements>"#,
    r#"</a:theme>"#,
);

/// A slide showing one PNG image
#[derive(Debug, Clone)]
pub struct Slide {
    pub png: Vec<u8>,
    /// Image size in pixels, used for the aspect ratio
    pub width: u32,
    pub height: u32,
}

impl Slide {
    /// Picture height when stretched to the full slide width
    pub fn picture_height_emu(&self) -> i64 {
        if self.width == 0 {
            return SLIDE_HEIGHT_EMU;
        }
        SLIDE_WIDTH_EMU * i64::from(self.height) / i64::from(self.width)
    }
}

pub fn write_pptx(slides: &[Slide], path: &Path) -> Result<()> {
    let mut package = Package::create(path)?;

    let mut overrides = vec![
        ("/ppt/presentation.xml".to_string(), CT_PRESENTATION),
        ("/ppt/slideMasters/slideMaster1.xml".to_string(), CT_SLIDE_MASTER),
        ("/ppt/slideLayouts/slideLayout1.xml".to_string(), CT_SLIDE_LAYOUT),
        ("/ppt/theme/theme1.xml".to_string(), CT_THEME),
    ];
    overrides.extend((1..=slides.len()).map(|n| (format!("/ppt/slides/slide{}.xml", n), CT_SLIDE)));

    package.add_xml("[Content_Types].xml", content_types(&[("png", "image/png")], &overrides)?)?;
    package.add_xml("_rels/.rels", root_relationships("ppt/presentation.xml")?)?;

    package.add_xml("ppt/presentation.xml", presentation_part(slides.len())?)?;
    let mut rels = vec![
        ("rId1".to_string(), REL_SLIDE_MASTER, "slideMasters/slideMaster1.xml".to_string()),
        ("rId2".to_string(), REL_THEME, "theme/theme1.xml".to_string()),
    ];
    rels.extend(
        (1..=slides.len()).map(|n| (format!("rId{}", n + 2), REL_SLIDE, format!("slides/slide{}.xml", n))),
    );
    package.add_xml("ppt/_rels/presentation.xml.rels", relationships(&rels)?)?;

    package.add("ppt/slideMasters/slideMaster1.xml", SLIDE_MASTER_XML.as_bytes())?;
    package.add_xml(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        relationships(&[
            ("rId1".to_string(), REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml".to_string()),
            ("rId2".to_string(), REL_THEME, "../theme/theme1.xml".to_string()),
        ])?,
    )?;

    package.add("ppt/slideLayouts/slideLayout1.xml", SLIDE_LAYOUT_XML.as_bytes())?;
    package.add_xml(
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        relationships(&[(
            "rId1".to_string(),
            REL_SLIDE_MASTER,
            "../slideMasters/slideMaster1.xml".to_string(),
        )])?,
    )?;

    package.add("ppt/theme/theme1.xml", THEME_XML.as_bytes())?;

    for (index, slide) in slides.iter().enumerate() {
        let n = index + 1;
        package.add(&format!("ppt/media/image{}.png", n), &slide.png)?;
        package.add_xml(&format!("ppt/slides/slide{}.xml", n), slide_part(slide, n)?)?;
        package.add_xml(
            &format!("ppt/slides/_rels/slide{}.xml.rels", n),
            relationships(&[
                ("rId1".to_string(), REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml".to_string()),
                ("rId2".to_string(), REL_IMAGE, format!("../media/image{}.png", n)),
            ])?,
        )?;
    }

    package.finish()?;
    Ok(())
}

fn presentation_part(slide_count: usize) -> Result<XmlPart> {
    let mut part = XmlPart::new()?;
    part.start(
        "p:presentation",
        &[
            ("xmlns:a", NS_DRAWING),
            ("xmlns:r", NS_OFFICE_DOC_RELS),
            ("xmlns:p", NS_PRESENTATION),
        ],
    )?;

    part.start("p:sldMasterIdLst", &[])?;
    part.empty("p:sldMasterId", &[("id", "2147483648"), ("r:id", "rId1")])?;
    part.end("p:sldMasterIdLst")?;

    if slide_count > 0 {
        part.start("p:sldIdLst", &[])?;
        for index in 0..slide_count {
            let id = (FIRST_SLIDE_ID + index).to_string();
            let rel_id = format!("rId{}", index + 3);
            part.empty("p:sldId", &[("id", id.as_str()), ("r:id", rel_id.as_str())])?;
        }
        part.end("p:sldIdLst")?;
    }

    let cx = SLIDE_WIDTH_EMU.to_string();
    let cy = SLIDE_HEIGHT_EMU.to_string();
    part.empty("p:sldSz", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
    // Notes are portrait: the slide size transposed
    part.empty("p:notesSz", &[("cx", cy.as_str()), ("cy", cx.as_str())])?;

    part.end("p:presentation")?;
    Ok(part)
}

fn slide_part(slide: &Slide, number: usize) -> Result<XmlPart> {
    let mut part = XmlPart::new()?;
    part.start(
        "p:sld",
        &[
            ("xmlns:a", NS_DRAWING),
            ("xmlns:r", NS_OFFICE_DOC_RELS),
            ("xmlns:p", NS_PRESENTATION),
        ],
    )?;
    part.start("p:cSld", &[])?;
    part.start("p:spTree", &[])?;

    part.start("p:nvGrpSpPr", &[])?;
    part.empty("p:cNvPr", &[("id", "1"), ("name", "")])?;
    part.empty("p:cNvGrpSpPr", &[])?;
    part.empty("p:nvPr", &[])?;
    part.end("p:nvGrpSpPr")?;
    part.empty("p:grpSpPr", &[])?;

    let name = format!("Page {}", number);
    let cx = SLIDE_WIDTH_EMU.to_string();
    let cy = slide.picture_height_emu().to_string();

    part.start("p:pic", &[])?;
    part.start("p:nvPicPr", &[])?;
    part.empty("p:cNvPr", &[("id", "2"), ("name", name.as_str())])?;
    part.start("p:cNvPicPr", &[])?;
    part.empty("a:picLocks", &[("noChangeAspect", "1")])?;
    part.end("p:cNvPicPr")?;
    part.empty("p:nvPr", &[])?;
    part.end("p:nvPicPr")?;

    part.start("p:blipFill", &[])?;
    part.empty("a:blip", &[("r:embed", "rId2")])?;
    part.start("a:stretch", &[])?;
    part.empty("a:fillRect", &[])?;
    part.end("a:stretch")?;
    part.end("p:blipFill")?;

    part.start("p:spPr", &[])?;
    part.start("a:xfrm", &[])?;
    part.empty("a:off", &[("x", "0"), ("y", "0")])?;
    part.empty("a:ext", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
    part.end("a:xfrm")?;
    part.start("a:prstGeom", &[("prst", "rect")])?;
    part.empty("a:avLst", &[])?;
    part.end("a:prstGeom")?;
    part.end("p:spPr")?;
    part.end("p:pic")?;

    part.end("p:spTree")?;
    part.end("p:cSld")?;
    part.start("p:clrMapOvr", &[])?;
    part.empty("a:masterClrMapping", &[])?;
    part.end("p:clrMapOvr")?;
    part.end("p:sld")?;
    Ok(part)
}
