use std::fmt::Write as FmtWrite;
use std::io::{Cursor, Write};

use tracing::debug;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::{SlideRenderer, escape_xml, paragraphs};
use crate::emit::{HAlign, ShapeGeometry, ShapeKind, ShapeStyle, TextPrimitive, VAlign};
use crate::error::{Result, SlideError};

const EMU_PER_INCH: f64 = 914_400.0;
const EMU_PER_POINT: f64 = 12_700.0;

const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

fn emu(inches: f32) -> i64 {
    (inches as f64 * EMU_PER_INCH).round() as i64
}

fn pt_emu(points: f32) -> i64 {
    (points as f64 * EMU_PER_POINT).round() as i64
}

/// Writes a single-slide PresentationML package.
#[derive(Debug)]
pub struct PptxRenderer {
    width: i64,
    height: i64,
    background: Option<String>,
    shapes: String,
    next_id: u32,
    title: String,
    author: String,
    font_family: String,
}

impl Default for PptxRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PptxRenderer {
    pub fn new() -> Self {
        Self {
            width: emu(13.33),
            height: emu(7.5),
            background: None,
            shapes: String::with_capacity(32 * 1024),
            // id 1 is the slide's group shape
            next_id: 2,
            title: String::new(),
            author: String::new(),
            font_family: "Arial".to_string(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Typeface recorded in the package theme.
    pub fn with_font_family(mut self, font_family: impl Into<String>) -> Self {
        self.font_family = font_family.into();
        self
    }

    fn take_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn slide_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(self.shapes.len() + 1024);
        xml.push_str(XML_DECL);
        write!(
            xml,
            r#"<p:sld xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:cSld>"#
        )?;
        if let Some(color) = &self.background {
            write!(
                xml,
                r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{color}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#
            )?;
        }
        xml.push_str("<p:spTree>");
        xml.push_str(r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#);
        xml.push_str(r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#);
        xml.push_str(&self.shapes);
        xml.push_str("</p:spTree></p:cSld>");
        xml.push_str(r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#);
        Ok(xml)
    }

    fn presentation_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(1024);
        xml.push_str(XML_DECL);
        write!(
            xml,
            r#"<p:presentation xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" saveSubsetFonts="1">"#
        )?;
        xml.push_str(r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#);
        xml.push_str(r#"<p:sldIdLst><p:sldId id="256" r:id="rId2"/></p:sldIdLst>"#);
        write!(xml, r#"<p:sldSz cx="{}" cy="{}"/>"#, self.width, self.height)?;
        xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/>"#);
        xml.push_str("</p:presentation>");
        Ok(xml)
    }

    fn core_xml(&self) -> String {
        let mut xml = String::with_capacity(512);
        xml.push_str(XML_DECL);
        xml.push_str(r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#);
        xml.push_str("<dc:title>");
        xml.push_str(&escape_xml(&self.title));
        xml.push_str("</dc:title><dc:creator>");
        xml.push_str(&escape_xml(&self.author));
        xml.push_str("</dc:creator></cp:coreProperties>");
        xml
    }

    fn theme_xml(&self) -> String {
        let font = escape_xml(&self.font_family);
        let mut xml = String::with_capacity(4096);
        xml.push_str(XML_DECL);
        xml.push_str(&format!(r#"<a:theme xmlns:a="{NS_A}" name="Slide Theme"><a:themeElements>"#));
        xml.push_str(r#"<a:clrScheme name="Slide">"#);
        xml.push_str(r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>"#);
        xml.push_str(r#"<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#);
        xml.push_str(r#"<a:dk2><a:srgbClr val="1A294B"/></a:dk2><a:lt2><a:srgbClr val="F8F9FB"/></a:lt2>"#);
        for (slot, color) in [
            ("accent1", "4285F4"),
            ("accent2", "0F9D58"),
            ("accent3", "F4B400"),
            ("accent4", "A52A2A"),
            ("accent5", "53A457"),
            ("accent6", "58A65C"),
            ("hlink", "4285F4"),
            ("folHlink", "1A294B"),
        ] {
            xml.push_str(&format!(r#"<a:{slot}><a:srgbClr val="{color}"/></a:{slot}>"#));
        }
        xml.push_str("</a:clrScheme>");
        xml.push_str(r#"<a:fontScheme name="Slide">"#);
        for slot in ["majorFont", "minorFont"] {
            xml.push_str(&format!(
                r#"<a:{slot}><a:latin typeface="{font}"/><a:ea typeface=""/><a:cs typeface=""/></a:{slot}>"#
            ));
        }
        xml.push_str("</a:fontScheme>");
        xml.push_str(r#"<a:fmtScheme name="Slide"><a:fillStyleLst>"#);
        for _ in 0..3 {
            xml.push_str(r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#);
        }
        xml.push_str("</a:fillStyleLst><a:lnStyleLst>");
        for width in [6350, 12700, 19050] {
            xml.push_str(&format!(
                r#"<a:ln w="{width}"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#
            ));
        }
        xml.push_str("</a:lnStyleLst><a:effectStyleLst>");
        for _ in 0..3 {
            xml.push_str("<a:effectStyle><a:effectLst/></a:effectStyle>");
        }
        xml.push_str("</a:effectStyleLst><a:bgFillStyleLst>");
        for _ in 0..3 {
            xml.push_str(r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#);
        }
        xml.push_str("</a:bgFillStyleLst></a:fmtScheme>");
        xml.push_str("</a:themeElements><a:objectDefaults/><a:extraClrSchemeLst/></a:theme>");
        xml
    }
}

fn xfrm(xml: &mut String, geometry: &ShapeGeometry) -> Result<()> {
    xml.push_str("<a:xfrm");
    if geometry.flip_h {
        xml.push_str(r#" flipH="1""#);
    }
    if geometry.flip_v {
        xml.push_str(r#" flipV="1""#);
    }
    write!(
        xml,
        r#"><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        emu(geometry.x),
        emu(geometry.y),
        emu(geometry.w),
        emu(geometry.h)
    )?;
    Ok(())
}

fn solid_fill(xml: &mut String, color: &str) -> Result<()> {
    write!(xml, r#"<a:solidFill><a:srgbClr val="{color}"/></a:solidFill>"#)?;
    Ok(())
}

fn preset_geometry(xml: &mut String, kind: ShapeKind, geometry: &ShapeGeometry, style: &ShapeStyle) -> Result<()> {
    let preset = match kind {
        ShapeKind::Rect => "rect",
        ShapeKind::RoundedRect => "roundRect",
        ShapeKind::Ellipse => "ellipse",
        ShapeKind::Line => "line",
    };
    write!(xml, r#"<a:prstGeom prst="{preset}">"#)?;
    match (kind, style.corner_radius) {
        (ShapeKind::RoundedRect, Some(radius)) => {
            // adj is the radius as a fraction of the shorter side, in 1/100000
            let shorter = emu(geometry.w).min(emu(geometry.h)).max(1);
            let adj = (emu(radius) * 100_000 / shorter).clamp(0, 50_000);
            write!(xml, r#"<a:avLst><a:gd name="adj" fmla="val {adj}"/></a:avLst>"#)?;
        }
        _ => xml.push_str("<a:avLst/>"),
    }
    xml.push_str("</a:prstGeom>");
    Ok(())
}

fn outline_and_effects(xml: &mut String, style: &ShapeStyle) -> Result<()> {
    match &style.stroke {
        Some(stroke) => {
            write!(xml, r#"<a:ln w="{}">"#, pt_emu(stroke.width))?;
            solid_fill(xml, &stroke.color)?;
            xml.push_str("</a:ln>");
        }
        None => xml.push_str("<a:ln><a:noFill/></a:ln>"),
    }
    if let Some(shadow) = &style.shadow {
        write!(
            xml,
            r#"<a:effectLst><a:outerShdw blurRad="{}" dist="{}" dir="{}" algn="bl" rotWithShape="0"><a:srgbClr val="{}"><a:alpha val="{}"/></a:srgbClr></a:outerShdw></a:effectLst>"#,
            pt_emu(shadow.blur),
            pt_emu(shadow.offset),
            (shadow.angle as f64 * 60_000.0).round() as i64,
            shadow.color,
            (shadow.opacity as f64 * 100_000.0).round() as i64
        )?;
    }
    Ok(())
}

impl SlideRenderer for PptxRenderer {
    fn define_custom_layout(&mut self, width: f32, height: f32) -> Result<()> {
        if !(width > 0.0 && height > 0.0) {
            return Err(SlideError::RenderFailure(format!(
                "slide size {width}x{height} is not positive"
            )));
        }
        self.width = emu(width);
        self.height = emu(height);
        Ok(())
    }

    fn add_slide_background(&mut self, color: &str) -> Result<()> {
        self.background = Some(color.to_string());
        Ok(())
    }

    fn add_shape(&mut self, kind: ShapeKind, geometry: &ShapeGeometry, style: &ShapeStyle) -> Result<()> {
        let id = self.take_id();
        let mut xml = String::with_capacity(512);
        if kind == ShapeKind::Line {
            write!(
                xml,
                r#"<p:cxnSp><p:nvCxnSpPr><p:cNvPr id="{id}" name="Connector {id}"/><p:cNvCxnSpPr/><p:nvPr/></p:nvCxnSpPr><p:spPr>"#
            )?;
            xfrm(&mut xml, geometry)?;
            preset_geometry(&mut xml, kind, geometry, style)?;
            outline_and_effects(&mut xml, style)?;
            xml.push_str("</p:spPr></p:cxnSp>");
        } else {
            write!(
                xml,
                r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Shape {id}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr>"#
            )?;
            xfrm(&mut xml, geometry)?;
            preset_geometry(&mut xml, kind, geometry, style)?;
            match &style.fill {
                Some(color) => solid_fill(&mut xml, color)?,
                None => xml.push_str("<a:noFill/>"),
            }
            outline_and_effects(&mut xml, style)?;
            xml.push_str("</p:spPr></p:sp>");
        }
        self.shapes.push_str(&xml);
        Ok(())
    }

    fn add_text(&mut self, text: &TextPrimitive, font_family: &str) -> Result<()> {
        let id = self.take_id();
        let anchor = match text.valign {
            VAlign::Top => "t",
            VAlign::Middle => "ctr",
            VAlign::Bottom => "b",
        };
        let align = match text.align {
            HAlign::Left => "l",
            HAlign::Center => "ctr",
            HAlign::Right => "r",
        };
        let typeface = escape_xml(font_family);

        let mut xml = String::with_capacity(1024);
        write!(
            xml,
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="TextBox {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr>"#
        )?;
        xfrm(&mut xml, &ShapeGeometry::from(text.frame))?;
        xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>"#);
        write!(
            xml,
            r#"<p:txBody><a:bodyPr wrap="square" lIns="91440" tIns="45720" rIns="91440" bIns="45720" rtlCol="0" anchor="{anchor}"><a:noAutofit/></a:bodyPr><a:lstStyle/>"#
        )?;
        for paragraph in paragraphs(&text.runs) {
            write!(xml, r#"<a:p><a:pPr algn="{align}"/>"#)?;
            for (run, piece) in paragraph {
                write!(
                    xml,
                    r#"<a:r><a:rPr lang="en-US" sz="{}""#,
                    (run.font_size * 100.0).round() as u32
                )?;
                if run.bold {
                    xml.push_str(r#" b="1""#);
                }
                if run.italic {
                    xml.push_str(r#" i="1""#);
                }
                xml.push_str(r#" dirty="0">"#);
                if let Some(color) = &run.color {
                    solid_fill(&mut xml, color)?;
                }
                write!(xml, r#"<a:latin typeface="{typeface}"/></a:rPr><a:t>{}</a:t></a:r>"#, escape_xml(piece))?;
            }
            xml.push_str("</a:p>");
        }
        xml.push_str("</p:txBody></p:sp>");
        self.shapes.push_str(&xml);
        Ok(())
    }

    fn serialize(&mut self) -> Result<Vec<u8>> {
        let parts: Vec<(&str, String)> = vec![
            ("[Content_Types].xml", CONTENT_TYPES.to_string()),
            ("_rels/.rels", package_rels()),
            ("docProps/core.xml", self.core_xml()),
            ("docProps/app.xml", APP_XML.to_string()),
            ("ppt/presentation.xml", self.presentation_xml()?),
            (
                "ppt/_rels/presentation.xml.rels",
                relationships(&[
                    ("rId1", "slideMaster", "slideMasters/slideMaster1.xml"),
                    ("rId2", "slide", "slides/slide1.xml"),
                    ("rId3", "theme", "theme/theme1.xml"),
                ]),
            ),
            ("ppt/slideMasters/slideMaster1.xml", slide_master_xml()),
            (
                "ppt/slideMasters/_rels/slideMaster1.xml.rels",
                relationships(&[
                    ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
                    ("rId2", "theme", "../theme/theme1.xml"),
                ]),
            ),
            ("ppt/slideLayouts/slideLayout1.xml", slide_layout_xml()),
            (
                "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
                relationships(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]),
            ),
            ("ppt/theme/theme1.xml", self.theme_xml()),
            ("ppt/slides/slide1.xml", self.slide_xml()?),
            (
                "ppt/slides/_rels/slide1.xml.rels",
                relationships(&[("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml")]),
            ),
        ];

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        // Fixed timestamp keeps equal slides byte-identical.
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default());
        for (path, body) in &parts {
            writer.start_file(*path, options)?;
            writer.write_all(body.as_bytes())?;
        }
        let bytes = writer.finish()?.into_inner();
        debug!(parts = parts.len(), bytes = bytes.len(), "pptx package written");
        Ok(bytes)
    }
}

fn relationships(entries: &[(&str, &str, &str)]) -> String {
    let mut xml = String::with_capacity(512);
    xml.push_str(XML_DECL);
    xml.push_str(r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);
    for (id, kind, target) in entries {
        xml.push_str(&format!(
            r#"<Relationship Id="{id}" Type="{REL_BASE}/{kind}" Target="{target}"/>"#
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn package_rels() -> String {
    let mut xml = String::with_capacity(512);
    xml.push_str(XML_DECL);
    xml.push_str(r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);
    xml.push_str(&format!(
        r#"<Relationship Id="rId1" Type="{REL_BASE}/officeDocument" Target="ppt/presentation.xml"/>"#
    ));
    xml.push_str(r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>"#);
    xml.push_str(&format!(
        r#"<Relationship Id="rId3" Type="{REL_BASE}/extended-properties" Target="docProps/app.xml"/>"#
    ));
    xml.push_str("</Relationships>");
    xml
}

fn slide_master_xml() -> String {
    let mut xml = String::with_capacity(1024);
    xml.push_str(XML_DECL);
    xml.push_str(&format!(r#"<p:sldMaster xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}">"#));
    xml.push_str(EMPTY_CSLD);
    xml.push_str(r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#);
    xml.push_str(r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>"#);
    xml.push_str("</p:sldMaster>");
    xml
}

fn slide_layout_xml() -> String {
    let mut xml = String::with_capacity(1024);
    xml.push_str(XML_DECL);
    xml.push_str(&format!(
        r#"<p:sldLayout xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" type="blank" preserve="1">"#
    ));
    xml.push_str(&EMPTY_CSLD.replace("<p:cSld>", r#"<p:cSld name="Blank">"#));
    xml.push_str(r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#);
    xml
}

const EMPTY_CSLD: &str = r#"<p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr></p:spTree></p:cSld>"#;

const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>"#,
    r#"<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>"#,
    r#"<Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>"#,
    r#"<Override PartName="/ppt/slides/slide1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
    r#"<Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>"#,
    r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#,
    r#"<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#,
    r#"</Types>"#
);

const APP_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#,
    r#"<Application>enablement-slide</Application><Slides>1</Slides><PresentationFormat>Custom</PresentationFormat>"#,
    r#"</Properties>"#
);
