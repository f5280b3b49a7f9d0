//! PresentationML writer.
//!
//! A new slide starts at every h1/h2 (which becomes its title) and whenever the
//! next block would push the body past [`LINE_BUDGET`] lines. Shapes are stacked
//! top to bottom in block order.

use super::image::LoadedImage;
use super::xml::{
    core_properties_xml, escape_text, package_rels_xml, Package, HYPERLINK_REL, IMAGE_REL, XML_DECL,
};
use super::{image_placeholder, DocumentWriter};
use crate::error::Result;
use crate::model::{CodeBlock, Image, List, MathBlock, MathContent, RunStyle, StyledRun, Table};

const SLIDE_CX: u64 = 12_192_000;
const SLIDE_CY: u64 = 6_858_000;
const MARGIN_X: u64 = 457_200;
const CONTENT_CX: u64 = SLIDE_CX - 2 * MARGIN_X;
const TITLE_Y: u64 = 228_600;
const TITLE_CY: u64 = 914_400;
const BODY_Y: u64 = 1_234_440;
const BODY_CY: u64 = SLIDE_CY - BODY_Y - 228_600;
/// One 18pt line with 1.2 leading.
const LINE_EMU: u64 = 274_320;
const ROW_EMU: u64 = 370_840;
const LINE_BUDGET: u32 = 18;

const BODY_SIZE: u32 = 1800;
const CODE_SIZE: u32 = 1400;
const BODY_CHARS_PER_LINE: usize = 90;
const CODE_CHARS_PER_LINE: usize = 95;

const LAYOUT_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";

struct Rel {
    id: String,
    kind: &'static str,
    target: String,
    external: bool,
}

enum Item {
    /// Consecutive `a:p` elements sharing one text box.
    Paragraphs { xml: Vec<String>, lines: u32 },
    Table { columns: usize, rows: Vec<String> },
    Picture { rid: String, cx: u64, cy: u64, descr: String },
}

#[derive(Default)]
struct Slide {
    title: Option<String>,
    items: Vec<Item>,
    lines: u32,
    rels: Vec<Rel>,
}

impl Slide {
    fn continuing(title: Option<String>) -> Self {
        Self {
            title,
            ..Self::default()
        }
    }

    fn add_rel(&mut self, kind: &'static str, target: String, external: bool) -> String {
        // rId1 is the layout.
        let id = format!("rId{}", self.rels.len() + 2);
        self.rels.push(Rel {
            id: id.clone(),
            kind,
            target,
            external,
        });
        id
    }

    fn link_rid(&mut self, href: &str) -> String {
        if let Some(rel) = self.rels.iter().find(|r| r.external && r.target == href) {
            return rel.id.clone();
        }
        self.add_rel(HYPERLINK_REL, href.to_string(), true)
    }
}

fn text_lines(text: &str, per_line: usize) -> u32 {
    text.split('\n')
        .map(|line| {
            let n = line.chars().count();
            n.div_ceil(per_line).max(1) as u32
        })
        .sum()
}

fn run_props(style: RunStyle, size: u32, link_rid: Option<&str>) -> String {
    let mut attrs = format!("lang=\"en-US\" sz=\"{}\"", size);
    if style.bold {
        attrs.push_str(" b=\"1\"");
    }
    if style.italic {
        attrs.push_str(" i=\"1\"");
    }
    if link_rid.is_some() {
        attrs.push_str(" u=\"sng\"");
    }
    attrs.push_str(" dirty=\"0\"");

    let mut children = String::new();
    if let Some(c) = style.color {
        children.push_str(&format!("<a:solidFill><a:srgbClr val=\"{}\"/></a:solidFill>", c.hex()));
    }
    if style.monospace {
        children.push_str("<a:latin typeface=\"Consolas\"/><a:cs typeface=\"Consolas\"/>");
    }
    if let Some(rid) = link_rid {
        children.push_str(&format!("<a:hlinkClick r:id=\"{}\"/>", rid));
    }
    if children.is_empty() {
        format!("<a:rPr {}/>", attrs)
    } else {
        format!("<a:rPr {}>{}</a:rPr>", attrs, children)
    }
}

fn paragraph_xml(slide: &mut Slide, runs: &[StyledRun], ppr: &str, size: u32) -> String {
    let mut out = String::from("<a:p>");
    out.push_str(ppr);
    for run in runs {
        let rid = run.href.as_deref().map(|h| slide.link_rid(h));
        for (i, piece) in run.text.split('\n').enumerate() {
            if i > 0 {
                out.push_str("<a:br/>");
            }
            if piece.is_empty() {
                continue;
            }
            out.push_str("<a:r>");
            out.push_str(&run_props(run.style, size, rid.as_deref()));
            out.push_str("<a:t>");
            out.push_str(&escape_text(piece));
            out.push_str("</a:t></a:r>");
        }
    }
    out.push_str(&format!("<a:endParaRPr lang=\"en-US\" sz=\"{}\" dirty=\"0\"/></a:p>", size));
    out
}

fn cell_border() -> &'static str {
    concat!(
        "<a:lnL w=\"12700\"><a:solidFill><a:srgbClr val=\"BFBFBF\"/></a:solidFill></a:lnL>",
        "<a:lnR w=\"12700\"><a:solidFill><a:srgbClr val=\"BFBFBF\"/></a:solidFill></a:lnR>",
        "<a:lnT w=\"12700\"><a:solidFill><a:srgbClr val=\"BFBFBF\"/></a:solidFill></a:lnT>",
        "<a:lnB w=\"12700\"><a:solidFill><a:srgbClr val=\"BFBFBF\"/></a:solidFill></a:lnB>",
    )
}

pub struct PptxWriter {
    title: Option<String>,
    slides: Vec<Slide>,
    media: Vec<(String, LoadedImage)>,
}

impl PptxWriter {
    pub fn new(title: Option<&str>) -> Self {
        Self {
            title: title.map(str::to_string),
            slides: vec![Slide::default()],
            media: Vec::new(),
        }
    }

    fn current(&mut self) -> &mut Slide {
        if self.slides.is_empty() {
            self.slides.push(Slide::default());
        }
        let last = self.slides.len() - 1;
        &mut self.slides[last]
    }

    /// Moves to a continuation slide when `lines` more would not fit.
    fn ensure_room(&mut self, lines: u32) {
        let slide = self.current();
        if !slide.items.is_empty() && slide.lines + lines > LINE_BUDGET {
            let title = slide.title.clone();
            self.slides.push(Slide::continuing(title));
        }
    }

    fn add_paragraphs(&mut self, paras: Vec<(Vec<StyledRun>, String, u32)>, lines: u32) {
        self.ensure_room(lines);
        let slide = self.current();
        let xml: Vec<String> = paras
            .iter()
            .map(|(runs, ppr, size)| paragraph_xml(slide, runs, ppr, *size))
            .collect();
        slide.lines += lines;
        match slide.items.last_mut() {
            Some(Item::Paragraphs { xml: existing, lines: l }) => {
                existing.extend(xml);
                *l += lines;
            }
            _ => slide.items.push(Item::Paragraphs { xml, lines }),
        }
    }

    fn add_text(&mut self, runs: Vec<StyledRun>, ppr: &str, size: u32, per_line: usize) {
        let text: String = runs.iter().map(|r| r.text.as_str()).collect();
        let lines = text_lines(&text, per_line);
        self.add_paragraphs(vec![(runs, ppr.to_string(), size)], lines);
    }

    fn slide_xml(slide: &Slide) -> String {
        let mut shapes = String::new();
        let mut id = 2u32;
        if let Some(title) = &slide.title {
            shapes.push_str(&format!(
                r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Title {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{MARGIN_X}" y="{TITLE_Y}"/><a:ext cx="{CONTENT_CX}" cy="{TITLE_CY}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr><p:txBody><a:bodyPr wrap="square" anchor="b"><a:normAutofit/></a:bodyPr><a:lstStyle/><a:p><a:r><a:rPr lang="en-US" sz="3200" b="1" dirty="0"/><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>"#,
                escape_text(title)
            ));
            id += 1;
        }

        let mut y = BODY_Y;
        for item in &slide.items {
            match item {
                Item::Paragraphs { xml, lines } => {
                    let cy = u64::from(*lines) * LINE_EMU + LINE_EMU / 2;
                    shapes.push_str(&format!(
                        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="TextBox {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{MARGIN_X}" y="{y}"/><a:ext cx="{CONTENT_CX}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr><p:txBody><a:bodyPr wrap="square" rtlCol="0"><a:spAutoFit/></a:bodyPr><a:lstStyle/>{}</p:txBody></p:sp>"#,
                        xml.concat()
                    ));
                    y += cy;
                }
                Item::Table { columns, rows } => {
                    let col_w = CONTENT_CX / (*columns).max(1) as u64;
                    let cy = rows.len() as u64 * ROW_EMU;
                    let grid: String = (0..*columns)
                        .map(|_| format!("<a:gridCol w=\"{}\"/>", col_w))
                        .collect();
                    shapes.push_str(&format!(
                        r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="{id}" name="Table {id}"/><p:cNvGraphicFramePr><a:graphicFrameLocks noGrp="1"/></p:cNvGraphicFramePr><p:nvPr/></p:nvGraphicFramePr><p:xfrm><a:off x="{MARGIN_X}" y="{y}"/><a:ext cx="{w}" cy="{cy}"/></p:xfrm><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/table"><a:tbl><a:tblPr firstRow="1" bandRow="1"/><a:tblGrid>{grid}</a:tblGrid>{}</a:tbl></a:graphicData></a:graphic></p:graphicFrame>"#,
                        rows.concat(),
                        w = col_w * (*columns).max(1) as u64,
                    ));
                    y += cy + LINE_EMU / 2;
                }
                Item::Picture { rid, cx, cy, descr } => {
                    shapes.push_str(&format!(
                        r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Picture {id}" descr="{descr}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{rid}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm><a:off x="{MARGIN_X}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#
                    ));
                    y += cy + LINE_EMU / 2;
                }
            }
            id += 1;
        }

        format!(
            r#"{XML_DECL}
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>{shapes}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#
        )
    }

    fn slide_rels_xml(slide: &Slide) -> String {
        let mut out = format!(
            r#"{XML_DECL}
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{LAYOUT_REL}" Target="../slideLayouts/slideLayout1.xml"/>"#
        );
        for rel in &slide.rels {
            let mode = if rel.external { " TargetMode=\"External\"" } else { "" };
            out.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}"{}/>"#,
                rel.id,
                rel.kind,
                escape_text(&rel.target),
                mode
            ));
        }
        out.push_str("</Relationships>");
        out
    }

    fn content_types_xml(&self) -> String {
        let mut out = String::from(XML_DECL);
        out.push('\n');
        out.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
        out.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
        out.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
        let mut seen = Vec::new();
        for (_, img) in &self.media {
            if !seen.contains(&img.format) {
                seen.push(img.format);
                out.push_str(&format!(
                    r#"<Default Extension="{}" ContentType="{}"/>"#,
                    img.format.extension(),
                    img.format.content_type()
                ));
            }
        }
        out.push_str(r#"<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>"#);
        out.push_str(r#"<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>"#);
        out.push_str(r#"<Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>"#);
        out.push_str(r#"<Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>"#);
        for i in 1..=self.slides.len() {
            out.push_str(&format!(
                r#"<Override PartName="/ppt/slides/slide{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#
            ));
        }
        out.push_str(r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#);
        out.push_str("</Types>");
        out
    }

    fn presentation_xml(&self) -> String {
        let ids: String = (0..self.slides.len())
            .map(|i| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, 10 + i))
            .collect();
        format!(
            r#"{XML_DECL}
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" saveSubsetFonts="1"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{ids}</p:sldIdLst><p:sldSz cx="{SLIDE_CX}" cy="{SLIDE_CY}"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#
        )
    }

    fn presentation_rels_xml(&self) -> String {
        let mut out = format!(
            r#"{XML_DECL}
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="theme/theme1.xml"/>"#
        );
        for i in 0..self.slides.len() {
            out.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{}.xml"/>"#,
                10 + i,
                i + 1
            ));
        }
        out.push_str("</Relationships>");
        out
    }
}

impl DocumentWriter for PptxWriter {
    fn paragraph(&mut self, runs: &[StyledRun]) {
        self.add_text(runs.to_vec(), "", BODY_SIZE, BODY_CHARS_PER_LINE);
    }

    fn heading(&mut self, level: u8, text: &str) {
        if level <= 2 {
            let slide = self.current();
            if slide.title.is_none() && slide.items.is_empty() {
                slide.title = Some(text.to_string());
            } else {
                self.slides.push(Slide::continuing(Some(text.to_string())));
            }
            return;
        }
        let size = if level == 3 { 2200 } else { 2000 };
        self.add_text(
            vec![StyledRun::new(text, RunStyle::bold())],
            "<a:pPr><a:spcBef><a:spcPts val=\"600\"/></a:spcBef></a:pPr>",
            size,
            BODY_CHARS_PER_LINE,
        );
    }

    fn code_block(&mut self, code: &CodeBlock) {
        // One a:p per source line so indentation survives.
        let mut lines: Vec<Vec<StyledRun>> = vec![Vec::new()];
        for run in &code.runs {
            for (i, piece) in run.text.split('\n').enumerate() {
                if i > 0 {
                    lines.push(Vec::new());
                }
                if !piece.is_empty() {
                    if let Some(line) = lines.last_mut() {
                        line.push(StyledRun::new(piece, run.style));
                    }
                }
            }
        }
        let count = text_lines(&code.text, CODE_CHARS_PER_LINE);
        let paras = lines
            .into_iter()
            .map(|runs| (runs, "<a:pPr><a:lnSpc><a:spcPct val=\"100000\"/></a:lnSpc></a:pPr>".to_string(), CODE_SIZE))
            .collect();
        self.add_paragraphs(paras, count);
    }

    fn table(&mut self, table: &Table) {
        let lines = ((table.rows.len() as u64 * ROW_EMU).div_ceil(LINE_EMU) as u32).max(1);
        self.ensure_room(lines);
        let slide = self.current();
        let rows: Vec<String> = table
            .rows
            .iter()
            .map(|row| {
                let cells: String = row
                    .iter()
                    .map(|cell| {
                        let runs: Vec<StyledRun> = cell
                            .runs
                            .iter()
                            .map(|r| {
                                let mut r = r.clone();
                                r.style.bold |= cell.header;
                                r
                            })
                            .collect();
                        format!(
                            "<a:tc><a:txBody><a:bodyPr/><a:lstStyle/>{}</a:txBody><a:tcPr>{}</a:tcPr></a:tc>",
                            paragraph_xml(slide, &runs, "", 1400),
                            cell_border()
                        )
                    })
                    .collect();
                format!("<a:tr h=\"{}\">{}</a:tr>", ROW_EMU, cells)
            })
            .collect();
        slide.lines += lines;
        slide.items.push(Item::Table {
            columns: table.columns,
            rows,
        });
    }

    fn math(&mut self, math: &MathBlock) {
        let text = match &math.content {
            MathContent::Linear(t) | MathContent::Fallback(t) => t.clone(),
            MathContent::Omml(_) => math.source.clone(),
        };
        self.add_text(
            vec![StyledRun::new(text, RunStyle::italic())],
            "<a:pPr algn=\"ctr\"/>",
            BODY_SIZE,
            BODY_CHARS_PER_LINE,
        );
    }

    fn image(&mut self, image: &Image, data: Option<LoadedImage>) {
        let Some(data) = data else {
            self.add_text(
                vec![StyledRun::new(image_placeholder(image), RunStyle::italic())],
                "",
                BODY_SIZE,
                BODY_CHARS_PER_LINE,
            );
            return;
        };
        let (cx, cy) = data.fit(CONTENT_CX, BODY_CY);
        let lines = (cy.div_ceil(LINE_EMU) as u32).max(1);
        self.ensure_room(lines);

        let part = format!("image{}.{}", self.media.len() + 1, data.format.extension());
        let slide = self.current();
        let rid = slide.add_rel(IMAGE_REL, format!("../media/{}", part), false);
        slide.lines += lines;
        slide.items.push(Item::Picture {
            rid,
            cx,
            cy,
            descr: escape_text(image.alt.as_deref().unwrap_or("")),
        });
        self.media.push((part, data));
    }

    fn hyperlink(&mut self, text: &str, url: &str) {
        self.add_text(
            vec![StyledRun::plain(text).with_href(url)],
            "",
            BODY_SIZE,
            BODY_CHARS_PER_LINE,
        );
    }

    fn list(&mut self, list: &List) {
        let mut lines = 0;
        let paras = list
            .items
            .iter()
            .map(|item| {
                let text: String = item.runs.iter().map(|r| r.text.as_str()).collect();
                lines += text_lines(&text, BODY_CHARS_PER_LINE);
                let indent = 342_900 * (u64::from(item.level) + 1);
                let bullet = if item.ordered {
                    "<a:buAutoNum type=\"arabicPeriod\"/>"
                } else {
                    "<a:buChar char=\"\u{2022}\"/>"
                };
                let ppr = format!(
                    "<a:pPr marL=\"{}\" lvl=\"{}\" indent=\"-285750\">{}</a:pPr>",
                    indent,
                    item.level.min(8),
                    bullet
                );
                (item.runs.clone(), ppr, BODY_SIZE)
            })
            .collect();
        self.add_paragraphs(paras, lines);
    }

    fn finish(mut self) -> Result<Vec<u8>> {
        if self.slides.is_empty() {
            self.slides.push(Slide::default());
        }
        let mut pkg = Package::new();
        pkg.add("[Content_Types].xml", self.content_types_xml().as_bytes())?;
        pkg.add("_rels/.rels", package_rels_xml("ppt/presentation.xml").as_bytes())?;
        pkg.add("docProps/core.xml", core_properties_xml(self.title.as_deref()).as_bytes())?;
        pkg.add("ppt/presentation.xml", self.presentation_xml().as_bytes())?;
        pkg.add("ppt/_rels/presentation.xml.rels", self.presentation_rels_xml().as_bytes())?;
        pkg.add("ppt/slideMasters/slideMaster1.xml", SLIDE_MASTER_XML.as_bytes())?;
        pkg.add("ppt/slideMasters/_rels/slideMaster1.xml.rels", SLIDE_MASTER_RELS_XML.as_bytes())?;
        pkg.add("ppt/slideLayouts/slideLayout1.xml", SLIDE_LAYOUT_XML.as_bytes())?;
        pkg.add("ppt/slideLayouts/_rels/slideLayout1.xml.rels", SLIDE_LAYOUT_RELS_XML.as_bytes())?;
        pkg.add("ppt/theme/theme1.xml", THEME_XML.as_bytes())?;
        for (i, slide) in self.slides.iter().enumerate() {
            pkg.add(&format!("ppt/slides/slide{}.xml", i + 1), Self::slide_xml(slide).as_bytes())?;
            pkg.add(
                &format!("ppt/slides/_rels/slide{}.xml.rels", i + 1),
                Self::slide_rels_xml(slide).as_bytes(),
            )?;
        }
        for (part, img) in &self.media {
            pkg.add(&format!("ppt/media/{}", part), &img.bytes)?;
        }
        pkg.finish()
    }
}

const SLIDE_MASTER_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>"#,
    r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr></p:spTree>"#,
    r#"</p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst><p:txStyles><p:titleStyle><a:lvl1pPr><a:defRPr sz="3200"/></a:lvl1pPr></p:titleStyle><p:bodyStyle><a:lvl1pPr><a:defRPr sz="1800"/></a:lvl1pPr></p:bodyStyle><p:otherStyle><a:lvl1pPr><a:defRPr sz="1800"/></a:lvl1pPr></p:otherStyle></p:txStyles></p:sldMaster>"#
);

const SLIDE_MASTER_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="../theme/theme1.xml"/></Relationships>"#;

const SLIDE_LAYOUT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="blank" preserve="1"><p:cSld name="Blank"><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr></p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#;

const SLIDE_LAYOUT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="../slideMasters/slideMaster1.xml"/></Relationships>"#;

const THEME_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements><a:clrScheme name="Office"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="44546A"/></a:dk2><a:lt2><a:srgbClr val="E7E6E6"/></a:lt2><a:accent1><a:srgbClr val="4472C4"/></a:accent1><a:accent2><a:srgbClr val="ED7D31"/></a:accent2><a:accent3><a:srgbClr val="A5A5A5"/></a:accent3><a:accent4><a:srgbClr val="FFC000"/></a:accent4><a:accent5><a:srgbClr val="5B9BD5"/></a:accent5><a:accent6><a:srgbClr val="70AD47"/></a:accent6><a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink></a:clrScheme><a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="Office"><a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst><a:lnStyleLst><a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst><a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst><a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst></a:fmtScheme></a:themeElements></a:theme>"#;
