//! WordprocessingML writer.

use std::collections::BTreeMap;

use super::image::LoadedImage;
use super::xml::{
    core_properties_xml, escape_text, package_rels_xml, Package, HYPERLINK_REL, IMAGE_REL, XML_DECL,
};
use super::{image_placeholder, DocumentWriter};
use crate::error::Result;
use crate::model::{CodeBlock, Image, List, MathBlock, MathContent, RunStyle, StyledRun, Table};

/// Printable width of a Letter page with 1in margins.
const TEXT_WIDTH_TWIPS: u32 = 9360;
const MAX_IMAGE_EMU: u64 = 6 * 914_400;
const MAX_IMAGE_HEIGHT_EMU: u64 = 9 * 914_400;
const BULLET_NUM_ID: u32 = 1;
const FIRST_LINK_RID: u32 = 10;

struct Media {
    rid: String,
    part: String,
    image: LoadedImage,
}

pub struct DocxWriter {
    title: Option<String>,
    body: String,
    /// href → relationship id
    links: BTreeMap<String, String>,
    media: Vec<Media>,
    next_rid: u32,
    /// Decimal list instances as (numId, ilvl); each restarts at 1 on its level.
    ordered_lists: Vec<(u32, u32)>,
    has_lists: bool,
    next_drawing_id: u32,
}

fn run_props(style: RunStyle, char_style: Option<&str>) -> String {
    let mut props = String::new();
    if let Some(s) = char_style {
        props.push_str(&format!("<w:rStyle w:val=\"{}\"/>", s));
    }
    if style.monospace {
        props.push_str("<w:rFonts w:ascii=\"Consolas\" w:hAnsi=\"Consolas\" w:cs=\"Consolas\"/>");
    }
    if style.bold {
        props.push_str("<w:b/>");
    }
    if style.italic {
        props.push_str("<w:i/>");
    }
    if let Some(c) = style.color {
        props.push_str(&format!("<w:color w:val=\"{}\"/>", c.hex()));
    }
    if props.is_empty() {
        props
    } else {
        format!("<w:rPr>{}</w:rPr>", props)
    }
}

/// One `w:r`; `\n` becomes `w:br` and `\t` becomes `w:tab`.
fn run_xml(text: &str, style: RunStyle, char_style: Option<&str>) -> String {
    if text.is_empty() {
        return String::new();
    }
    let mut out = String::from("<w:r>");
    out.push_str(&run_props(style, char_style));
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push_str("<w:br/>");
        }
        for (j, piece) in line.split('\t').enumerate() {
            if j > 0 {
                out.push_str("<w:tab/>");
            }
            if !piece.is_empty() {
                out.push_str("<w:t xml:space=\"preserve\">");
                out.push_str(&escape_text(piece));
                out.push_str("</w:t>");
            }
        }
    }
    out.push_str("</w:r>");
    out
}

fn paragraph_open(style: Option<&str>, numbering: Option<(u32, u32)>) -> String {
    if style.is_none() && numbering.is_none() {
        return "<w:p>".to_string();
    }
    let mut out = String::from("<w:p><w:pPr>");
    if let Some(s) = style {
        out.push_str(&format!("<w:pStyle w:val=\"{}\"/>", s));
    }
    if let Some((num_id, ilvl)) = numbering {
        out.push_str(&format!(
            "<w:numPr><w:ilvl w:val=\"{}\"/><w:numId w:val=\"{}\"/></w:numPr>",
            ilvl, num_id
        ));
    }
    out.push_str("</w:pPr>");
    out
}

impl DocxWriter {
    pub fn new(title: Option<&str>) -> Self {
        Self {
            title: title.map(str::to_string),
            body: String::new(),
            links: BTreeMap::new(),
            media: Vec::new(),
            next_rid: FIRST_LINK_RID,
            ordered_lists: Vec::new(),
            has_lists: false,
            next_drawing_id: 1,
        }
    }

    fn alloc_rid(&mut self) -> String {
        let rid = format!("rId{}", self.next_rid);
        self.next_rid += 1;
        rid
    }

    fn link_rid(&mut self, href: &str) -> String {
        if let Some(rid) = self.links.get(href) {
            return rid.clone();
        }
        let rid = self.alloc_rid();
        self.links.insert(href.to_string(), rid.clone());
        rid
    }

    /// Runs of one paragraph; consecutive runs sharing an href share one `w:hyperlink`.
    fn runs_xml(&mut self, runs: &[StyledRun], force_bold: bool) -> String {
        let mut out = String::new();
        let mut i = 0;
        while i < runs.len() {
            match runs[i].href.clone() {
                Some(href) => {
                    let rid = self.link_rid(&href);
                    out.push_str(&format!("<w:hyperlink r:id=\"{}\" w:history=\"1\">", rid));
                    while i < runs.len() && runs[i].href.as_deref() == Some(href.as_str()) {
                        let mut s = runs[i].style;
                        s.bold |= force_bold;
                        out.push_str(&run_xml(&runs[i].text, s, Some("Hyperlink")));
                        i += 1;
                    }
                    out.push_str("</w:hyperlink>");
                }
                None => {
                    let mut style = runs[i].style;
                    style.bold |= force_bold;
                    out.push_str(&run_xml(&runs[i].text, style, None));
                    i += 1;
                }
            }
        }
        out
    }

    fn push_paragraph(&mut self, style: Option<&str>, numbering: Option<(u32, u32)>, content: &str) {
        self.body.push_str(&paragraph_open(style, numbering));
        self.body.push_str(content);
        self.body.push_str("</w:p>");
    }

    fn drawing_xml(&mut self, image: &Image, data: LoadedImage) -> String {
        let id = self.next_drawing_id;
        self.next_drawing_id += 1;
        let rid = self.alloc_rid();
        let part = format!("media/image{}.{}", id, data.format.extension());
        let (cx, cy) = data.fit(MAX_IMAGE_EMU, MAX_IMAGE_HEIGHT_EMU);
        let descr = escape_text(image.alt.as_deref().unwrap_or(""));
        let xml = format!(
            r#"<w:r><w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0"><wp:extent cx="{cx}" cy="{cy}"/><wp:docPr id="{id}" name="Picture {id}" descr="{descr}"/><wp:cNvGraphicFramePr><a:graphicFrameLocks xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" noChangeAspect="1"/></wp:cNvGraphicFramePr><a:graphic xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture"><pic:pic xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture"><pic:nvPicPr><pic:cNvPr id="{id}" name="image{id}.{ext}"/><pic:cNvPicPr/></pic:nvPicPr><pic:blipFill><a:blip r:embed="{rid}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill><pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r>"#,
            ext = data.format.extension(),
        );
        self.media.push(Media {
            rid,
            part,
            image: data,
        });
        xml
    }

    fn document_xml(&self) -> String {
        format!(
            r#"{XML_DECL}
<w:document xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"
 xmlns:m="http://schemas.openxmlformats.org/officeDocument/2006/math"
 xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing"
 xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    {body}
    <w:sectPr>
      <w:pgSz w:w="12240" w:h="15840"/>
      <w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="708" w:footer="708" w:gutter="0"/>
      <w:cols w:space="708"/>
      <w:docGrid w:linePitch="360"/>
    </w:sectPr>
  </w:body>
</w:document>"#,
            body = self.body
        )
    }

    fn content_types_xml(&self) -> String {
        let mut out = String::new();
        out.push_str(XML_DECL);
        out.push('\n');
        out.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
        out.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
        out.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
        let mut seen = Vec::new();
        for f in self.media.iter().map(|m| m.image.format) {
            if seen.contains(&f) {
                continue;
            }
            seen.push(f);
            out.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                f.extension(),
                f.content_type()
            ));
        }
        out.push_str(r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#);
        out.push_str(r#"<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#);
        if self.has_lists {
            out.push_str(r#"<Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/>"#);
        }
        out.push_str(r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#);
        out.push_str("</Types>");
        out
    }

    fn document_rels_xml(&self) -> String {
        let mut out = String::new();
        out.push_str(XML_DECL);
        out.push('\n');
        out.push_str(r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);
        out.push_str(r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#);
        if self.has_lists {
            out.push_str(r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/>"#);
        }
        for (href, rid) in &self.links {
            out.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}" TargetMode="External"/>"#,
                rid,
                HYPERLINK_REL,
                escape_text(href)
            ));
        }
        for m in &self.media {
            out.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
                m.rid, IMAGE_REL, m.part
            ));
        }
        out.push_str("</Relationships>");
        out
    }

    fn numbering_xml(&self) -> String {
        let levels = |fmt: &str| -> String {
            (0..9)
                .map(|l| {
                    let text = if fmt == "bullet" {
                        ["\u{2022}", "\u{25E6}", "\u{25AA}"][l % 3].to_string()
                    } else {
                        format!("%{}.", l + 1)
                    };
                    format!(
                        r#"<w:lvl w:ilvl="{l}"><w:start w:val="1"/><w:numFmt w:val="{fmt}"/><w:lvlText w:val="{text}"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="{left}" w:hanging="360"/></w:pPr></w:lvl>"#,
                        left = 720 * (l + 1)
                    )
                })
                .collect()
        };
        let mut out = format!(
            r#"{XML_DECL}
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:abstractNum w:abstractNumId="1"><w:multiLevelType w:val="hybridMultilevel"/>{}</w:abstractNum><w:abstractNum w:abstractNumId="2"><w:multiLevelType w:val="hybridMultilevel"/>{}</w:abstractNum>"#,
            levels("bullet"),
            levels("decimal")
        );
        out.push_str(&format!(
            r#"<w:num w:numId="{BULLET_NUM_ID}"><w:abstractNumId w:val="1"/></w:num>"#
        ));
        for (num_id, ilvl) in &self.ordered_lists {
            out.push_str(&format!(
                r#"<w:num w:numId="{num_id}"><w:abstractNumId w:val="2"/><w:lvlOverride w:ilvl="{ilvl}"><w:startOverride w:val="1"/></w:lvlOverride></w:num>"#
            ));
        }
        out.push_str("</w:numbering>");
        out
    }
}

impl DocumentWriter for DocxWriter {
    fn paragraph(&mut self, runs: &[StyledRun]) {
        let content = self.runs_xml(runs, false);
        self.push_paragraph(None, None, &content);
    }

    fn heading(&mut self, level: u8, text: &str) {
        let style = format!("Heading{}", level.clamp(1, 6));
        let content = run_xml(text, RunStyle::default(), None);
        self.push_paragraph(Some(&style), None, &content);
    }

    fn code_block(&mut self, code: &CodeBlock) {
        let content: String = code
            .runs
            .iter()
            .map(|r| run_xml(&r.text, r.style, None))
            .collect();
        self.push_paragraph(Some("CodeBlock"), None, &content);
    }

    fn table(&mut self, table: &Table) {
        let col_width = TEXT_WIDTH_TWIPS / table.columns.max(1) as u32;
        let mut out = String::from("<w:tbl><w:tblPr><w:tblStyle w:val=\"TableGrid\"/><w:tblW w:w=\"0\" w:type=\"auto\"/>");
        out.push_str(
            r#"<w:tblBorders><w:top w:val="single" w:sz="4" w:space="0" w:color="BFBFBF"/><w:left w:val="single" w:sz="4" w:space="0" w:color="BFBFBF"/><w:bottom w:val="single" w:sz="4" w:space="0" w:color="BFBFBF"/><w:right w:val="single" w:sz="4" w:space="0" w:color="BFBFBF"/><w:insideH w:val="single" w:sz="4" w:space="0" w:color="BFBFBF"/><w:insideV w:val="single" w:sz="4" w:space="0" w:color="BFBFBF"/></w:tblBorders></w:tblPr><w:tblGrid>"#,
        );
        for _ in 0..table.columns {
            out.push_str(&format!("<w:gridCol w:w=\"{}\"/>", col_width));
        }
        out.push_str("</w:tblGrid>");
        for row in &table.rows {
            out.push_str("<w:tr>");
            if row.iter().all(|c| c.header) {
                out.push_str("<w:trPr><w:tblHeader/></w:trPr>");
            }
            for cell in row {
                out.push_str(&format!(
                    "<w:tc><w:tcPr><w:tcW w:w=\"{}\" w:type=\"dxa\"/></w:tcPr><w:p>",
                    col_width
                ));
                let runs = self.runs_xml(&cell.runs, cell.header);
                out.push_str(&runs);
                out.push_str("</w:p></w:tc>");
            }
            out.push_str("</w:tr>");
        }
        out.push_str("</w:tbl>");
        self.body.push_str(&out);
    }

    fn math(&mut self, math: &MathBlock) {
        match &math.content {
            MathContent::Omml(xml) => self.push_paragraph(None, None, xml),
            MathContent::Linear(text) | MathContent::Fallback(text) => {
                let content = run_xml(text, RunStyle::default(), None);
                self.push_paragraph(None, None, &content);
            }
        }
    }

    fn image(&mut self, image: &Image, data: Option<LoadedImage>) {
        let content = match data {
            Some(data) => self.drawing_xml(image, data),
            None => run_xml(&image_placeholder(image), RunStyle::italic(), None),
        };
        self.push_paragraph(None, None, &content);
    }

    fn hyperlink(&mut self, text: &str, url: &str) {
        let content = self.runs_xml(&[StyledRun::plain(text).with_href(url)], false);
        self.push_paragraph(None, None, &content);
    }

    fn list(&mut self, list: &List) {
        self.has_lists = true;
        // Ordered instance open at each level. Returning to a shallower level
        // closes the deeper ones, so the next sublist counts from 1 again.
        let mut open: Vec<Option<u32>> = Vec::new();
        for item in &list.items {
            let level = item.level.min(8);
            let depth = level as usize + 1;
            open.truncate(depth);
            open.resize(depth, None);
            let num_id = if item.ordered {
                match open[level as usize] {
                    Some(id) => id,
                    None => {
                        // numId 1 is the bullet instance.
                        let id = BULLET_NUM_ID + 1 + self.ordered_lists.len() as u32;
                        self.ordered_lists.push((id, level));
                        open[level as usize] = Some(id);
                        id
                    }
                }
            } else {
                BULLET_NUM_ID
            };
            let content = self.runs_xml(&item.runs, false);
            self.push_paragraph(Some("ListParagraph"), Some((num_id, level)), &content);
        }
    }

    fn finish(self) -> Result<Vec<u8>> {
        let mut pkg = Package::new();
        pkg.add("[Content_Types].xml", self.content_types_xml().as_bytes())?;
        pkg.add("_rels/.rels", package_rels_xml("word/document.xml").as_bytes())?;
        pkg.add("docProps/core.xml", core_properties_xml(self.title.as_deref()).as_bytes())?;
        pkg.add("word/document.xml", self.document_xml().as_bytes())?;
        pkg.add("word/styles.xml", STYLES_XML.as_bytes())?;
        if self.has_lists {
            pkg.add("word/numbering.xml", self.numbering_xml().as_bytes())?;
        }
        pkg.add("word/_rels/document.xml.rels", self.document_rels_xml().as_bytes())?;
        for m in &self.media {
            pkg.add(&format!("word/{}", m.part), &m.image.bytes)?;
        }
        pkg.finish()
    }
}

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:docDefaults>
    <w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:cs="Calibri"/><w:sz w:val="22"/></w:rPr></w:rPrDefault>
    <w:pPrDefault><w:pPr><w:spacing w:after="160" w:line="259" w:lineRule="auto"/></w:pPr></w:pPrDefault>
  </w:docDefaults>
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal">
    <w:name w:val="Normal"/>
    <w:qFormat/>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Heading1">
    <w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:uiPriority w:val="9"/><w:qFormat/>
    <w:pPr><w:keepNext/><w:spacing w:before="360" w:after="120"/><w:outlineLvl w:val="0"/></w:pPr>
    <w:rPr><w:b/><w:sz w:val="32"/></w:rPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Heading2">
    <w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:uiPriority w:val="9"/><w:qFormat/>
    <w:pPr><w:keepNext/><w:spacing w:before="240" w:after="120"/><w:outlineLvl w:val="1"/></w:pPr>
    <w:rPr><w:b/><w:sz w:val="28"/></w:rPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Heading3">
    <w:name w:val="heading 3"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:uiPriority w:val="9"/><w:qFormat/>
    <w:pPr><w:keepNext/><w:spacing w:before="240" w:after="80"/><w:outlineLvl w:val="2"/></w:pPr>
    <w:rPr><w:b/><w:sz w:val="26"/></w:rPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Heading4">
    <w:name w:val="heading 4"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:uiPriority w:val="9"/><w:qFormat/>
    <w:pPr><w:keepNext/><w:spacing w:before="200" w:after="80"/><w:outlineLvl w:val="3"/></w:pPr>
    <w:rPr><w:b/><w:i/><w:sz w:val="24"/></w:rPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Heading5">
    <w:name w:val="heading 5"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:uiPriority w:val="9"/><w:qFormat/>
    <w:pPr><w:keepNext/><w:spacing w:before="160" w:after="60"/><w:outlineLvl w:val="4"/></w:pPr>
    <w:rPr><w:b/><w:sz w:val="22"/></w:rPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Heading6">
    <w:name w:val="heading 6"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:uiPriority w:val="9"/><w:qFormat/>
    <w:pPr><w:keepNext/><w:spacing w:before="160" w:after="60"/><w:outlineLvl w:val="5"/></w:pPr>
    <w:rPr><w:i/><w:sz w:val="22"/></w:rPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="CodeBlock">
    <w:name w:val="Code Block"/><w:basedOn w:val="Normal"/><w:uiPriority w:val="99"/><w:qFormat/>
    <w:pPr><w:shd w:val="clear" w:color="auto" w:fill="F5F5F5"/><w:spacing w:before="120" w:after="120" w:line="240" w:lineRule="auto"/></w:pPr>
    <w:rPr><w:rFonts w:ascii="Consolas" w:hAnsi="Consolas" w:cs="Consolas"/><w:sz w:val="20"/></w:rPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="ListParagraph">
    <w:name w:val="List Paragraph"/><w:basedOn w:val="Normal"/><w:uiPriority w:val="34"/><w:qFormat/>
    <w:pPr><w:spacing w:after="40"/><w:contextualSpacing/></w:pPr>
  </w:style>
  <w:style w:type="character" w:styleId="Hyperlink">
    <w:name w:val="Hyperlink"/><w:uiPriority w:val="99"/><w:unhideWhenUsed/>
    <w:rPr><w:color w:val="0563C1"/><w:u w:val="single"/></w:rPr>
  </w:style>
  <w:style w:type="table" w:styleId="TableGrid">
    <w:name w:val="Table Grid"/><w:uiPriority w:val="39"/>
    <w:tblPr><w:tblCellMar><w:left w:w="108" w:type="dxa"/><w:right w:w="108" w:type="dxa"/></w:tblCellMar></w:tblPr>
  </w:style>
</w:styles>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Color, ListItem, TableCell};
    use crate::writer::image::{sniff, tests::png_header};
    use std::io::{Cursor, Read};

    fn part(bytes: &[u8], name: &str) -> Option<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).ok()?;
        let mut f = archive.by_name(name).ok()?;
        let mut s = String::new();
        f.read_to_string(&mut s).ok()?;
        Some(s)
    }

    #[test]
    fn writes_the_package_parts() {
        let mut w = DocxWriter::new(Some("T"));
        w.heading(2, "Title");
        w.paragraph(&[StyledRun::plain("A "), StyledRun::new("bold", RunStyle::bold())]);
        let bytes = w.finish().unwrap();

        let doc = part(&bytes, "word/document.xml").unwrap();
        assert!(doc.contains("<w:pStyle w:val=\"Heading2\"/>"));
        assert!(doc.contains("<w:r><w:rPr><w:b/></w:rPr><w:t xml:space=\"preserve\">bold</w:t></w:r>"));
        assert!(part(&bytes, "word/styles.xml").unwrap().contains("Heading6"));
        assert!(part(&bytes, "docProps/core.xml").unwrap().contains("<dc:title>T</dc:title>"));
        assert!(part(&bytes, "word/numbering.xml").is_none());
    }

    #[test]
    fn adjacent_link_runs_share_one_hyperlink() {
        let mut w = DocxWriter::new(None);
        w.paragraph(&[
            StyledRun::plain("go ").with_href("https://a.b/?x=1&y=2"),
            StyledRun::new("now", RunStyle::bold()).with_href("https://a.b/?x=1&y=2"),
            StyledRun::plain("."),
        ]);
        w.hyperlink("again", "https://a.b/?x=1&y=2");
        let bytes = w.finish().unwrap();
        let doc = part(&bytes, "word/document.xml").unwrap();
        assert_eq!(doc.matches("<w:hyperlink r:id=\"rId10\"").count(), 2);
        let rels = part(&bytes, "word/_rels/document.xml.rels").unwrap();
        assert_eq!(rels.matches("TargetMode=\"External\"").count(), 1);
        assert!(rels.contains("https://a.b/?x=1&amp;y=2"));
    }

    #[test]
    fn tables_have_a_fixed_grid() {
        let mut w = DocxWriter::new(None);
        w.table(&Table {
            columns: 3,
            rows: vec![vec![TableCell::empty(), TableCell::empty(), TableCell::empty()]],
        });
        let doc = part(&w.finish().unwrap(), "word/document.xml").unwrap();
        assert_eq!(doc.matches("<w:gridCol ").count(), 3);
        assert_eq!(doc.matches("<w:tc>").count(), 3);
    }

    #[test]
    fn code_lines_break_and_keep_colors() {
        let mut w = DocxWriter::new(None);
        w.code_block(&CodeBlock {
            text: "a\n  b".to_string(),
            language: None,
            highlighted: true,
            runs: vec![StyledRun::new(
                "a\n  b",
                RunStyle {
                    monospace: true,
                    color: Some(Color::rgb(1, 2, 3)),
                    ..RunStyle::default()
                },
            )],
        });
        let doc = part(&w.finish().unwrap(), "word/document.xml").unwrap();
        assert!(doc.contains("<w:pStyle w:val=\"CodeBlock\"/>"));
        assert!(doc.contains("<w:color w:val=\"010203\"/>"));
        assert!(doc.contains("<w:br/><w:t xml:space=\"preserve\">  b</w:t>"));
    }

    #[test]
    fn math_content_is_embedded_or_written_as_text() {
        let mut w = DocxWriter::new(None);
        w.math(&MathBlock {
            source: "x".to_string(),
            content: MathContent::Omml("<m:oMathPara><m:oMath/></m:oMathPara>".to_string()),
        });
        w.math(&MathBlock {
            source: "{".to_string(),
            content: MathContent::Fallback("[Math: {]".to_string()),
        });
        let doc = part(&w.finish().unwrap(), "word/document.xml").unwrap();
        assert!(doc.contains("<w:p><m:oMathPara><m:oMath/></m:oMathPara></w:p>"));
        assert!(doc.contains("[Math: {]"));
    }

    #[test]
    fn lists_use_numbering() {
        let mut w = DocxWriter::new(None);
        w.list(&List {
            ordered: true,
            items: vec![
                ListItem {
                    level: 0,
                    ordered: true,
                    runs: vec![StyledRun::plain("one")],
                },
                ListItem {
                    level: 1,
                    ordered: false,
                    runs: vec![StyledRun::plain("sub")],
                },
            ],
        });
        let bytes = w.finish().unwrap();
        let doc = part(&bytes, "word/document.xml").unwrap();
        assert!(doc.contains("<w:ilvl w:val=\"0\"/><w:numId w:val=\"2\"/>"));
        assert!(doc.contains("<w:ilvl w:val=\"1\"/><w:numId w:val=\"1\"/>"));
        let numbering = part(&bytes, "word/numbering.xml").unwrap();
        assert!(numbering.contains("<w:num w:numId=\"2\">"));
        assert!(part(&bytes, "[Content_Types].xml").unwrap().contains("numbering+xml"));
    }

    #[test]
    fn each_ordered_sublist_restarts_its_count() {
        let item = |level, text: &str| ListItem {
            level,
            ordered: true,
            runs: vec![StyledRun::plain(text)],
        };
        let mut w = DocxWriter::new(None);
        w.list(&List {
            ordered: true,
            items: vec![item(0, "a"), item(1, "x1"), item(1, "x2"), item(0, "b"), item(1, "y")],
        });
        let bytes = w.finish().unwrap();
        let doc = part(&bytes, "word/document.xml").unwrap();
        let numbered = |id: u32, lvl: u32| doc.matches(&format!("<w:ilvl w:val=\"{lvl}\"/><w:numId w:val=\"{id}\"/>")).count();
        assert_eq!(numbered(2, 0), 2);
        assert_eq!(numbered(3, 1), 2);
        assert_eq!(numbered(4, 1), 1);
        let numbering = part(&bytes, "word/numbering.xml").unwrap();
        assert!(numbering.contains(r#"<w:num w:numId="4"><w:abstractNumId w:val="2"/><w:lvlOverride w:ilvl="1"><w:startOverride w:val="1"/>"#));
    }

    #[test]
    fn images_are_embedded_or_replaced() {
        let mut w = DocxWriter::new(None);
        let img = Image {
            src: "pic.png".to_string(),
            alt: Some("chart".to_string()),
        };
        w.image(&img, sniff(png_header(100, 50)));
        w.image(&img, None);
        let bytes = w.finish().unwrap();
        let doc = part(&bytes, "word/document.xml").unwrap();
        assert!(doc.contains("<a:blip r:embed=\"rId10\"/>"));
        assert!(doc.contains("<wp:extent cx=\"952500\" cy=\"476250\"/>"));
        assert!(doc.contains("[Image: chart]"));
        assert!(part(&bytes, "[Content_Types].xml").unwrap().contains("image/png"));
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert!(archive.by_name("word/media/image1.png").is_ok());
    }

    #[test]
    fn very_tall_images_are_scaled_to_the_page() {
        let mut w = DocxWriter::new(None);
        let img = Image {
            src: "tall.png".to_string(),
            alt: None,
        };
        w.image(&img, sniff(png_header(2000, 4_000_000_000)));
        let doc = part(&w.finish().unwrap(), "word/document.xml").unwrap();
        assert!(doc.contains(&format!("cy=\"{}\"", MAX_IMAGE_HEIGHT_EMU)));
    }
}
