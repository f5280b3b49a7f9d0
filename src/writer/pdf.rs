//! Minimal PDF 1.4 writer: standard Type1 fonts, WinAnsi text, greedy wrapping.
//!
//! Glyph widths are approximations of the Helvetica metrics, close enough to
//! keep lines inside the margins. Images are never embedded.

use std::fmt::Write as _;

use super::image::LoadedImage;
use super::{image_placeholder, DocumentWriter};
use crate::error::Result;
use crate::model::{CodeBlock, Color, Image, List, MathBlock, MathContent, RunStyle, StyledRun, Table};

const PAGE_W: f32 = 612.0;
const PAGE_H: f32 = 792.0;
const MARGIN: f32 = 72.0;
const CONTENT_W: f32 = PAGE_W - 2.0 * MARGIN;
const LEADING: f32 = 1.3;

const BODY_SIZE: f32 = 11.0;
const CODE_SIZE: f32 = 9.5;
const TABLE_SIZE: f32 = 10.0;
const CELL_PAD: f32 = 4.0;
const HEADING_SIZES: [f32; 6] = [22.0, 18.0, 15.0, 13.0, 12.0, 11.0];

const LINK_COLOR: Color = Color::rgb(0x05, 0x63, 0xC1);

/// Base fonts, referenced as `/F1`..`/F6` in content streams.
const FONTS: [&str; 6] = [
    "Helvetica",
    "Helvetica-Bold",
    "Helvetica-Oblique",
    "Helvetica-BoldOblique",
    "Courier",
    "Courier-Bold",
];

fn font_for(style: RunStyle) -> usize {
    match (style.monospace, style.bold, style.italic) {
        (true, true, _) => 6,
        (true, false, _) => 5,
        (false, true, true) => 4,
        (false, false, true) => 3,
        (false, true, false) => 2,
        (false, false, false) => 1,
    }
}

fn glyph_width(ch: char) -> f32 {
    match ch {
        'i' | 'j' | 'l' | '\'' | '|' | '!' | '.' | ',' | ':' | ';' => 0.25,
        ' ' | 'f' | 't' | 'I' | 'r' | '(' | ')' | '[' | ']' | '/' | '-' => 0.31,
        'm' | 'w' | 'M' | 'W' | '@' | '%' => 0.85,
        'A'..='Z' => 0.68,
        '0'..='9' | 'a'..='z' => 0.55,
        _ => 0.6,
    }
}

/// Approximate advance of `text` in points.
fn text_width(text: &str, font: usize, size: f32) -> f32 {
    let em: f32 = match font {
        5 | 6 => 0.6 * text.chars().count() as f32,
        2 | 4 => text.chars().map(glyph_width).sum::<f32>() * 1.06,
        _ => text.chars().map(glyph_width).sum(),
    };
    em * size
}

fn win_ansi(ch: char) -> u8 {
    match ch {
        ' '..='~' => ch as u8,
        '\u{A0}'..='\u{FF}' => ch as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => b'?',
    }
}

/// PDF literal string body, WinAnsi encoded; high bytes as octal escapes.
fn pdf_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match win_ansi(ch) {
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b'\\' => out.push_str("\\\\"),
            b if b < 0x80 => out.push(b as char),
            b => {
                let _ = write!(out, "\\{:03o}", b);
            }
        }
    }
    out
}

fn rgb(c: Color) -> String {
    format!(
        "{:.3} {:.3} {:.3}",
        f32::from(c.r) / 255.0,
        f32::from(c.g) / 255.0,
        f32::from(c.b) / 255.0
    )
}

#[derive(Debug, Clone, PartialEq)]
struct Fragment {
    text: String,
    font: usize,
    color: Option<Color>,
    href: Option<String>,
}

/// Greedy line breaker over styled runs.
struct Wrapper {
    width: f32,
    size: f32,
    lines: Vec<Vec<Fragment>>,
    line: Vec<Fragment>,
    x: f32,
    /// The current line was started by wrapping, not by an explicit break.
    soft: bool,
}

impl Wrapper {
    fn new(width: f32, size: f32) -> Self {
        Self {
            width,
            size,
            lines: Vec::new(),
            line: Vec::new(),
            x: 0.0,
            soft: false,
        }
    }

    fn break_line(&mut self, soft: bool) {
        if soft {
            if let Some(last) = self.line.last_mut() {
                let trimmed = last.text.trim_end_matches(' ').len();
                last.text.truncate(trimmed);
            }
        }
        self.lines.push(std::mem::take(&mut self.line));
        self.x = 0.0;
        self.soft = soft;
    }

    fn append(&mut self, text: &str, font: usize, color: Option<Color>, href: Option<&str>) {
        self.x += text_width(text, font, self.size);
        if let Some(last) = self.line.last_mut() {
            if last.font == font && last.color == color && last.href.as_deref() == href {
                last.text.push_str(text);
                return;
            }
        }
        self.line.push(Fragment {
            text: text.to_string(),
            font,
            color,
            href: href.map(str::to_string),
        });
    }

    fn token(&mut self, token: &str, font: usize, color: Option<Color>, href: Option<&str>) {
        if token.starts_with(' ') {
            if !(self.soft && self.x == 0.0) {
                self.append(token, font, color, href);
            }
            return;
        }
        let w = text_width(token, font, self.size);
        if self.x + w <= self.width {
            self.append(token, font, color, href);
            return;
        }
        if self.x > 0.0 && w <= self.width {
            self.break_line(true);
            self.append(token, font, color, href);
            return;
        }
        // Longer than a whole line: break between characters.
        let mut buf = [0u8; 4];
        for ch in token.chars() {
            let piece: &str = ch.encode_utf8(&mut buf);
            if self.x > 0.0 && self.x + text_width(piece, font, self.size) > self.width {
                self.break_line(true);
            }
            self.append(piece, font, color, href);
        }
    }

    fn push_runs(&mut self, runs: &[StyledRun], force_bold: bool) {
        for run in runs {
            let mut style = run.style;
            style.bold |= force_bold;
            let font = font_for(style);
            let color = run.style.color.or(run.href.as_ref().map(|_| LINK_COLOR));
            let text = run.text.replace('\t', "    ");
            for (i, hard) in text.split('\n').enumerate() {
                if i > 0 {
                    self.break_line(false);
                }
                for token in tokens(hard) {
                    self.token(token, font, color, run.href.as_deref());
                }
            }
        }
    }

    fn finish(mut self) -> Vec<Vec<Fragment>> {
        if !self.line.is_empty() || self.lines.is_empty() {
            self.lines.push(self.line);
        }
        self.lines
    }
}

/// Splits into maximal runs of spaces and of non-spaces.
fn tokens(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut prev_space = None;
    for (i, ch) in text.char_indices() {
        let space = ch == ' ';
        if prev_space.is_some_and(|p| p != space) {
            out.push(&text[start..i]);
            start = i;
        }
        prev_space = Some(space);
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}

fn wrap(runs: &[StyledRun], width: f32, size: f32, force_bold: bool) -> Vec<Vec<Fragment>> {
    let mut w = Wrapper::new(width, size);
    w.push_runs(runs, force_bold);
    w.finish()
}

struct LinkAnnot {
    rect: [f32; 4],
    uri: String,
}

#[derive(Default)]
struct Page {
    content: String,
    links: Vec<LinkAnnot>,
}

pub struct PdfWriter {
    title: Option<String>,
    pages: Vec<Page>,
    /// Top of the free area on the current page.
    y: f32,
}

impl PdfWriter {
    pub fn new(title: Option<&str>) -> Self {
        Self {
            title: title.map(str::to_string),
            pages: vec![Page::default()],
            y: PAGE_H - MARGIN,
        }
    }

    fn page(&mut self) -> &mut Page {
        if self.pages.is_empty() {
            self.pages.push(Page::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = PAGE_H - MARGIN;
    }

    /// Starts a new page unless `height` still fits. A fresh page always accepts.
    fn ensure(&mut self, height: f32) {
        let fresh = self.y >= PAGE_H - MARGIN;
        if !fresh && self.y - height < MARGIN {
            self.new_page();
        }
    }

    fn gap(&mut self, points: f32) {
        if self.y < PAGE_H - MARGIN {
            self.y -= points;
        }
    }

    /// Draws one wrapped line with its baseline at `baseline`.
    fn draw_line(&mut self, line: &[Fragment], x: f32, baseline: f32, size: f32) {
        let mut cx = x;
        for frag in line {
            let w = text_width(&frag.text, frag.font, size);
            let color = frag.color.map(rgb).unwrap_or_else(|| "0 0 0".to_string());
            let page = self.page();
            let _ = writeln!(
                page.content,
                "BT /F{} {} Tf {} rg {:.2} {:.2} Td ({}) Tj ET",
                frag.font,
                size,
                color,
                cx,
                baseline,
                pdf_string(&frag.text)
            );
            if let Some(uri) = &frag.href {
                let _ = writeln!(
                    page.content,
                    "{} RG 0.5 w {:.2} {:.2} m {:.2} {:.2} l S",
                    rgb(LINK_COLOR),
                    cx,
                    baseline - 1.5,
                    cx + w,
                    baseline - 1.5
                );
                page.links.push(LinkAnnot {
                    rect: [cx, baseline - 2.0, cx + w, baseline + size],
                    uri: uri.clone(),
                });
            }
            cx += w;
        }
    }

    fn flow(&mut self, lines: Vec<Vec<Fragment>>, x: f32, size: f32, shade: bool) {
        let lh = size * LEADING;
        for line in lines {
            self.ensure(lh);
            if shade {
                let top = self.y;
                let _ = writeln!(
                    self.page().content,
                    "0.953 g {:.2} {:.2} {:.2} {:.2} re f",
                    x - 3.0,
                    top - lh,
                    CONTENT_W - (x - MARGIN) + 6.0,
                    lh
                );
            }
            let baseline = self.y - size;
            self.draw_line(&line, x, baseline, size);
            self.y -= lh;
        }
    }

    fn text_block(&mut self, runs: &[StyledRun], size: f32, indent: f32) {
        let lines = wrap(runs, CONTENT_W - indent, size, false);
        self.flow(lines, MARGIN + indent, size, false);
        self.gap(size * 0.5);
    }

    fn serialize(&self) -> String {
        let mut objects: Vec<String> = Vec::new();
        // 1 catalog, 2 page tree; filled once the page ids are known.
        objects.push(String::new());
        objects.push(String::new());
        for name in FONTS {
            objects.push(format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                name
            ));
        }
        let mut info = format!("<< /Producer ({})", pdf_string(env!("CARGO_PKG_NAME")));
        if let Some(title) = &self.title {
            let _ = write!(info, " /Title ({})", pdf_string(title));
        }
        info.push_str(" >>");
        objects.push(info);
        let info_id = objects.len();

        let fonts: String = (1..=FONTS.len()).map(|i| format!(" /F{} {} 0 R", i, i + 2)).collect();
        let mut kids = Vec::new();
        for page in &self.pages {
            objects.push(format!(
                "<< /Length {} >>\nstream\n{}endstream",
                page.content.len(),
                page.content
            ));
            let content_id = objects.len();
            let mut annots = Vec::new();
            for link in &page.links {
                objects.push(format!(
                    "<< /Type /Annot /Subtype /Link /Rect [{:.2} {:.2} {:.2} {:.2}] /Border [0 0 0] /A << /S /URI /URI ({}) >> >>",
                    link.rect[0],
                    link.rect[1],
                    link.rect[2],
                    link.rect[3],
                    pdf_string(&link.uri)
                ));
                annots.push(format!("{} 0 R", objects.len()));
            }
            let annots = if annots.is_empty() {
                String::new()
            } else {
                format!(" /Annots [{}]", annots.join(" "))
            };
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] /Resources << /Font <<{} >> >> /Contents {} 0 R{} >>",
                PAGE_W, PAGE_H, fonts, content_id, annots
            ));
            kids.push(format!("{} 0 R", objects.len()));
        }
        objects[0] = "<< /Type /Catalog /Pages 2 0 R >>".to_string();
        objects[1] = format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids.join(" "), kids.len());

        let mut out = String::from("%PDF-1.4\n");
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            let _ = write!(out, "{} 0 obj\n{}\nendobj\n", i + 1, body);
        }
        let xref = out.len();
        let _ = write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for off in offsets {
            let _ = write!(out, "{:010} 00000 n \n", off);
        }
        let _ = write!(
            out,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            info_id,
            xref
        );
        out
    }
}

impl DocumentWriter for PdfWriter {
    fn paragraph(&mut self, runs: &[StyledRun]) {
        self.text_block(runs, BODY_SIZE, 0.0);
    }

    fn heading(&mut self, level: u8, text: &str) {
        let size = HEADING_SIZES[usize::from(level.clamp(1, 6)) - 1];
        self.gap(size * 0.4);
        // Keep a heading with at least one following body line.
        self.ensure(size * LEADING + BODY_SIZE * LEADING);
        let lines = wrap(&[StyledRun::new(text, RunStyle::bold())], CONTENT_W, size, false);
        self.flow(lines, MARGIN, size, false);
        self.gap(size * 0.3);
    }

    fn code_block(&mut self, code: &CodeBlock) {
        let lines = wrap(&code.runs, CONTENT_W - 6.0, CODE_SIZE, false);
        self.flow(lines, MARGIN + 3.0, CODE_SIZE, true);
        self.gap(BODY_SIZE * 0.6);
    }

    fn table(&mut self, table: &Table) {
        let columns = table.columns.max(1);
        let col_w = CONTENT_W / columns as f32;
        let lh = TABLE_SIZE * LEADING;
        for row in &table.rows {
            let cells: Vec<Vec<Vec<Fragment>>> = row
                .iter()
                .map(|cell| wrap(&cell.runs, col_w - 2.0 * CELL_PAD, TABLE_SIZE, cell.header))
                .collect();
            let tallest = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
            let height = tallest as f32 * lh + 2.0 * CELL_PAD;
            self.ensure(height);

            let top = self.y;
            for (i, lines) in cells.into_iter().enumerate() {
                let x = MARGIN + i as f32 * col_w;
                let _ = writeln!(
                    self.page().content,
                    "0.6 G 0.5 w {:.2} {:.2} {:.2} {:.2} re S",
                    x,
                    top - height,
                    col_w,
                    height
                );
                for (n, line) in lines.iter().enumerate() {
                    let baseline = top - CELL_PAD - n as f32 * lh - TABLE_SIZE;
                    self.draw_line(line, x + CELL_PAD, baseline, TABLE_SIZE);
                }
            }
            self.y -= height;
        }
        self.gap(BODY_SIZE * 0.6);
    }

    fn math(&mut self, math: &MathBlock) {
        let text = match &math.content {
            MathContent::Linear(t) | MathContent::Fallback(t) => t.as_str(),
            MathContent::Omml(_) => math.source.as_str(),
        };
        self.text_block(&[StyledRun::new(text, RunStyle::italic())], BODY_SIZE, 36.0);
    }

    fn image(&mut self, image: &Image, _data: Option<LoadedImage>) {
        let text = image_placeholder(image);
        self.text_block(&[StyledRun::new(text, RunStyle::italic())], BODY_SIZE, 0.0);
    }

    fn hyperlink(&mut self, text: &str, url: &str) {
        self.text_block(&[StyledRun::plain(text).with_href(url)], BODY_SIZE, 0.0);
    }

    fn list(&mut self, list: &List) {
        let mut counters: Vec<u32> = Vec::new();
        for item in &list.items {
            let level = item.level as usize;
            counters.truncate(level + 1);
            counters.resize(level + 1, 0);
            counters[level] += 1;

            let marker = if item.ordered {
                format!("{}. ", counters[level])
            } else {
                "\u{2022} ".to_string()
            };
            let indent = 18.0 * (level as f32 + 1.0);
            let mut runs = vec![StyledRun::plain(marker)];
            runs.extend(item.runs.iter().cloned());
            let lines = wrap(&runs, CONTENT_W - indent, BODY_SIZE, false);
            self.flow(lines, MARGIN + indent, BODY_SIZE, false);
        }
        self.gap(BODY_SIZE * 0.5);
    }

    fn finish(self) -> Result<Vec<u8>> {
        Ok(self.serialize().into_bytes())
    }
}
