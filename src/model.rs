//! Document model produced by one conversion pass.
//!
//! Blocks are appended in document order by the dispatcher and never reordered.
//! An [`OutputDocument`] can only be filled from inside the crate; callers read it
//! and hand it to a writer exactly once.

use std::path::Path;

/// Which markup the caller handed us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Html,
    Markdown,
}

impl SourceKind {
    /// `.md` / `.markdown` files are Markdown, everything else is treated as HTML.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("md") | Some("markdown") | Some("mdown") => SourceKind::Markdown,
            _ => SourceKind::Html,
        }
    }
}

/// Container format the adapter serializes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetFormat {
    Docx,
    Pptx,
    Pdf,
}

impl TargetFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            TargetFormat::Docx => "docx",
            TargetFormat::Pptx => "pptx",
            TargetFormat::Pdf => "pdf",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            TargetFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            TargetFormat::Pptx => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
            TargetFormat::Pdf => "application/pdf",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Upper-case `RRGGBB`, the form both WordprocessingML and DrawingML expect.
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Formatting flags of a run. Flags are only ever OR'd in while walking down the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RunStyle {
    pub bold: bool,
    pub italic: bool,
    pub monospace: bool,
    pub color: Option<Color>,
}

impl RunStyle {
    pub fn is_plain(&self) -> bool {
        *self == RunStyle::default()
    }

    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Self::default()
        }
    }

    pub fn italic() -> Self {
        Self {
            italic: true,
            ..Self::default()
        }
    }

    pub fn monospace() -> Self {
        Self {
            monospace: true,
            ..Self::default()
        }
    }
}

/// A contiguous span of text sharing one formatting state.
///
/// `\n` inside `text` is a hard line break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledRun {
    pub text: String,
    pub style: RunStyle,
    pub href: Option<String>,
}

impl StyledRun {
    pub fn new(text: impl Into<String>, style: RunStyle) -> Self {
        Self {
            text: text.into(),
            style,
            href: None,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, RunStyle::default())
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }
}

/// Concatenated text of a run sequence.
pub fn runs_text(runs: &[StyledRun]) -> String {
    runs.iter().map(|r| r.text.as_str()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Raw source text, newlines preserved.
    pub text: String,
    pub language: Option<String>,
    /// True when a lexer ran over the text and `runs` carries per-token colors.
    pub highlighted: bool,
    /// Monospace runs covering `text` exactly.
    pub runs: Vec<StyledRun>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCell {
    pub runs: Vec<StyledRun>,
    pub header: bool,
}

impl TableCell {
    pub fn empty() -> Self {
        Self {
            runs: Vec::new(),
            header: false,
        }
    }

    pub fn text(&self) -> String {
        runs_text(&self.runs)
    }
}

/// A rectangular grid: every row holds exactly `columns` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub columns: usize,
    pub rows: Vec<Vec<TableCell>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MathContent {
    /// Native Office Math markup (`m:oMathPara`), DOCX only.
    Omml(String),
    /// Linear Unicode text rendered from MathML, for targets without native math.
    Linear(String),
    /// `[Math: <source>]` after a failed translation.
    Fallback(String),
}

impl MathContent {
    pub fn is_fallback(&self) -> bool {
        matches!(self, MathContent::Fallback(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathBlock {
    /// LaTeX exactly as found in the source.
    pub source: String,
    pub content: MathContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub src: String,
    pub alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    /// Nesting depth, 0 for items of the outermost list.
    pub level: u32,
    pub ordered: bool,
    pub runs: Vec<StyledRun>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    pub ordered: bool,
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(Vec<StyledRun>),
    Heading { level: u8, text: String },
    CodeBlock(CodeBlock),
    Table(Table),
    Math(MathBlock),
    Image(Image),
    Hyperlink { text: String, url: String },
    List(List),
}

/// Ordered blocks plus the metadata the writers need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDocument {
    target: TargetFormat,
    title: Option<String>,
    blocks: Vec<Block>,
}

impl OutputDocument {
    pub(crate) fn new(target: TargetFormat, title: Option<String>) -> Self {
        Self {
            target,
            title,
            blocks: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn target(&self) -> TargetFormat {
        self.target
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_kind_from_extension() {
        assert_eq!(SourceKind::from_path(Path::new("a/readme.md")), SourceKind::Markdown);
        assert_eq!(SourceKind::from_path(Path::new("NOTES.Markdown")), SourceKind::Markdown);
        assert_eq!(SourceKind::from_path(Path::new("page.html")), SourceKind::Html);
        assert_eq!(SourceKind::from_path(Path::new("noext")), SourceKind::Html);
    }

    #[test]
    fn color_hex_is_upper_case() {
        assert_eq!(Color::rgb(0, 0x11, 0xab).hex(), "0011AB");
    }

    #[test]
    fn target_metadata() {
        assert_eq!(TargetFormat::Pptx.extension(), "pptx");
        assert_eq!(TargetFormat::Pdf.mime_type(), "application/pdf");
        assert!(TargetFormat::Docx.mime_type().ends_with("wordprocessingml.document"));
    }
}
