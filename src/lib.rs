//! HTML and Markdown to DOCX, PPTX and PDF.
//!
//! [`convert`] walks the parsed source once and produces an [`OutputDocument`];
//! [`render`] hands that document to the writer for its target format.
//!
//! ```no_run
//! use office_from_html::{convert_to_bytes, ConvertOptions, SourceKind, TargetFormat};
//!
//! let bytes = convert_to_bytes("<h1>Hi</h1>", SourceKind::Html, TargetFormat::Docx, &ConvertOptions::default())?;
//! # Ok::<(), office_from_html::Error>(())
//! ```

pub mod bundle;
pub mod code;
pub mod dispatch;
pub mod error;
pub mod highlight;
pub mod inline;
pub mod markdown;
pub mod math;
pub mod model;
pub mod options;
pub mod table;
pub mod tree;
pub mod writer;

use log::{info, warn};

pub use error::{Error, MathError, Result};
pub use model::*;
pub use options::ConvertOptions;
pub use writer::{render, ImageSource, NoImages};

/// Outcome of one conversion. Blank input is a status, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    Empty,
    Document(OutputDocument),
}

impl Conversion {
    pub fn is_empty(&self) -> bool {
        matches!(self, Conversion::Empty)
    }

    pub fn document(self) -> Option<OutputDocument> {
        match self {
            Conversion::Empty => None,
            Conversion::Document(doc) => Some(doc),
        }
    }
}

/// Converts with [`ConvertOptions::default`].
pub fn convert(source: &str, kind: SourceKind, target: TargetFormat) -> Conversion {
    convert_with(source, kind, target, &ConvertOptions::default())
}

pub fn convert_with(source: &str, kind: SourceKind, target: TargetFormat, options: &ConvertOptions) -> Conversion {
    if source.trim().is_empty() {
        info!("nothing to convert: source is blank");
        return Conversion::Empty;
    }
    info!("converting {} bytes of {:?} to {}", source.len(), kind, target.extension());

    let html = markdown::normalize(source, kind, &options.math_class);
    let root = tree::parse(&html);
    let doc = dispatch::dispatch(&root, target, options);

    if doc.is_empty() {
        warn!("conversion produced no blocks");
    }
    info!("converted into {} blocks", doc.len());
    Conversion::Document(doc)
}

/// Converts and serializes in one step, without images. `None` for blank input.
pub fn convert_to_bytes(
    source: &str,
    kind: SourceKind,
    target: TargetFormat,
    options: &ConvertOptions,
) -> Result<Option<Vec<u8>>> {
    match convert_with(source, kind, target, options) {
        Conversion::Empty => Ok(None),
        Conversion::Document(doc) => render(&doc, options, &NoImages).map(Some),
    }
}

/// Converts independent sources; results keep the input order.
#[cfg(feature = "parallel")]
pub fn convert_all(inputs: &[(String, SourceKind)], target: TargetFormat, options: &ConvertOptions) -> Vec<Conversion> {
    use rayon::prelude::*;

    inputs
        .par_iter()
        .map(|(source, kind)| convert_with(source, *kind, target, options))
        .collect()
}

/// Converts independent sources; results keep the input order.
#[cfg(not(feature = "parallel"))]
pub fn convert_all(inputs: &[(String, SourceKind)], target: TargetFormat, options: &ConvertOptions) -> Vec<Conversion> {
    inputs
        .iter()
        .map(|(source, kind)| convert_with(source, *kind, target, options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_source_is_empty() {
        assert!(convert("", SourceKind::Html, TargetFormat::Docx).is_empty());
        assert!(convert(" \n\t ", SourceKind::Markdown, TargetFormat::Pdf).is_empty());
        let bytes = convert_to_bytes("  ", SourceKind::Html, TargetFormat::Pptx, &ConvertOptions::default()).unwrap();
        assert!(bytes.is_none());
    }

    #[test]
    fn markdown_and_html_agree() {
        let md = convert("# Title\n\nSome **bold** text.\n", SourceKind::Markdown, TargetFormat::Docx);
        let html = convert(
            "<h1>Title</h1><p>Some <strong>bold</strong> text.</p>",
            SourceKind::Html,
            TargetFormat::Docx,
        );
        assert_eq!(md, html);
    }

    #[test]
    fn title_comes_from_options() {
        let options = ConvertOptions::default().with_title("Report");
        let doc = convert_with("<p>x</p>", SourceKind::Html, TargetFormat::Pdf, &options)
            .document()
            .unwrap();
        assert_eq!(doc.title(), Some("Report"));
        assert_eq!(doc.target(), TargetFormat::Pdf);
    }

    #[test]
    fn batch_keeps_input_order() {
        let inputs = vec![
            ("<p>one</p>".to_string(), SourceKind::Html),
            (String::new(), SourceKind::Html),
            ("two".to_string(), SourceKind::Markdown),
        ];
        let out = convert_all(&inputs, TargetFormat::Docx, &ConvertOptions::default());
        assert_eq!(out.len(), 3);
        assert!(!out[0].is_empty());
        assert!(out[1].is_empty());
        let doc = out[2].clone().document().unwrap();
        assert_eq!(doc.blocks(), &[Block::Paragraph(vec![StyledRun::plain("two")])]);
    }

    #[test]
    fn every_target_serializes() {
        let src = "<h1>T</h1><p>x</p><table><tr><td>a</td></tr></table>";
        for target in [TargetFormat::Docx, TargetFormat::Pptx, TargetFormat::Pdf] {
            let bytes = convert_to_bytes(src, SourceKind::Html, target, &ConvertOptions::default())
                .unwrap()
                .unwrap();
            assert!(!bytes.is_empty());
        }
    }
}
