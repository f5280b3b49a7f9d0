//! Document Model Adapter: turns an [`OutputDocument`] into container bytes.
//!
//! Each target implements [`DocumentWriter`]; [`render`] walks the blocks once
//! and makes one structural call per block.

pub mod docx;
pub mod image;
pub mod pdf;
pub mod pptx;
pub mod xml;

use log::{info, warn};

use crate::error::Result;
use crate::model::{Block, CodeBlock, Image, List, MathBlock, OutputDocument, StyledRun, Table, TargetFormat};
use crate::options::ConvertOptions;

use self::image::LoadedImage;

/// Resolves an image `src` to its bytes. Fetching is the caller's business.
pub trait ImageSource {
    fn load(&self, src: &str) -> Option<Vec<u8>>;
}

/// Resolves nothing; every image becomes a placeholder.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImages;

impl ImageSource for NoImages {
    fn load(&self, _src: &str) -> Option<Vec<u8>> {
        None
    }
}

/// Structural writes a container format must accept.
pub trait DocumentWriter {
    fn paragraph(&mut self, runs: &[StyledRun]);
    fn heading(&mut self, level: u8, text: &str);
    fn code_block(&mut self, code: &CodeBlock);
    fn table(&mut self, table: &Table);
    fn math(&mut self, math: &MathBlock);
    /// `data` is `None` when the source could not be resolved or decoded.
    fn image(&mut self, image: &Image, data: Option<LoadedImage>);
    fn hyperlink(&mut self, text: &str, url: &str);
    fn list(&mut self, list: &List);

    fn finish(self) -> Result<Vec<u8>>
    where
        Self: Sized;
}

/// Text shown where an image could not be embedded.
pub fn image_placeholder(image: &Image) -> String {
    format!("[Image: {}]", image.alt.as_deref().unwrap_or(&image.src))
}

fn load_image(image: &Image, images: &dyn ImageSource) -> Option<LoadedImage> {
    let Some(bytes) = images.load(&image.src) else {
        warn!("image not found: {}", image.src);
        return None;
    };
    let loaded = self::image::sniff(bytes);
    if loaded.is_none() {
        warn!("unsupported image format: {}", image.src);
    }
    loaded
}

/// Feeds every block to `writer` in order, then serializes.
pub fn write_blocks<W: DocumentWriter>(
    mut writer: W,
    doc: &OutputDocument,
    images: &dyn ImageSource,
) -> Result<Vec<u8>> {
    for block in doc.blocks() {
        match block {
            Block::Paragraph(runs) => writer.paragraph(runs),
            Block::Heading { level, text } => writer.heading(*level, text),
            Block::CodeBlock(code) => writer.code_block(code),
            Block::Table(table) => {
                if table.columns == 0 {
                    warn!("skipping table whose first row has no cells");
                    continue;
                }
                writer.table(table)
            }
            Block::Math(math) => writer.math(math),
            Block::Image(image) => {
                let data = load_image(image, images);
                writer.image(image, data)
            }
            Block::Hyperlink { text, url } => writer.hyperlink(text, url),
            Block::List(list) => writer.list(list),
        }
    }
    writer.finish()
}

/// Serializes `doc` for its target format.
pub fn render(doc: &OutputDocument, options: &ConvertOptions, images: &dyn ImageSource) -> Result<Vec<u8>> {
    let title = options.title.as_deref().or(doc.title());
    let bytes = match doc.target() {
        TargetFormat::Docx => write_blocks(docx::DocxWriter::new(title), doc, images)?,
        TargetFormat::Pptx => write_blocks(pptx::PptxWriter::new(title), doc, images)?,
        TargetFormat::Pdf => write_blocks(pdf::PdfWriter::new(title), doc, images)?,
    };
    info!(
        "wrote {} bytes of {} from {} blocks",
        bytes.len(),
        doc.target().extension(),
        doc.len()
    );
    Ok(bytes)
}
