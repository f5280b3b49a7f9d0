//! Block Dispatcher: one linear pass over the top-level nodes.
//!
//! Each top-level node is classified into a [`BlockTag`] and routed to its
//! converter; the resulting block (if any) is appended to the document in order.

use log::{debug, warn};

use crate::code::{declared_language, render_code};
use crate::inline::{math_source, plain_text, resolve_nodes, resolve_runs, sanitize_href};
use crate::math;
use crate::model::{Block, Image, List, ListItem, OutputDocument, TargetFormat};
use crate::options::ConvertOptions;
use crate::table;
use crate::tree::SourceNode;

/// Closed set of block kinds recognized at the top level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTag {
    Paragraph,
    Heading(u8),
    Code,
    Pre,
    Table,
    Math,
    Image,
    Link,
    List { ordered: bool },
    Unrecognized,
}

impl BlockTag {
    pub fn classify(node: &SourceNode, math_class: &str) -> Self {
        if !node.is_element() {
            return BlockTag::Unrecognized;
        }
        match node.tag.as_str() {
            "p" => BlockTag::Paragraph,
            "h1" => BlockTag::Heading(1),
            "h2" => BlockTag::Heading(2),
            "h3" => BlockTag::Heading(3),
            "h4" => BlockTag::Heading(4),
            "h5" => BlockTag::Heading(5),
            "h6" => BlockTag::Heading(6),
            "code" => BlockTag::Code,
            "pre" => BlockTag::Pre,
            "table" => BlockTag::Table,
            "span" if node.has_class(math_class) => BlockTag::Math,
            "img" => BlockTag::Image,
            "a" => BlockTag::Link,
            "ul" => BlockTag::List { ordered: false },
            "ol" => BlockTag::List { ordered: true },
            _ => BlockTag::Unrecognized,
        }
    }
}

/// Walks the children of `root` once, in order.
pub fn dispatch(root: &SourceNode, target: TargetFormat, options: &ConvertOptions) -> OutputDocument {
    let mut doc = OutputDocument::new(target, options.title.clone());
    for node in &root.children {
        let tag = BlockTag::classify(node, &options.math_class);
        debug!("<{}> -> {:?}", node.tag, tag);
        if let Some(block) = convert_node(node, tag, target, options) {
            doc.push(block);
        }
    }
    doc
}

fn convert_node(
    node: &SourceNode,
    tag: BlockTag,
    target: TargetFormat,
    options: &ConvertOptions,
) -> Option<Block> {
    let math_class = options.math_class.as_str();
    match tag {
        BlockTag::Paragraph => Some(
            lone_image(node)
                .map(Block::Image)
                .unwrap_or_else(|| Block::Paragraph(resolve_runs(node, math_class))),
        ),
        BlockTag::Heading(level) => Some(Block::Heading {
            level,
            text: plain_text(node, math_class),
        }),
        BlockTag::Code | BlockTag::Pre => {
            let lang = declared_language(node);
            Some(Block::CodeBlock(render_code(
                &node.text_content(),
                lang.as_deref(),
                options,
            )))
        }
        BlockTag::Table => {
            let table = table::reconstruct(node, math_class);
            if table.is_none() {
                debug!("omitting table without rows");
            }
            table.map(Block::Table)
        }
        BlockTag::Math => Some(Block::Math(math::translate(&math_source(node), target))),
        BlockTag::Image => {
            let image = image_of(node);
            if image.is_none() {
                warn!("skipping <img> without src");
            }
            image.map(Block::Image)
        }
        BlockTag::Link => Some(link_block(node, math_class)),
        BlockTag::List { ordered } => {
            let mut items = Vec::new();
            collect_items(node, ordered, 0, math_class, &mut items);
            if items.is_empty() {
                debug!("omitting list without items");
                return None;
            }
            Some(Block::List(List { ordered, items }))
        }
        BlockTag::Unrecognized => {
            if node.is_element() && !node.text_content().trim().is_empty() {
                warn!("ignoring unrecognized top-level <{}>", node.tag);
            }
            None
        }
    }
}

fn image_of(node: &SourceNode) -> Option<Image> {
    let src = node.attr("src").map(str::trim).filter(|s| !s.is_empty())?;
    Some(Image {
        src: src.to_string(),
        alt: node
            .attr("alt")
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string),
    })
}

/// `<p><img ...></p>` is how Markdown spells a standalone image.
fn lone_image(p: &SourceNode) -> Option<Image> {
    let mut found = None;
    for child in &p.children {
        if child.is_text() {
            if !child.text.trim().is_empty() {
                return None;
            }
        } else if child.tag == "img" && found.is_none() {
            found = Some(child);
        } else {
            return None;
        }
    }
    found.and_then(image_of)
}

fn link_block(node: &SourceNode, math_class: &str) -> Block {
    match node.attr("href").and_then(sanitize_href) {
        Some(url) => {
            let text = plain_text(node, math_class);
            let text = if text.is_empty() { url.clone() } else { text };
            Block::Hyperlink { text, url }
        }
        None => {
            warn!("dropping unsafe or missing link target; keeping the text");
            Block::Paragraph(resolve_runs(node, math_class))
        }
    }
}

fn collect_items(
    list: &SourceNode,
    ordered: bool,
    level: u32,
    math_class: &str,
    out: &mut Vec<ListItem>,
) {
    for li in list.element_children().filter(|c| c.tag == "li") {
        let (nested, inline): (Vec<&SourceNode>, Vec<&SourceNode>) = li
            .children
            .iter()
            .partition(|c| c.tag == "ul" || c.tag == "ol");
        out.push(ListItem {
            level,
            ordered,
            runs: resolve_nodes(inline, math_class),
        });
        for sub in nested {
            collect_items(sub, sub.tag == "ol", level + 1, math_class, out);
        }
    }
}
