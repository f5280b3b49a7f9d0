//! HTML string → owned [`SourceNode`] tree.
//!
//! Error recovery is entirely html5ever's; this module only copies the `body`
//! subtree out of the rcdom into plain owned nodes so the rest of the pipeline
//! never touches `Rc`/`RefCell`.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Tag of the synthetic root.
pub const DOCUMENT_TAG: &str = "#document";
/// Tag of anonymous text nodes.
pub const TEXT_TAG: &str = "#text";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceNode {
    /// Lower-case element name, or [`TEXT_TAG`] / [`DOCUMENT_TAG`].
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<SourceNode>,
    /// Own text; empty for elements.
    pub text: String,
}

impl SourceNode {
    pub fn element(tag: impl Into<String>, attributes: Vec<(String, String)>, children: Vec<SourceNode>) -> Self {
        Self {
            tag: tag.into(),
            attributes,
            children,
            text: String::new(),
        }
    }

    pub fn text_node(text: impl Into<String>) -> Self {
        Self {
            tag: TEXT_TAG.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
            text: text.into(),
        }
    }

    pub fn is_text(&self) -> bool {
        self.tag == TEXT_TAG
    }

    pub fn is_element(&self) -> bool {
        self.tag != TEXT_TAG && self.tag != DOCUMENT_TAG
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c.eq_ignore_ascii_case(class))
    }

    pub fn element_children(&self) -> impl Iterator<Item = &SourceNode> {
        self.children.iter().filter(|c| c.is_element())
    }

    /// All descendant text in document order, whitespace untouched.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(node: &SourceNode, out: &mut String) {
    if node.is_text() {
        out.push_str(&node.text);
        return;
    }
    for c in &node.children {
        collect_text(c, out);
    }
}

/// Elements whose content is never document text.
fn is_drop_content_tag(lower: &str) -> bool {
    matches!(
        lower,
        "script" | "style" | "noscript" | "template" | "iframe" | "object" | "embed" | "head"
    )
}

fn html5_parse(input: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(input)
}

fn tag_lower(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.to_string().to_ascii_lowercase()),
        _ => None,
    }
}

fn attrs_vec(node: &Handle) -> Vec<(String, String)> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .map(|a| (a.name.local.to_string().to_ascii_lowercase(), a.value.to_string()))
            .collect(),
        _ => Vec::new(),
    }
}

fn find_body(node: &Handle) -> Option<Handle> {
    if tag_lower(node).as_deref() == Some("body") {
        return Some(node.clone());
    }
    for c in node.children.borrow().iter() {
        if let Some(body) = find_body(c) {
            return Some(body);
        }
    }
    None
}

fn to_owned_node(node: &Handle) -> Option<SourceNode> {
    match &node.data {
        NodeData::Text { contents } => Some(SourceNode::text_node(contents.borrow().to_string())),
        NodeData::Element { .. } => {
            let tag = tag_lower(node)?;
            if is_drop_content_tag(&tag) {
                return None;
            }
            let children = to_owned_children(node);
            Some(SourceNode::element(tag, attrs_vec(node), children))
        }
        NodeData::Document
        | NodeData::Doctype { .. }
        | NodeData::Comment { .. }
        | NodeData::ProcessingInstruction { .. } => None,
    }
}

fn to_owned_children(node: &Handle) -> Vec<SourceNode> {
    node.children
        .borrow()
        .iter()
        .filter_map(to_owned_node)
        .collect()
}

/// Parses `html` (fragment or full document) and returns a [`DOCUMENT_TAG`] root
/// whose children are the `body` children. Never fails.
pub fn parse(html: &str) -> SourceNode {
    let wrapped = if html.to_ascii_lowercase().contains("<html") {
        html.to_string()
    } else {
        format!(
            "<!doctype html><html><head><meta charset=\"utf-8\"></head><body>{}</body></html>",
            html
        )
    };

    let dom = html5_parse(&wrapped);
    let children = match find_body(&dom.document) {
        Some(body) => to_owned_children(&body),
        None => to_owned_children(&dom.document),
    };

    SourceNode {
        tag: DOCUMENT_TAG.to_string(),
        attributes: Vec::new(),
        children,
        text: String::new(),
    }
}
