//! A small owned MathML tree read with quick-xml, plus linear text rendering.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::MathError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathNode {
    /// Local element name (`mi`, `msup`, ...).
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<MathNode>,
    /// Character data of token elements.
    pub text: String,
}

impl MathNode {
    fn new(name: String, attrs: Vec<(String, String)>) -> Self {
        Self {
            name,
            attrs,
            children: Vec::new(),
            text: String::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_token(&self) -> bool {
        matches!(self.name.as_str(), "mi" | "mn" | "mo" | "mtext" | "ms")
    }

    /// No token carries any text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty() && self.children.iter().all(MathNode::is_blank)
    }
}

fn local_name(name: &[u8]) -> String {
    let local = match name.iter().position(|b| *b == b':') {
        Some(i) => &name[i + 1..],
        None => name,
    };
    String::from_utf8_lossy(local).into_owned()
}

fn element_attrs(e: &BytesStart) -> Vec<(String, String)> {
    e.attributes()
        .with_checks(false)
        .filter_map(|a| a.ok())
        .map(|a| {
            let key = local_name(a.key.as_ref());
            let value = match a.unescape_value() {
                Ok(v) => v.into_owned(),
                Err(_) => String::from_utf8_lossy(&a.value).into_owned(),
            };
            (key, value)
        })
        .collect()
}

/// Escapes `<` and `&` that cannot start markup, so operator text such as
/// `<mo><</mo>` still reads as XML.
fn repair_markup(xml: &str) -> String {
    let mut out = String::with_capacity(xml.len());
    let mut chars = xml.char_indices().peekable();
    while let Some((i, ch)) = chars.next() {
        match ch {
            '<' => {
                let next = chars.peek().map(|(_, c)| *c);
                if matches!(next, Some(c) if c.is_ascii_alphabetic() || c == '/' || c == '!' || c == '?') {
                    out.push('<');
                } else {
                    out.push_str("&lt;");
                }
            }
            '&' => {
                let rest = &xml[i + 1..];
                let is_ref = rest
                    .find(';')
                    .map(|end| {
                        let name = &rest[..end];
                        !name.is_empty()
                            && name.len() <= 32
                            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '#')
                    })
                    .unwrap_or(false);
                if is_ref {
                    out.push('&');
                } else {
                    out.push_str("&amp;");
                }
            }
            _ => out.push(ch),
        }
    }
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{00A0}'),
        "minus" => Some('\u{2212}'),
        "times" => Some('\u{00D7}'),
        "infin" => Some('\u{221E}'),
        _ if name.starts_with("#x") || name.starts_with("#X") => {
            u32::from_str_radix(&name[2..], 16).ok().and_then(char::from_u32)
        }
        _ if name.starts_with('#') => name[1..].parse::<u32>().ok().and_then(char::from_u32),
        _ => None,
    }
}

/// Lenient text unescape for entity names quick-xml does not know.
fn decode_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        match tail.find(';').and_then(|end| decode_entity(&tail[..end]).map(|c| (c, end))) {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Parses a MathML document; the result is always rooted at a `math` node.
pub fn parse_mathml(xml: &str) -> Result<MathNode, MathError> {
    let repaired = repair_markup(xml);
    let mut reader = Reader::from_str(&repaired);
    reader.trim_text(true);

    let mut stack: Vec<MathNode> = vec![MathNode::new("math".to_string(), Vec::new())];
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = local_name(e.name().as_ref());
                stack.push(MathNode::new(name, element_attrs(e)));
            }
            Ok(Event::Empty(ref e)) => {
                let node = MathNode::new(local_name(e.name().as_ref()), element_attrs(e));
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(node);
                }
            }
            Ok(Event::Text(t)) => {
                let text = match t.unescape() {
                    Ok(s) => s.into_owned(),
                    Err(_) => decode_text(&String::from_utf8_lossy(&t.into_inner())),
                };
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Ok(Event::End(_)) => {
                if stack.len() < 2 {
                    return Err(MathError::MathMl("unexpected end tag".to_string()));
                }
                if let Some(node) = stack.pop() {
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(node);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(MathError::MathMl(format!(
                    "at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
        buf.clear();
    }

    if stack.len() != 1 {
        return Err(MathError::MathMl("unclosed element".to_string()));
    }
    let mut root = stack.pop().ok_or_else(|| MathError::MathMl("empty document".to_string()))?;
    // Unwrap the synthetic root when the document had its own <math>.
    if root.children.len() == 1 && root.children[0].name == "math" {
        root = root.children.remove(0);
    }
    Ok(root)
}

/// Children that carry presentation (annotations dropped).
pub fn presentation_children(node: &MathNode) -> impl Iterator<Item = &MathNode> {
    node.children
        .iter()
        .filter(|c| !matches!(c.name.as_str(), "annotation" | "annotation-xml"))
}

/// Combining mark for an accent written over a base, if `over` is one.
pub fn accent_mark(over: &str) -> Option<char> {
    match over.trim() {
        "^" | "\u{02C6}" | "\u{0302}" => Some('\u{0302}'),
        "~" | "\u{02DC}" | "\u{0303}" => Some('\u{0303}'),
        "\u{00AF}" | "\u{02C9}" | "\u{0304}" | "\u{203E}" | "_" => Some('\u{0304}'),
        "\u{02D9}" | "\u{0307}" | "." => Some('\u{0307}'),
        "\u{00A8}" | "\u{0308}" => Some('\u{0308}'),
        "\u{2192}" | "\u{20D7}" => Some('\u{20D7}'),
        "\u{02C7}" | "\u{030C}" => Some('\u{030C}'),
        "\u{02D8}" | "\u{0306}" => Some('\u{0306}'),
        _ => None,
    }
}

/// Renders MathML as single-line Unicode text (`E=mc^2`, `(a+b)/2`, `√x`).
pub fn linearize(node: &MathNode) -> String {
    let nth = |i: usize| presentation_children(node).nth(i);
    let part = |i: usize| nth(i).map(linearize).unwrap_or_default();
    let grouped = |i: usize| nth(i).map(group).unwrap_or_default();

    match node.name.as_str() {
        "mi" | "mn" | "mo" | "mtext" | "ms" => node.text.clone(),
        "mspace" => " ".to_string(),
        "mphantom" | "annotation" | "annotation-xml" => String::new(),
        "semantics" => part(0),
        "msup" => format!("{}^{}", grouped(0), grouped(1)),
        "msub" => format!("{}_{}", grouped(0), grouped(1)),
        "msubsup" => format!("{}_{}^{}", grouped(0), grouped(1), grouped(2)),
        "mfrac" => format!("{}/{}", grouped(0), grouped(1)),
        "msqrt" => {
            let inner = concat(node);
            format!("\u{221A}{}", wrap_if_long(&inner))
        }
        "mroot" => {
            let index = part(1);
            let radix = match index.trim() {
                "3" => "\u{221B}".to_string(),
                "4" => "\u{221C}".to_string(),
                other => format!("({})\u{221A}", other),
            };
            format!("{}{}", radix, grouped(0))
        }
        "mover" => {
            let over = part(1);
            match accent_mark(&over) {
                Some(mark) => format!("{}{}", part(0), mark),
                None => format!("{}^{}", grouped(0), grouped(1)),
            }
        }
        "munder" => format!("{}_{}", grouped(0), grouped(1)),
        "munderover" => format!("{}_{}^{}", grouped(0), grouped(1), grouped(2)),
        "mfenced" => {
            let open = node.attr("open").unwrap_or("(");
            let close = node.attr("close").unwrap_or(")");
            let sep = node.attr("separators").unwrap_or(",");
            let items: Vec<String> = presentation_children(node).map(linearize).collect();
            format!("{}{}{}", open, items.join(sep.trim()), close)
        }
        "mtable" => {
            let rows: Vec<String> = presentation_children(node)
                .map(|row| {
                    presentation_children(row)
                        .map(linearize)
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .collect();
            format!("[{}]", rows.join("; "))
        }
        _ => concat(node),
    }
}

fn concat(node: &MathNode) -> String {
    let mut out = node.text.clone();
    for c in presentation_children(node) {
        out.push_str(&linearize(c));
    }
    out
}

fn wrap_if_long(s: &str) -> String {
    if s.chars().count() > 1 {
        format!("({})", s)
    } else {
        s.to_string()
    }
}

/// Operand form for scripts and fractions: tokens stay bare, compound pieces get parens.
fn group(node: &MathNode) -> String {
    let s = linearize(node);
    if node.is_token() || s.chars().count() <= 1 {
        return s;
    }
    if s.starts_with('(') && s.ends_with(')') && s.matches('(').count() == 1 {
        return s;
    }
    format!("({})", s)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMC2: &str = r#"<math xmlns="http://www.w3.org/1998/Math/MathML" display="block"><mi>E</mi><mo>=</mo><mi>m</mi><msup><mi>c</mi><mn>2</mn></msup></math>"#;

    #[test]
    fn reads_the_tree() {
        let root = parse_mathml(EMC2).unwrap();
        assert_eq!(root.name, "math");
        assert_eq!(root.attr("display"), Some("block"));
        assert_eq!(root.children.len(), 4);
        assert_eq!(root.children[3].name, "msup");
        assert_eq!(root.children[3].children[1].text, "2");
    }

    #[test]
    fn linear_rendering() {
        assert_eq!(linearize(&parse_mathml(EMC2).unwrap()), "E=mc^2");

        let frac = "<math><mfrac><mrow><mi>a</mi><mo>+</mo><mi>b</mi></mrow><mn>2</mn></mfrac></math>";
        assert_eq!(linearize(&parse_mathml(frac).unwrap()), "(a+b)/2");

        let sqrt = "<math><msqrt><mi>x</mi></msqrt><mo>+</mo><mover><mi>v</mi><mo>→</mo></mover></math>";
        assert_eq!(linearize(&parse_mathml(sqrt).unwrap()), "\u{221A}x+v\u{20D7}");

        let sum = "<math><munderover><mo>∑</mo><mrow><mi>i</mi><mo>=</mo><mn>1</mn></mrow><mi>n</mi></munderover><msub><mi>x</mi><mi>i</mi></msub></math>";
        assert_eq!(linearize(&parse_mathml(sum).unwrap()), "∑_(i=1)^nx_i");
    }

    #[test]
    fn tolerates_bare_operators_and_unknown_entities() {
        let root = parse_mathml("<math><mi>a</mi><mo><</mo><mi>b</mi><mo>&nbsp;&amp;</mo></math>").unwrap();
        assert_eq!(root.children[1].text, "<");
        assert_eq!(root.children[3].text, "\u{00A0}&");
    }

    #[test]
    fn reports_broken_markup() {
        assert!(parse_mathml("<math><mi>x</mi>").is_err());
    }

    #[test]
    fn blank_trees() {
        assert!(parse_mathml("<math><mrow></mrow></math>").unwrap().is_blank());
        assert!(!parse_mathml(EMC2).unwrap().is_blank());
    }
}
