//! Inline Run Resolver: flattens mixed inline content into ordered [`StyledRun`]s.
//!
//! Formatting state only grows on the way down (`strong` inside `em` is bold and
//! italic). Whitespace is collapsed the HTML way, edges of the paragraph are
//! trimmed and adjacent runs that ended up with identical formatting are merged.

use lazy_static::lazy_static;
use regex::Regex;

use crate::model::{Color, RunStyle, StyledRun};
use crate::tree::SourceNode;

#[derive(Debug, Clone, Default)]
struct InlineCtx {
    style: RunStyle,
    href: Option<String>,
}

/// Runs for the children of `node` (a paragraph, heading, cell, list item ...).
pub fn resolve_runs(node: &SourceNode, math_class: &str) -> Vec<StyledRun> {
    resolve_nodes(&node.children, math_class)
}

/// Same as [`resolve_runs`] for any run of sibling nodes.
pub fn resolve_nodes<'a>(
    nodes: impl IntoIterator<Item = &'a SourceNode>,
    math_class: &str,
) -> Vec<StyledRun> {
    let mut runs = Vec::new();
    let ctx = InlineCtx::default();
    for n in nodes {
        walk(n, &ctx, math_class, &mut runs);
    }
    finish_runs(runs)
}

/// Whitespace-collapsed text of `node` with formatting discarded.
pub fn plain_text(node: &SourceNode, math_class: &str) -> String {
    resolve_runs(node, math_class)
        .into_iter()
        .map(|r| r.text)
        .collect()
}

fn walk(node: &SourceNode, ctx: &InlineCtx, math_class: &str, runs: &mut Vec<StyledRun>) {
    if node.is_text() {
        push_text(runs, ctx, &node.text);
        return;
    }

    let mut inner = ctx.clone();
    if let Some(style) = node.attr("style") {
        apply_inline_style(&mut inner.style, &parse_style_attr(style));
    }

    match node.tag.as_str() {
        "br" => {
            push_break(runs, ctx);
            return;
        }
        "strong" | "b" => inner.style.bold = true,
        "em" | "i" => inner.style.italic = true,
        "code" | "kbd" | "samp" | "tt" => inner.style.monospace = true,
        "a" => {
            if let Some(href) = node.attr("href").and_then(sanitize_href) {
                inner.href = Some(href);
            }
        }
        "span" if node.has_class(math_class) => {
            let latex = math_source(node);
            push_text(runs, &inner, &latex);
            return;
        }
        "img" => {
            let label = node
                .attr("alt")
                .filter(|a| !a.trim().is_empty())
                .or_else(|| node.attr("src"))
                .unwrap_or("");
            push_text(runs, &inner, &format!("[Image: {}]", label.trim()));
            return;
        }
        _ => {}
    }

    let block = is_nested_block(&node.tag);
    if block {
        push_block_break(runs, ctx);
    }
    for c in &node.children {
        walk(c, &inner, math_class, runs);
    }
    if block {
        push_block_break(runs, ctx);
    }
}

/// Block elements met inside inline content (`<td><p>a</p><p>b</p></td>`) are
/// kept apart by a line break.
fn is_nested_block(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "div" | "li" | "ul" | "ol" | "blockquote" | "pre" | "table" | "tr"
            | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "section" | "article"
    )
}

/// LaTeX carried by a math marker: `data-math` wins over the element text.
pub fn math_source(node: &SourceNode) -> String {
    match node.attr("data-math") {
        Some(m) if !m.trim().is_empty() => m.trim().to_string(),
        _ => node.text_content().trim().to_string(),
    }
}

fn is_html_ws(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | '\x0c')
}

/// Runs of HTML whitespace (newlines included) become one space.
pub fn collapse_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_ws = false;
    for ch in s.chars() {
        if is_html_ws(ch) {
            if !in_ws {
                out.push(' ');
                in_ws = true;
            }
        } else {
            out.push(ch);
            in_ws = false;
        }
    }
    out
}

fn ends_with_space_or_break(runs: &[StyledRun]) -> bool {
    match runs.iter().rev().find(|r| !r.text.is_empty()) {
        Some(r) => r.text.ends_with(' ') || r.text.ends_with('\n'),
        None => true,
    }
}

fn push_text(runs: &mut Vec<StyledRun>, ctx: &InlineCtx, raw: &str) {
    let mut text = collapse_ws(raw);
    if text.starts_with(' ') && ends_with_space_or_break(runs) {
        text.remove(0);
    }
    if text.is_empty() {
        return;
    }
    runs.push(StyledRun {
        text,
        style: ctx.style,
        href: ctx.href.clone(),
    });
}

fn push_break(runs: &mut Vec<StyledRun>, ctx: &InlineCtx) {
    trim_trailing_spaces(runs);
    runs.push(StyledRun {
        text: "\n".to_string(),
        style: ctx.style,
        href: None,
    });
}

fn push_block_break(runs: &mut Vec<StyledRun>, ctx: &InlineCtx) {
    let at_line_start = runs
        .iter()
        .rev()
        .find(|r| !r.text.is_empty())
        .map_or(true, |r| r.text.ends_with('\n'));
    if !at_line_start {
        push_break(runs, ctx);
    }
}

fn trim_trailing_spaces(runs: &mut Vec<StyledRun>) {
    trim_trailing(runs, &[' ']);
}

fn trim_trailing(runs: &mut Vec<StyledRun>, chars: &[char]) {
    while let Some(last) = runs.last_mut() {
        let trimmed_len = last.text.trim_end_matches(chars).len();
        last.text.truncate(trimmed_len);
        if last.text.is_empty() {
            runs.pop();
        } else {
            break;
        }
    }
}

fn finish_runs(mut runs: Vec<StyledRun>) -> Vec<StyledRun> {
    trim_trailing(&mut runs, &[' ', '\n']);
    // Leading breaks carry nothing.
    while runs.first().is_some_and(|r| r.text == "\n") {
        runs.remove(0);
    }

    let mut merged: Vec<StyledRun> = Vec::with_capacity(runs.len());
    for run in runs {
        match merged.last_mut() {
            Some(prev) if prev.style == run.style && prev.href == run.href => {
                prev.text.push_str(&run.text);
            }
            _ => merged.push(run),
        }
    }
    merged
}

/// Drops empty links and script-capable schemes.
pub fn sanitize_href(href: &str) -> Option<String> {
    let h = href.trim();
    if h.is_empty() {
        return None;
    }
    let low = h.to_ascii_lowercase();
    if low.starts_with("javascript:") || low.starts_with("data:") || low.starts_with("vbscript:") {
        return None;
    }
    Some(h.to_string())
}

/// The `style` declarations we honor. Everything else in the attribute is ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineStyle {
    pub bold: bool,
    pub italic: bool,
    pub color: Option<Color>,
}

fn apply_inline_style(style: &mut RunStyle, parsed: &InlineStyle) {
    style.bold |= parsed.bold;
    style.italic |= parsed.italic;
    if parsed.color.is_some() {
        style.color = parsed.color;
    }
}

pub fn parse_style_attr(style: &str) -> InlineStyle {
    let mut out = InlineStyle::default();
    for decl in style.split(';') {
        let Some((prop, value)) = decl.split_once(':') else {
            continue;
        };
        let prop = prop.trim().to_ascii_lowercase();
        let value = value
            .trim()
            .trim_end_matches("!important")
            .trim()
            .to_ascii_lowercase();
        match prop.as_str() {
            "color" => {
                if let Some(c) = parse_color(&value) {
                    out.color = Some(c);
                }
            }
            "font-weight" => {
                out.bold = match value.as_str() {
                    "bold" | "bolder" => true,
                    v => v.parse::<u16>().map(|w| w >= 600).unwrap_or(false),
                };
            }
            "font-style" => out.italic = value == "italic" || value == "oblique",
            _ => {}
        }
    }
    out
}

lazy_static! {
    static ref RGB_FN: Regex = Regex::new(
        r"^rgba?\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*(?:,[^)]*)?\)$"
    )
    .unwrap();
}

fn parse_color(value: &str) -> Option<Color> {
    let v = value.trim();
    if let Some(hex) = v.strip_prefix('#') {
        return parse_hex_color(hex);
    }
    if let Some(caps) = RGB_FN.captures(v) {
        let channel = |i: usize| -> Option<u8> {
            let n: u16 = caps.get(i)?.as_str().parse().ok()?;
            Some(n.min(255) as u8)
        };
        return Some(Color::rgb(channel(1)?, channel(2)?, channel(3)?));
    }
    named_color(v)
}

fn parse_hex_color(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let d = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|n| n * 17);
            Some(Color::rgb(d(0)?, d(1)?, d(2)?))
        }
        6 => {
            let d = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some(Color::rgb(d(0)?, d(2)?, d(4)?))
        }
        _ => None,
    }
}

fn named_color(name: &str) -> Option<Color> {
    let c = match name {
        "black" => Color::rgb(0, 0, 0),
        "white" => Color::rgb(255, 255, 255),
        "red" => Color::rgb(255, 0, 0),
        "green" => Color::rgb(0, 128, 0),
        "lime" => Color::rgb(0, 255, 0),
        "blue" => Color::rgb(0, 0, 255),
        "navy" => Color::rgb(0, 0, 128),
        "yellow" => Color::rgb(255, 255, 0),
        "orange" => Color::rgb(255, 165, 0),
        "purple" => Color::rgb(128, 0, 128),
        "fuchsia" | "magenta" => Color::rgb(255, 0, 255),
        "aqua" | "cyan" => Color::rgb(0, 255, 255),
        "teal" => Color::rgb(0, 128, 128),
        "olive" => Color::rgb(128, 128, 0),
        "maroon" => Color::rgb(128, 0, 0),
        "silver" => Color::rgb(192, 192, 192),
        "gray" | "grey" => Color::rgb(128, 128, 128),
        _ => return None,
    };
    Some(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree;

    fn runs(html: &str) -> Vec<StyledRun> {
        let root = tree::parse(html);
        resolve_runs(&root.children[0], "math")
    }

    #[test]
    fn splits_at_formatting_boundaries() {
        let r = runs("<p>A <strong>bold</strong> word.</p>");
        assert_eq!(
            r,
            vec![
                StyledRun::plain("A "),
                StyledRun::new("bold", RunStyle::bold()),
                StyledRun::plain(" word."),
            ]
        );
    }

    #[test]
    fn flags_are_additive_along_the_ancestor_chain() {
        let r = runs("<p><strong>x <em>both</em></strong><em>only</em></p>");
        assert_eq!(r[0], StyledRun::new("x ", RunStyle::bold()));
        assert_eq!(
            r[1].style,
            RunStyle {
                bold: true,
                italic: true,
                ..RunStyle::default()
            }
        );
        assert_eq!(r[2], StyledRun::new("only", RunStyle::italic()));
    }

    #[test]
    fn unknown_tags_pass_text_through() {
        let r = runs("<p><b>a<x-thing>b</x-thing></b><code>c</code></p>");
        assert_eq!(r[0], StyledRun::new("ab", RunStyle::bold()));
        assert_eq!(r[1], StyledRun::new("c", RunStyle::monospace()));
    }

    #[test]
    fn collapses_and_trims_whitespace() {
        let r = runs("<p>\n   lots   of\n\tspace <b> here </b> end  </p>");
        assert_eq!(runs_text_of(&r), "lots of space here end");
    }

    #[test]
    fn nested_blocks_are_separated_by_breaks() {
        let root = tree::parse("<table><tr><td><p>a</p><p>b</p>c</td></tr></table>");
        let td = &root.children[0].children[0].children[0].children[0];
        assert_eq!(td.tag, "td");
        assert_eq!(runs_text_of(&resolve_runs(td, "math")), "a\nb\nc");
    }

    #[test]
    fn line_breaks_become_newlines() {
        let r = runs("<p>one <br> two</p>");
        assert_eq!(runs_text_of(&r), "one\ntwo");
    }

    #[test]
    fn links_carry_href_and_unsafe_ones_are_dropped() {
        let r = runs(r#"<p>see <a href="https://x.org">the <b>site</b></a> or <a href="javascript:alert(1)">this</a></p>"#);
        assert_eq!(r[1].text, "the ");
        assert_eq!(r[1].href.as_deref(), Some("https://x.org"));
        assert_eq!(r[2].href.as_deref(), Some("https://x.org"));
        assert!(r[2].style.bold);
        assert_eq!(r[3], StyledRun::plain(" or this"));
    }

    #[test]
    fn inline_math_keeps_its_source() {
        let r = runs(r#"<p>Euler <span class="math" data-math="e^{i\pi}"></span> ok</p>"#);
        assert_eq!(runs_text_of(&r), r"Euler e^{i\pi} ok");
    }

    #[test]
    fn style_subset_sets_color_and_weight() {
        let r = runs(r#"<p><span style="color:#f00; font-weight: 700">red</span><span style="COLOR: rgb(0, 0, 300); font-style:italic">blue</span><span style="color: teal; margin: 0">t</span></p>"#);
        assert_eq!(r[0].style.color, Some(Color::rgb(255, 0, 0)));
        assert!(r[0].style.bold);
        assert_eq!(r[1].style.color, Some(Color::rgb(0, 0, 255)));
        assert!(r[1].style.italic);
        assert_eq!(r[2].style.color, Some(Color::rgb(0, 128, 128)));
    }

    #[test]
    fn ignores_unparseable_styles() {
        let s = parse_style_attr("color: #12; font-weight: 400; text-align: center; garbage");
        assert_eq!(s, InlineStyle::default());
    }

    #[test]
    fn sanitizes_hrefs() {
        assert_eq!(sanitize_href("  https://a.b "), Some("https://a.b".to_string()));
        assert_eq!(sanitize_href("DATA:text/html,x"), None);
        assert_eq!(sanitize_href("  "), None);
    }

    fn runs_text_of(r: &[StyledRun]) -> String {
        crate::model::runs_text(r)
    }
}
