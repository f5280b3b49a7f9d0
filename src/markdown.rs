//! Markdown → HTML normalization.
//!
//! `$$..$$` math is found by pulldown-cmark itself, so it never fires inside
//! fenced or indented code. `\[..\]` and `\(..\)` would be eaten by backslash
//! escapes, so they are lifted to marker spans first, skipping the code ranges
//! the parser reports. Display math becomes a standalone math-marker `span`,
//! inline math an empty inline `span`; both carry the formula in `data-math`.

use std::ops::Range;

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

use crate::model::SourceKind;

/// Returns the HTML the tree parser should see. HTML input passes through untouched.
pub fn normalize(source: &str, kind: SourceKind, math_class: &str) -> String {
    match kind {
        SourceKind::Html => source.to_string(),
        SourceKind::Markdown => markdown_to_html(source, math_class),
    }
}

pub fn markdown_to_html(md: &str, math_class: &str) -> String {
    if md.trim().is_empty() {
        return String::new();
    }
    let prepared = lift_escaped_math(md, math_class);
    markdown_to_html_string(&prepared, math_class)
}

fn options() -> Options {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);
    opts.insert(Options::ENABLE_FOOTNOTES);
    opts.insert(Options::ENABLE_MATH);
    opts
}

fn markdown_to_html_string(md: &str, math_class: &str) -> String {
    let events = place_math(Parser::new_ext(md, options()), math_class);
    let mut out = String::new();
    html::push_html(&mut out, events.into_iter());
    out
}

/// Maps math events to marker spans. Display math inside a paragraph splits it,
/// so the span lands between two paragraphs; empty halves are dropped. Single
/// `$` math is not recognized and goes back to plain text.
fn place_math<'a>(parser: impl Iterator<Item = Event<'a>>, class: &str) -> Vec<Event<'a>> {
    let mut events: Vec<Event<'a>> = Vec::new();
    let mut in_paragraph = false;
    for event in parser {
        match event {
            Event::InlineMath(latex) => events.push(Event::Text(CowStr::from(format!("${}$", latex)))),
            Event::DisplayMath(latex) if in_paragraph => {
                if matches!(events.last(), Some(Event::Start(Tag::Paragraph))) {
                    events.pop();
                } else {
                    events.push(Event::End(TagEnd::Paragraph));
                }
                events.push(Event::Html(CowStr::from(display_math(class, &latex))));
                events.push(Event::Start(Tag::Paragraph));
            }
            Event::DisplayMath(latex) => events.push(Event::InlineHtml(CowStr::from(inline_math(class, &latex)))),
            Event::Start(Tag::Paragraph) => {
                in_paragraph = true;
                events.push(event);
            }
            Event::End(TagEnd::Paragraph) => {
                in_paragraph = false;
                if matches!(events.last(), Some(Event::Start(Tag::Paragraph))) {
                    events.pop();
                } else {
                    events.push(event);
                }
            }
            other => events.push(other),
        }
    }
    events
}

fn esc_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' | '\r' => out.push(' '),
            _ => out.push(ch),
        }
    }
    out
}

fn display_math(class: &str, latex: &str) -> String {
    format!(
        "\n<span class=\"{class}\" data-math=\"{}\">\n</span>\n",
        esc_attr(latex.trim())
    )
}

fn inline_math(class: &str, latex: &str) -> String {
    format!(
        "<span class=\"{class}\" data-math=\"{}\"></span>",
        esc_attr(latex.trim())
    )
}

const ESCAPED_DELIMITERS: [(&str, &str, bool); 2] = [("\\[", "\\]", true), ("\\(", "\\)", false)];

/// Byte ranges of code spans, code blocks (fenced or indented) and `$` math.
fn protected_ranges(md: &str) -> Vec<Range<usize>> {
    Parser::new_ext(md, options())
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            Event::Code(_) | Event::InlineMath(_) | Event::DisplayMath(_) | Event::Start(Tag::CodeBlock(_)) => {
                Some(range)
            }
            _ => None,
        })
        .collect()
}

/// `(latex, display, consumed bytes)` when `rest` opens with an escaped delimiter
/// that closes inside it.
fn escaped_math(rest: &str) -> Option<(&str, bool, usize)> {
    ESCAPED_DELIMITERS.iter().find_map(|&(open, close, display)| {
        let body = rest.strip_prefix(open)?;
        let end = body.find(close)?;
        let inner = &body[..end];
        (!inner.trim().is_empty()).then_some((inner, display, open.len() + end + close.len()))
    })
}

/// Replaces `\[..\]` and `\(..\)` outside protected ranges with math spans.
fn lift_escaped_math(md: &str, class: &str) -> String {
    let protected = protected_ranges(md);
    let mut pending = protected.iter().peekable();
    let mut out = String::with_capacity(md.len());
    let mut i = 0usize;

    while i < md.len() {
        while pending.next_if(|r| r.end <= i).is_some() {}
        let limit = match pending.peek() {
            Some(r) if r.start <= i => {
                out.push_str(&md[i..r.end]);
                i = r.end;
                continue;
            }
            Some(r) => r.start,
            None => md.len(),
        };
        let rest = &md[i..limit];

        if let Some((latex, display, used)) = escaped_math(rest) {
            if display {
                out.push_str(&format!("\n{}\n", display_math(class, latex)));
            } else {
                out.push_str(&inline_math(class, latex));
            }
            i += used;
            continue;
        }

        let Some(ch) = rest.chars().next() else { break };
        out.push(ch);
        i += ch.len_utf8();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_input_is_untouched() {
        let html = "<p>a *b*</p>";
        assert_eq!(normalize(html, SourceKind::Html, "math"), html);
    }

    #[test]
    fn empty_markdown_yields_empty_html() {
        assert_eq!(markdown_to_html("   \n\t", "math"), "");
    }

    #[test]
    fn translates_block_and_inline_rules() {
        let html = markdown_to_html(
            "# Title\n\n###### Small\n\nSome **bold** and *italic*.\n\n- one\n- two\n\n1. first\n\n```rust\nfn main() {}\n```\n\n    indented\n",
            "math",
        );
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<h6>Small</h6>"));
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<em>italic</em>"));
        assert!(html.contains("<ul>"));
        assert!(html.contains("<ol>"));
        assert!(html.contains("language-rust"));
        assert!(html.contains("indented"));
    }

    #[test]
    fn display_math_becomes_a_standalone_block() {
        let html = markdown_to_html("Before\n\n$$a_1 * b_2$$\n\nAfter", "math");
        assert!(html.contains(r#"<span class="math" data-math="a_1 * b_2">"#));
        assert!(!html.contains("<em>"));
        assert!(!html.contains("<p><span"));
    }

    #[test]
    fn inline_math_stays_inside_the_paragraph() {
        let html = markdown_to_html(r"Euler: \(e^{i\pi}\) holds.", "math");
        assert!(html.contains(r#"<p>Euler: <span class="math" data-math="e^{i\pi}"></span> holds.</p>"#));
    }

    #[test]
    fn math_delimiters_inside_code_are_left_alone() {
        let html = markdown_to_html("`$$x$$`\n\n```\n$$y$$\n```\n", "math");
        assert!(!html.contains("data-math"));
        assert!(html.contains("$$x$$"));
    }

    #[test]
    fn tilde_fences_keep_their_dollars() {
        let html = markdown_to_html("~~~\ncost: $$x$$ and \\[y\\]\n~~~\n", "math");
        assert!(!html.contains("data-math"));
        assert!(html.contains("cost: $$x$$ and \\[y\\]"));
    }

    #[test]
    fn indented_code_stays_one_block() {
        let html = markdown_to_html("    indented $$y$$ code\n", "math");
        assert_eq!(html.matches("<pre><code>").count(), 1);
        assert!(html.contains("indented $$y$$ code"));
        assert!(!html.contains("data-math"));
    }

    #[test]
    fn display_math_splits_a_paragraph() {
        let html = markdown_to_html("cost $$x$$ more", "math");
        assert!(html.contains("<p>cost </p>"));
        assert!(html.contains(r#"<span class="math" data-math="x">"#));
        assert!(html.contains("<p> more</p>"));
    }

    #[test]
    fn single_dollars_are_plain_text() {
        let html = markdown_to_html("costs $5 or $x$ total", "math");
        assert!(!html.contains("data-math"));
        assert!(html.contains("$x$"));
    }

    #[test]
    fn keeps_non_ascii_text_intact() {
        let html = markdown_to_html("Grüße — ϕ(h,r,t)", "math");
        assert!(html.contains("Grüße — ϕ(h,r,t)"));
    }
}
