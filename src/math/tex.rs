use latex2mathml::{latex_to_mathml, DisplayStyle};

use crate::error::MathError;

/// Cleans up LaTeX that was copied out of rendered pages.
pub fn normalize_latex(latex: &str) -> String {
    let mut s = latex.trim().to_string();
    // Zero-width characters sneak into copied identifiers.
    s.retain(|c| {
        !matches!(
            c,
            '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}'
        )
    });
    s = s.replace('\u{00A0}', " ");
    // Double vertical bar (norm).
    s = s.replace('\u{2016}', "||");
    // PUA glyph some sites use for "not equals".
    s = s.replace('\u{E020}', "\\neq ");
    s.replace('\u{2297}', "\\otimes ")
        .replace('\u{03F5}', "\\epsilon ")
        .replace('\u{03D5}', "\\phi ")
        .replace('\u{2192}', "\\to ")
        .replace('\u{2260}', "\\neq ")
        .replace('\u{2264}', "\\leq ")
        .replace('\u{2265}', "\\geq ")
        .replace('\u{00D7}', "\\times ")
        .replace('\u{27E8}', "\\langle ")
        .replace('\u{27E9}', "\\rangle ")
        .trim()
        .to_string()
}

/// True when every unescaped `{` has a matching `}`.
pub fn braces_balanced(latex: &str) -> bool {
    let mut depth = 0i32;
    let mut escaped = false;
    for ch in latex.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

const PARSE_ERROR_OPEN: &str = "<mtext>[PARSE ERROR:";

/// Drops the `<mtext>[PARSE ERROR: ..]</mtext>` nodes latex2mathml emits for
/// commands it does not know. `Unsupported` when a marker is left unclosed or
/// nothing but markers was produced.
fn drop_parse_errors(mathml: &str) -> Result<String, MathError> {
    let mut kept = String::with_capacity(mathml.len());
    let mut rest = mathml;
    let mut dropped = false;
    while let Some(at) = rest.find(PARSE_ERROR_OPEN) {
        kept.push_str(&rest[..at]);
        let tail = &rest[at..];
        let close = tail.find("</mtext>").ok_or(MathError::Unsupported)?;
        rest = &tail[close + "</mtext>".len()..];
        dropped = true;
    }
    kept.push_str(rest);
    if dropped && !has_content(&kept) {
        return Err(MathError::Unsupported);
    }
    Ok(kept)
}

/// True when some token element survives.
fn has_content(mathml: &str) -> bool {
    ["<mi", "<mn", "<mo", "<mtext", "<ms>"]
        .iter()
        .any(|tag| mathml.contains(tag))
}

/// LaTeX → MathML string. Input should already be normalized.
pub fn tex_to_mathml(latex: &str, display: bool) -> Result<String, MathError> {
    if latex.trim().is_empty() {
        return Err(MathError::Empty);
    }
    if !braces_balanced(latex) {
        return Err(MathError::UnbalancedBraces);
    }

    let style = if display {
        DisplayStyle::Block
    } else {
        DisplayStyle::Inline
    };

    let mathml = latex_to_mathml(latex, style).map_err(|e| MathError::Latex(e.to_string()))?;
    drop_parse_errors(&mathml)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_commands_are_dropped_from_the_mathml() {
        let out = tex_to_mathml("\\mathcal{Z}_{ij}", false).unwrap();
        assert!(!out.contains("PARSE ERROR"));
        assert!(out.contains("<mi>Z</mi>"));
    }

    #[test]
    fn parse_error_markers_alone_are_unsupported() {
        let only_errors = "<math><mrow><mtext>[PARSE ERROR: x]</mtext></mrow></math>";
        assert_eq!(drop_parse_errors(only_errors), Err(MathError::Unsupported));
        let unclosed = "<math><mi>a</mi><mtext>[PARSE ERROR: x</math>";
        assert_eq!(drop_parse_errors(unclosed), Err(MathError::Unsupported));
        let mixed = "<math><mtext>[PARSE ERROR: y]</mtext><mi>b</mi></math>";
        assert_eq!(drop_parse_errors(mixed).unwrap(), "<math><mi>b</mi></math>");
    }

    #[test]
    fn rejects_unbalanced_braces_before_translating() {
        assert_eq!(tex_to_mathml("\\frac{a}{b", true), Err(MathError::UnbalancedBraces));
        assert_eq!(tex_to_mathml("x}", true), Err(MathError::UnbalancedBraces));
        assert!(braces_balanced("\\{ a \\} {b}"));
    }

    #[test]
    fn empty_input_is_an_error() {
        assert_eq!(tex_to_mathml("  ", true), Err(MathError::Empty));
    }

    #[test]
    fn normalizes_unicode_symbols() {
        assert_eq!(normalize_latex("a\u{200B}→b"), "a\\to b");
        assert_eq!(normalize_latex(" x ≠ y "), "x \\neq  y");
    }
}
