//! Code Block Renderer.

use log::{debug, warn};

use crate::highlight::{self, TokenKind};
use crate::model::{CodeBlock, RunStyle, StyledRun};
use crate::options::ConvertOptions;
use crate::tree::SourceNode;

/// Language declared on a `pre` / `code` element (`language-rust`, `lang-py`,
/// `data-lang="go"`). The `pre` itself wins over its `code` child.
pub fn declared_language(node: &SourceNode) -> Option<String> {
    fn own(node: &SourceNode) -> Option<String> {
        for class in node.classes() {
            let lower = class.to_ascii_lowercase();
            for prefix in ["language-", "lang-"] {
                if let Some(lang) = lower.strip_prefix(prefix) {
                    if !lang.is_empty() {
                        return Some(lang.to_string());
                    }
                }
            }
        }
        node.attr("data-lang")
            .or_else(|| node.attr("data-language"))
            .map(|l| l.trim().to_ascii_lowercase())
            .filter(|l| !l.is_empty())
    }

    own(node).or_else(|| node.element_children().find(|c| c.tag == "code").and_then(own))
}

fn clean_code_text(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");
    // A newline right after <pre> is not content.
    let body = unified.strip_prefix('\n').unwrap_or(&unified);
    body.trim_end().to_string()
}

fn monospace_run(text: &str) -> StyledRun {
    StyledRun::new(text, RunStyle::monospace())
}

/// Builds a code block from raw text. Never fails: unknown languages come back
/// as one unhighlighted monospace run.
pub fn render_code(raw: &str, declared: Option<&str>, options: &ConvertOptions) -> CodeBlock {
    let text = clean_code_text(raw);
    let language = declared
        .map(str::to_string)
        .unwrap_or_else(|| options.default_code_language.clone());

    if text.is_empty() {
        return CodeBlock {
            text,
            language: Some(language),
            highlighted: false,
            runs: Vec::new(),
        };
    }

    let tokens = if options.highlight_code {
        let tokens = highlight::tokenize(&text, &language);
        if tokens.is_none() {
            warn!("no highlighter for language {:?}; emitting plain code", language);
        }
        tokens
    } else {
        None
    };

    match tokens {
        Some(tokens) => {
            debug!("highlighted {} tokens of {}", tokens.len(), language);
            let runs = tokens
                .into_iter()
                .map(|(kind, t)| {
                    let mut style = RunStyle::monospace();
                    style.color = kind.color();
                    if kind == TokenKind::Keyword {
                        style.bold = true;
                    }
                    StyledRun::new(t, style)
                })
                .collect();
            CodeBlock {
                text,
                language: Some(language),
                highlighted: true,
                runs,
            }
        }
        None => CodeBlock {
            runs: vec![monospace_run(&text)],
            text,
            language: Some(language),
            highlighted: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::runs_text;
    use crate::tree;

    #[test]
    fn detects_language_on_pre_or_code() {
        let root = tree::parse(r#"<pre><code class="hljs language-Rust">fn x() {}</code></pre><pre class="lang-go"></pre><pre data-lang="SH"></pre><pre>x</pre>"#);
        let langs: Vec<Option<String>> = root.element_children().map(declared_language).collect();
        assert_eq!(
            langs,
            vec![
                Some("rust".to_string()),
                Some("go".to_string()),
                Some("sh".to_string()),
                None
            ]
        );
    }

    #[test]
    fn highlighted_runs_cover_the_text() {
        let block = render_code("\nfn main() {\n    let x = 1;\n}\n\n", Some("rust"), &ConvertOptions::default());
        assert!(block.highlighted);
        assert_eq!(block.text, "fn main() {\n    let x = 1;\n}");
        assert_eq!(runs_text(&block.runs), block.text);
        assert!(block.runs.iter().all(|r| r.style.monospace));
        assert!(block.runs[0].style.bold);
        assert!(block.runs[0].style.color.is_some());
    }

    #[test]
    fn undeclared_language_uses_the_default() {
        let block = render_code("print('hi')", None, &ConvertOptions::default());
        assert_eq!(block.language.as_deref(), Some("python"));
        assert!(block.highlighted);
    }

    #[test]
    fn unknown_language_degrades_to_plain_monospace() {
        let block = render_code("+++[>]", Some("brainfuck"), &ConvertOptions::default());
        assert!(!block.highlighted);
        assert_eq!(block.runs, vec![StyledRun::new("+++[>]", RunStyle::monospace())]);
    }

    #[test]
    fn highlighting_can_be_switched_off() {
        let opts = ConvertOptions {
            highlight_code: false,
            ..ConvertOptions::default()
        };
        let block = render_code("let x = 1;", Some("rust"), &opts);
        assert!(!block.highlighted);
        assert_eq!(block.runs.len(), 1);
    }
}
