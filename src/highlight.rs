//! Regex token lexers for the languages we color.
//!
//! Each lexer is one alternation of named groups compiled once; the group that
//! matched decides the token kind. Gaps between matches are plain text.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::model::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Plain,
    Keyword,
    String,
    Comment,
    Number,
    Literal,
}

impl TokenKind {
    /// Light-background palette.
    pub fn color(self) -> Option<Color> {
        match self {
            TokenKind::Plain => None,
            TokenKind::Keyword => Some(Color::rgb(0x00, 0x00, 0xC0)),
            TokenKind::String => Some(Color::rgb(0xA3, 0x15, 0x15)),
            TokenKind::Comment => Some(Color::rgb(0x00, 0x80, 0x00)),
            TokenKind::Number => Some(Color::rgb(0x09, 0x86, 0x58)),
            TokenKind::Literal => Some(Color::rgb(0x79, 0x5E, 0x26)),
        }
    }
}

const KINDS: [(&str, TokenKind); 5] = [
    ("comment", TokenKind::Comment),
    ("string", TokenKind::String),
    ("keyword", TokenKind::Keyword),
    ("literal", TokenKind::Literal),
    ("number", TokenKind::Number),
];

/// Never matches; stands in for a token class a language does not have.
const NOTHING: &str = r"[^\s\S]";

fn words(list: &str) -> String {
    let alternatives: Vec<&str> = list.split_whitespace().collect();
    if alternatives.is_empty() {
        return NOTHING.to_string();
    }
    format!(r"\b(?:{})\b", alternatives.join("|"))
}

fn lexer(comment: &str, string: &str, keywords: &str, literals: &str) -> Regex {
    let pattern = format!(
        r"(?P<comment>{})|(?P<string>{})|(?P<keyword>{})|(?P<literal>{})|(?P<number>\b(?:0[xX][0-9a-fA-F_]+|\d[\d_]*(?:\.\d+)?(?:[eE][+-]?\d+)?)\b)",
        comment,
        string,
        words(keywords),
        words(literals)
    );
    Regex::new(&pattern).unwrap()
}

const C_STRINGS: &str = r#""(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*'"#;
const C_COMMENTS: &str = r"//[^\n]*|/\*[\s\S]*?\*/";

lazy_static! {
    static ref LEXERS: HashMap<&'static str, Regex> = {
        let mut m = HashMap::new();
        m.insert(
            "python",
            lexer(
                r"#[^\n]*",
                r#"(?:[rRbBuUfF]{0,2})(?:"""[\s\S]*?"""|'''[\s\S]*?'''|"(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*')"#,
                "and as assert async await break class continue def del elif else except finally for from global if import in is lambda nonlocal not or pass raise return try while with yield match case",
                "True False None self",
            ),
        );
        m.insert(
            "rust",
            lexer(
                C_COMMENTS,
                r#"b?"(?:[^"\\]|\\.)*"|b?'(?:[^'\\\n]|\\.)'"#,
                "as async await break const continue crate dyn else enum extern fn for if impl in let loop match mod move mut pub ref return static struct super trait type unsafe use where while",
                "true false self Self None Some Ok Err",
            ),
        );
        m.insert(
            "javascript",
            lexer(
                C_COMMENTS,
                r#""(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*'|`(?:[^`\\]|\\.)*`"#,
                "async await break case catch class const continue debugger default delete do else export extends finally for from function if import in instanceof interface let new of return static switch throw try type typeof var void while with yield enum implements private protected public readonly",
                "true false null undefined this NaN Infinity",
            ),
        );
        m.insert(
            "json",
            lexer(NOTHING, r#""(?:[^"\\\n]|\\.)*""#, "", "true false null"),
        );
        m.insert(
            "bash",
            lexer(
                r"#[^\n]*",
                r#""(?:[^"\\]|\\.)*"|'[^']*'"#,
                "if then else elif fi for while until do done case esac function in return local export select",
                "true false",
            ),
        );
        m.insert(
            "c",
            lexer(
                C_COMMENTS,
                C_STRINGS,
                "auto break case catch char class const continue default delete do double else enum extern final float for func go goto if implements import int interface long namespace new package private protected public return short signed sizeof static struct switch template this throw try typedef union unsigned using var virtual void volatile while defer chan select range map type",
                "true false null nullptr NULL nil",
            ),
        );
        m
    };
}

/// Maps a declared language onto one of our lexers.
pub fn canonical_language(lang: &str) -> Option<&'static str> {
    let l = lang.trim().to_ascii_lowercase();
    let name = match l.as_str() {
        "python" | "py" | "python3" => "python",
        "rust" | "rs" => "rust",
        "javascript" | "js" | "jsx" | "typescript" | "ts" | "tsx" | "mjs" => "javascript",
        "json" | "jsonc" => "json",
        "bash" | "sh" | "shell" | "zsh" | "console" => "bash",
        "c" | "h" | "cpp" | "c++" | "cc" | "hpp" | "cxx" | "java" | "go" | "golang" | "cs" | "csharp" | "kotlin" | "swift" => "c",
        _ => return None,
    };
    Some(name)
}

/// Splits `code` into consecutive tokens covering it exactly, or `None` for an
/// unsupported language.
pub fn tokenize(code: &str, lang: &str) -> Option<Vec<(TokenKind, String)>> {
    let lexer = LEXERS.get(canonical_language(lang)?)?;
    let mut tokens: Vec<(TokenKind, String)> = Vec::new();
    let mut push = |kind: TokenKind, text: &str| {
        if text.is_empty() {
            return;
        }
        match tokens.last_mut() {
            Some((k, t)) if *k == kind => t.push_str(text),
            _ => tokens.push((kind, text.to_string())),
        }
    };

    let mut last = 0usize;
    for caps in lexer.captures_iter(code) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.as_str().is_empty() {
            continue;
        }
        push(TokenKind::Plain, &code[last..whole.start()]);
        let kind = KINDS
            .iter()
            .find(|(group, _)| caps.name(group).is_some())
            .map(|(_, k)| *k)
            .unwrap_or(TokenKind::Plain);
        push(kind, whole.as_str());
        last = whole.end();
    }
    push(TokenKind::Plain, &code[last..]);
    Some(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(code: &str, lang: &str) -> Vec<(TokenKind, String)> {
        tokenize(code, lang).unwrap()
    }

    #[test]
    fn python_tokens() {
        let t = kinds("def f(x):\n    return 42  # answer\n", "python");
        assert_eq!(t[0], (TokenKind::Keyword, "def".to_string()));
        assert!(t.contains(&(TokenKind::Number, "42".to_string())));
        assert!(t.contains(&(TokenKind::Comment, "# answer".to_string())));
        let joined: String = t.iter().map(|(_, s)| s.as_str()).collect();
        assert_eq!(joined, "def f(x):\n    return 42  # answer\n");
    }

    #[test]
    fn strings_hide_keywords_and_comments() {
        let t = kinds(r#"let s = "fn // not a comment";"#, "rust");
        assert!(t.contains(&(TokenKind::String, r#""fn // not a comment""#.to_string())));
        assert!(!t.iter().any(|(k, _)| *k == TokenKind::Comment));
    }

    #[test]
    fn aliases_and_unknown_languages() {
        assert_eq!(canonical_language("TS"), Some("javascript"));
        assert_eq!(canonical_language("c++"), Some("c"));
        assert!(tokenize("x", "brainfuck").is_none());
    }

    #[test]
    fn json_literals() {
        let t = kinds(r#"{"a": true, "b": 1.5e3}"#, "json");
        assert!(t.contains(&(TokenKind::Literal, "true".to_string())));
        assert!(t.contains(&(TokenKind::Number, "1.5e3".to_string())));
    }
}
