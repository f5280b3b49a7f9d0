//! Math Translator: LaTeX → MathML → OMML (DOCX) or linear text (PPTX, PDF).
//!
//! Failures never leave this module: they become `[Math: <source>]`.

pub mod mathml;
pub mod omml;
pub mod tex;

use std::collections::HashMap;
use std::sync::Mutex;

use lazy_static::lazy_static;
use log::{debug, warn};

use crate::error::MathError;
use crate::model::{MathBlock, MathContent, TargetFormat};

const CACHE_LIMIT: usize = 1024;

/// What a target can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Rendering {
    Omml,
    Linear,
}

impl From<TargetFormat> for Rendering {
    fn from(target: TargetFormat) -> Self {
        match target {
            TargetFormat::Docx => Rendering::Omml,
            TargetFormat::Pptx | TargetFormat::Pdf => Rendering::Linear,
        }
    }
}

lazy_static! {
    static ref TRANSLATIONS: Mutex<HashMap<(String, Rendering), Result<String, MathError>>> =
        Mutex::new(HashMap::new());
}

/// Literal text used when a formula cannot be translated.
pub fn fallback_text(source: &str) -> String {
    format!("[Math: {}]", source)
}

/// Translates a display formula for `target`.
pub fn translate(source: &str, target: TargetFormat) -> MathBlock {
    let rendering = Rendering::from(target);
    let latex = tex::normalize_latex(source);

    let content = match cached(&latex, rendering) {
        Ok(markup) => match rendering {
            Rendering::Omml => MathContent::Omml(markup),
            Rendering::Linear => MathContent::Linear(markup),
        },
        Err(e) => {
            warn!("math fallback for {:?}: {}", source, e);
            MathContent::Fallback(fallback_text(source))
        }
    };

    MathBlock {
        source: source.to_string(),
        content,
    }
}

fn cached(latex: &str, rendering: Rendering) -> Result<String, MathError> {
    let key = (latex.to_string(), rendering);
    {
        let cache = TRANSLATIONS.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(hit) = cache.get(&key) {
            debug!("math cache hit");
            return hit.clone();
        }
    }

    let result = render(latex, rendering);

    let mut cache = TRANSLATIONS.lock().unwrap_or_else(|p| p.into_inner());
    if cache.len() >= CACHE_LIMIT {
        cache.clear();
    }
    cache.insert(key, result.clone());
    result
}

fn render(latex: &str, rendering: Rendering) -> Result<String, MathError> {
    let mathml = tex::tex_to_mathml(latex, true)?;
    let root = mathml::parse_mathml(&mathml)?;
    if root.is_blank() {
        return Err(MathError::Unsupported);
    }
    Ok(match rendering {
        Rendering::Omml => omml::to_omml_para(&root),
        Rendering::Linear => mathml::linearize(&root),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn docx_gets_omml() {
        let block = translate("E=mc^2", TargetFormat::Docx);
        assert_eq!(block.source, "E=mc^2");
        match block.content {
            MathContent::Omml(xml) => {
                assert!(xml.starts_with("<m:oMathPara>"));
                assert!(xml.contains("<m:sSup>"));
            }
            other => panic!("expected OMML, got {:?}", other),
        }
    }

    #[test]
    fn other_targets_get_linear_text() {
        let block = translate("E=mc^2", TargetFormat::Pdf);
        assert_eq!(block.content, MathContent::Linear("E=mc^2".to_string()));
        // Served from the cache the second time; same answer.
        assert_eq!(translate("E=mc^2", TargetFormat::Pptx).content, block.content);
    }

    #[test]
    fn malformed_latex_falls_back_to_the_literal_source() {
        let source = "\\frac{a}{b";
        let block = translate(source, TargetFormat::Docx);
        assert_eq!(block.content, MathContent::Fallback("[Math: \\frac{a}{b]".to_string()));
        assert!(block.content.is_fallback());
    }

    #[test]
    fn blank_formula_falls_back() {
        assert!(translate("   ", TargetFormat::Docx).content.is_fallback());
    }
}
