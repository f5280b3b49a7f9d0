use thiserror::Error;

/// Hard failures: the container could not be produced.
///
/// Everything that goes wrong before serialization degrades locally instead of
/// surfacing here.
#[derive(Debug, Error)]
pub enum Error {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("write error: {0}")]
    Io(#[from] std::io::Error),
    #[error("xml error: {0}")]
    Xml(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Why a LaTeX expression could not be turned into math markup.
///
/// Always recovered by emitting the bracketed fallback text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("empty expression")]
    Empty,
    #[error("unbalanced braces")]
    UnbalancedBraces,
    #[error("latex: {0}")]
    Latex(String),
    #[error("parse error: unsupported LaTeX command or token")]
    Unsupported,
    #[error("mathml: {0}")]
    MathMl(String),
}
