/// Knobs for one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Language assumed for code blocks that do not declare one.
    pub default_code_language: String,
    /// Run the token lexers over code blocks.
    pub highlight_code: bool,
    /// Class marking a `span` whose content is LaTeX.
    pub math_class: String,
    /// Written to the container's document properties.
    pub title: Option<String>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            default_code_language: "python".to_string(),
            highlight_code: true,
            math_class: "math".to_string(),
            title: None,
        }
    }
}

impl ConvertOptions {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}
