//! Code block extraction and parsing.

/// Programming language of a code block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Language {
    Python,
    Latex,
    Matlab,
    Bash,
    Json,
    Yaml,
    Toml,
    Rust,
    Markdown,
    /// Language tag not recognized; kept verbatim (lowercased)
    Other(String),
    /// No language tag
    #[default]
    Plain,
}

impl Language {
    /// Parse language from code fence info string.
    pub fn from_info(info: &str) -> Self {
        let lang = info.split_whitespace().next().unwrap_or("");
        match lang.to_lowercase().as_str() {
            "" | "text" | "txt" | "plain" => Self::Plain,
            "py" | "python" | "python3" => Self::Python,
            "tex" | "latex" => Self::Latex,
            "matlab" | "octave" => Self::Matlab,
            "bash" | "sh" | "shell" | "zsh" | "console" => Self::Bash,
            "json" => Self::Json,
            "yaml" | "yml" => Self::Yaml,
            "toml" => Self::Toml,
            "rust" | "rs" => Self::Rust,
            "md" | "markdown" | "mdx" => Self::Markdown,
            other => Self::Other(other.to_string()),
        }
    }

    /// Highlighter identifier, `None` for plain text.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Python => Some("python"),
            Self::Latex => Some("latex"),
            Self::Matlab => Some("matlab"),
            Self::Bash => Some("bash"),
            Self::Json => Some("json"),
            Self::Yaml => Some("yaml"),
            Self::Toml => Some("toml"),
            Self::Rust => Some("rust"),
            Self::Markdown => Some("markdown"),
            Self::Other(name) => Some(name),
            Self::Plain => None,
        }
    }
}

/// A parsed code block from a document.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock {
    /// Unique identifier for this block (format: block-{line_number})
    pub id: String,

    /// Programming language
    pub language: Language,

    /// Source code content
    pub source: String,

    /// Line number where the block starts (1-indexed)
    pub line_number: usize,

    /// Optional title from the info string, shown above the block
    pub title: Option<String>,
}

impl CodeBlock {
    /// Create a new code block.
    pub fn new(language: Language, source: String, line_number: usize) -> Self {
        Self {
            id: format!("block-{}", line_number),
            language,
            source,
            line_number,
            title: None,
        }
    }
}

/// Extract a block title from code fence info string if present.
///
/// Supports formats like:
/// - `python title="chapter1_first_law.py"`
/// - `python title=chapter1_first_law.py`
pub fn extract_title(info: &str) -> Option<String> {
    let start = info.find("title=")?;
    let rest = &info[start + 6..];

    if let Some(quoted) = rest.strip_prefix('"') {
        let end = quoted.find('"')?;
        return Some(quoted[..end].to_string()).filter(|t| !t.is_empty());
    }

    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    Some(rest[..end].to_string()).filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_language() {
        assert_eq!(Language::from_info("python title=\"a.py\""), Language::Python);
        assert_eq!(Language::from_info("py"), Language::Python);
        assert_eq!(Language::from_info("tex"), Language::Latex);
        assert_eq!(Language::from_info("sh"), Language::Bash);
        assert_eq!(Language::from_info(""), Language::Plain);
        assert_eq!(
            Language::from_info("Fortran"),
            Language::Other("fortran".to_string())
        );
    }

    #[test]
    fn names_languages() {
        assert_eq!(Language::Matlab.name(), Some("matlab"));
        assert_eq!(Language::Other("julia".to_string()).name(), Some("julia"));
        assert_eq!(Language::Plain.name(), None);
    }

    #[test]
    fn extracts_title() {
        assert_eq!(
            extract_title("python title=\"chapter1_first_law.py\""),
            Some("chapter1_first_law.py".to_string())
        );
        assert_eq!(
            extract_title("bash title=setup.sh showLineNumbers"),
            Some("setup.sh".to_string())
        );
        assert_eq!(extract_title("python"), None);
        assert_eq!(extract_title("python title=\"\""), None);
    }
}
