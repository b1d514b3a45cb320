//! Frontmatter extraction and parsing.

use serde::Deserialize;

/// Parsed frontmatter from a document.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Frontmatter {
    /// Document id override; the directory part of the path is kept
    #[serde(default)]
    pub id: Option<String>,

    /// Page title (falls back to the first heading)
    #[serde(default)]
    pub title: Option<String>,

    /// Page description for SEO
    #[serde(default)]
    pub description: Option<String>,

    /// Label used in sidebars instead of the title
    #[serde(default)]
    pub sidebar_label: Option<String>,

    /// Position hint for generated indexes (lower = first)
    #[serde(default)]
    pub sidebar_position: Option<i32>,

    /// Custom route override
    #[serde(default)]
    pub slug: Option<String>,
}

/// Extract frontmatter from document source.
///
/// The block opens with a `---` line at the top of the file and closes at the
/// next line consisting of `---` alone. Returns the parsed frontmatter and the
/// content after the block.
pub fn extract_frontmatter(source: &str) -> Result<(Option<Frontmatter>, &str), FrontmatterError> {
    let trimmed = source.trim_start();

    let Some(after_open) = trimmed
        .strip_prefix("---\n")
        .or_else(|| trimmed.strip_prefix("---\r\n"))
    else {
        return Ok((None, source));
    };

    let mut offset = 0;
    let mut close = None;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            close = Some((offset, offset + line.len()));
            break;
        }
        offset += line.len();
    }
    let Some((yaml_end, body_start)) = close else {
        return Err(FrontmatterError::Unclosed);
    };

    let yaml_content = after_open[..yaml_end].trim();
    let frontmatter = if yaml_content.is_empty() {
        Frontmatter::default()
    } else {
        serde_yaml::from_str(yaml_content)
            .map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?
    };

    Ok((Some(frontmatter), after_open[body_start..].trim_start()))
}

/// Errors that can occur when parsing frontmatter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Unclosed frontmatter block - missing closing ---")]
    Unclosed,

    #[error("Invalid YAML in frontmatter: {0}")]
    InvalidYaml(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_valid_frontmatter() {
        let source = r#"---
id: first-law
title: "Chapter 1: First Law"
sidebar_label: First Law
sidebar_position: 1
---

# Thermodynamic States and the First Law
"#;

        let (fm, content) = extract_frontmatter(source).unwrap();
        let fm = fm.unwrap();

        assert_eq!(fm.id.as_deref(), Some("first-law"));
        assert_eq!(fm.title.as_deref(), Some("Chapter 1: First Law"));
        assert_eq!(fm.sidebar_label.as_deref(), Some("First Law"));
        assert_eq!(fm.sidebar_position, Some(1));
        assert!(content.starts_with("# Thermodynamic States"));
    }

    #[test]
    fn handles_no_frontmatter() {
        let source = "# Just Markdown\n\nNo frontmatter here.";

        let (fm, content) = extract_frontmatter(source).unwrap();

        assert!(fm.is_none());
        assert_eq!(content, source);
    }

    #[test]
    fn accepts_empty_frontmatter() {
        let (fm, content) = extract_frontmatter("---\n---\n# Body").unwrap();

        assert_eq!(fm, Some(Frontmatter::default()));
        assert_eq!(content, "# Body");
    }

    #[test]
    fn handles_crlf_and_inline_dashes() {
        let source = "---\r\ntitle: Entropy --- Second Law\r\n---\r\n# Entropy\r\n";

        let (fm, content) = extract_frontmatter(source).unwrap();

        assert_eq!(fm.unwrap().title.as_deref(), Some("Entropy --- Second Law"));
        assert!(content.starts_with("# Entropy"));
    }

    #[test]
    fn errors_on_unclosed_frontmatter() {
        let source = "---\ntitle: Test\n# No closing";

        let result = extract_frontmatter(source);

        assert!(matches!(result, Err(FrontmatterError::Unclosed)));
    }

    #[test]
    fn errors_on_invalid_yaml() {
        let source = "---\ntitle: [invalid yaml\n---\n";

        let result = extract_frontmatter(source);

        assert!(matches!(result, Err(FrontmatterError::InvalidYaml(_))));
    }
}
