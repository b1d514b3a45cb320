//! Markdown/MDX document parser.

use std::collections::HashMap;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::codeblock::{extract_title, CodeBlock, Language};
use crate::frontmatter::{extract_frontmatter, Frontmatter, FrontmatterError};

/// A parsed document.
#[derive(Debug, Clone)]
pub struct ParsedDoc {
    /// Parsed frontmatter (if present)
    pub frontmatter: Option<Frontmatter>,

    /// Markdown content (without frontmatter)
    pub content: String,

    /// Extracted code blocks
    pub code_blocks: Vec<CodeBlock>,

    /// Table of contents entries
    pub toc: Vec<TocEntry>,

    /// Outgoing links in document order
    pub links: Vec<LinkRef>,

    /// Whether the document contains inline or display math
    pub has_math: bool,
}

impl ParsedDoc {
    /// Frontmatter title, or the first level-1 heading.
    pub fn title(&self) -> Option<&str> {
        self.frontmatter
            .as_ref()
            .and_then(|fm| fm.title.as_deref())
            .or_else(|| {
                self.toc
                    .iter()
                    .find(|entry| entry.level == 1)
                    .map(|entry| entry.title.as_str())
            })
    }
}

/// A table of contents entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    /// Heading text
    pub title: String,
    /// Anchor ID (explicit `{#id}` or slug of the title)
    pub id: String,
    /// Heading level (1-6)
    pub level: u8,
}

/// A link found in document content.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkRef {
    /// Link destination as written
    pub dest: String,
    /// Line number in the source file (1-indexed)
    pub line: usize,
}

/// Markdown extensions to enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Parse `$...$` and `$$...$$` as math
    pub math: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { math: true }
    }
}

impl ParseOptions {
    /// pulldown-cmark options for these settings.
    ///
    /// Renderers must use the same options so headings line up with the TOC.
    pub fn markdown_options(&self) -> Options {
        let mut options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_HEADING_ATTRIBUTES;
        if self.math {
            options |= Options::ENABLE_MATH;
        }
        options
    }
}

/// Errors that can occur when parsing a document.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] FrontmatterError),
}

/// Parse a document with all extensions enabled.
pub fn parse_mdx(source: &str) -> Result<ParsedDoc, ParseError> {
    parse_mdx_with(source, ParseOptions::default())
}

/// Parse a document.
///
/// Extracts frontmatter, code blocks, links and a table of contents.
pub fn parse_mdx_with(source: &str, options: ParseOptions) -> Result<ParsedDoc, ParseError> {
    let (frontmatter, content) = extract_frontmatter(source)?;

    // `content` is a suffix of `source`; count the lines it skipped
    let line_offset = source[..source.len() - content.len()].matches('\n').count();
    let lines = LineIndex::new(content);

    let mut code_blocks = Vec::new();
    let mut toc = Vec::new();
    let mut links = Vec::new();
    let mut has_math = false;
    let mut slugs: HashMap<String, usize> = HashMap::new();

    let mut current_code_block: Option<(String, usize, String)> = None; // (info, line, source)
    let mut current_heading: Option<(u8, Option<String>, String)> = None; // (level, id, text)

    let parser = Parser::new_ext(content, options.markdown_options());

    for (event, range) in parser.into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let info = match &kind {
                    CodeBlockKind::Fenced(info) => info.to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                let line = lines.line_of(range.start) + line_offset;
                current_code_block = Some((info, line, String::new()));
            }

            Event::End(TagEnd::CodeBlock) => {
                if let Some((info, line, source)) = current_code_block.take() {
                    let mut block = CodeBlock::new(Language::from_info(&info), source, line);
                    block.title = extract_title(&info);
                    code_blocks.push(block);
                }
            }

            Event::Start(Tag::Heading { level, id, .. }) => {
                current_heading = Some((level as u8, id.map(|id| id.to_string()), String::new()));
            }

            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, id, title)) = current_heading.take() {
                    let title = title.trim().to_string();
                    let id = id.unwrap_or_else(|| unique_slug(&title, &mut slugs));
                    toc.push(TocEntry { title, id, level });
                }
            }

            Event::Start(Tag::Link { dest_url, .. }) => {
                links.push(LinkRef {
                    dest: dest_url.to_string(),
                    line: lines.line_of(range.start) + line_offset,
                });
            }

            Event::Text(text) | Event::Code(text) => {
                if let Some((_, _, ref mut code)) = current_code_block {
                    code.push_str(&text);
                } else if let Some((_, _, ref mut heading_text)) = current_heading {
                    heading_text.push_str(&text);
                }
            }

            Event::InlineMath(math) | Event::DisplayMath(math) => {
                has_math = true;
                if let Some((_, _, ref mut heading_text)) = current_heading {
                    heading_text.push_str(&math);
                }
            }

            _ => {}
        }
    }

    Ok(ParsedDoc {
        frontmatter,
        content: content.to_string(),
        code_blocks,
        toc,
        links,
        has_math,
    })
}

/// Byte offsets of line starts, for mapping event ranges to line numbers.
struct LineIndex {
    newlines: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        Self {
            newlines: text.match_indices('\n').map(|(i, _)| i).collect(),
        }
    }

    /// 1-indexed line containing a byte offset.
    fn line_of(&self, offset: usize) -> usize {
        self.newlines.partition_point(|&nl| nl < offset) + 1
    }
}

/// Slug a heading, suffixing `-1`, `-2`... on repeats within one document.
fn unique_slug(title: &str, seen: &mut HashMap<String, usize>) -> String {
    let base = slugify(title);
    let count = seen.entry(base.clone()).or_insert(0);
    let slug = if *count == 0 {
        base
    } else {
        format!("{}-{}", base, count)
    };
    *count += 1;
    slug
}

/// Convert a heading to a URL-safe slug.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c
            } else if c.is_whitespace() || c == '-' || c == '_' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|c| *c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_complete_document() {
        let source = r#"---
title: "Chapter 1: First Law"
---

# Thermodynamic States

Work done on an ideal gas is $W = -\int p\,dV$.

```python title="problem_1003.py"
R = x / ((alpha2 - alpha1) * delta_T)
```

## Problem 1003 {#p1003}

See the [entropy chapter](../entropy.md) and [constants](/docs/solutions/constants).

```latex
\oint \frac{dQ}{T} \le 0
```
"#;

        let doc = parse_mdx(source).unwrap();

        assert_eq!(doc.title(), Some("Chapter 1: First Law"));
        assert!(doc.has_math);

        assert_eq!(doc.code_blocks.len(), 2);
        let python = &doc.code_blocks[0];
        assert_eq!(python.language, Language::Python);
        assert_eq!(python.title.as_deref(), Some("problem_1003.py"));
        assert_eq!(python.line_number, 9);
        assert!(python.source.contains("delta_T"));
        assert_eq!(doc.code_blocks[1].language, Language::Latex);

        assert_eq!(
            doc.toc,
            vec![
                TocEntry {
                    title: "Thermodynamic States".to_string(),
                    id: "thermodynamic-states".to_string(),
                    level: 1,
                },
                TocEntry {
                    title: "Problem 1003".to_string(),
                    id: "p1003".to_string(),
                    level: 2,
                },
            ]
        );

        assert_eq!(
            doc.links,
            vec![
                LinkRef {
                    dest: "../entropy.md".to_string(),
                    line: 15,
                },
                LinkRef {
                    dest: "/docs/solutions/constants".to_string(),
                    line: 15,
                },
            ]
        );
    }

    #[test]
    fn parses_without_frontmatter() {
        let source = "# Just Markdown\n\nNo frontmatter.";

        let doc = parse_mdx(source).unwrap();

        assert!(doc.frontmatter.is_none());
        assert_eq!(doc.title(), Some("Just Markdown"));
        assert_eq!(doc.toc.len(), 1);
        assert!(!doc.has_math);
    }

    #[test]
    fn math_is_plain_text_when_disabled() {
        let doc = parse_mdx_with("Energy $E = mc^2$.", ParseOptions { math: false }).unwrap();

        assert!(!doc.has_math);
    }

    #[test]
    fn deduplicates_heading_slugs() {
        let doc = parse_mdx("## Solution\n\n## Solution\n\n## Solution").unwrap();

        let ids: Vec<_> = doc.toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["solution", "solution-1", "solution-2"]);
    }

    #[test]
    fn heading_text_includes_inline_code() {
        let doc = parse_mdx("## The `fsolve` call").unwrap();

        assert_eq!(doc.toc[0].title, "The fsolve call");
        assert_eq!(doc.toc[0].id, "the-fsolve-call");
    }

    #[test]
    fn slugify_works() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Ch.1: First Law"), "ch1-first-law");
        assert_eq!(slugify("Entropy (Second Law)"), "entropy-second-law");
        assert_eq!(slugify("  Multiple   Spaces  "), "multiple-spaces");
    }
}
