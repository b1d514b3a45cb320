//! Markdown/MDX parser with frontmatter, heading and link extraction.
//!
//! This crate parses course documents, extracts YAML frontmatter, builds a table
//! of contents and collects code blocks and outgoing links for the site builder.

pub mod codeblock;
pub mod frontmatter;
pub mod parser;

pub use codeblock::{CodeBlock, Language};
pub use frontmatter::Frontmatter;
pub use parser::{parse_mdx, parse_mdx_with, slugify, LinkRef, ParseError, ParseOptions, ParsedDoc, TocEntry};
