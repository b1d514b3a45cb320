//! Link resolution and broken link detection for page content.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use folio_site::{DocumentStore, SiteConfig};

use crate::content::{ContentCollection, Document};

/// Where a link in page content points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// External URL, mail link or same-page anchor; left untouched
    External,
    /// Site-internal link, rewritten to a URL under the base path
    Internal(String),
    /// Internal link to a document or file that does not exist
    Broken,
}

/// A link in page content that does not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenLink {
    /// Source file, relative to the docs directory
    pub source: PathBuf,
    pub line: usize,
    pub dest: String,
}

impl fmt::Display for BrokenLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.source.display(), self.line, self.dest)
    }
}

/// Resolves links written in documents to site URLs.
///
/// Three kinds of internal links are understood:
/// - file links to other documents (`../entropy.md#maxwell`)
/// - absolute routes (`/docs/code/intro`), with or without the base path
/// - relative routes (`entropy`), resolved against the document's parent route
///
/// Routes that are not documents may name files in the static directory.
pub struct LinkResolver<'a> {
    config: &'a SiteConfig,
    collection: &'a ContentCollection,
    static_dir: &'a Path,
}

impl<'a> LinkResolver<'a> {
    pub fn new(
        config: &'a SiteConfig,
        collection: &'a ContentCollection,
        static_dir: &'a Path,
    ) -> Self {
        Self {
            config,
            collection,
            static_dir,
        }
    }

    pub fn resolve(&self, from: &Document, dest: &str) -> LinkTarget {
        if dest.is_empty() || dest.starts_with('#') || dest.starts_with("//") || has_scheme(dest) {
            return LinkTarget::External;
        }

        let (path, suffix) = split_suffix(dest);

        if path.ends_with(".md") || path.ends_with(".mdx") {
            let base = if path.starts_with('/') {
                Vec::new()
            } else {
                path_segments(from.relative_path.parent().unwrap_or(Path::new("")))
            };
            let target = join_segments(base, path).join("/");

            return match self.collection.by_path(Path::new(&target)) {
                Some(doc) => LinkTarget::Internal(self.config.url_for(&doc.route) + suffix),
                None => LinkTarget::Broken,
            };
        }

        let route = if path.starts_with('/') {
            let base_url = &self.config.site.base_url;
            let path = match path.strip_prefix(base_url.trim_end_matches('/')) {
                Some(rest) if base_url != "/" && (rest.is_empty() || rest.starts_with('/')) => rest,
                _ => path,
            };
            format!("/{}", join_segments(Vec::new(), path).join("/"))
        } else {
            let parent: Vec<&str> = from.route.split('/').filter(|s| !s.is_empty()).collect();
            let base = parent[..parent.len().saturating_sub(1)].to_vec();
            format!("/{}", join_segments(base, path).join("/"))
        };

        if self.collection.route_exists(&route) {
            return LinkTarget::Internal(self.config.url_for(&route) + suffix);
        }

        let file = route.trim_start_matches('/');
        if !file.is_empty() && self.static_dir.join(file).is_file() {
            return LinkTarget::Internal(format!("{}{}{}", self.config.site.base_url, file, suffix));
        }

        LinkTarget::Broken
    }

    /// Every broken link in the collection, in document order.
    pub fn broken_links(&self) -> Vec<BrokenLink> {
        self.collection
            .iter()
            .flat_map(|doc| {
                doc.doc
                    .links
                    .iter()
                    .filter(|link| self.resolve(doc, &link.dest) == LinkTarget::Broken)
                    .map(|link| BrokenLink {
                        source: doc.relative_path.clone(),
                        line: link.line,
                        dest: link.dest.clone(),
                    })
            })
            .collect()
    }
}

fn has_scheme(dest: &str) -> bool {
    match dest.split_once(':') {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
        }
        None => false,
    }
}

/// Split `path?query#fragment` into the path and the rest.
fn split_suffix(dest: &str) -> (&str, &str) {
    let end = dest.find(['?', '#']).unwrap_or(dest.len());
    dest.split_at(end)
}

fn path_segments(path: &Path) -> Vec<&str> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect()
}

/// Apply a `/`-separated relative path to base segments, folding `.` and `..`.
fn join_segments<'s>(mut base: Vec<&'s str>, relative: &'s str) -> Vec<&'s str> {
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                base.pop();
            }
            s => base.push(s),
        }
    }
    base
}
