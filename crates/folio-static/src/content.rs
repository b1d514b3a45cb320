//! Content collection: the documents under the docs directory.
//!
//! Each `.md`/`.mdx` file becomes a [`Document`] with a stable id and a route.
//! The id is the path relative to the docs directory without extension, with
//! number prefixes (`01-intro.md`) stripped; a frontmatter `id` replaces the
//! file name part. The collection implements [`DocumentStore`] for validation.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use walkdir::WalkDir;

use folio_mdx::{parse_mdx_with, ParseOptions, ParsedDoc};
use folio_site::{doc_route, normalize_route, DocumentStore};

/// A parsed document with its id and route.
#[derive(Debug, Clone)]
pub struct Document {
    /// Stable identifier, e.g. `problems/thermodynamics/first-law`
    pub id: String,

    /// Site route without base URL, e.g. `/docs/problems/thermodynamics/first-law`
    pub route: String,

    /// Path relative to the docs directory
    pub relative_path: PathBuf,

    /// Parsed content
    pub doc: ParsedDoc,
}

impl Document {
    /// Display title: frontmatter title, first heading, or the last id segment.
    pub fn title(&self) -> &str {
        self.doc
            .title()
            .unwrap_or_else(|| self.id.rsplit('/').next().unwrap_or(&self.id))
    }

    /// Label used in sidebars when the sidebar entry has none.
    pub fn sidebar_label(&self) -> &str {
        self.doc
            .frontmatter
            .as_ref()
            .and_then(|fm| fm.sidebar_label.as_deref())
            .unwrap_or_else(|| self.title())
    }

    pub fn description(&self) -> Option<&str> {
        self.doc
            .frontmatter
            .as_ref()
            .and_then(|fm| fm.description.as_deref())
    }
}

/// Errors that can occur while loading documents.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Docs directory not found: {0}")]
    MissingDir(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Document id '{id}' is used by both {first} and {second}")]
    DuplicateId {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Route '{route}' is used by both {first} and {second}")]
    DuplicateRoute {
        route: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// All documents of a site, in path order.
#[derive(Debug, Default)]
pub struct ContentCollection {
    docs: Vec<Document>,
    by_id: HashMap<String, usize>,
    by_route: HashMap<String, usize>,
    by_path: HashMap<PathBuf, usize>,
}

impl ContentCollection {
    /// Scan a docs directory and parse every document.
    ///
    /// Files and directories starting with `_` are partials and are skipped.
    pub fn load(
        docs_dir: &Path,
        route_base: &str,
        options: ParseOptions,
    ) -> Result<Self, ContentError> {
        if !docs_dir.is_dir() {
            return Err(ContentError::MissingDir(docs_dir.to_path_buf()));
        }

        let mut collection = Self::default();

        for entry in WalkDir::new(docs_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('_'))
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            if !path.is_file() {
                continue;
            }

            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if ext != "mdx" && ext != "md" {
                continue;
            }

            let source = fs::read_to_string(path).map_err(|source| ContentError::Read {
                path: path.to_path_buf(),
                source,
            })?;

            let doc = parse_mdx_with(&source, options).map_err(|e| ContentError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

            let relative_path = path.strip_prefix(docs_dir).unwrap_or(path).to_path_buf();

            collection.insert(Self::document(relative_path, doc, route_base))?;
        }

        tracing::debug!(
            "Loaded {} documents from {}",
            collection.len(),
            docs_dir.display()
        );

        Ok(collection)
    }

    /// Assign id and route to a parsed document.
    fn document(relative_path: PathBuf, doc: ParsedDoc, route_base: &str) -> Document {
        let dir: Vec<String> = relative_path
            .parent()
            .into_iter()
            .flat_map(Path::components)
            .map(|c| strip_number_prefix(&c.as_os_str().to_string_lossy()).to_string())
            .collect();

        let frontmatter = doc.frontmatter.as_ref();

        let name = frontmatter
            .and_then(|fm| fm.id.clone())
            .unwrap_or_else(|| {
                let stem = relative_path
                    .file_stem()
                    .map(|s| s.to_string_lossy())
                    .unwrap_or_default();
                strip_number_prefix(&stem).to_string()
            });

        let id = dir
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(name.as_str()))
            .collect::<Vec<_>>()
            .join("/");

        let route = match frontmatter.and_then(|fm| fm.slug.as_deref()) {
            Some(slug) if slug.starts_with('/') => {
                doc_route(route_base, slug.trim_start_matches('/'))
            }
            Some(slug) => {
                let mut segments = dir.clone();
                segments.push(slug.to_string());
                doc_route(route_base, &segments.join("/"))
            }
            None => doc_route(route_base, &id),
        };

        Document {
            id,
            route,
            relative_path,
            doc,
        }
    }

    /// Add a document, rejecting duplicate ids and routes.
    pub fn insert(&mut self, document: Document) -> Result<(), ContentError> {
        if let Some(&existing) = self.by_id.get(&document.id) {
            return Err(ContentError::DuplicateId {
                id: document.id,
                first: self.docs[existing].relative_path.clone(),
                second: document.relative_path,
            });
        }
        if let Some(&existing) = self.by_route.get(&document.route) {
            return Err(ContentError::DuplicateRoute {
                route: document.route,
                first: self.docs[existing].relative_path.clone(),
                second: document.relative_path,
            });
        }

        let index = self.docs.len();
        self.by_id.insert(document.id.clone(), index);
        self.by_route.insert(document.route.clone(), index);
        self.by_path.insert(document.relative_path.clone(), index);
        self.docs.push(document);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.by_id.get(id).map(|&i| &self.docs[i])
    }

    /// Look up a document by its path relative to the docs directory.
    pub fn by_path(&self, relative: &Path) -> Option<&Document> {
        self.by_path.get(relative).map(|&i| &self.docs[i])
    }

    pub fn by_route(&self, route: &str) -> Option<&Document> {
        self.by_route.get(&normalize_route(route)).map(|&i| &self.docs[i])
    }

    /// Documents in path order.
    pub fn documents(&self) -> &[Document] {
        &self.docs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.docs.iter()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl DocumentStore for ContentCollection {
    fn exists(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    fn resolve_path(&self, id: &str) -> Option<String> {
        self.get(id).map(|d| d.route.clone())
    }

    fn route_exists(&self, route: &str) -> bool {
        let route = normalize_route(route);
        route == "/" || self.by_route.contains_key(&route)
    }
}

/// Strip an ordering prefix like `01-`, `2_` or `3.` from a path segment.
fn strip_number_prefix(segment: &str) -> &str {
    static RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^\d+\s*[-_.]+\s*([^-_.\s].*)$").expect("Invalid number prefix regex")
    });

    RE.captures(segment)
        .and_then(|caps| caps.get(1))
        .map_or(segment, |m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn write(dir: &Path, relative: &str, content: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn assigns_ids_and_routes() {
        let temp = tempdir().unwrap();
        let docs = temp.path();
        write(docs, "problems/intro.md", "# Problems");
        write(
            docs,
            "problems/thermodynamics/01-first-law.md",
            "---\ntitle: First Law\n---\n# Chapter 1",
        );
        write(
            docs,
            "solutions/latex/chapter1/p1.md",
            "---\nid: problems-1001-1010\n---\n",
        );
        write(docs, "code/index.mdx", "# Code");
        write(docs, "code/setup.md", "---\nslug: /getting-started\n---\n# Setup");
        write(docs, "_partials/snippet.md", "ignored");
        write(docs, "notes.txt", "ignored");

        let collection = ContentCollection::load(docs, "docs", ParseOptions::default()).unwrap();

        let ids: Vec<_> = collection.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "code/index",
                "code/setup",
                "problems/intro",
                "problems/thermodynamics/first-law",
                "solutions/latex/chapter1/problems-1001-1010",
            ]
        );

        assert_eq!(collection.get("code/index").unwrap().route, "/docs/code");
        assert_eq!(
            collection.get("code/setup").unwrap().route,
            "/docs/getting-started"
        );
        assert_eq!(
            collection
                .resolve_path("problems/thermodynamics/first-law")
                .as_deref(),
            Some("/docs/problems/thermodynamics/first-law")
        );
        assert_eq!(
            collection.get("problems/thermodynamics/first-law").unwrap().title(),
            "First Law"
        );
        assert_eq!(
            collection
                .by_path(Path::new("problems/intro.md"))
                .map(|d| d.id.as_str()),
            Some("problems/intro")
        );
    }

    #[test]
    fn implements_document_store() {
        let temp = tempdir().unwrap();
        write(temp.path(), "code/intro.md", "# Code");

        let collection =
            ContentCollection::load(temp.path(), "docs", ParseOptions::default()).unwrap();

        assert!(collection.exists("code/intro"));
        assert!(!collection.exists("code/setup"));
        assert!(collection.route_exists("/docs/code/intro/"));
        assert!(collection.route_exists("/"));
        assert!(!collection.route_exists("/docs/code/setup"));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let temp = tempdir().unwrap();
        write(temp.path(), "a.md", "---\nid: same\n---\n");
        write(temp.path(), "b.md", "---\nid: same\n---\n");

        let err = ContentCollection::load(temp.path(), "docs", ParseOptions::default()).unwrap_err();

        assert!(matches!(err, ContentError::DuplicateId { ref id, .. } if id == "same"));
    }

    #[test]
    fn reports_missing_directory() {
        let temp = tempdir().unwrap();

        let err = ContentCollection::load(&temp.path().join("docs"), "docs", ParseOptions::default())
            .unwrap_err();

        assert!(matches!(err, ContentError::MissingDir(_)));
    }

    #[test]
    fn falls_back_to_id_for_title() {
        let temp = tempdir().unwrap();
        write(temp.path(), "code/setup.md", "Plain paragraph.");

        let collection =
            ContentCollection::load(temp.path(), "docs", ParseOptions::default()).unwrap();

        assert_eq!(collection.get("code/setup").unwrap().title(), "setup");
        assert_eq!(collection.get("code/setup").unwrap().sidebar_label(), "setup");
    }

    #[test]
    fn strips_number_prefixes() {
        assert_eq!(strip_number_prefix("01-intro"), "intro");
        assert_eq!(strip_number_prefix("2_entropy"), "entropy");
        assert_eq!(strip_number_prefix("3. functions"), "functions");
        assert_eq!(strip_number_prefix("1001"), "1001");
        assert_eq!(strip_number_prefix("problems-1001-1010"), "problems-1001-1010");
    }
}
