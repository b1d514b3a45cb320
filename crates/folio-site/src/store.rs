//! The document collaborator used by reference checks.

use std::collections::{BTreeMap, BTreeSet};

/// Read-only view over the documents a site can link to.
///
/// Routes are site-internal paths without the base URL (e.g. `/docs/code/intro`).
pub trait DocumentStore {
    /// Check whether a document with this id exists.
    fn exists(&self, id: &str) -> bool;

    /// Route of the document with this id.
    fn resolve_path(&self, id: &str) -> Option<String>;

    /// Check whether a route is served by the site.
    fn route_exists(&self, route: &str) -> bool;
}

/// An in-memory document set mapping ids to routes.
///
/// The homepage route `/` is always present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSet {
    routes: BTreeMap<String, String>,
    extra_routes: BTreeSet<String>,
}

impl DocumentSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set where every id is served at `/{route_base}/{id}`.
    pub fn from_ids<I, S>(route_base: &str, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for id in ids {
            let id = id.into();
            let route = doc_route(route_base, &id);
            set.insert(id, route);
        }
        set
    }

    /// Register a document. Returns the previous route if the id was taken.
    pub fn insert(&mut self, id: impl Into<String>, route: impl AsRef<str>) -> Option<String> {
        self.routes.insert(id.into(), normalize_route(route.as_ref()))
    }

    /// Register a route that is not backed by a document (e.g. a generated page).
    pub fn insert_route(&mut self, route: &str) {
        self.extra_routes.insert(normalize_route(route));
    }

    /// Iterate over `(id, route)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.routes.iter().map(|(id, route)| (id.as_str(), route.as_str()))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl DocumentStore for DocumentSet {
    fn exists(&self, id: &str) -> bool {
        self.routes.contains_key(id)
    }

    fn resolve_path(&self, id: &str) -> Option<String> {
        self.routes.get(id).cloned()
    }

    fn route_exists(&self, route: &str) -> bool {
        let route = normalize_route(route);
        route == "/"
            || self.extra_routes.contains(&route)
            || self.routes.values().any(|r| *r == route)
    }
}

/// Route for a document id under a docs route base.
///
/// A trailing `index` segment maps to its directory: `guide/index` -> `/docs/guide`.
pub fn doc_route(route_base: &str, id: &str) -> String {
    let id = id.strip_suffix("index").map_or(id, |rest| {
        if rest.is_empty() || rest.ends_with('/') {
            rest
        } else {
            id
        }
    });
    let base = route_base.trim_matches('/');
    if base.is_empty() {
        normalize_route(&format!("/{}", id))
    } else {
        normalize_route(&format!("/{}/{}", base, id))
    }
}

/// Normalize a route: leading slash, no trailing slash, no query or fragment.
pub fn normalize_route(route: &str) -> String {
    let route = route.split(['#', '?']).next().unwrap_or("");
    let trimmed = route.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", trimmed)
    }
}
