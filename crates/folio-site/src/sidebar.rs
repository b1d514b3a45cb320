//! Sidebar trees and their validation.
//!
//! A site declares several named sidebars (e.g. `problems`, `solutions`, `code`).
//! Each is an ordered forest of [`NavNode`]s: document references and categories.
//! [`resolve`] checks a [`SidebarForest`] against a [`DocumentStore`] and returns
//! it unchanged as a [`ValidatedForest`].

use std::collections::{BTreeMap, HashSet};
use std::ops::Deref;
use std::path::Path;

use serde::Deserialize;

use crate::error::{LoadError, ValidationError};
use crate::store::DocumentStore;

/// A node in a sidebar tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawNode")]
pub enum NavNode {
    /// Reference to a document by id, with an optional label override.
    DocRef { id: String, label: Option<String> },

    /// Named group of child nodes. Children keep their declared order.
    Category {
        label: String,
        collapsed: bool,
        children: Vec<NavNode>,
    },
}

impl NavNode {
    /// A document reference without a label override.
    pub fn doc(id: impl Into<String>) -> Self {
        Self::DocRef {
            id: id.into(),
            label: None,
        }
    }

    /// A document reference shown under a custom label.
    pub fn labeled_doc(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::DocRef {
            id: id.into(),
            label: Some(label.into()),
        }
    }

    /// A category, collapsed by default.
    pub fn category(label: impl Into<String>, children: Vec<NavNode>) -> Self {
        Self::Category {
            label: label.into(),
            collapsed: true,
            children,
        }
    }

    /// Same node, expanded by default if it is a category.
    pub fn expanded(self) -> Self {
        match self {
            Self::Category {
                label, children, ..
            } => Self::Category {
                label,
                collapsed: false,
                children,
            },
            doc => doc,
        }
    }
}

/// Pre-order iterator over the nodes of a forest.
pub struct Preorder<'a> {
    stack: Vec<std::slice::Iter<'a, NavNode>>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a NavNode;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let iter = self.stack.last_mut()?;
            match iter.next() {
                Some(node) => {
                    if let NavNode::Category { children, .. } = node {
                        self.stack.push(children.iter());
                    }
                    return Some(node);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Walk every node of a forest in pre-order.
pub fn preorder(nodes: &[NavNode]) -> Preorder<'_> {
    Preorder {
        stack: vec![nodes.iter()],
    }
}

/// Document ids of a forest in pre-order.
pub fn doc_ids(nodes: &[NavNode]) -> impl Iterator<Item = &str> {
    preorder(nodes).filter_map(|node| match node {
        NavNode::DocRef { id, .. } => Some(id.as_str()),
        NavNode::Category { .. } => None,
    })
}

/// Named sidebars, iterated in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SidebarForest {
    sidebars: BTreeMap<String, Vec<NavNode>>,
}

impl SidebarForest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a named sidebar.
    pub fn insert(&mut self, name: impl Into<String>, nodes: Vec<NavNode>) -> &mut Self {
        self.sidebars.insert(name.into(), nodes);
        self
    }

    /// Top-level nodes of a sidebar.
    pub fn get(&self, name: &str) -> Option<&[NavNode]> {
        self.sidebars.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sidebars.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[NavNode])> {
        self.sidebars
            .iter()
            .map(|(name, nodes)| (name.as_str(), nodes.as_slice()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sidebars.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sidebars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sidebars.is_empty()
    }

    /// Parse sidebars from YAML.
    pub fn from_yaml(source: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(source)
    }

    /// Load sidebars from a YAML file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let source = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&source).map_err(|source| LoadError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// A sidebar forest that passed [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedForest(SidebarForest);

impl ValidatedForest {
    /// Give back the plain forest.
    pub fn into_inner(self) -> SidebarForest {
        self.0
    }

    /// Name of the first sidebar (in name order) that references a document.
    pub fn sidebar_of(&self, id: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(_, nodes)| doc_ids(nodes).any(|doc| doc == id))
            .map(|(name, _)| name)
    }

    /// Labels of the categories enclosing a document, outermost first.
    pub fn trail(&self, sidebar: &str, id: &str) -> Option<Vec<&str>> {
        let nodes = self.0.get(sidebar)?;
        let mut trail = Vec::new();
        find_trail(nodes, id, &mut trail).then_some(trail)
    }
}

impl Deref for ValidatedForest {
    type Target = SidebarForest;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn find_trail<'a>(nodes: &'a [NavNode], id: &str, trail: &mut Vec<&'a str>) -> bool {
    for node in nodes {
        match node {
            NavNode::DocRef { id: doc, .. } if doc == id => return true,
            NavNode::DocRef { .. } => {}
            NavNode::Category {
                label, children, ..
            } => {
                trail.push(label);
                if find_trail(children, id, trail) {
                    return true;
                }
                trail.pop();
            }
        }
    }
    false
}

/// Validate every sidebar of a forest.
///
/// Structural checks (empty categories, duplicate ids within one sidebar) run over
/// all sidebars before document references are checked against the store. The
/// first failure is returned. On success the forest is returned unchanged.
pub fn resolve(
    forest: SidebarForest,
    store: &dyn DocumentStore,
) -> Result<ValidatedForest, ValidationError> {
    for (name, nodes) in forest.iter() {
        check_structure(name, nodes)?;
    }

    for (name, nodes) in forest.iter() {
        if let Some(id) = doc_ids(nodes).find(|id| !store.exists(id)) {
            return Err(ValidationError::DanglingReference {
                scope: format!("Sidebar '{}'", name),
                target: id.to_string(),
            });
        }
    }

    tracing::debug!(sidebars = forest.len(), "Resolved sidebars");

    Ok(ValidatedForest(forest))
}

fn check_structure(sidebar: &str, nodes: &[NavNode]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();

    for node in preorder(nodes) {
        match node {
            NavNode::Category {
                label, children, ..
            } if children.is_empty() => {
                return Err(ValidationError::EmptyCategory {
                    sidebar: sidebar.to_string(),
                    label: label.clone(),
                });
            }
            NavNode::Category { .. } => {}
            NavNode::DocRef { id, .. } => {
                if !seen.insert(id.as_str()) {
                    return Err(ValidationError::DuplicateId {
                        sidebar: sidebar.to_string(),
                        id: id.clone(),
                    });
                }
            }
        }
    }

    Ok(())
}

/// Sidebar item as written in YAML: a bare id or a tagged map.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawNode {
    Id(String),
    Tagged(TaggedNode),
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum TaggedNode {
    Doc {
        id: String,
        #[serde(default)]
        label: Option<String>,
    },
    Category {
        label: String,
        #[serde(default = "default_collapsed")]
        collapsed: bool,
        #[serde(default)]
        items: Vec<RawNode>,
    },
}

fn default_collapsed() -> bool {
    true
}

impl From<RawNode> for NavNode {
    fn from(raw: RawNode) -> Self {
        match raw {
            RawNode::Id(id) => NavNode::doc(id),
            RawNode::Tagged(TaggedNode::Doc { id, label }) => NavNode::DocRef { id, label },
            RawNode::Tagged(TaggedNode::Category {
                label,
                collapsed,
                items,
            }) => NavNode::Category {
                label,
                collapsed,
                children: items.into_iter().map(NavNode::from).collect(),
            },
        }
    }
}
