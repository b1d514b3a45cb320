//! Navigation and homepage data model for folio sites.
//!
//! This crate holds the declarative parts of a site: named sidebar trees, the
//! homepage feature cards and the site configuration. Everything is loaded once
//! and validated against a [`DocumentStore`] and a [`PluginCatalog`] before any
//! page is rendered.

pub mod config;
pub mod error;
pub mod feature;
pub mod manifest;
pub mod sidebar;
pub mod store;

pub use config::{BrokenLinkPolicy, PluginCatalog, SiteConfig};
pub use error::{LoadError, ValidationError};
pub use feature::{FeatureCard, FeatureGrid};
pub use manifest::{Manifest, ValidatedSite};
pub use sidebar::{doc_ids, preorder, resolve, NavNode, SidebarForest, ValidatedForest};
pub use store::{doc_route, normalize_route, DocumentSet, DocumentStore};
