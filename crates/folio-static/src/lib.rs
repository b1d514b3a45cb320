//! Static site generator for folio course sites.
//!
//! Builds a documentation site with navbar, sidebars, homepage feature grid and
//! KaTeX math from a validated site manifest and a directory of Markdown files.

pub mod assets;
pub mod builder;
pub mod catalog;
pub mod content;
pub mod deploy;
pub mod links;
pub mod templates;

pub use builder::{BuildConfig, BuildError, BuildResult, CheckedSite, StaticBuilder};
pub use catalog::Capabilities;
pub use content::{ContentCollection, ContentError, Document};
pub use deploy::{deploy, DeployError, DeployReport};
pub use links::{BrokenLink, LinkResolver, LinkTarget};
