//! Error types for loading and validating a site manifest.

use std::path::PathBuf;

/// A configuration error found while validating the manifest.
///
/// Every variant is fatal: the build aborts before any output is written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Sidebar '{sidebar}': document '{id}' is referenced more than once")]
    DuplicateId { sidebar: String, id: String },

    #[error("Sidebar '{sidebar}': category '{label}' has no items")]
    EmptyCategory { sidebar: String, label: String },

    #[error("{scope}: '{target}' does not resolve to any document")]
    DanglingReference { scope: String, target: String },

    #[error("Unknown {kind} '{name}'")]
    UnknownPlugin { kind: &'static str, name: String },

    #[error("Invalid base URL '{0}': expected a path prefix like '/' or '/project/'")]
    InvalidBaseUrl(String),

    #[error("Invalid site URL '{0}': expected an http(s) origin like 'https://example.org'")]
    InvalidUrl(String),

    #[error("Default locale '{default_locale}' is not listed in locales {locales:?}")]
    DefaultLocaleMissing {
        default_locale: String,
        locales: Vec<String>,
    },

    #[error("{scope}: sidebar '{sidebar}' is not defined")]
    UnknownSidebar { scope: String, sidebar: String },

    #[error("Feature grid needs at least one column, got {0}")]
    InvalidColumns(usize),
}

/// Errors that can occur when reading manifest files.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
