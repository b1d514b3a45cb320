//! Loading and validating everything a build needs before rendering.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::config::{FooterLink, NavbarItem, PluginCatalog, SiteConfig};
use crate::error::{LoadError, ValidationError};
use crate::feature::FeatureGrid;
use crate::sidebar::{resolve, SidebarForest, ValidatedForest};
use crate::store::DocumentStore;

/// Site configuration, sidebars and homepage features as loaded from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Directory containing the config file; relative paths resolve against it
    pub root: PathBuf,
    pub config: SiteConfig,
    pub sidebars: SidebarForest,
    pub homepage: FeatureGrid,
}

/// Layout of `site.toml`.
#[derive(Debug, Deserialize)]
struct ManifestFile {
    #[serde(flatten)]
    config: SiteConfig,
    #[serde(default)]
    homepage: FeatureGrid,
}

/// A manifest whose every part passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSite {
    pub root: PathBuf,
    pub config: SiteConfig,
    pub sidebars: ValidatedForest,
    pub homepage: FeatureGrid,
}

impl Manifest {
    /// Load `site.toml` and the sidebars file it names.
    pub fn load(config_path: &Path) -> Result<Self, LoadError> {
        let source = std::fs::read_to_string(config_path).map_err(|source| LoadError::Io {
            path: config_path.to_path_buf(),
            source,
        })?;
        let file: ManifestFile = toml::from_str(&source).map_err(|source| LoadError::Toml {
            path: config_path.to_path_buf(),
            source,
        })?;

        let root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let sidebars = SidebarForest::load(&root.join(&file.config.docs.sidebars))?;

        tracing::info!(
            "Loaded {} with {} sidebars and {} feature cards",
            config_path.display(),
            sidebars.len(),
            file.homepage.features.len()
        );

        Ok(Self {
            root,
            config: file.config,
            sidebars,
            homepage: file.homepage,
        })
    }

    /// Resolve a path from the config against the manifest root.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Validate config, sidebars, features, navbar and footer, in that order.
    ///
    /// Stops at the first error.
    pub fn validate(
        self,
        store: &dyn DocumentStore,
        catalog: &dyn PluginCatalog,
    ) -> Result<ValidatedSite, ValidationError> {
        self.config.validate(catalog)?;

        let sidebars = resolve(self.sidebars, store)?;

        self.homepage.validate(store)?;

        validate_navbar(&self.config.navbar.items, &sidebars, store)?;
        validate_footer(&self.config, store)?;

        Ok(ValidatedSite {
            root: self.root,
            config: self.config,
            sidebars,
            homepage: self.homepage,
        })
    }
}

impl ValidatedSite {
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }
}

fn validate_navbar(
    items: &[NavbarItem],
    sidebars: &ValidatedForest,
    store: &dyn DocumentStore,
) -> Result<(), ValidationError> {
    for item in items {
        match item {
            NavbarItem::DocSidebar { sidebar, label, .. } => {
                let has_doc = sidebars
                    .get(sidebar)
                    .is_some_and(|nodes| crate::sidebar::doc_ids(nodes).next().is_some());
                if !has_doc {
                    return Err(ValidationError::UnknownSidebar {
                        scope: format!("Navbar item '{}'", label),
                        sidebar: sidebar.clone(),
                    });
                }
            }
            NavbarItem::Doc { id, label, .. } => {
                if !store.exists(id) {
                    return Err(ValidationError::DanglingReference {
                        scope: format!("Navbar item '{}'", label),
                        target: id.clone(),
                    });
                }
            }
            NavbarItem::Link { .. } => {}
        }
    }
    Ok(())
}

fn validate_footer(config: &SiteConfig, store: &dyn DocumentStore) -> Result<(), ValidationError> {
    for column in &config.footer.links {
        for link in &column.items {
            if let FooterLink::Internal { label, to } = link {
                if !store.route_exists(to) {
                    return Err(ValidationError::DanglingReference {
                        scope: format!("Footer link '{}'", label),
                        target: to.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DocumentSet;
    use std::fs;
    use tempfile::tempdir;

    struct Catalog;

    impl PluginCatalog for Catalog {
        fn knows_plugin(&self, name: &str) -> bool {
            matches!(name, "math" | "katex")
        }

        fn knows_language(&self, _name: &str) -> bool {
            true
        }
    }

    const SITE: &str = r#"
[site]
title = "Statistical Mechanics PhD Problems"
url = "https://outisnemosseus.github.io"
base_url = "/stat-mech/"

[markdown]
plugins = ["math", "katex"]

[[navbar.items]]
type = "doc_sidebar"
sidebar = "problems"
label = "Problems"

[[footer.links]]
title = "Documentation"
items = [{ label = "Problems Overview", to = "/docs/problems/intro" }]

[homepage]
columns = 3

[[homepage.features]]
title = "Thermodynamics"
icon = "img/mountain.svg"
description = "Problems on the *First Law*."
link = "/docs/problems/first-law"
"#;

    const SIDEBARS: &str = r#"
problems:
  - type: doc
    id: problems/intro
    label: Overview
  - type: category
    label: "Part I"
    collapsed: false
    items:
      - problems/first-law
"#;

    fn write_site(dir: &Path) -> PathBuf {
        let config_path = dir.join("site.toml");
        fs::write(&config_path, SITE).unwrap();
        fs::write(dir.join("sidebars.yaml"), SIDEBARS).unwrap();
        config_path
    }

    fn store() -> DocumentSet {
        DocumentSet::from_ids("docs", ["problems/intro", "problems/first-law"])
    }

    #[test]
    fn loads_config_sidebars_and_features() {
        let temp = tempdir().unwrap();
        let config_path = write_site(temp.path());

        let manifest = Manifest::load(&config_path).unwrap();

        assert_eq!(manifest.root, temp.path());
        assert_eq!(manifest.config.site.base_url, "/stat-mech/");
        assert_eq!(manifest.sidebars.len(), 1);
        assert_eq!(manifest.homepage.features.len(), 1);
        assert_eq!(manifest.path("docs"), temp.path().join("docs"));
    }

    #[test]
    fn validates_complete_site() {
        let temp = tempdir().unwrap();
        let manifest = Manifest::load(&write_site(temp.path())).unwrap();

        let site = manifest.validate(&store(), &Catalog).unwrap();

        assert_eq!(site.sidebars.sidebar_of("problems/first-law"), Some("problems"));
    }

    #[test]
    fn reports_unknown_navbar_sidebar() {
        let temp = tempdir().unwrap();
        let mut manifest = Manifest::load(&write_site(temp.path())).unwrap();
        manifest.config.navbar.items.push(NavbarItem::DocSidebar {
            sidebar: "exams".to_string(),
            label: "Exams".to_string(),
            position: Default::default(),
        });

        let err = manifest.validate(&store(), &Catalog).unwrap_err();

        assert_eq!(
            err,
            ValidationError::UnknownSidebar {
                scope: "Navbar item 'Exams'".to_string(),
                sidebar: "exams".to_string(),
            }
        );
    }

    #[test]
    fn reports_broken_footer_link() {
        let temp = tempdir().unwrap();
        let mut manifest = Manifest::load(&write_site(temp.path())).unwrap();
        manifest.config.footer.links[0].items.push(FooterLink::Internal {
            label: "Entropy".to_string(),
            to: "/docs/problems/entropy".to_string(),
        });

        let err = manifest.validate(&store(), &Catalog).unwrap_err();

        assert_eq!(
            err,
            ValidationError::DanglingReference {
                scope: "Footer link 'Entropy'".to_string(),
                target: "/docs/problems/entropy".to_string(),
            }
        );
    }

    #[test]
    fn sidebar_references_are_checked_before_footer() {
        let temp = tempdir().unwrap();
        let manifest = Manifest::load(&write_site(temp.path())).unwrap();
        let store = DocumentSet::from_ids("docs", ["problems/first-law"]);

        let err = manifest.validate(&store, &Catalog).unwrap_err();

        assert!(matches!(
            err,
            ValidationError::DanglingReference { ref target, .. } if target == "problems/intro"
        ));
    }

    #[test]
    fn unknown_plugin_aborts_before_sidebars() {
        let temp = tempdir().unwrap();
        let mut manifest = Manifest::load(&write_site(temp.path())).unwrap();
        manifest.config.markdown.plugins.push("mermaid".to_string());

        let err = manifest.validate(&DocumentSet::new(), &Catalog).unwrap_err();

        assert!(matches!(err, ValidationError::UnknownPlugin { .. }));
    }

    #[test]
    fn missing_sidebars_file_is_a_load_error() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("site.toml");
        fs::write(
            &config_path,
            "[site]\ntitle = \"T\"\nurl = \"https://example.org\"\n",
        )
        .unwrap();

        let err = Manifest::load(&config_path).unwrap_err();

        match err {
            LoadError::Io { path, .. } => assert_eq!(path, temp.path().join("sidebars.yaml")),
            other => panic!("expected an io error, got {:?}", other),
        }
    }

    #[test]
    fn empty_sidebars_file_yields_empty_forest() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("site.toml");
        fs::write(
            &config_path,
            "[site]\ntitle = \"T\"\nurl = \"https://example.org\"\n",
        )
        .unwrap();
        fs::write(temp.path().join("sidebars.yaml"), "{}\n").unwrap();

        let manifest = Manifest::load(&config_path).unwrap();

        assert!(manifest.sidebars.is_empty());
        assert_eq!(manifest.homepage, FeatureGrid::default());
    }

    #[test]
    fn malformed_toml_is_a_load_error() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("site.toml");
        fs::write(&config_path, "[site\ntitle = ").unwrap();

        let err = Manifest::load(&config_path).unwrap_err();

        assert!(matches!(err, LoadError::Toml { .. }));
    }
}
