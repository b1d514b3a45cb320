//! Validation-only command.

use std::path::Path;

use anyhow::{Context, Result};
use folio_site::{preorder, BrokenLinkPolicy, Manifest, NavNode};
use folio_static::{BuildConfig, CheckedSite, StaticBuilder};

/// Run the check command.
pub fn run(config_path: &Path) -> Result<()> {
    let checked = check(config_path)?;
    println!("{}", summary(&checked));

    let policy = checked.site.config.site.on_broken_links;
    if !checked.broken_links.is_empty() {
        for link in &checked.broken_links {
            tracing::warn!("Broken link {}", link);
        }
        if policy == BrokenLinkPolicy::Throw {
            anyhow::bail!("Found {} broken link(s)", checked.broken_links.len());
        }
    }

    Ok(())
}

/// Load and validate the site without writing anything.
fn check(config_path: &Path) -> Result<CheckedSite> {
    let manifest = Manifest::load(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    let checked = StaticBuilder::new(manifest, BuildConfig::default()).check()?;
    Ok(checked)
}

/// One line per sidebar plus totals.
fn summary(checked: &CheckedSite) -> String {
    let site = &checked.site;
    let mut lines = vec![format!(
        "{} ({})",
        site.config.site.title,
        site.config.absolute_url("/")
    )];

    for (name, nodes) in site.sidebars.iter() {
        let docs = preorder(nodes)
            .filter(|node| matches!(node, NavNode::DocRef { .. }))
            .count();
        let categories = preorder(nodes)
            .filter(|node| matches!(node, NavNode::Category { .. }))
            .count();
        lines.push(format!(
            "  sidebar {}: {} documents in {} categories",
            name, docs, categories
        ));
    }

    lines.push(format!(
        "  {} documents, {} feature cards, {} broken link(s)",
        checked.content.len(),
        site.homepage.features.len(),
        checked.broken_links.len()
    ));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_site(root: &Path, sidebars: &str) {
        fs::create_dir_all(root.join("docs/part")).unwrap();
        fs::write(
            root.join("site.toml"),
            "[site]\ntitle = \"Notes\"\nurl = \"https://example.org\"\n",
        )
        .unwrap();
        fs::write(root.join("sidebars.yaml"), sidebars).unwrap();
        fs::write(root.join("docs/intro.md"), "# Intro\n").unwrap();
        fs::write(root.join("docs/part/one.md"), "# One\n").unwrap();
    }

    #[test]
    fn summarizes_valid_site() {
        let temp = tempdir().unwrap();
        write_site(
            temp.path(),
            "notes:\n  - intro\n  - type: category\n    label: Part\n    items:\n      - part/one\n",
        );

        let checked = check(&temp.path().join("site.toml")).unwrap();
        let text = summary(&checked);

        assert!(text.contains("Notes (https://example.org/)"));
        assert!(text.contains("sidebar notes: 2 documents in 1 categories"));
        assert!(!temp.path().join("build").exists());
    }

    #[test]
    fn reports_dangling_reference() {
        let temp = tempdir().unwrap();
        write_site(temp.path(), "notes:\n  - intro\n  - part/two\n");

        let err = check(&temp.path().join("site.toml")).unwrap_err();

        assert!(err.to_string().contains("part/two"));
    }
}
