//! Deploy command.

use std::path::Path;

use anyhow::{Context, Result};
use folio_site::Manifest;
use folio_static::{deploy, DeployError};

use super::build;

/// Run the deploy command.
pub fn run(config_path: &Path, skip_build: bool) -> Result<()> {
    let manifest = Manifest::load(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    let target = manifest
        .config
        .deploy
        .target
        .as_deref()
        .map(|target| manifest.path(target))
        .ok_or(DeployError::NoTarget)?;

    let build_dir = if skip_build {
        manifest.path(&manifest.config.build.output)
    } else {
        build::build(config_path, None, None)?.output_dir
    };

    tracing::info!(
        "Deploying {} to {}",
        build_dir.display(),
        target.display()
    );

    let report = deploy(&build_dir, &target, &manifest.root, &manifest.config.deploy)?;

    tracing::info!("Published {} files to {}", report.files, report.target.display());
    tracing::info!("Site URL: {}", manifest.config.absolute_url("/"));

    Ok(())
}
