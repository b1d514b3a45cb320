//! Static site build command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use folio_site::Manifest;
use folio_static::{BuildConfig, BuildResult, StaticBuilder};

/// Run the build command.
pub fn run(config_path: &Path, output: Option<PathBuf>, minify: Option<bool>) -> Result<()> {
    build(config_path, output, minify)?;
    Ok(())
}

/// Load the manifest and build the site, logging a summary.
pub fn build(
    config_path: &Path,
    output: Option<PathBuf>,
    minify: Option<bool>,
) -> Result<BuildResult> {
    tracing::info!("Building static site...");

    let manifest = Manifest::load(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    let config = BuildConfig {
        output_dir: output,
        minify,
        live_reload: None,
    };

    let result = StaticBuilder::new(manifest, config).build()?;

    tracing::info!(
        "Built {} pages from {} documents in {}ms",
        result.pages,
        result.documents,
        result.duration_ms
    );
    if !result.broken_links.is_empty() {
        tracing::warn!("{} broken link(s) left in output", result.broken_links.len());
    }

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(result)
}
