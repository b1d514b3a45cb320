//! Development server command.

use std::path::PathBuf;

use anyhow::Result;
use folio_server::{DevServer, DevServerConfig};

/// Run the dev server.
pub async fn run(config_path: PathBuf, port: u16, open: bool) -> Result<()> {
    tracing::info!("Starting development server on port {}", port);

    let config = DevServerConfig {
        config_path,
        port,
        open,
        ..Default::default()
    };
    let output_dir = config.output_dir.clone();

    let result = DevServer::new(config).start().await;

    if output_dir.exists() {
        if let Err(e) = std::fs::remove_dir_all(&output_dir) {
            tracing::debug!("Failed to remove {}: {}", output_dir.display(), e);
        }
    }

    result?;
    Ok(())
}
