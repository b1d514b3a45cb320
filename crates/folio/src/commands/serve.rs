//! Preview server command.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axum::{response::Redirect, routing::get, Router};
use folio_site::Manifest;
use tower_http::services::{ServeDir, ServeFile};

/// Run the serve command.
pub async fn run(config_path: &Path, port: u16, dir: Option<PathBuf>) -> Result<()> {
    let manifest = Manifest::load(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    let base_url = manifest.config.site.base_url.clone();
    let dir = dir.unwrap_or_else(|| manifest.path(&manifest.config.build.output));

    if !dir.exists() {
        anyhow::bail!(
            "Directory not found: {}. Run 'folio build' first.",
            dir.display()
        );
    }

    let addr: SocketAddr = format!("127.0.0.1:{}", port)
        .parse()
        .context("Invalid address")?;

    let url = format!("http://{}{}", addr, base_url);
    tracing::info!("Serving {} at {}", dir.display(), url);

    let app = preview_router(&dir, &base_url);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Open browser
    let _ = open::that(&url);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Serve `dir` under `base_url`, redirecting `/` to it.
fn preview_router(dir: &Path, base_url: &str) -> Router {
    let files = ServeDir::new(dir).not_found_service(ServeFile::new(dir.join("404.html")));

    if base_url == "/" {
        Router::new().fallback_service(files)
    } else {
        let base = base_url.to_string();
        Router::new()
            .nest_service(base_url.trim_end_matches('/'), files)
            .route(
                "/",
                get(move || {
                    let base = base.clone();
                    async move { Redirect::temporary(&base) }
                }),
            )
    }
}
