//! Development server implementation.

use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::{IntoResponse, Redirect},
    routing::get,
    Router,
};
use tokio::sync::broadcast::error::RecvError;
use tower_http::services::{ServeDir, ServeFile};

use folio_site::Manifest;
use folio_static::{BuildConfig, BuildError, BuildResult, StaticBuilder};

use crate::reload::{reload_client_script, ReloadHub, ReloadMessage, RELOAD_PATH};
use crate::watcher::{FileWatcher, WatchEvent};

/// Configuration for the development server.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Path to `site.toml`
    pub config_path: PathBuf,

    /// Directory the dev build is written to
    pub output_dir: PathBuf,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from("site.toml"),
            output_dir: std::env::temp_dir().join(format!("folio-dev-{}", std::process::id())),
            port: 3000,
            host: "127.0.0.1".to_string(),
            open: true,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("Failed to swap in new build at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Shared server state.
struct ServerState {
    hub: ReloadHub,
}

/// Development server.
pub struct DevServer {
    config: DevServerConfig,
}

impl DevServer {
    /// Create a new development server.
    pub fn new(config: DevServerConfig) -> Self {
        Self { config }
    }

    /// Build the site, then serve it and rebuild on every change.
    ///
    /// The initial build must succeed. Later failures keep the last good build
    /// and are reported to connected browsers.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|_| {
                ServerError::InvalidAddress(format!("{}:{}", self.config.host, self.config.port))
            })?;

        let manifest = Manifest::load(&self.config.config_path).map_err(BuildError::from)?;
        let base_url = manifest.config.site.base_url.clone();

        let script = reload_client_script(RELOAD_PATH);
        let result = spawn_rebuild(&self.config, &script).await?;
        tracing::info!(
            "Built {} pages in {}ms",
            result.pages,
            result.duration_ms
        );

        let state = Arc::new(ServerState {
            hub: ReloadHub::new(),
        });

        // Set up file watcher
        let root = manifest.root.clone();
        let recursive = vec![
            manifest.path(&manifest.config.docs.dir),
            manifest.path(&manifest.config.docs.static_dir),
        ];
        let mut shallow = vec![if root.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            root
        }];
        shallow.extend(
            manifest
                .config
                .theme
                .custom_css
                .iter()
                .filter_map(|css| manifest.path(css).parent().map(Path::to_path_buf)),
        );

        let (watcher, mut rx) = FileWatcher::new(&recursive, &shallow)
            .map_err(|e| ServerError::WatchError(e.to_string()))?;

        // Rebuild on changes
        let state_clone = Arc::clone(&state);
        let config = self.config.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                handle_watch_event(&state_clone, &config, &script, event).await;
            }
            // Keep watcher alive
            drop(watcher);
        });

        let app = router(state, &self.config.output_dir, &base_url);

        let url = format!("http://{}{}", addr, base_url);
        tracing::info!("Serving at {}", url);

        if self.config.open {
            if let Err(e) = open::that(&url) {
                tracing::warn!("Failed to open browser: {}", e);
            }
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

/// Routes: the live reload socket, and the build output under the base path.
fn router(state: Arc<ServerState>, output_dir: &Path, base_url: &str) -> Router {
    let files = ServeDir::new(output_dir)
        .not_found_service(ServeFile::new(output_dir.join("404.html")));

    let app = Router::new()
        .route(RELOAD_PATH, get(ws_handler))
        .with_state(state);

    if base_url == "/" {
        app.fallback_service(files)
    } else {
        let base = base_url.to_string();
        app.nest_service(base_url.trim_end_matches('/'), files)
            .route(
                "/",
                get(move || {
                    let base = base.clone();
                    async move { Redirect::temporary(&base) }
                }),
            )
    }
}

/// Build the site into a staging directory and swap it in on success.
///
/// A failed build leaves the previous output untouched.
pub fn rebuild(config: &DevServerConfig, live_reload: &str) -> Result<BuildResult, ServerError> {
    let manifest = Manifest::load(&config.config_path).map_err(BuildError::from)?;

    let staging = config.output_dir.with_extension("next");
    if staging.exists() {
        std::fs::remove_dir_all(&staging).map_err(|source| ServerError::Io {
            path: staging.clone(),
            source,
        })?;
    }

    let builder = StaticBuilder::new(
        manifest,
        BuildConfig {
            output_dir: Some(staging.clone()),
            minify: Some(false),
            live_reload: Some(live_reload.to_string()),
        },
    );
    let mut result = builder.build()?;

    match std::fs::remove_dir_all(&config.output_dir) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(ServerError::Io {
                path: config.output_dir.clone(),
                source,
            })
        }
    }
    std::fs::rename(&staging, &config.output_dir).map_err(|source| ServerError::Io {
        path: config.output_dir.clone(),
        source,
    })?;

    result.output_dir = config.output_dir.clone();
    Ok(result)
}

/// Run [`rebuild`] off the async runtime.
async fn spawn_rebuild(config: &DevServerConfig, script: &str) -> Result<BuildResult, ServerError> {
    let config = config.clone();
    let script = script.to_string();

    match tokio::task::spawn_blocking(move || rebuild(&config, &script)).await {
        Ok(result) => result,
        Err(e) => Err(ServerError::WatchError(format!("Rebuild task failed: {}", e))),
    }
}

/// Handle file watch events.
async fn handle_watch_event(
    state: &ServerState,
    config: &DevServerConfig,
    script: &str,
    event: WatchEvent,
) {
    match &event {
        WatchEvent::DocModified(path) => tracing::info!("Document modified: {}", path.display()),
        WatchEvent::ConfigModified(path) => tracing::info!("Config modified: {}", path.display()),
        WatchEvent::Created(path) => tracing::info!("Created: {}", path.display()),
        WatchEvent::Deleted(path) => tracing::info!("Deleted: {}", path.display()),
        WatchEvent::Modified(path) => tracing::debug!("Modified: {}", path.display()),
    }

    match spawn_rebuild(config, script).await {
        Ok(result) => {
            tracing::info!(
                "Rebuilt {} pages in {}ms",
                result.pages,
                result.duration_ms
            );
            state.hub.send(ReloadMessage::Reload);
        }
        Err(e) => {
            tracing::error!("Rebuild failed: {}", e);
            state.hub.send(ReloadMessage::BuildFailed {
                message: e.to_string(),
            });
        }
    }
}

/// Handler for the live reload WebSocket endpoint.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Handle a WebSocket connection.
async fn handle_ws(mut socket: WebSocket, state: Arc<ServerState>) {
    let mut rx = state.hub.subscribe();

    if send_message(&mut socket, &ReloadMessage::Connected).await.is_err() {
        return;
    }

    // Forward reload messages to the browser
    loop {
        match rx.recv().await {
            Ok(msg) => {
                if send_message(&mut socket, &msg).await.is_err() {
                    break;
                }
            }
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ReloadMessage) -> Result<(), axum::Error> {
    let json = serde_json::to_string(msg).map_err(axum::Error::new)?;
    socket.send(Message::Text(json.into())).await
}
