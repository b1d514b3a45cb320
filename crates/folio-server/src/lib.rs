//! Development server with live reload for folio sites.
//!
//! Builds the site, serves it under its base path and rebuilds on every change
//! to documents, static files or configuration, reloading connected browsers.

pub mod reload;
pub mod server;
pub mod watcher;

pub use reload::{ReloadHub, ReloadMessage};
pub use server::{rebuild, DevServer, DevServerConfig, ServerError};
pub use watcher::{FileWatcher, WatchEvent};
