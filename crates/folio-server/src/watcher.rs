//! File watching for live reload.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// Quiet period after the last change before a batch of events is emitted.
const DEBOUNCE: Duration = Duration::from_millis(100);

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// Markdown document was modified
    DocModified(PathBuf),

    /// Site config or sidebars file was modified
    ConfigModified(PathBuf),

    /// File was created
    Created(PathBuf),

    /// File was deleted
    Deleted(PathBuf),

    /// Any other modification (static files, stylesheets)
    Modified(PathBuf),
}

impl WatchEvent {
    pub fn path(&self) -> &Path {
        match self {
            Self::DocModified(p)
            | Self::ConfigModified(p)
            | Self::Created(p)
            | Self::Deleted(p)
            | Self::Modified(p) => p,
        }
    }
}

/// File watcher for detecting changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Create a new file watcher.
    ///
    /// `recursive` paths are watched with all their descendants, `shallow` paths
    /// only for their direct entries. Missing paths are skipped. Events are
    /// debounced and deduplicated per path.
    pub fn new(
        recursive: &[PathBuf],
        shallow: &[PathBuf],
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        let targets = recursive
            .iter()
            .map(|p| (p, RecursiveMode::Recursive))
            .chain(shallow.iter().map(|p| (p, RecursiveMode::NonRecursive)));

        for (path, mode) in targets {
            if path.exists() {
                watcher.watch(path, mode).map_err(std::io::Error::other)?;
            } else {
                tracing::debug!("Not watching missing path {}", path.display());
            }
        }

        std::thread::spawn(move || {
            while let Ok(first) = sync_rx.recv() {
                let mut batch = vec![first];
                while let Ok(event) = sync_rx.recv_timeout(DEBOUNCE) {
                    batch.push(event);
                }

                let mut seen = HashSet::new();
                for event in batch {
                    for path in &event.paths {
                        let Some(e) = classify_event(path, &event.kind) else {
                            continue;
                        };
                        if seen.insert(path.clone()) && async_tx.blocking_send(e).is_err() {
                            return;
                        }
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Classify a notify event into a WatchEvent.
fn classify_event(path: &Path, kind: &notify::EventKind) -> Option<WatchEvent> {
    use notify::EventKind;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    match kind {
        EventKind::Create(_) => Some(WatchEvent::Created(path.to_path_buf())),
        EventKind::Remove(_) => Some(WatchEvent::Deleted(path.to_path_buf())),
        EventKind::Modify(_) => match ext {
            "md" | "mdx" => Some(WatchEvent::DocModified(path.to_path_buf())),
            "toml" | "yaml" | "yml" => Some(WatchEvent::ConfigModified(path.to_path_buf())),
            _ => Some(WatchEvent::Modified(path.to_path_buf())),
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, ModifyKind};
    use notify::EventKind;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn classifies_events() {
        let modify = EventKind::Modify(ModifyKind::Data(DataChange::Content));

        assert_eq!(
            classify_event(Path::new("docs/intro.md"), &modify),
            Some(WatchEvent::DocModified(PathBuf::from("docs/intro.md")))
        );
        assert_eq!(
            classify_event(Path::new("sidebars.yaml"), &modify),
            Some(WatchEvent::ConfigModified(PathBuf::from("sidebars.yaml")))
        );
        assert_eq!(
            classify_event(Path::new("static/img/logo.svg"), &modify),
            Some(WatchEvent::Modified(PathBuf::from("static/img/logo.svg")))
        );
        assert_eq!(
            classify_event(Path::new("docs/new.md"), &EventKind::Create(CreateKind::File)),
            Some(WatchEvent::Created(PathBuf::from("docs/new.md")))
        );
        assert_eq!(classify_event(Path::new("docs/intro.md"), &EventKind::Any), None);
    }

    #[tokio::test]
    async fn watches_file_changes() {
        let temp = tempdir().unwrap();
        let docs = temp.path().join("docs");
        fs::create_dir_all(&docs).unwrap();

        let (watcher, mut rx) = FileWatcher::new(&[docs.clone()], &[]).unwrap();

        // Give inotify time to set up
        tokio::time::sleep(Duration::from_millis(100)).await;

        fs::write(docs.join("intro.md"), "# Created").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(3), rx.recv()).await;

        drop(watcher);

        assert!(event.is_ok(), "timeout waiting for file watch event");
        let event = event.unwrap().expect("channel should not be closed");
        assert!(event.path().ends_with("intro.md"));
    }
}
