// src/watch/watcher.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::{BindingName, RuntimeEvent};
use crate::watch::bindings::WatchBinding;
use crate::watch::path_utils::relative_str;

/// Handle for the filesystem watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive. Dropping this handle
/// stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn a filesystem watcher over `watch_dir` (recursively) and send
/// `RuntimeEvent::BindingTriggered` for every binding a change matches.
///
/// - `root` is the project root against which all binding globs are
///   evaluated.
/// - `watch_dir` is the directory actually observed (usually `src`).
/// - `runtime_tx` is the channel into the watch engine.
///
/// Sends `RuntimeEvent::WatcherReady` once the watch is armed.
pub async fn spawn_watcher(
    root: impl Into<PathBuf>,
    watch_dir: impl Into<PathBuf>,
    bindings: Vec<WatchBinding>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();
    let root = root.canonicalize().unwrap_or(root);
    let watch_dir = watch_dir.into();

    let bindings = Arc::new(bindings);

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    eprintln!("assetdag: failed to forward notify event: {err}");
                }
            }
            Err(err) => eprintln!("assetdag: file watch error: {err}"),
        },
        Config::default(),
    )?;

    watcher
        .watch(&watch_dir, RecursiveMode::Recursive)
        .with_context(|| format!("watching {:?}", watch_dir))?;

    info!("file watcher started on {:?}", watch_dir);

    let async_root = root.clone();
    let async_bindings = Arc::clone(&bindings);
    let ready_tx = runtime_tx.clone();

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if matches!(event.kind, EventKind::Access(_)) {
                continue;
            }
            debug!(?event, "received notify event");

            for (binding, path) in triggers_for_paths(&async_root, &event.paths, &async_bindings) {
                if runtime_tx
                    .send(RuntimeEvent::BindingTriggered { binding, path })
                    .await
                    .is_err()
                {
                    debug!("watch engine gone; stopping watcher loop");
                    return;
                }
            }
        }
        debug!("watcher event loop finished");
    });

    if ready_tx.send(RuntimeEvent::WatcherReady).await.is_err() {
        warn!("watch engine closed before the watcher was ready");
    }

    Ok(WatcherHandle { _inner: watcher })
}

/// Bindings triggered by one filesystem event.
///
/// Each binding appears at most once, paired with the first path in `paths`
/// that matched it. Order follows `bindings`.
pub fn triggers_for_paths(
    root: &Path,
    paths: &[PathBuf],
    bindings: &[WatchBinding],
) -> Vec<(BindingName, String)> {
    let rel_paths: Vec<String> = paths
        .iter()
        .filter_map(|p| {
            let rel = relative_str(root, p);
            if rel.is_none() {
                debug!(path = ?p, "changed path outside project root; ignoring");
            }
            rel
        })
        .collect();

    bindings
        .iter()
        .filter_map(|binding| {
            rel_paths
                .iter()
                .find(|rel| binding.matches(rel))
                .map(|rel| (binding.name().to_string(), rel.clone()))
        })
        .collect()
}
