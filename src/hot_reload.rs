//! # Hot Reload Module
//!
//! Live reloading of the route configuration without restarting.
//!
//! ## Overview
//!
//! A [`RouterHandle`] owns the active [`Router`] behind an
//! [`arc_swap::ArcSwap`]. A reload:
//!
//! 1. **Parse** - the configuration file is read and deserialized
//! 2. **Build** - a complete new `Router` is built from scratch
//! 3. **Swap** - the new router replaces the old one in a single store
//!
//! Requests already holding the previous router finish on it; new requests
//! see the new one. Readers never lock.
//!
//! ## Error Handling
//!
//! If the new configuration fails to parse or build, the error is logged
//! and returned, and the previous router keeps serving.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use radixroute::hot_reload::{watch_config, RouterHandle};
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let handle = Arc::new(RouterHandle::load("routes.yaml")?);
//!
//! // keep the watcher alive for as long as reloads should happen
//! let _watcher = watch_config(Arc::clone(&handle), |router| {
//!     println!("now serving {} domains", router.len());
//! })?;
//!
//! let router = handle.router();
//! let _domain = router.lookup("localhost:8080");
//! # Ok(())
//! # }
//! ```

use arc_swap::ArcSwap;
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::Router;

/// Shared, atomically swappable router bound to its configuration file
#[derive(Debug)]
pub struct RouterHandle {
    path: PathBuf,
    current: ArcSwap<Router>,
}

impl RouterHandle {
    /// Wrap an already built router.
    pub fn new(path: impl AsRef<Path>, router: Router) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            current: ArcSwap::from_pointee(router),
        }
    }

    /// Build the initial router from `path`.
    ///
    /// # Errors
    ///
    /// Read, parse, and build errors for the file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let router = Router::load(path.as_ref())?;
        Ok(Self::new(path, router))
    }

    /// Snapshot of the active router.
    #[must_use]
    pub fn router(&self) -> Arc<Router> {
        self.current.load_full()
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rebuild from the configuration file and swap the result in.
    ///
    /// # Errors
    ///
    /// Read, parse, and build errors. The active router is unchanged.
    pub fn reload(&self) -> anyhow::Result<()> {
        match Router::load(&self.path) {
            Ok(router) => {
                let domains_count = router.len();
                self.current.store(Arc::new(router));
                info!(
                    path = %self.path.display(),
                    domains_count,
                    "hot-reload: router swapped"
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    path = %self.path.display(),
                    error = %format!("{err:#}"),
                    "hot-reload: rebuild failed, keeping current router"
                );
                Err(err)
            }
        }
    }

    /// Swap in a router built elsewhere.
    pub fn replace(&self, router: Router) {
        self.current.store(Arc::new(router));
    }
}

/// Watch the handle's configuration file and reload on every change.
///
/// `on_reload` runs after each successful swap with the new router. The
/// returned watcher stops watching when dropped.
///
/// # Errors
///
/// Fails when the watcher cannot be created or the file cannot be watched.
pub fn watch_config<F>(
    handle: Arc<RouterHandle>,
    mut on_reload: F,
) -> notify::Result<RecommendedWatcher>
where
    F: FnMut(&Router) + Send + 'static,
{
    let path = handle.path().to_path_buf();
    let watch_handle = Arc::clone(&handle);

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
                    && watch_handle.reload().is_ok()
                {
                    on_reload(&watch_handle.router());
                }
            }
            Err(e) => warn!(error = %e, "hot-reload: watch error"),
        },
        Config::default(),
    )?;

    watcher.watch(&path, RecursiveMode::NonRecursive)?;
    info!(path = %path.display(), "hot-reload: watching route config");
    Ok(watcher)
}
