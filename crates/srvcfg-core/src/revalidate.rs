//! Background revalidation
//!
//! One worker task per registered root. Workers run resolutions one at a
//! time, so results for a root are published in order; requests that pile
//! up while a resolution runs are coalesced into a single rerun that reads
//! the latest file state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::Serialize;
use srvcfg_fs::{FileProvider, NormalizedPath, ServerLayout};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::dependency::{DependencyGraph, RootDependencies};
use crate::engine::{ConfigEngine, ResolvedConfiguration};
use crate::{Error, Result};

/// Why a resolution ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "paths", rename_all = "camelCase")]
pub enum Trigger {
    Registered,
    Requested,
    FileChanged(Vec<NormalizedPath>),
}

impl Trigger {
    fn coalesce(self, next: Trigger) -> Trigger {
        match (self, next) {
            (Trigger::FileChanged(mut paths), Trigger::FileChanged(more)) => {
                for path in more {
                    if !paths.contains(&path) {
                        paths.push(path);
                    }
                }
                Trigger::FileChanged(paths)
            }
            (Trigger::Registered, _) | (_, Trigger::Registered) => Trigger::Registered,
            _ => Trigger::Requested,
        }
    }
}

/// A finished resolution.
#[derive(Debug, Clone)]
pub struct ResolutionEvent {
    /// Server directory of the root
    pub root: NormalizedPath,
    pub trigger: Trigger,
    pub outcome: std::result::Result<Arc<ResolvedConfiguration>, String>,
}

/// Work queued for a root's worker.
struct Request {
    trigger: Trigger,
    /// Replaces the worker's layout before the next resolution
    layout: Option<ServerLayout>,
}

impl Request {
    fn trigger(trigger: Trigger) -> Self {
        Self {
            trigger,
            layout: None,
        }
    }

    fn coalesce(self, next: Request) -> Request {
        Request {
            trigger: self.trigger.coalesce(next.trigger),
            layout: next.layout.or(self.layout),
        }
    }
}

struct Worker {
    tx: mpsc::UnboundedSender<Request>,
    handle: JoinHandle<()>,
}

/// Keeps registered roots up to date as their files change.
pub struct Revalidator {
    engine: Arc<ConfigEngine>,
    provider: Arc<dyn FileProvider>,
    graph: Arc<RwLock<DependencyGraph>>,
    workers: Mutex<HashMap<NormalizedPath, Worker>>,
    events: mpsc::UnboundedSender<ResolutionEvent>,
}

impl Revalidator {
    /// Create a revalidator and the receiver its results are published on.
    pub fn new(
        engine: Arc<ConfigEngine>,
        provider: Arc<dyn FileProvider>,
    ) -> (Self, mpsc::UnboundedReceiver<ResolutionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let revalidator = Self {
            engine,
            provider,
            graph: Arc::new(RwLock::new(DependencyGraph::new())),
            workers: Mutex::new(HashMap::new()),
            events,
        };
        (revalidator, rx)
    }

    /// Start tracking a root and schedule its first resolution.
    ///
    /// Must be called from within a Tokio runtime. Registering a root
    /// again hands the new layout to its running worker, so resolutions of
    /// that root stay serialized.
    pub fn register(&self, layout: ServerLayout) {
        let root = layout.server_dir.clone();
        let mut workers = self.lock_workers();

        let request = Request {
            trigger: Trigger::Registered,
            layout: Some(layout.clone()),
        };
        let request = match workers.get(&root) {
            Some(worker) => match worker.tx.send(request) {
                Ok(()) => {
                    tracing::debug!(root = %root, "Root re-registered");
                    return;
                }
                Err(mpsc::error::SendError(request)) => request,
            },
            None => request,
        };

        self.write_graph().update(RootDependencies::skeleton(&layout));
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_worker(
            layout,
            Arc::clone(&self.engine),
            Arc::clone(&self.provider),
            Arc::clone(&self.graph),
            rx,
            self.events.clone(),
        ));
        // The receiver is alive until the worker exits.
        let _ = tx.send(request);

        tracing::debug!(root = %root, "Registered root for revalidation");
        workers.insert(root, Worker { tx, handle });
    }

    /// Stop tracking a root. Returns whether it was registered.
    pub fn unregister(&self, root: &NormalizedPath) -> bool {
        let removed = self.lock_workers().remove(root);
        self.write_graph().remove(root);
        match removed {
            Some(worker) => {
                worker.handle.abort();
                tracing::debug!(root = %root, "Unregistered root");
                true
            }
            None => false,
        }
    }

    /// Schedule a resolution of one root.
    pub fn request(&self, root: &NormalizedPath) -> Result<()> {
        let workers = self.lock_workers();
        let stopped = || Error::WorkerStopped {
            root: root.to_string(),
        };
        let worker = workers.get(root).ok_or_else(stopped)?;
        worker
            .tx
            .send(Request::trigger(Trigger::Requested))
            .map_err(|_| stopped())
    }

    /// Report a created, modified or deleted file. Returns the roots that
    /// were scheduled for revalidation.
    pub fn file_changed(&self, path: &NormalizedPath) -> Vec<NormalizedPath> {
        let canonical = self.provider.canonicalize(path);
        self.engine.cache().invalidate(path);
        if &canonical != path {
            self.engine.cache().invalidate(&canonical);
        }

        let mut roots = {
            let graph = self.read_graph();
            let mut roots = graph.dependents(path);
            roots.extend(graph.dependents(&canonical));
            roots
        };
        roots.sort();
        roots.dedup();

        let workers = self.lock_workers();
        for root in &roots {
            if let Some(worker) = workers.get(root) {
                let _ = worker
                    .tx
                    .send(Request::trigger(Trigger::FileChanged(vec![path.clone()])));
            }
        }
        if !roots.is_empty() {
            tracing::info!(path = %path, roots = roots.len(), "File change scheduled revalidation");
        }
        roots
    }

    /// Snapshot of the current dependency graph.
    pub fn graph(&self) -> DependencyGraph {
        self.read_graph().clone()
    }

    pub fn roots(&self) -> Vec<NormalizedPath> {
        let mut roots: Vec<_> = self.lock_workers().keys().cloned().collect();
        roots.sort();
        roots
    }

    fn lock_workers(&self) -> std::sync::MutexGuard<'_, HashMap<NormalizedPath, Worker>> {
        self.workers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_graph(&self) -> std::sync::RwLockReadGuard<'_, DependencyGraph> {
        self.graph.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_graph(&self) -> std::sync::RwLockWriteGuard<'_, DependencyGraph> {
        self.graph.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Revalidator {
    fn drop(&mut self) {
        let workers = self.workers.get_mut().unwrap_or_else(PoisonError::into_inner);
        for (_, worker) in workers.drain() {
            worker.handle.abort();
        }
    }
}

async fn run_worker(
    mut layout: ServerLayout,
    engine: Arc<ConfigEngine>,
    provider: Arc<dyn FileProvider>,
    graph: Arc<RwLock<DependencyGraph>>,
    mut rx: mpsc::UnboundedReceiver<Request>,
    events: mpsc::UnboundedSender<ResolutionEvent>,
) {
    let root = layout.server_dir.clone();
    while let Some(first) = rx.recv().await {
        let mut request = first;
        while let Ok(next) = rx.try_recv() {
            request = request.coalesce(next);
        }
        if let Some(replacement) = request.layout {
            layout = replacement;
        }

        let job = {
            let engine = Arc::clone(&engine);
            let provider = Arc::clone(&provider);
            let layout = layout.clone();
            tokio::task::spawn_blocking(move || engine.resolve(&layout, provider.as_ref()))
        };
        let outcome = match job.await {
            Ok(Ok(resolved)) => {
                record(&graph, &root, resolved.dependencies.clone());
                Ok(Arc::new(resolved))
            }
            Ok(Err(e)) => {
                tracing::warn!(root = %root, error = %e, "Resolution failed");
                record(&graph, &root, RootDependencies::skeleton(&layout));
                Err(e.to_string())
            }
            Err(e) => Err(e.to_string()),
        };

        let event = ResolutionEvent {
            root: root.clone(),
            trigger: request.trigger,
            outcome,
        };
        if events.send(event).is_err() {
            break;
        }
    }
    tracing::debug!(root = %root, "Revalidation worker stopped");
}

/// Store a root's dependencies unless it was unregistered meanwhile.
fn record(graph: &RwLock<DependencyGraph>, root: &NormalizedPath, deps: RootDependencies) {
    let mut graph = graph.write().unwrap_or_else(PoisonError::into_inner);
    if graph.get(root).is_some() {
        graph.update(deps);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changed(paths: &[&str]) -> Trigger {
        Trigger::FileChanged(paths.iter().map(|p| NormalizedPath::new(p)).collect())
    }

    #[test]
    fn file_changes_coalesce_without_duplicates() {
        let merged = changed(&["/a.xml", "/b.xml"]).coalesce(changed(&["/b.xml", "/c.xml"]));
        assert_eq!(merged, changed(&["/a.xml", "/b.xml", "/c.xml"]));
    }

    #[test]
    fn registration_dominates() {
        assert_eq!(Trigger::Registered.coalesce(changed(&["/a.xml"])), Trigger::Registered);
        assert_eq!(Trigger::Requested.coalesce(Trigger::Registered), Trigger::Registered);
        assert_eq!(changed(&["/a.xml"]).coalesce(Trigger::Requested), Trigger::Requested);
    }

    #[test]
    fn latest_layout_survives_coalescing() {
        let first = Request {
            trigger: Trigger::Registered,
            layout: Some(ServerLayout::from_server_dir("/wlp/usr/servers/a")),
        };
        let moved = ServerLayout::from_server_dir("/wlp/usr/servers/a").with_user_dir("/alt/usr");
        let second = Request {
            trigger: Trigger::Registered,
            layout: Some(moved.clone()),
        };

        let merged = first.coalesce(second).coalesce(Request::trigger(changed(&["/a.xml"])));
        assert_eq!(merged.trigger, Trigger::Registered);
        assert_eq!(merged.layout, Some(moved));
    }
}
