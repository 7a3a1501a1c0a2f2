//! Watch command implementation
//!
//! Filesystem events from `notify` are forwarded to one [`Revalidator`]
//! per server. Each server directory is watched recursively; directories
//! outside it that hold dependencies (shared includes, env files) are
//! added non-recursively as resolutions discover them.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use colored::Colorize;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use srvcfg_core::{DocumentCache, ResolutionEvent, Revalidator, RootDependencies, Trigger};
use srvcfg_fs::{DiskProvider, FileProvider, NormalizedPath};
use tokio::sync::mpsc;

use super::check::{print_summary, render_diagnostics};
use crate::context::{build_engine, server_layout};
use crate::error::Result;

/// Run the watch command until interrupted
pub fn run_watch(server_dirs: &[PathBuf], schema: Option<&Path>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(watch(server_dirs, schema))
}

async fn watch(server_dirs: &[PathBuf], schema: Option<&Path>) -> Result<()> {
    let layouts = server_dirs
        .iter()
        .map(|dir| server_layout(dir))
        .collect::<Result<Vec<_>>>()?;

    let (change_tx, mut changes) = mpsc::unbounded_channel::<Vec<PathBuf>>();
    let watcher = notify::recommended_watcher(move |result: notify::Result<Event>| match result {
        Ok(event) if matches!(event.kind, EventKind::Access(_)) => {}
        Ok(event) => {
            // Receiver only goes away on shutdown.
            let _ = change_tx.send(event.paths);
        }
        Err(e) => tracing::warn!(error = %e, "File watcher error"),
    })?;
    let mut watches = WatchSet::new(watcher);

    let cache = Arc::new(DocumentCache::new());
    let provider: Arc<dyn FileProvider> = Arc::new(DiskProvider::new());
    let (event_tx, mut events) = mpsc::unbounded_channel::<ResolutionEvent>();
    let mut revalidators = Vec::with_capacity(layouts.len());

    for layout in layouts {
        watches.watch_recursive(&layout.server_dir)?;

        let engine = build_engine(&layout.server_dir, schema)?.with_cache(Arc::clone(&cache));
        let (revalidator, mut rx) = Revalidator::new(Arc::new(engine), Arc::clone(&provider));
        let tx = event_tx.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if tx.send(event).is_err() {
                    break;
                }
            }
        });

        println!("{} Watching {}", "=>".blue().bold(), layout.server_dir);
        revalidator.register(layout);
        revalidators.push(revalidator);
    }

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            Some(paths) = changes.recv() => {
                for path in paths {
                    let path = NormalizedPath::new(path);
                    for revalidator in &revalidators {
                        revalidator.file_changed(&path);
                    }
                }
            }
            Some(event) = events.recv() => {
                if let Ok(config) = &event.outcome {
                    watches.cover(&config.dependencies);
                }
                print_event(&event);
            }
            result = &mut shutdown => {
                result?;
                println!("{} Stopped watching", "=>".blue().bold());
                break;
            }
        }
    }
    Ok(())
}

fn print_event(event: &ResolutionEvent) {
    println!();
    println!(
        "{} {} ({})",
        "=>".blue().bold(),
        event.root,
        describe_trigger(&event.trigger)
    );
    match &event.outcome {
        Ok(config) => {
            print!("{}", render_diagnostics(&config.diagnostics));
            print_summary(&config.diagnostics);
        }
        Err(message) => println!("{}: {}", "error".red().bold(), message),
    }
}

fn describe_trigger(trigger: &Trigger) -> String {
    match trigger {
        Trigger::Registered => "initial check".to_string(),
        Trigger::Requested => "requested".to_string(),
        Trigger::FileChanged(paths) => match paths.as_slice() {
            [single] => format!("{single} changed"),
            _ => format!("{} files changed", paths.len()),
        },
    }
}

/// Directories registered with the watcher.
struct WatchSet {
    watcher: RecommendedWatcher,
    recursive: Vec<NormalizedPath>,
    flat: HashSet<NormalizedPath>,
}

impl WatchSet {
    fn new(watcher: RecommendedWatcher) -> Self {
        Self {
            watcher,
            recursive: Vec::new(),
            flat: HashSet::new(),
        }
    }

    fn watch_recursive(&mut self, dir: &NormalizedPath) -> Result<()> {
        self.watcher.watch(&dir.to_native(), RecursiveMode::Recursive)?;
        self.recursive.push(dir.clone());
        Ok(())
    }

    /// Start watching every existing directory holding a dependency.
    fn cover(&mut self, dependencies: &RootDependencies) {
        let parents = dependencies
            .files
            .iter()
            .chain(&dependencies.missing)
            .chain(&dependencies.env_files)
            .filter_map(NormalizedPath::parent);
        let dirs: Vec<NormalizedPath> = parents
            .chain(dependencies.watched_dirs.iter().cloned())
            .collect();

        for dir in dirs {
            if self.is_covered(&dir) {
                continue;
            }
            if !dir.is_dir() {
                tracing::debug!(%dir, "Skipping watch on missing directory");
                continue;
            }
            match self.watcher.watch(&dir.to_native(), RecursiveMode::NonRecursive) {
                Ok(()) => {
                    tracing::debug!(%dir, "Watching dependency directory");
                    self.flat.insert(dir);
                }
                Err(e) => tracing::warn!(%dir, error = %e, "Failed to watch directory"),
            }
        }
    }

    fn is_covered(&self, dir: &NormalizedPath) -> bool {
        self.flat.contains(dir) || self.recursive.iter().any(|root| dir.starts_with(root))
    }
}
