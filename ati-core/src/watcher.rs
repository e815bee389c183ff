//! Watcher for the update directory.
//!
//! The platform rewrites one file per record whenever the record changes.
//! [`FileWatcher`] subscribes to change notifications for that directory and
//! runs every changed file through classify → parse → store on a single
//! background thread.
//!
//! Notifications for a path are debounced: a file is read only once it has
//! been quiet for the configured interval. Bursts of writes to one file
//! collapse into a single read of its latest content, and a file is never
//! read while the platform is still writing it. Intermediate states can be
//! skipped; the store always converges on the last stable content.
//!
//! A file that never goes quiet is read anyway once it has been pending for
//! `max_latency`, so a record rewritten on every partial fill still reaches
//! the store while the rewrites go on.

use crate::diagnostics::{Diagnostics, WatchEvent};
use crate::error::{AtiError, Result, UpdateError};
use crate::protocol::{classify, parse};
use crate::settings::Settings;
use crate::store::StateStore;
use log::{debug, error, info};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Lifecycle of a [`FileWatcher`]. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Idle,
    Watching,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchOptions {
    /// Quiet time before a changed file is read.
    pub debounce: Duration,
    /// Longest a changed file waits for a quiet period before it is read.
    pub max_latency: Duration,
    /// Upper bound on how long the worker sleeps between checks.
    pub tick: Duration,
    /// Load files already present in the directory on start.
    pub scan_existing: bool,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for WatchOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            debounce: settings.debounce(),
            max_latency: settings.max_latency(),
            tick: settings.poll_tick(),
            scan_existing: settings.scan_existing,
        }
    }
}

pub struct FileWatcher {
    dir: PathBuf,
    processor: UpdateProcessor,
    options: WatchOptions,
    state: WatcherState,
    watcher: Option<RecommendedWatcher>,
    worker: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl FileWatcher {
    /// Creates an idle watcher. Nothing is watched until [`start`](Self::start).
    ///
    /// # Arguments
    ///
    /// * `dir` - The update directory.
    /// * `store` - Destination of every parsed update.
    /// * `diagnostics` - Receives one event per processed file.
    /// * `options` - Debounce and scan behaviour.
    pub fn new(
        dir: impl Into<PathBuf>,
        store: Arc<StateStore>,
        diagnostics: Diagnostics,
        options: WatchOptions,
    ) -> Self {
        Self {
            dir: dir.into(),
            processor: UpdateProcessor { store, diagnostics },
            options,
            state: WatcherState::Idle,
            watcher: None,
            worker: None,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn state(&self) -> WatcherState {
        self.state
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Subscribes to the directory and starts the worker thread (Idle → Watching).
    ///
    /// The subscription is in place before the initial scan runs, so a file
    /// written during the scan is still picked up by the worker.
    ///
    /// # Returns
    ///
    /// * `Ok(())` once watching.
    /// * `Err(AtiError::InvalidState)` if the watcher was already started.
    /// * `Err(AtiError::Watch)` if the notification backend fails.
    /// * `Err(AtiError::FileSystem)` if the initial scan cannot list the directory.
    pub fn start(&mut self) -> Result<()> {
        if self.state != WatcherState::Idle {
            return Err(AtiError::InvalidState(format!(
                "watcher cannot start from {:?}",
                self.state
            )));
        }

        let (tx, rx) = channel();
        let mut watcher: RecommendedWatcher = Watcher::new(tx, Config::default())?;
        watcher.watch(&self.dir, RecursiveMode::NonRecursive)?;

        if self.options.scan_existing {
            self.scan_all()?;
        }

        let worker = Worker {
            processor: self.processor.clone(),
            debounce: self.options.debounce,
            max_latency: self.options.max_latency,
            tick: self.options.tick,
            stop: Arc::clone(&self.stop),
        };
        let handle = thread::Builder::new()
            .name("ati-watcher".to_string())
            .spawn(move || worker.run(rx))
            .map_err(AtiError::Spawn)?;

        self.watcher = Some(watcher);
        self.worker = Some(handle);
        self.state = WatcherState::Watching;
        info!("[Watcher] Watching {:?}", self.dir);
        Ok(())
    }

    /// Stops watching and joins the worker (→ Stopped).
    ///
    /// When this returns no further store writes will happen. An update being
    /// processed when the stop is requested completes first; updates still
    /// waiting for their debounce interval are discarded. Calling it again is
    /// a no-op.
    pub fn stop(&mut self) {
        if self.state == WatcherState::Stopped {
            return;
        }

        self.stop.store(true, Ordering::Release);
        // Dropping the backend closes the event channel and wakes the worker.
        drop(self.watcher.take());
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                error!("[Watcher] Worker thread panicked");
            }
        }

        self.state = WatcherState::Stopped;
        info!("[Watcher] Stopped watching {:?}", self.dir);
    }

    fn scan_all(&self) -> Result<()> {
        let entries =
            std::fs::read_dir(&self.dir).map_err(|e| AtiError::file_system(&self.dir, e))?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        debug!("[Watcher] Initial scan of {} files", paths.len());
        for path in paths {
            self.processor.process(&path);
        }
        Ok(())
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

/// classify → read → parse → store for one file.
#[derive(Clone)]
struct UpdateProcessor {
    store: Arc<StateStore>,
    diagnostics: Diagnostics,
}

impl UpdateProcessor {
    fn process(&self, path: &Path) {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            return;
        };
        let Some(target) = classify(file_name) else {
            debug!("[Watcher] Ignoring {}", file_name);
            return;
        };

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("[Watcher] {} vanished before it was read", file_name);
                return;
            }
            Err(e) => {
                self.reject(file_name, UpdateError::Read {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
                return;
            }
        };

        match parse(&target, &content) {
            Ok(update) => {
                let applied = update.target();
                self.store.apply(update);
                self.diagnostics.publish(WatchEvent::Applied(applied));
            }
            Err(error) => self.reject(file_name, error),
        }
    }

    fn reject(&self, file_name: &str, error: UpdateError) {
        self.diagnostics.publish(WatchEvent::Rejected {
            file_name: file_name.to_string(),
            error,
        });
    }
}

struct Worker {
    processor: UpdateProcessor,
    debounce: Duration,
    max_latency: Duration,
    tick: Duration,
    stop: Arc<AtomicBool>,
}

impl Worker {
    fn run(self, rx: Receiver<notify::Result<Event>>) {
        let mut pending: HashMap<PathBuf, Pending> = HashMap::new();

        while !self.stop.load(Ordering::Acquire) {
            match rx.recv_timeout(self.tick) {
                Ok(Ok(Event { kind, paths, .. })) => {
                    if is_content_change(&kind) {
                        let now = Instant::now();
                        for path in paths {
                            pending
                                .entry(path)
                                .and_modify(|p| p.last_seen = now)
                                .or_insert(Pending {
                                    first_seen: now,
                                    last_seen: now,
                                });
                        }
                    }
                }
                Ok(Err(e)) => error!("[Watcher] Watch error: {}", e),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            let now = Instant::now();
            let settled: Vec<PathBuf> = pending
                .iter()
                .filter(|(_, p)| p.is_settled(now, self.debounce, self.max_latency))
                .map(|(path, _)| path.clone())
                .collect();

            for path in settled {
                if self.stop.load(Ordering::Acquire) {
                    break;
                }
                pending.remove(&path);
                self.processor.process(&path);
            }
        }

        if !pending.is_empty() {
            debug!("[Watcher] Discarding {} unsettled updates", pending.len());
        }
    }
}

/// Change window of one path.
#[derive(Debug, Clone, Copy)]
struct Pending {
    first_seen: Instant,
    last_seen: Instant,
}

impl Pending {
    fn is_settled(&self, now: Instant, debounce: Duration, max_latency: Duration) -> bool {
        now.duration_since(self.last_seen) >= debounce
            || now.duration_since(self.first_seen) >= max_latency
    }
}

fn is_content_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Any
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> WatchOptions {
        WatchOptions {
            debounce: Duration::from_millis(20),
            max_latency: Duration::from_millis(100),
            tick: Duration::from_millis(5),
            scan_existing: true,
        }
    }

    #[test]
    fn test_state_transitions() {
        let dir = tempfile::tempdir().unwrap();
        let mut watcher = FileWatcher::new(
            dir.path(),
            Arc::new(StateStore::new()),
            Diagnostics::new(),
            options(),
        );
        assert_eq!(watcher.state(), WatcherState::Idle);

        watcher.start().unwrap();
        assert_eq!(watcher.state(), WatcherState::Watching);
        assert!(matches!(watcher.start(), Err(AtiError::InvalidState(_))));

        watcher.stop();
        assert_eq!(watcher.state(), WatcherState::Stopped);
        watcher.stop();
        assert!(matches!(watcher.start(), Err(AtiError::InvalidState(_))));
    }

    #[test]
    fn test_start_fails_on_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut watcher = FileWatcher::new(
            dir.path().join("missing"),
            Arc::new(StateStore::new()),
            Diagnostics::new(),
            options(),
        );
        assert!(watcher.start().is_err());
        assert_eq!(watcher.state(), WatcherState::Idle);
    }

    #[test]
    fn test_initial_scan_loads_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Sim_101.txt"), "CONNECTED").unwrap();
        std::fs::write(dir.path().join("readme.md"), "ignored").unwrap();

        let store = Arc::new(StateStore::new());
        let mut watcher =
            FileWatcher::new(dir.path(), Arc::clone(&store), Diagnostics::new(), options());
        watcher.start().unwrap();

        assert!(store.connection("Sim_101").unwrap().is_connected());
        watcher.stop();
    }

    #[test]
    fn test_scan_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Sim_101.txt"), "CONNECTED").unwrap();

        let store = Arc::new(StateStore::new());
        let mut watcher = FileWatcher::new(
            dir.path(),
            Arc::clone(&store),
            Diagnostics::new(),
            WatchOptions {
                scan_existing: false,
                ..options()
            },
        );
        watcher.start().unwrap();
        watcher.stop();

        assert!(store.connection("Sim_101").is_none());
    }

    #[test]
    fn test_pending_settles_on_quiet_or_latency_cap() {
        let debounce = Duration::from_millis(30);
        let max_latency = Duration::from_millis(150);
        let start = Instant::now();

        let busy = Pending {
            first_seen: start,
            last_seen: start + Duration::from_millis(100),
        };
        assert!(!busy.is_settled(start + Duration::from_millis(110), debounce, max_latency));
        assert!(busy.is_settled(start + Duration::from_millis(130), debounce, max_latency));

        let never_quiet = Pending {
            first_seen: start,
            last_seen: start + Duration::from_millis(149),
        };
        assert!(never_quiet.is_settled(start + Duration::from_millis(150), debounce, max_latency));
    }

    #[test]
    fn test_content_change_kinds() {
        use notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind};
        assert!(is_content_change(&EventKind::Create(CreateKind::File)));
        assert!(is_content_change(&EventKind::Modify(ModifyKind::Any)));
        assert!(!is_content_change(&EventKind::Remove(RemoveKind::File)));
        assert!(!is_content_change(&EventKind::Access(AccessKind::Any)));
    }
}
