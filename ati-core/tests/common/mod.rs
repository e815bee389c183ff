#![allow(dead_code)]

use ati_core::{AtiClient, Settings, WatchEvent};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};
use tempfile::TempDir;

pub const WAIT: Duration = Duration::from_secs(5);

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn test_settings(documents: &Path) -> Settings {
    Settings {
        debounce_ms: 30,
        max_latency_ms: 150,
        poll_tick_ms: 5,
        ..Settings::with_documents_dir(documents)
    }
}

/// A client rooted in a scratch directory, with a subscription opened
/// before the watcher starts.
pub struct Harness {
    pub client: AtiClient,
    pub events: Receiver<WatchEvent>,
    // Dropped last, after the client has stopped watching it.
    pub dir: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        init_logging();
        let dir = tempfile::tempdir().unwrap();
        let diagnostics = ati_core::Diagnostics::new();
        let events = diagnostics.subscribe();
        let client = AtiClient::open_with(&test_settings(dir.path()), diagnostics).unwrap();
        Self {
            client,
            events,
            dir,
        }
    }

    pub fn write_update(&self, file_name: &str, content: &str) -> PathBuf {
        let path = self.client.paths().outgoing_dir().join(file_name);
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Waits for the next event accepted by `matches`.
    pub fn wait_for(&self, matches: impl Fn(&WatchEvent) -> bool) -> WatchEvent {
        let deadline = Instant::now() + WAIT;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.events.recv_timeout(remaining) {
                Ok(event) if matches(&event) => return event,
                Ok(_) => continue,
                Err(e) => panic!("no matching watch event: {}", e),
            }
        }
    }

    pub fn command_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(self.client.paths().incoming_dir())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        files.sort();
        files
    }

    pub fn command_fields(&self) -> Vec<Vec<String>> {
        self.command_files()
            .iter()
            .map(|path| {
                std::fs::read_to_string(path)
                    .unwrap()
                    .split('|')
                    .map(str::to_string)
                    .collect()
            })
            .collect()
    }
}
