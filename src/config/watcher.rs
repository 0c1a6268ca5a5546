// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Hot reload of the settings file.
//!
//! A background thread debounces file system events and re-parses the
//! settings. Reloads are reported as [`ConfigEvent`]s; the caller applies
//! them to the shared controls from its own thread.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use super::Settings;
use crate::error::Result;

/// Default quiet period before a modified file is re-read
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Events emitted by the config watcher
#[derive(Debug, Clone)]
pub enum ConfigEvent {
    /// Settings file was modified and successfully reloaded
    Reloaded(Box<Settings>),
    /// Settings file was modified but failed to load
    Error(String),
    /// A new file was created in the watch directory
    FileCreated(PathBuf),
    /// A file was deleted from the watch directory
    FileDeleted(PathBuf),
}

/// Settings file watcher with debouncing and validation
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    event_receiver: Receiver<ConfigEvent>,
    watched_path: PathBuf,
}

impl ConfigWatcher {
    /// Watch a settings file, or every `.toml` file in a directory.
    ///
    /// `debounce_ms` defaults to [`DEFAULT_DEBOUNCE_MS`].
    pub fn new<P: AsRef<Path>>(path: P, debounce_ms: Option<u64>) -> Result<Self> {
        let watched_path = path.as_ref().to_path_buf();
        let debounce = Duration::from_millis(debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS));

        let (event_tx, event_rx): (Sender<ConfigEvent>, Receiver<ConfigEvent>) = mpsc::channel();
        let (notify_tx, notify_rx): (Sender<Event>, Receiver<Event>) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let _ = notify_tx.send(event);
                }
                Err(e) => warn!(error = %e, "file watcher error"),
            },
            Config::default(),
        )?;

        let mode = if watched_path.is_dir() {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };

        watcher.watch(&watched_path, mode)?;

        info!(path = ?watched_path, debounce_ms = debounce.as_millis() as u64, "watching settings");

        let root = watched_path.clone();
        std::thread::spawn(move || debounce_loop(root, debounce, notify_rx, event_tx));

        Ok(Self {
            _watcher: watcher,
            event_receiver: event_rx,
            watched_path,
        })
    }

    /// Try to receive the next config event (non-blocking)
    pub fn try_recv(&self) -> Option<ConfigEvent> {
        self.event_receiver.try_recv().ok()
    }

    /// Receive all pending config events
    pub fn recv_all(&self) -> Vec<ConfigEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_recv() {
            events.push(event);
        }
        events
    }

    /// Block until the next config event is received
    pub fn recv(&self) -> Option<ConfigEvent> {
        self.event_receiver.recv().ok()
    }

    /// Block for at most `timeout` waiting for an event
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ConfigEvent> {
        self.event_receiver.recv_timeout(timeout).ok()
    }

    /// Get the path being watched
    pub fn watched_path(&self) -> &Path {
        &self.watched_path
    }
}

fn debounce_loop(
    root: PathBuf,
    debounce: Duration,
    notify_rx: Receiver<Event>,
    event_tx: Sender<ConfigEvent>,
) {
    let mut last_event_time: Option<Instant> = None;
    let mut pending_paths: Vec<PathBuf> = Vec::new();

    loop {
        match notify_rx.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => match event.kind {
                EventKind::Create(_) => {
                    for path in event.paths {
                        let _ = event_tx.send(ConfigEvent::FileCreated(path));
                    }
                }
                EventKind::Remove(_) => {
                    for path in event.paths {
                        let _ = event_tx.send(ConfigEvent::FileDeleted(path));
                    }
                }
                EventKind::Modify(_) => {
                    for path in event.paths {
                        if !pending_paths.contains(&path) {
                            pending_paths.push(path);
                        }
                    }
                    last_event_time = Some(Instant::now());
                }
                _ => {}
            },
            Err(mpsc::RecvTimeoutError::Timeout) => {
                let settled = last_event_time.is_some_and(|t| t.elapsed() >= debounce);
                if !settled {
                    continue;
                }

                for path in pending_paths.drain(..) {
                    if !is_settings_file(&path, &root) {
                        continue;
                    }

                    let event = match Settings::load(&path) {
                        Ok(settings) => {
                            debug!(?path, "settings reloaded");
                            ConfigEvent::Reloaded(Box::new(settings))
                        }
                        Err(e) => {
                            warn!(?path, error = %e, "settings reload failed");
                            let e = anyhow::Error::from(e);
                            ConfigEvent::Error(format!("Failed to load {:?}: {:#}", path, e))
                        }
                    };
                    let _ = event_tx.send(event);
                }
                last_event_time = None;
            }
            // Watcher was dropped
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
}

/// `.toml` files, or the watched path itself
fn is_settings_file(path: &Path, root: &Path) -> bool {
    match path.extension() {
        Some(ext) => ext == "toml",
        None => path == root,
    }
}

/// Load and validate a settings file without applying it
pub fn validate_config<P: AsRef<Path>>(path: P) -> Result<Settings> {
    Settings::load(path)
}
