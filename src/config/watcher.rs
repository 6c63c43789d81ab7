//! Hot reload of the edge config file.
//!
//! # Design Decisions
//! - The parent directory is watched, not the file: editors and deploy tools
//!   save by writing a sibling and renaming it over the original, which
//!   detaches a watch placed on the file's inode
//! - Events for other files in the directory are ignored
//! - A reload that parses to the config already sent is not sent again, so
//!   the several events one save produces collapse into one update
//! - Invalid files are logged and skipped; the server keeps its current rule

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::EdgeConfig;

/// Watches one config file and emits each new valid `EdgeConfig`.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<EdgeConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiver the server drains for updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<EdgeConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. Updates stop when the returned handle is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let file_name = self
            .path
            .file_name()
            .map(OsString::from)
            .ok_or_else(|| notify::Error::generic("config path has no file name"))?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let tx = self.update_tx;
        let path = self.path.clone();
        let mut last_sent: Option<EdgeConfig> = None;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::error!(error = ?e, "Config watch error");
                        return;
                    }
                };
                if !touches_file(&event, &file_name) {
                    return;
                }

                match load_config(&path) {
                    Ok(config) if last_sent.as_ref() == Some(&config) => {}
                    Ok(config) => {
                        tracing::info!(path = ?path, "Config file changed, reloading");
                        last_sent = Some(config.clone());
                        let _ = tx.send(config);
                    }
                    Err(e) => tracing::warn!(
                        path = ?path,
                        error = %e,
                        "Ignoring config change, keeping current rule"
                    ),
                }
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::info!(path = ?self.path, dir = ?dir, "Config watcher started");
        Ok(watcher)
    }
}

/// Whether `event` writes or renames into the watched file name.
fn touches_file(event: &Event, file_name: &OsString) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name.as_os_str()))
}
