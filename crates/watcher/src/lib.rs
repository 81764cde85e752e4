//! Filesystem change source for mirrorwatch
//!
//! Wraps the platform notification mechanism (inotify, FSEvents, ...) behind
//! a crossbeam channel of [`ChangeEvent`]s. Raw notify events are mapped to
//! the four change kinds the rest of the system cares about, and events whose
//! paths match the configured exclude patterns are dropped here so they never
//! wake the scheduler for files rsync would skip anyway.

pub mod filter;
pub mod ticker;

use crossbeam_channel::{unbounded, Receiver};
use notify::event::ModifyKind;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

pub use filter::EventFilter;
pub use ticker::{IntervalTicker, TickerHandle};

/// Errors raised while setting up the filesystem watcher
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to watch {path}: {source}")]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("invalid exclude pattern: {0}")]
    Pattern(#[from] ignore::Error),
}

/// Kind of filesystem change observed in the watched tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Deleted,
    Modified,
    Renamed,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Created => "created",
            ChangeKind::Deleted => "deleted",
            ChangeKind::Modified => "modified",
            ChangeKind::Renamed => "renamed",
        };
        f.write_str(s)
    }
}

/// One observed change; renames carry both the old and new path
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub paths: Vec<PathBuf>,
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.kind)?;
        for (i, path) in self.paths.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{}", path.display())?;
        }
        Ok(())
    }
}

/// Recursive watcher over one directory tree
///
/// Holds the platform watcher alive; dropping this stops event delivery and
/// disconnects the channel.
pub struct ChangeWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<ChangeEvent>,
}

impl ChangeWatcher {
    /// Start watching `root` recursively
    pub fn start(root: &Path, filter: EventFilter) -> Result<Self, WatchError> {
        let (tx, rx) = unbounded();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    if let Some(change) = map_event(&event, &filter) {
                        // Receiver gone means we are shutting down
                        let _ = tx.send(change);
                    }
                }
                Err(e) => warn!("watch error: {e}"),
            }
        })
        .map_err(|source| WatchError::Watch {
            path: root.to_path_buf(),
            source,
        })?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(|source| WatchError::Watch {
                path: root.to_path_buf(),
                source,
            })?;

        Ok(Self {
            _watcher: watcher,
            rx,
        })
    }

    /// Channel of filtered change events
    pub fn events(&self) -> &Receiver<ChangeEvent> {
        &self.rx
    }
}

/// Map a raw notify event to a [`ChangeEvent`], dropping excluded paths
fn map_event(event: &notify::Event, filter: &EventFilter) -> Option<ChangeEvent> {
    let kind = map_kind(&event.kind)?;

    // A rename out of an excluded path into an included one still matters,
    // so the event survives as long as any of its paths is not excluded
    if !event.paths.is_empty() && event.paths.iter().all(|p| filter.is_excluded(p)) {
        return None;
    }

    Some(ChangeEvent {
        kind,
        paths: event.paths.clone(),
    })
}

fn map_kind(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Created),
        EventKind::Remove(_) => Some(ChangeKind::Deleted),
        EventKind::Modify(ModifyKind::Name(_)) => Some(ChangeKind::Renamed),
        EventKind::Modify(_) => Some(ChangeKind::Modified),
        // Catch-all kinds from backends that cannot classify; treat as a
        // modification so a sync still happens
        EventKind::Any | EventKind::Other => Some(ChangeKind::Modified),
        // Reads never change the tree
        EventKind::Access(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind, RenameMode};
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn raw_event(kind: EventKind, paths: Vec<PathBuf>) -> notify::Event {
        let mut event = notify::Event::new(kind);
        event.paths = paths;
        event
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            map_kind(&EventKind::Create(CreateKind::File)),
            Some(ChangeKind::Created)
        );
        assert_eq!(
            map_kind(&EventKind::Remove(RemoveKind::Any)),
            Some(ChangeKind::Deleted)
        );
        assert_eq!(
            map_kind(&EventKind::Modify(ModifyKind::Data(
                notify::event::DataChange::Content
            ))),
            Some(ChangeKind::Modified)
        );
        assert_eq!(
            map_kind(&EventKind::Modify(ModifyKind::Name(RenameMode::Both))),
            Some(ChangeKind::Renamed)
        );
        assert_eq!(map_kind(&EventKind::Access(AccessKind::Any)), None);
        assert_eq!(map_kind(&EventKind::Any), Some(ChangeKind::Modified));
    }

    #[test]
    fn test_excluded_event_dropped() {
        let root = PathBuf::from("/tree");
        let filter = EventFilter::new(&root, &[".git".to_string()], &[]).unwrap();

        let event = raw_event(
            EventKind::Create(CreateKind::File),
            vec![root.join(".git/index.lock")],
        );
        assert!(map_event(&event, &filter).is_none());

        let event = raw_event(
            EventKind::Create(CreateKind::File),
            vec![root.join("src/main.rs")],
        );
        assert!(map_event(&event, &filter).is_some());
    }

    #[test]
    fn test_rename_across_exclusion_boundary_kept() {
        let root = PathBuf::from("/tree");
        let filter = EventFilter::new(&root, &["*.tmp".to_string()], &[]).unwrap();

        let event = raw_event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            vec![root.join("upload.tmp"), root.join("upload.bin")],
        );
        let change = map_event(&event, &filter).unwrap();
        assert_eq!(change.kind, ChangeKind::Renamed);
        assert_eq!(change.paths.len(), 2);
    }

    #[test]
    fn test_event_display() {
        let change = ChangeEvent {
            kind: ChangeKind::Renamed,
            paths: vec![PathBuf::from("/a/old"), PathBuf::from("/a/new")],
        };
        assert_eq!(change.to_string(), "renamed: /a/old -> /a/new");
    }

    #[test]
    fn test_watcher_delivers_create_events() {
        let dir = TempDir::new().unwrap();
        let filter = EventFilter::new(dir.path(), &[], &[]).unwrap();
        let watcher = ChangeWatcher::start(dir.path(), filter).unwrap();

        fs::write(dir.path().join("hello.txt"), b"hi").unwrap();

        let event = watcher
            .events()
            .recv_timeout(Duration::from_secs(5))
            .expect("no event for created file");
        assert!(event.paths.iter().any(|p| p.ends_with("hello.txt")));
    }

    #[test]
    fn test_watcher_filters_excluded_paths() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("skip")).unwrap();

        let filter = EventFilter::new(dir.path(), &["skip".to_string()], &[]).unwrap();
        let watcher = ChangeWatcher::start(dir.path(), filter).unwrap();

        // Touch an excluded file first, then an included one; the first
        // event that arrives must be for the included path
        fs::write(dir.path().join("skip/ignored.txt"), b"x").unwrap();
        fs::write(dir.path().join("kept.txt"), b"y").unwrap();

        let event = watcher
            .events()
            .recv_timeout(Duration::from_secs(5))
            .expect("no event for included file");
        assert!(
            event.paths.iter().any(|p| p.ends_with("kept.txt")),
            "unexpected event: {event}"
        );
    }
}
