//! # Sink Directory Manager
//!
//! Owns the set of open log files. Every day gets its own directory,
//! `root/YYYY/MM/DD/`, holding one append-only `<name>.log` per known severity
//! plus `event.log`. The whole set is replaced when the day rolls over; a
//! custom severity gets its file as soon as it is registered.
//!
//! Failures here are returned to the dispatch engine, which reports them on the
//! console and keeps logging against whatever set is still installed.

use chrono::{Datelike, NaiveDate};
use futures_util::future::join_all;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::error::LoggrError;
use super::severity::SeverityRegistry;

/// One append-only log file.
pub struct FileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl fmt::Debug for FileSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSink").field("path", &self.path).finish()
    }
}

impl FileSink {
    /// Opens `path` for appending, creating it if needed.
    pub async fn open(path: PathBuf) -> Result<Self, LoggrError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| LoggrError::io(&path, e))?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Appends `text` verbatim and flushes.
    pub async fn append(&self, text: &str) -> Result<(), LoggrError> {
        let mut file = self.file.lock().await;
        file.write_all(text.as_bytes())
            .await
            .map_err(|e| LoggrError::io(&self.path, e))?;
        file.flush().await.map_err(|e| LoggrError::io(&self.path, e))
    }

    /// Location of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// # Sink Set
///
/// The open sinks of one day directory, keyed by sink name. An empty set with
/// no directory is what the logger holds before its first successful start.
#[derive(Debug, Clone, Default)]
pub struct SinkSet {
    dir: Option<PathBuf>,
    sinks: HashMap<String, Arc<FileSink>>,
}

impl SinkSet {
    /// Day directory the sinks live in, if any.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Sink by name.
    pub fn get(&self, name: &str) -> Option<Arc<FileSink>> {
        self.sinks.get(name).cloned()
    }

    /// True if a sink with this name is open.
    pub fn contains(&self, name: &str) -> bool {
        self.sinks.contains_key(name)
    }

    /// Names of the open sinks, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sinks.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of open sinks.
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// True when nothing is open.
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

/// `root/YYYY/MM/DD` for `day`.
pub fn day_dir(root: &Path, day: NaiveDate) -> PathBuf {
    root.join(format!("{:04}", day.year()))
        .join(format!("{:02}", day.month()))
        .join(format!("{:02}", day.day()))
}

/// Custom sink names must be usable as plain file names.
pub fn validate_sink_name(name: &str) -> Result<(), LoggrError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(LoggrError::InvalidSinkName(name.to_string()))
    }
}

/// Creates day directories, opens sink sets and holds the installed set.
#[derive(Debug)]
pub struct SinkDirectoryManager {
    root: PathBuf,
    current: RwLock<Arc<SinkSet>>,
}

impl SinkDirectoryManager {
    /// Creates a manager for `root` with nothing open yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            current: RwLock::new(Arc::new(SinkSet::default())),
        }
    }

    /// Log root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Snapshot of the installed set. Lookups by name always go through a
    /// fresh snapshot, so a set replaced by rotation is never written to again
    /// by later calls.
    pub fn current(&self) -> Arc<SinkSet> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Replaces the installed set. The previous handles are closed once the
    /// last in-flight write holding them finishes.
    pub fn install(&self, set: SinkSet) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(set);
    }

    /// # Ensure Directory
    ///
    /// Creates whatever segments of `root/YYYY/MM/DD/` are missing. Existing
    /// segments are fine; only a real filesystem failure is an error.
    pub async fn ensure_directory(&self, day: NaiveDate) -> Result<PathBuf, LoggrError> {
        let dir = day_dir(&self.root, day);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| LoggrError::io(&dir, e))?;
        Ok(dir)
    }

    /// # Open Sinks
    ///
    /// Opens `dir/<name>.log` for every name. All files are opened
    /// concurrently; if any of them fails the whole set is discarded and the
    /// first error is returned, leaving the caller with its previous set.
    pub async fn open_sinks(&self, dir: &Path, names: &[String]) -> Result<SinkSet, LoggrError> {
        let opened = join_all(names.iter().map(|name| async move {
            let sink = FileSink::open(sink_path(dir, name)).await?;
            Ok::<_, LoggrError>((name.clone(), Arc::new(sink)))
        }))
        .await;

        let sinks = opened.into_iter().collect::<Result<HashMap<_, _>, _>>()?;
        log::debug!("Opened {} sinks in {}", sinks.len(), dir.display());
        Ok(SinkSet {
            dir: Some(dir.to_path_buf()),
            sinks,
        })
    }

    /// # Register New Severity
    ///
    /// Adds `name` to the known severities and opens its sink in the current
    /// day directory straight away. Registering a name twice opens nothing new.
    /// Before the first successful start there is no directory yet; the sink is
    /// then opened together with the others on the next rotation.
    ///
    /// Returns `true` when a new severity was registered.
    pub async fn register_new_severity(
        &self,
        name: &str,
        registry: &RwLock<SeverityRegistry>,
    ) -> Result<bool, LoggrError> {
        validate_sink_name(name)?;
        let (added, is_sink) = {
            let mut registry = registry.write().unwrap_or_else(PoisonError::into_inner);
            let added = registry.register(name);
            (added, registry.is_sink(name))
        };
        // `default` is a severity without a file of its own.
        if !is_sink {
            return Ok(added);
        }

        self.fill_missing(&[name.to_string()]).await?;
        Ok(added)
    }

    /// # Fill Missing
    ///
    /// Opens every sink in `names` that the installed set lacks, in the
    /// installed set's directory, and adds it copy-on-write. If a rotation
    /// installs a newer set while the files are opening, the work is redone
    /// against that set. Returns how many sinks were added; nothing is opened
    /// before the first successful start.
    pub async fn fill_missing(&self, names: &[String]) -> Result<usize, LoggrError> {
        loop {
            let snapshot = self.current();
            let Some(dir) = snapshot.dir() else {
                return Ok(0);
            };
            let missing: Vec<String> = names
                .iter()
                .filter(|name| !snapshot.contains(name))
                .cloned()
                .collect();
            if missing.is_empty() {
                return Ok(0);
            }

            let opened = self.open_sinks(dir, &missing).await?;
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            if current.dir() != Some(dir) {
                continue;
            }
            let mut next = SinkSet::clone(&current);
            let mut added = 0;
            for (name, sink) in opened.sinks {
                if !next.contains(&name) {
                    log::debug!("Added sink {} in {}", name, dir.display());
                    next.sinks.insert(name, sink);
                    added += 1;
                }
            }
            *current = Arc::new(next);
            return Ok(added);
        }
    }
}

fn sink_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.log", name))
}
