//! File-backed store, the production binding for the device agent's files.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

// Traits must be in scope for `.read_until()` on `BufReader` and `.write_all()` on `File`.
use io::{BufRead, Write};

use crate::model::CommandEvent;

use super::{Artifact, CommandStore, Result, StorageError};

/// Where each artifact lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    pub log: PathBuf,
    pub audit: PathBuf,
    pub mirror: PathBuf,
    pub actual: PathBuf,
    pub lock: PathBuf,
}

impl StorePaths {
    /// The default layout rooted at `data_dir`.
    ///
    /// The mirror and actual-state files sit in the parent directory, where
    /// the device agent looks for them.
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        let shared = data_dir.parent().unwrap_or(data_dir);
        Self {
            log: data_dir.join("controlstate.txt"),
            audit: data_dir.join("controllog.txt"),
            mirror: shared.join("mirrorstate.txt"),
            actual: shared.join("actualstate.txt"),
            lock: data_dir.join(".sprinkler.lock"),
        }
    }
}

/// Local file-based storage.
///
/// Serialization uses an advisory OS lock on a dedicated lock file, so it
/// holds across threads and across separate `sprinkler` processes.
pub struct FileStore {
    paths: StorePaths,
}

impl FileStore {
    /// Creates a store over the given paths.
    ///
    /// Nothing is touched on disk until the first write, so a reader with
    /// read-only access to the data directory can still use the store.
    pub fn new(paths: StorePaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    fn open_write_lock(&self) -> Result<fs::File> {
        let open = || -> io::Result<fs::File> {
            create_parent(&self.paths.lock)?;
            fs::OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(&self.paths.lock)
        };
        open().map_err(|source| StorageError::Write {
            artifact: Artifact::Lock,
            source,
        })
    }

    /// Opens the lock file for a shared lock, `None` if no writer ever
    /// created it.
    fn open_read_lock(&self) -> Result<Option<fs::File>> {
        match fs::File::open(&self.paths.lock) {
            Ok(file) => Ok(Some(file)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read {
                artifact: Artifact::Lock,
                source,
            }),
        }
    }

    fn append(artifact: Artifact, path: &Path, line: &str) -> Result<()> {
        let write = || -> io::Result<()> {
            create_parent(path)?;
            let mut file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            file.write_all(line.as_bytes())
        };
        write().map_err(|source| StorageError::Write { artifact, source })
    }
}

impl CommandStore for FileStore {
    fn append_log(&self, event: &CommandEvent) -> Result<()> {
        Self::append(Artifact::CommandLog, &self.paths.log, &event.log_line())
    }

    fn overwrite_mirror(&self, event: &CommandEvent) -> Result<()> {
        // Write beside the target and rename over it, so the device agent
        // sees either the old line or the new one.
        let mut tmp = self.paths.mirror.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        create_parent(&tmp)
            .and_then(|()| fs::write(&tmp, event.mirror_line()))
            .and_then(|()| fs::rename(&tmp, &self.paths.mirror))
            .map_err(|source| StorageError::Write {
                artifact: Artifact::MirrorState,
                source,
            })
    }

    fn append_audit(&self, event: &CommandEvent) -> Result<()> {
        Self::append(Artifact::AuditTrail, &self.paths.audit, &event.audit_line())
    }

    fn read_log(&self) -> Result<Option<String>> {
        // Decoded lossily: a corrupt byte spoils its own record, not the log.
        match fs::read(&self.paths.log) {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read {
                artifact: Artifact::CommandLog,
                source,
            }),
        }
    }

    fn read_actual_state(&self) -> Result<Option<String>> {
        let file = match fs::File::open(&self.paths.actual) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StorageError::Read {
                    artifact: Artifact::ActualState,
                    source,
                });
            }
        };
        let mut line = Vec::new();
        io::BufReader::new(file)
            .read_until(b'\n', &mut line)
            .map_err(|source| StorageError::Read {
                artifact: Artifact::ActualState,
                source,
            })?;
        Ok(Some(String::from_utf8_lossy(&line).into_owned()))
    }

    fn with_write_lock<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        let lock = self.open_write_lock()?;
        lock.lock().map_err(|source| StorageError::Write {
            artifact: Artifact::Lock,
            source,
        })?;
        // Closing the file releases the lock.
        let result = f(self);
        drop(lock);
        result
    }

    fn with_read_lock<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        // No lock file means no writer has run yet.
        let lock = self.open_read_lock()?;
        if let Some(lock) = &lock {
            lock.lock_shared().map_err(|source| StorageError::Read {
                artifact: Artifact::Lock,
                source,
            })?;
        }
        let result = f(self);
        drop(lock);
        result
    }
}

fn create_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir),
        _ => Ok(()),
    }
}
