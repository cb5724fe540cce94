//! Persistence for the command log, mirror file and audit trail.
//!
//! The default on-disk layout keeps the controller's own files in the data
//! directory and the two files shared with the device agent one level up:
//!
//! ```text
//! <data-dir>/../mirrorstate.txt  # Current command, polled by the device agent
//! <data-dir>/../actualstate.txt  # Written by the device agent, read-only here
//! <data-dir>/controlstate.txt    # Append-only command log
//! <data-dir>/controllog.txt      # Append-only audit trail
//! <data-dir>/.sprinkler.lock     # Writer/reader serialization
//! ```

mod file;
mod memory;

use std::{fmt, io};

use crate::model::CommandEvent;

pub use file::{FileStore, StorePaths};
pub use memory::MemoryStore;

/// The persisted artifacts the core touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    CommandLog,
    MirrorState,
    AuditTrail,
    ActualState,
    Lock,
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CommandLog => "command log",
            Self::MirrorState => "mirror state",
            Self::AuditTrail => "audit trail",
            Self::ActualState => "actual state",
            Self::Lock => "lock file",
        })
    }
}

/// Errors that can occur during storage operations.
///
/// A missing command log or actual-state file is not an error; reads report
/// it as `None`.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to write {artifact}: {source}")]
    Write { artifact: Artifact, source: io::Error },

    #[error("failed to read {artifact}: {source}")]
    Read { artifact: Artifact, source: io::Error },
}

impl StorageError {
    /// The artifact the failed operation was touching.
    pub fn artifact(&self) -> Artifact {
        match self {
            Self::Write { artifact, .. } | Self::Read { artifact, .. } => *artifact,
        }
    }
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// Storage seam between the controller and wherever the artifacts live.
///
/// Writers hold the write lock across all of a command's writes; readers of
/// the command log hold the read lock. The actual-state file belongs to
/// another process and is read without locking.
pub trait CommandStore {
    /// Appends `<state> <date>` to the command log, creating it if absent.
    fn append_log(&self, event: &CommandEvent) -> Result<()>;

    /// Replaces the mirror file with `<state>,<date>,<time>`.
    fn overwrite_mirror(&self, event: &CommandEvent) -> Result<()>;

    /// Appends `ADD <state> <date>,<time>` to the audit trail.
    fn append_audit(&self, event: &CommandEvent) -> Result<()>;

    /// Full command log contents, `None` if no command was ever recorded.
    fn read_log(&self) -> Result<Option<String>>;

    /// First line of the actual-state file, `None` if the agent never wrote it.
    fn read_actual_state(&self) -> Result<Option<String>>;

    /// Runs `f` while holding the exclusive writer lock.
    fn with_write_lock<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T>
    where
        Self: Sized;

    /// Runs `f` while holding a shared reader lock.
    fn with_read_lock<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T>
    where
        Self: Sized;
}
