//! In-memory store for tests and embedding.

use std::{
    io,
    sync::{Mutex, MutexGuard, PoisonError, RwLock},
};

use crate::model::CommandEvent;

use super::{Artifact, CommandStore, Result, StorageError};

#[derive(Debug, Default)]
struct Artifacts {
    log: Option<String>,
    mirror: Option<String>,
    audit: Option<String>,
    actual: Option<String>,
    failing: Option<Artifact>,
}

/// Keeps every artifact in memory with the same lock discipline as
/// [`FileStore`](super::FileStore).
#[derive(Debug, Default)]
pub struct MemoryStore {
    lock: RwLock<()>,
    artifacts: Mutex<Artifacts>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the command log, as if an earlier deployment had written it.
    pub fn set_log(&self, contents: impl Into<String>) {
        self.artifacts().log = Some(contents.into());
    }

    /// Publishes an actual-state line, as the device agent would.
    pub fn set_actual_state(&self, line: impl Into<String>) {
        self.artifacts().actual = Some(line.into());
    }

    /// Makes every subsequent write to `artifact` fail.
    pub fn fail_writes_to(&self, artifact: Artifact) {
        self.artifacts().failing = Some(artifact);
    }

    pub fn log(&self) -> Option<String> {
        self.artifacts().log.clone()
    }

    pub fn mirror(&self) -> Option<String> {
        self.artifacts().mirror.clone()
    }

    pub fn audit(&self) -> Option<String> {
        self.artifacts().audit.clone()
    }

    fn artifacts(&self) -> MutexGuard<'_, Artifacts> {
        self.artifacts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, artifact: Artifact, apply: impl FnOnce(&mut Artifacts)) -> Result<()> {
        let mut artifacts = self.artifacts();
        if artifacts.failing == Some(artifact) {
            return Err(StorageError::Write {
                artifact,
                source: io::Error::other("injected write failure"),
            });
        }
        apply(&mut artifacts);
        Ok(())
    }
}

impl CommandStore for MemoryStore {
    fn append_log(&self, event: &CommandEvent) -> Result<()> {
        self.write(Artifact::CommandLog, |a| {
            a.log.get_or_insert_default().push_str(&event.log_line());
        })
    }

    fn overwrite_mirror(&self, event: &CommandEvent) -> Result<()> {
        self.write(Artifact::MirrorState, |a| {
            a.mirror = Some(event.mirror_line());
        })
    }

    fn append_audit(&self, event: &CommandEvent) -> Result<()> {
        self.write(Artifact::AuditTrail, |a| {
            a.audit.get_or_insert_default().push_str(&event.audit_line());
        })
    }

    fn read_log(&self) -> Result<Option<String>> {
        Ok(self.log())
    }

    fn read_actual_state(&self) -> Result<Option<String>> {
        Ok(self
            .artifacts()
            .actual
            .as_deref()
            .map(|s| s.lines().next().unwrap_or_default().to_string()))
    }

    fn with_write_lock<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        let _guard = self.lock.write().unwrap_or_else(PoisonError::into_inner);
        f(self)
    }

    fn with_read_lock<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        let _guard = self.lock.read().unwrap_or_else(PoisonError::into_inner);
        f(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::date;

    use crate::model::Command;

    fn event(command: Command) -> CommandEvent {
        CommandEvent::new(command, date(2024, 6, 1).at(8, 0, 0, 0))
    }

    #[test]
    fn starts_empty() {
        let store = MemoryStore::new();

        assert_eq!(store.read_log().unwrap(), None);
        assert_eq!(store.read_actual_state().unwrap(), None);
        assert_eq!(store.mirror(), None);
    }

    #[test]
    fn records_the_same_formats_as_files() {
        let store = MemoryStore::new();
        let event = event(Command::Standby);

        store.append_log(&event).unwrap();
        store.overwrite_mirror(&event).unwrap();
        store.append_audit(&event).unwrap();

        assert_eq!(store.log().unwrap(), "Standby 2024-06-01\n");
        assert_eq!(store.mirror().unwrap(), "Standby,2024-06-01,08:00:00\n");
        assert_eq!(store.audit().unwrap(), "ADD Standby 2024-06-01,08:00:00\n");
    }

    #[test]
    fn injected_failure_leaves_artifact_untouched() {
        let store = MemoryStore::new();
        store.fail_writes_to(Artifact::MirrorState);

        let err = store.overwrite_mirror(&event(Command::Alert)).unwrap_err();

        assert_eq!(err.artifact(), Artifact::MirrorState);
        assert_eq!(store.mirror(), None);
    }
}
