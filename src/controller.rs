//! Command controller: turns one operator command into the three writes
//! the rest of the system depends on.
//!
//! For every accepted command, in order:
//!
//! 1. append `<state> <date>` to the command log,
//! 2. replace the mirror file with `<state>,<date>,<time>`,
//! 3. append `ADD <state> <date>,<time>` to the audit trail.
//!
//! All three run under the store's write lock, so concurrent submits never
//! interleave. There is no rollback: if a write fails the earlier ones stay,
//! and the error names the artifact that failed.

use jiff::civil::DateTime;

use crate::{
    model::{Command, CommandEvent},
    storage::{CommandStore, StorageError},
};

/// Errors surfaced by the controller.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// No reversal semantics are defined for the command log yet.
    #[error("undo not yet implemented")]
    UndoUnsupported,
}

pub type Result<T> = core::result::Result<T, ControllerError>;

/// Accepts operator commands and records them through a [`CommandStore`].
pub struct Controller<S> {
    store: S,
}

impl<S: CommandStore> Controller<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Submits a command by name.
    ///
    /// Empty or unrecognized names are a no-op: nothing is written and
    /// `Ok(None)` is returned.
    pub fn submit(&self, name: &str, now: DateTime) -> Result<Option<CommandEvent>> {
        let Some(command) = Command::parse(name) else {
            tracing::debug!(name, "ignoring unrecognized command");
            return Ok(None);
        };
        self.submit_command(command, now).map(Some)
    }

    /// Records `command` as of `now`.
    pub fn submit_command(&self, command: Command, now: DateTime) -> Result<CommandEvent> {
        let event = CommandEvent::new(command, now);

        self.store
            .with_write_lock(|store| {
                store.append_log(&event)?;
                store.overwrite_mirror(&event)?;
                store.append_audit(&event)
            })
            .inspect_err(|e| {
                tracing::error!(
                    %command,
                    artifact = %e.artifact(),
                    error = %e,
                    "command only partially recorded"
                );
            })?;

        tracing::info!(%command, at = %event.at, "command accepted");
        Ok(event)
    }

    /// Reverting the last command is not supported.
    pub fn undo(&self) -> Result<()> {
        Err(ControllerError::UndoUnsupported)
    }
}
