//! Command events and their on-disk renderings.

use std::fmt;

use jiff::civil::{Date, DateTime};
use serde::Serialize;

use super::Command;

/// One accepted command, stamped with a single capture of `now`.
///
/// The command log, the mirror file and the audit trail are all rendered
/// from the same event so they can never disagree on the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEvent {
    pub command: Command,
    pub at: DateTime,
}

impl CommandEvent {
    pub fn new(command: Command, at: DateTime) -> Self {
        Self { command, at }
    }

    /// `YYYY-MM-DD`
    pub fn date(&self) -> String {
        self.at.strftime("%Y-%m-%d").to_string()
    }

    /// `HH:MM:SS`, sub-second precision is dropped.
    pub fn time(&self) -> String {
        self.at.strftime("%H:%M:%S").to_string()
    }

    /// Command log line: `<state> <date>`.
    pub fn log_line(&self) -> String {
        format!("{} {}\n", self.command, self.date())
    }

    /// Mirror file line: `<state>,<date>,<time>`.
    pub fn mirror_line(&self) -> String {
        format!("{},{},{}\n", self.command, self.date(), self.time())
    }

    /// Audit trail line: `ADD <state> <date>,<time>`.
    pub fn audit_line(&self) -> String {
        format!("ADD {} {},{}\n", self.command, self.date(), self.time())
    }
}

/// A single command log record as read back for history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    pub command: Command,
    pub date: Date,
}

impl LogRecord {
    /// Parses a `<state> <date>` line.
    ///
    /// Returns `None` when the line has no separator, names an unknown
    /// command, or carries an invalid date.
    pub fn parse(line: &str) -> Option<Self> {
        let (state, date) = line.trim_end().split_once(' ')?;
        Some(Self {
            command: Command::parse(state)?,
            date: date.trim().parse().ok()?,
        })
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.command)
    }
}
