//! History reconstruction: replays the command log for display.
//!
//! The last record in the log is the current command. Everything before it
//! is history and is shown most recent first.

use serde::Serialize;

use crate::{
    model::{Command, LogRecord},
    storage::{CommandStore, Result},
};

/// The command log as seen by an operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum History {
    /// No command log exists yet. Not an error.
    NotYetInitialized,

    /// At least the log file exists.
    Recorded {
        /// The most recent record, `None` if the log is empty or its last
        /// line is malformed.
        current: Option<LogRecord>,

        /// Records before the current one, most recent first.
        past: Vec<LogRecord>,

        /// Malformed lines left out of `current` and `past`.
        skipped: usize,
    },
}

/// Reads the command log under the store's read lock and rebuilds history.
pub fn render<S: CommandStore>(store: &S) -> Result<History> {
    let log = store.with_read_lock(|s| s.read_log())?;
    Ok(log.map_or(History::NotYetInitialized, |log| History::from_log(&log)))
}

impl History {
    /// Rebuilds history from raw command log contents.
    ///
    /// Blank lines are ignored. Malformed lines are counted and skipped
    /// without stopping the replay.
    pub fn from_log(log: &str) -> Self {
        let mut lines: Vec<&str> = log.lines().filter(|l| !l.trim().is_empty()).collect();
        let mut skipped = 0;

        let current = lines
            .pop()
            .and_then(|line| parse_record(line, &mut skipped));
        let past = lines
            .into_iter()
            .rev()
            .filter_map(|line| parse_record(line, &mut skipped))
            .collect();

        Self::Recorded {
            current,
            past,
            skipped,
        }
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self, Self::Recorded { .. })
    }

    pub fn current(&self) -> Option<&LogRecord> {
        match self {
            Self::NotYetInitialized => None,
            Self::Recorded { current, .. } => current.as_ref(),
        }
    }

    /// Past records, most recent first. Excludes the current record.
    pub fn past(&self) -> &[LogRecord] {
        match self {
            Self::NotYetInitialized => &[],
            Self::Recorded { past, .. } => past,
        }
    }

    pub fn skipped(&self) -> usize {
        match self {
            Self::NotYetInitialized => 0,
            Self::Recorded { skipped, .. } => *skipped,
        }
    }

    /// Past records rendered as `<date> <state>`, most recent first.
    pub fn lines(&self) -> Vec<String> {
        self.past().iter().map(ToString::to_string).collect()
    }

    /// How often each command was issued, current record included.
    ///
    /// Commands never issued are omitted.
    pub fn totals(&self) -> Vec<(Command, usize)> {
        let records: Vec<&LogRecord> = self.current().into_iter().chain(self.past()).collect();
        Command::ALL
            .into_iter()
            .map(|command| {
                let count = records.iter().filter(|r| r.command == command).count();
                (command, count)
            })
            .filter(|&(_, count)| count > 0)
            .collect()
    }
}

fn parse_record(line: &str, skipped: &mut usize) -> Option<LogRecord> {
    let record = LogRecord::parse(line);
    if record.is_none() {
        *skipped += 1;
        tracing::warn!(line, "skipping malformed command log record");
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::{
        fs,
        sync::atomic::{AtomicBool, Ordering},
        thread,
    };

    use jiff::civil::date;
    use tempfile::TempDir;

    use crate::{
        controller::Controller,
        storage::{FileStore, MemoryStore, StorePaths},
    };

    fn record(command: Command, day: i8) -> LogRecord {
        LogRecord {
            command,
            date: date(2024, 6, day),
        }
    }

    #[test]
    fn absent_log_is_not_yet_initialized() {
        let history = render(&MemoryStore::new()).unwrap();

        assert_eq!(history, History::NotYetInitialized);
        assert!(!history.is_initialized());
        assert!(history.lines().is_empty());
    }

    #[test]
    fn single_record_is_current_with_empty_history() {
        let history = History::from_log("Standby 2024-06-01\n");

        assert!(history.is_initialized());
        assert_eq!(history.current(), Some(&record(Command::Standby, 1)));
        assert!(history.lines().is_empty());
    }

    #[test]
    fn past_records_are_reverse_chronological() {
        let history = History::from_log(
            "Standby 2024-06-01\nProtect 2024-06-02\nAllOn 2024-06-03\nAlert 2024-06-04\n",
        );

        assert_eq!(history.current(), Some(&record(Command::Alert, 4)));
        assert_eq!(
            history.lines(),
            vec!["2024-06-03 AllOn", "2024-06-02 Protect", "2024-06-01 Standby"]
        );
    }

    #[test]
    fn malformed_lines_are_skipped_not_fatal() {
        let history = History::from_log(
            "Standby 2024-06-01\ngarbage\nProtect 2024-06-02\nAlert not-a-date\nAllOn 2024-06-03\n",
        );

        assert_eq!(history.skipped(), 2);
        assert_eq!(history.current(), Some(&record(Command::AllOn, 3)));
        assert_eq!(
            history.lines(),
            vec!["2024-06-02 Protect", "2024-06-01 Standby"]
        );
    }

    #[test]
    fn corrupt_bytes_spoil_only_their_record() {
        let dir = TempDir::new().unwrap();
        let paths = StorePaths::in_dir(dir.path().join("controller"));
        fs::create_dir_all(paths.log.parent().unwrap()).unwrap();
        fs::write(
            &paths.log,
            b"Standby 2024-06-01\nProt\xffect 2024-06-02\nAllOn 2024-06-03\nAlert 2024-06-04\n",
        )
        .unwrap();

        let history = render(&FileStore::new(paths)).unwrap();

        assert_eq!(history.skipped(), 1);
        assert_eq!(history.current(), Some(&record(Command::Alert, 4)));
        assert_eq!(
            history.lines(),
            vec!["2024-06-03 AllOn", "2024-06-01 Standby"]
        );
    }

    #[test]
    fn concurrent_renders_see_whole_submits() {
        const SUBMITS: usize = 30;

        let dir = TempDir::new().unwrap();
        let paths = StorePaths::in_dir(dir.path().join("controller"));
        let done = AtomicBool::new(false);

        // One submit up front so readers always find the lock file.
        Controller::new(FileStore::new(paths.clone()))
            .submit_command(Command::Standby, date(2024, 6, 1).at(9, 0, 0, 0))
            .unwrap();

        thread::scope(|scope| {
            let reader = scope.spawn(|| {
                let store = FileStore::new(paths.clone());
                let mut seen = 0;
                let mut renders = 0;
                loop {
                    let finished = done.load(Ordering::Acquire);
                    let history = render(&store).unwrap();
                    assert_eq!(history.skipped(), 0);

                    let count = history.current().into_iter().count() + history.past().len();
                    assert!(count >= seen, "history shrank from {seen} to {count}");
                    seen = count;
                    renders += 1;

                    if finished {
                        return (seen, renders);
                    }
                }
            });

            let writers: Vec<_> = (0..SUBMITS)
                .map(|i| {
                    let paths = paths.clone();
                    scope.spawn(move || {
                        let controller = Controller::new(FileStore::new(paths));
                        let command = Command::ALL[i % Command::ALL.len()];
                        let second = i8::try_from(i).unwrap();
                        controller
                            .submit_command(command, date(2024, 6, 1).at(10, 0, second, 0))
                            .unwrap();
                    })
                })
                .collect();
            for writer in writers {
                writer.join().unwrap();
            }
            done.store(true, Ordering::Release);

            let (seen, renders) = reader.join().unwrap();
            assert_eq!(seen, SUBMITS + 1);
            assert!(renders > 0);
        });
    }

    #[test]
    fn malformed_last_line_still_counts_as_current() {
        let history = History::from_log("Protect 2024-06-01\nAlert\n");

        assert_eq!(history.current(), None);
        assert_eq!(history.skipped(), 1);
        assert_eq!(history.lines(), vec!["2024-06-01 Protect"]);
    }

    #[test]
    fn empty_log_file_is_initialized_but_empty() {
        let history = History::from_log("");

        assert!(history.is_initialized());
        assert_eq!(history.current(), None);
        assert!(history.past().is_empty());
    }

    #[test]
    fn blank_lines_are_ignored() {
        let history = History::from_log("Protect 2024-06-01\n\n  \nAlert 2024-06-02\n\n");

        assert_eq!(history.skipped(), 0);
        assert_eq!(history.current(), Some(&record(Command::Alert, 2)));
        assert_eq!(history.lines(), vec!["2024-06-01 Protect"]);
    }

    #[test]
    fn totals_count_every_record() {
        let history = History::from_log(
            "Protect 2024-06-01\nAlert 2024-06-01\nProtect 2024-06-02\nProtect 2024-06-03\n",
        );

        assert_eq!(
            history.totals(),
            vec![(Command::Protect, 3), (Command::Alert, 1)]
        );
        assert!(History::NotYetInitialized.totals().is_empty());
    }

    #[test]
    fn serializes_with_status_tag() {
        let history = History::from_log("Protect 2024-06-01\nAlert 2024-06-02\n");

        let json = serde_json::to_value(&history).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "status": "recorded",
                "current": { "command": "Alert", "date": "2024-06-02" },
                "past": [{ "command": "Protect", "date": "2024-06-01" }],
                "skipped": 0,
            })
        );
        assert_eq!(
            serde_json::to_value(History::NotYetInitialized).unwrap(),
            serde_json::json!({ "status": "notYetInitialized" })
        );
    }

    #[test]
    fn protect_then_alert() {
        let controller = Controller::new(MemoryStore::new());
        let now = date(2024, 6, 1).at(18, 45, 10, 0);

        controller.submit("Protect", now).unwrap();
        controller.submit("Alert", now).unwrap();

        let history = render(controller.store()).unwrap();
        assert_eq!(history.lines(), vec!["2024-06-01 Protect"]);
        assert_eq!(
            controller.store().mirror().unwrap(),
            "Alert,2024-06-01,18:45:10\n"
        );
    }
}
