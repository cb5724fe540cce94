//! Telemetry reported by the device agent.

use serde::Serialize;

/// The device agent's self-reported state.
///
/// Every field is opaque text: the agent owns the format and the core only
/// displays it. Fields missing from a short line are empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActualState {
    pub state: String,
    pub date: String,
    pub time: String,
    pub temperature: String,
}

impl ActualState {
    /// Placeholder shown until the agent has reported anything.
    pub fn not_read_yet() -> Self {
        Self::parse_line("NotReadYet,0000-00-00,00:00:00,0.0")
    }

    /// Parses a `<state>,<date>,<time>,<temperature>` line.
    ///
    /// Never fails. Extra fields are ignored.
    pub fn parse_line(line: &str) -> Self {
        let mut fields = line.trim_end_matches(['\r', '\n']).split(',');
        let mut next = || fields.next().unwrap_or_default().to_string();
        Self {
            state: next(),
            date: next(),
            time: next(),
            temperature: next(),
        }
    }
}
