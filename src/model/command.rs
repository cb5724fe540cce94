//! Command: the operating modes an operator can ask the controller for.

use std::fmt;

use serde::Serialize;

/// A recognized operating-mode command.
///
/// Any command is accepted from any prior state. There are no guarded
/// transitions and no terminal mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Command {
    /// Idle, nothing running.
    Standby,

    /// Frost/heat protection cycle.
    Protect,

    /// Every zone on.
    AllOn,

    /// Alert mode.
    Alert,
}

impl Command {
    /// Every recognized command, in the order the controller presents them.
    pub const ALL: [Self; 4] = [Self::Standby, Self::Protect, Self::AllOn, Self::Alert];

    /// Parses a persisted or operator-supplied command name.
    ///
    /// Matching is exact and case-sensitive, the same names that are written
    /// to disk. Returns `None` for empty or unrecognized names.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// The name as written to the command log and mirror file.
    pub fn name(self) -> &'static str {
        match self {
            Self::Standby => "Standby",
            Self::Protect => "Protect",
            Self::AllOn => "AllOn",
            Self::Alert => "Alert",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
