//! Reads the state the device agent reports about itself.

use crate::{model::ActualState, storage::CommandStore};

/// Reads the device agent's latest report.
///
/// Never fails. A missing file means the agent hasn't reported yet, and an
/// unreadable one is logged; both yield [`ActualState::not_read_yet`].
pub fn read<S: CommandStore>(store: &S) -> ActualState {
    match store.read_actual_state() {
        Ok(Some(line)) => ActualState::parse_line(&line),
        Ok(None) => ActualState::not_read_yet(),
        Err(e) => {
            tracing::warn!(error = %e, "actual state unreadable, showing placeholder");
            ActualState::not_read_yet()
        }
    }
}
