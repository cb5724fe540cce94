//! Core data model for the sprinkler controller.
//!
//! Commands flow out to the device as [`CommandEvent`]s; what the device
//! reports back comes in as an [`ActualState`]. The two are never correlated
//! by the core, only displayed side by side.

mod command;
mod event;
mod telemetry;

pub use command::Command;
pub use event::{CommandEvent, LogRecord};
pub use telemetry::ActualState;
