//! Command/telemetry synchronization core for a remote sprinkler controller.
//!
//! An operator command becomes one [`CommandEvent`](model::CommandEvent),
//! recorded three ways by the [`Controller`]: appended to the command log,
//! written to the mirror file the device agent polls, and appended to the
//! audit trail. [`history::render`] replays the log; [`actual::read`] shows
//! what the device agent last reported.

pub mod actual;
pub mod clock;
pub mod controller;
pub mod history;
pub mod model;
pub mod storage;

pub use controller::{Controller, ControllerError};
