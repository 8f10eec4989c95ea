//! Scheduling: rank once, then poll, diff and notify on a fixed interval.
//!
//! [`PollLoop`] is one session. [`Monitor`] owns at most one running
//! session and the channels the presentation layer reads from.

mod monitor;
mod report;
mod runner;
mod state;


pub use monitor::{Monitor, MonitorError, MonitorStatus, SessionRequest, SessionStarted};
pub use report::{CycleReport, FailureKind, SessionSummary, SnapshotSink, StationFailure};
pub use runner::PollLoop;
pub use state::PollState;
