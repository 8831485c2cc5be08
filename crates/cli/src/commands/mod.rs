//! Command implementations.

pub mod bridge;
pub mod services;

/// How a command that did not fail ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// The BTP setup found the bridge already in place.
    AlreadyRunning,
}
