//! Structured setup events.
//!
//! Every bridge setup run gets a correlation id; the events emitted along the
//! way carry it together with the chain pair and phase, so a run can be
//! followed through aggregated logs.
//!
//! ```ignore
//! LogEvent::new(EventType::SetupStarted)
//!     .with_correlation_id(run_id.to_string())
//!     .with_chain_pair("icon", "eth")
//!     .emit();
//! ```

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Standardized event types for structured logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    // Setup lifecycle
    SetupStarted,
    SetupCompleted,
    SetupFailed,
    AlreadyRunning,

    // Chain resolution
    ServiceResolved,
    NodeLaunched,
    LaunchFailed,

    // Bridge workflow
    WorkflowInvoked,
    WorkflowFailed,
    RollbackStarted,
    RollbackCompleted,
    RollbackFailed,
}

impl EventType {
    fn is_warning(self) -> bool {
        matches!(
            self,
            Self::SetupFailed
                | Self::LaunchFailed
                | Self::WorkflowFailed
                | Self::RollbackStarted
                | Self::RollbackFailed
                | Self::AlreadyRunning
        )
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::SetupStarted => "setup_started",
            Self::SetupCompleted => "setup_completed",
            Self::SetupFailed => "setup_failed",
            Self::AlreadyRunning => "already_running",
            Self::ServiceResolved => "service_resolved",
            Self::NodeLaunched => "node_launched",
            Self::LaunchFailed => "launch_failed",
            Self::WorkflowInvoked => "workflow_invoked",
            Self::WorkflowFailed => "workflow_failed",
            Self::RollbackStarted => "rollback_started",
            Self::RollbackCompleted => "rollback_completed",
            Self::RollbackFailed => "rollback_failed",
        };
        write!(f, "{}", s)
    }
}

/// A structured log event with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub event_type: EventType,
    /// Unix timestamp in milliseconds.
    pub timestamp_ms: i64,
    /// Setup run this event belongs to.
    pub correlation_id: Option<String>,
    pub chain_a: Option<String>,
    pub chain_b: Option<String>,
    /// Setup phase (validation, chain resolution, bridge workflow).
    pub phase: Option<String>,
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub context: HashMap<String, String>,
    pub error: Option<String>,
}

impl LogEvent {
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            correlation_id: None,
            chain_a: None,
            chain_b: None,
            phase: None,
            duration_ms: None,
            context: HashMap::new(),
            error: None,
        }
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    pub fn with_chain_pair(mut self, chain_a: impl Into<String>, chain_b: impl Into<String>) -> Self {
        self.chain_a = Some(chain_a.into());
        self.chain_b = Some(chain_b.into());
        self
    }

    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = Some(phase.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = Some(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Emit this event through `tracing`.
    pub fn emit(&self) {
        let json = serde_json::to_string(&self).unwrap_or_default();

        if self.event_type.is_warning() {
            tracing::warn!(event = %json, "bridge_event");
        } else {
            tracing::info!(event = %json, "bridge_event");
        }
    }
}
