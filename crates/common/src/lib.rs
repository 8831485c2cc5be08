//! Common types shared between bridge setup components.
//!
//! - Chain identifiers and the chain pair a bridge is set up between
//! - The service registry of already launched nodes
//! - The remote workflow engine interface and its HTTP client
//! - Extraction of workflow run results
//! - Structured observability events

pub mod chain;
pub mod engine;
pub mod execution;
pub mod observability;
pub mod service;

pub use chain::{ChainPair, ChainPairError, ChainSide, ChainType};
pub use engine::{EngineError, HttpWorkflowEngine, WorkflowEngine, WorkflowRequest};
pub use execution::{ExecutionOutcome, ExecutionReport, ExtractionError, RunEvent};
pub use observability::{EventType, LogEvent};
pub use service::{RegistryError, ServiceRegistry, ServiceResponse, ServiceStore, Services};

/// Default name of the enclave hosting bridge services.
pub const DEFAULT_ENCLAVE: &str = "bridge";
