//! Bridge setup error types.

use chains::LaunchError;
use common::{
    ChainPair, ChainPairError, ChainSide, ChainType, EngineError, ExtractionError, RegistryError,
};
use thiserror::Error;

/// Errors of the individual setup phases.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Neither side is the coordinator chain, or a chain is unsupported.
    #[error("invalid chain pair: {0}")]
    InvalidChainPair(#[from] ChainPairError),

    #[error("service name not found: {service_name}")]
    ServiceNotFound { service_name: String },

    #[error("service registry unavailable: {0}")]
    Registry(#[source] RegistryError),

    #[error("{side} {chain} run failed: {source}")]
    LaunchFailed {
        side: ChainSide,
        chain: ChainType,
        #[source]
        source: LaunchError,
    },

    #[error("bridge parameters could not be encoded: {0}")]
    PayloadEncoding(#[source] serde_json::Error),

    #[error("bridge workflow run failed: {0}")]
    WorkflowExecutionFailed(#[source] EngineError),

    #[error("bridge workflow result could not be extracted: {0}")]
    ResultExtractionFailed(#[source] ExtractionError),

    /// Removing the services of a failed run failed. Takes precedence over
    /// the extraction error that triggered the rollback.
    #[error("rollback of services [{}] failed: {source}", .services.join(", "))]
    RollbackFailed {
        services: Vec<String>,
        #[source]
        source: EngineError,
    },

    /// The workflow found nothing to do. Reported, not fatal.
    #[error("already running")]
    AlreadyRunning,
}

impl From<RegistryError> for BridgeError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound { service_name } => BridgeError::ServiceNotFound { service_name },
            other => BridgeError::Registry(other),
        }
    }
}

/// Result type for setup phases.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Phase of a bridge setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupPhase {
    Validation,
    Resolution,
    Workflow,
}

impl std::fmt::Display for SetupPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetupPhase::Validation => write!(f, "validation"),
            SetupPhase::Resolution => write!(f, "chain resolution"),
            SetupPhase::Workflow => write!(f, "bridge workflow"),
        }
    }
}

/// A failed bridge setup, with the chain pair and phase it failed in.
#[derive(Debug, Error)]
#[error("BTP setup failed for chain A {chain_a} and chain B {chain_b} during {phase}: {source}")]
pub struct SetupError {
    pub chain_a: ChainType,
    pub chain_b: ChainType,
    pub phase: SetupPhase,
    #[source]
    pub source: BridgeError,
}

impl SetupError {
    pub fn new(pair: &ChainPair, phase: SetupPhase, source: BridgeError) -> Self {
        Self {
            chain_a: pair.chain_a(),
            chain_b: pair.chain_b(),
            phase,
            source,
        }
    }

    pub fn kind(&self) -> &BridgeError {
        &self.source
    }

    pub fn into_kind(self) -> BridgeError {
        self.source
    }

    /// The setup was a no-op because the bridge already runs.
    pub fn is_already_running(&self) -> bool {
        matches!(self.source, BridgeError::AlreadyRunning)
    }
}
