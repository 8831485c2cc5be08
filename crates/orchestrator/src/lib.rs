//! BTP Bridge Setup Orchestration
//!
//! Brings two chains to a ready state and runs the BTP bridge setup workflow
//! against them:
//!
//! 1. **Validation**: the pair must include the coordinator chain (ICON)
//! 2. **Chain resolution**: look up running nodes, launch missing ones, put
//!    the coordinator chain in the source slot
//! 3. **Bridge workflow**: run the setup workflow, detect no-op runs, roll
//!    back touched services when the result cannot be extracted

pub mod config;
pub mod error;
pub mod resolver;
pub mod service;
pub mod workflow;

pub use config::BridgeConfig;
pub use error::{BridgeError, Result, SetupError, SetupPhase};
pub use resolver::{ChainPairResolver, EntryPoint, ReconciliationState, ResolvedPair};
pub use service::BridgeOrchestrator;
pub use workflow::{BridgeParams, BridgeWorkflowRunner};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::BridgeConfig;
    pub use crate::error::{BridgeError, Result, SetupError};
    pub use crate::service::BridgeOrchestrator;
    pub use common::{ChainPair, ChainType};
}
