//! Chain pair resolution.
//!
//! Turns a [`ChainPair`] into the inputs of the bridge workflow: the service
//! response of each side (looked up when the node already runs, launched
//! otherwise), ordered so that the coordinator chain is the source, and the
//! workflow entry point.

use std::sync::Arc;

use chains::LauncherTable;
use common::{
    ChainPair, ChainSide, ChainType, EventType, LogEvent, ServiceRegistry, ServiceResponse,
};
use tracing::{debug, info};

use crate::error::{BridgeError, Result};

/// Which sides of a pair already have a running node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconciliationState<'a> {
    BothRunning {
        chain_a_service: &'a str,
        chain_b_service: &'a str,
    },
    NoneRunning,
    OnlyARunning {
        chain_a_service: &'a str,
    },
    OnlyBRunning {
        chain_b_service: &'a str,
    },
}

impl<'a> ReconciliationState<'a> {
    pub fn of(pair: &'a ChainPair) -> Self {
        match (pair.chain_a_service(), pair.chain_b_service()) {
            (Some(chain_a_service), Some(chain_b_service)) => Self::BothRunning {
                chain_a_service,
                chain_b_service,
            },
            (Some(chain_a_service), None) => Self::OnlyARunning { chain_a_service },
            (None, Some(chain_b_service)) => Self::OnlyBRunning { chain_b_service },
            (None, None) => Self::NoneRunning,
        }
    }
}

impl std::fmt::Display for ReconciliationState<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BothRunning { .. } => write!(f, "both running"),
            Self::NoneRunning => write!(f, "none running"),
            Self::OnlyARunning { .. } => write!(f, "only ChainA running"),
            Self::OnlyBRunning { .. } => write!(f, "only ChainB running"),
        }
    }
}

/// Bridge workflow entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    /// Both chains are coordinator chains.
    CoordinatorToCoordinator,
    /// A coordinator chain and a peer chain.
    CoordinatorToPeer,
}

impl EntryPoint {
    pub fn select(pair: &ChainPair) -> Self {
        if pair.are_chains_coordinator() {
            Self::CoordinatorToCoordinator
        } else {
            Self::CoordinatorToPeer
        }
    }

    pub fn function_name(&self) -> &'static str {
        match self {
            Self::CoordinatorToCoordinator => "run_btp_setup_icon_to_icon",
            Self::CoordinatorToPeer => "run_btp_setup_icon_to_evm",
        }
    }
}

impl std::fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.function_name())
    }
}

/// A chain pair ready for the bridge workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPair {
    pub src_chain: ChainType,
    pub dst_chain: ChainType,
    /// Canonical JSON of the source chain's service response.
    pub src_service_response: String,
    /// Canonical JSON of the destination chain's service response.
    pub dst_service_response: String,
    pub entry_point: EntryPoint,
}

/// Resolves chain pairs against the service registry and the launchers.
pub struct ChainPairResolver {
    registry: Arc<dyn ServiceRegistry>,
    launchers: LauncherTable,
}

impl ChainPairResolver {
    pub fn new(registry: Arc<dyn ServiceRegistry>, launchers: LauncherTable) -> Self {
        Self {
            registry,
            launchers,
        }
    }

    /// Bring both sides of a validated pair to a running state.
    ///
    /// Lookups and launches run one after the other; the running side is
    /// looked up before the other side is launched, so a stale service name
    /// fails without starting a node.
    pub async fn resolve(&self, pair: &ChainPair) -> Result<ResolvedPair> {
        let state = ReconciliationState::of(pair);
        debug!("Resolving {}: {}", pair, state);

        let (chain_a_response, chain_b_response) = match state {
            ReconciliationState::BothRunning {
                chain_a_service,
                chain_b_service,
            } => (self.lookup(chain_a_service)?, self.lookup(chain_b_service)?),
            ReconciliationState::NoneRunning => {
                let chain_a_response = self.launch(pair, ChainSide::A).await?;
                let chain_b_response = self.launch(pair, ChainSide::B).await?;
                (chain_a_response, chain_b_response)
            }
            ReconciliationState::OnlyARunning { chain_a_service } => {
                let chain_a_response = self.lookup(chain_a_service)?;
                (chain_a_response, self.launch(pair, ChainSide::B).await?)
            }
            ReconciliationState::OnlyBRunning { chain_b_service } => {
                let chain_b_response = self.lookup(chain_b_service)?;
                (self.launch(pair, ChainSide::A).await?, chain_b_response)
            }
        };

        let chain_a_response = encode(&chain_a_response)?;
        let chain_b_response = encode(&chain_b_response)?;

        let swap = pair.chain_b().is_coordinator() && !pair.chain_a().is_coordinator();
        let resolved = if swap {
            ResolvedPair {
                src_chain: pair.chain_b(),
                dst_chain: pair.chain_a(),
                src_service_response: chain_b_response,
                dst_service_response: chain_a_response,
                entry_point: EntryPoint::select(pair),
            }
        } else {
            ResolvedPair {
                src_chain: pair.chain_a(),
                dst_chain: pair.chain_b(),
                src_service_response: chain_a_response,
                dst_service_response: chain_b_response,
                entry_point: EntryPoint::select(pair),
            }
        };

        debug!(
            "Resolved {} -> {} via {}",
            resolved.src_chain, resolved.dst_chain, resolved.entry_point
        );
        Ok(resolved)
    }

    fn lookup(&self, service_name: &str) -> Result<ServiceResponse> {
        debug!("Looking up running service {}", service_name);
        let response = self.registry.lookup(service_name)?;

        LogEvent::new(EventType::ServiceResolved)
            .with_context("service_name", service_name)
            .emit();
        Ok(response)
    }

    async fn launch(&self, pair: &ChainPair, side: ChainSide) -> Result<ServiceResponse> {
        let chain = pair.chain(side);
        info!("{} {} is not running, launching a node", side, chain);
        match self.launchers.launch(chain).await {
            Ok(response) => {
                LogEvent::new(EventType::NodeLaunched)
                    .with_context("side", side.to_string())
                    .with_context("chain", chain.as_str())
                    .with_context("service_name", response.service_name.as_str())
                    .emit();
                Ok(response)
            }
            Err(source) => {
                LogEvent::new(EventType::LaunchFailed)
                    .with_context("side", side.to_string())
                    .with_context("chain", chain.as_str())
                    .with_error(source.to_string())
                    .emit();
                Err(BridgeError::LaunchFailed {
                    side,
                    chain,
                    source,
                })
            }
        }
    }
}

fn encode(response: &ServiceResponse) -> Result<String> {
    response.encode_to_string().map_err(BridgeError::PayloadEncoding)
}
