//! Chain identifiers and the chain pair a BTP bridge is set up between.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Chain types supported by the BTP bridge workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainType {
    /// ICON. The coordinator chain: one side of every bridge.
    Icon,
    /// Ethereum.
    Eth,
    /// Local Hardhat EVM network.
    Hardhat,
}

impl ChainType {
    /// Every supported chain type.
    pub const ALL: [ChainType; 3] = [ChainType::Icon, ChainType::Eth, ChainType::Hardhat];

    /// Whether this is the coordinator chain type.
    pub const fn is_coordinator(self) -> bool {
        matches!(self, ChainType::Icon)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ChainType::Icon => "icon",
            ChainType::Eth => "eth",
            ChainType::Hardhat => "hardhat",
        }
    }
}

impl std::fmt::Display for ChainType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ChainType {
    type Err = ChainPairError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "icon" => Ok(ChainType::Icon),
            "eth" => Ok(ChainType::Eth),
            "hardhat" => Ok(ChainType::Hardhat),
            _ => Err(ChainPairError::UnsupportedChain {
                chain: s.to_string(),
            }),
        }
    }
}

/// Side of a chain pair, as declared by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainSide {
    A,
    B,
}

impl std::fmt::Display for ChainSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainSide::A => write!(f, "ChainA"),
            ChainSide::B => write!(f, "ChainB"),
        }
    }
}

/// Errors for chain pairs that cannot be bridged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainPairError {
    #[error("unsupported chain type '{chain}' (supported: icon, eth, hardhat)")]
    UnsupportedChain { chain: String },

    #[error("a bridge between {chain_a} and {chain_b} requires an icon chain on one side")]
    MissingCoordinator { chain_a: ChainType, chain_b: ChainType },
}

/// The two chains to bridge and, for each, the service name of an
/// already running node.
///
/// Built once per setup request and never mutated afterwards. An empty
/// service name means the chain is not running yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainPair {
    chain_a: ChainType,
    chain_b: ChainType,
    chain_a_service: Option<String>,
    chain_b_service: Option<String>,
    bridge: bool,
}

impl ChainPair {
    pub fn new(chain_a: ChainType, chain_b: ChainType) -> Self {
        Self {
            chain_a,
            chain_b,
            chain_a_service: None,
            chain_b_service: None,
            bridge: false,
        }
    }

    /// Parse a pair from user supplied chain names.
    pub fn parse(chain_a: &str, chain_b: &str) -> Result<Self, ChainPairError> {
        Ok(Self::new(chain_a.parse()?, chain_b.parse()?))
    }

    /// Set the service name of an already running chain A node.
    pub fn with_chain_a_service(mut self, service_name: impl Into<String>) -> Self {
        self.chain_a_service = non_empty(service_name.into());
        self
    }

    /// Set the service name of an already running chain B node.
    pub fn with_chain_b_service(mut self, service_name: impl Into<String>) -> Self {
        self.chain_b_service = non_empty(service_name.into());
        self
    }

    /// Enable or disable the bridge flag passed to the workflow.
    pub fn with_bridge(mut self, bridge: bool) -> Self {
        self.bridge = bridge;
        self
    }

    pub fn chain_a(&self) -> ChainType {
        self.chain_a
    }

    pub fn chain_b(&self) -> ChainType {
        self.chain_b
    }

    pub fn chain(&self, side: ChainSide) -> ChainType {
        match side {
            ChainSide::A => self.chain_a,
            ChainSide::B => self.chain_b,
        }
    }

    pub fn chain_a_service(&self) -> Option<&str> {
        self.chain_a_service.as_deref()
    }

    pub fn chain_b_service(&self) -> Option<&str> {
        self.chain_b_service.as_deref()
    }

    pub fn service(&self, side: ChainSide) -> Option<&str> {
        match side {
            ChainSide::A => self.chain_a_service(),
            ChainSide::B => self.chain_b_service(),
        }
    }

    pub fn bridge(&self) -> bool {
        self.bridge
    }

    /// Whether both chains are the coordinator type.
    pub fn are_chains_coordinator(&self) -> bool {
        self.chain_a.is_coordinator() && self.chain_b.is_coordinator()
    }

    /// Check the pair is bridge eligible: the coordinator chain type must
    /// take part on at least one side.
    pub fn validate(&self) -> Result<(), ChainPairError> {
        if self.chain_a.is_coordinator() || self.chain_b.is_coordinator() {
            Ok(())
        } else {
            Err(ChainPairError::MissingCoordinator {
                chain_a: self.chain_a,
                chain_b: self.chain_b,
            })
        }
    }
}

impl std::fmt::Display for ChainPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <-> {}", self.chain_a, self.chain_b)
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
