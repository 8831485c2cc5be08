//! Bridge workflow configuration.

use common::DEFAULT_ENCLAVE;
use serde::{Deserialize, Serialize};

/// Package holding the node and bridge workflow scripts.
pub const DEFAULT_PACKAGE: &str = "bridge-packages";

/// Script of the BTP bridge setup entry points.
pub const BTP_BRIDGE_SCRIPT: &str = "main.star";

/// Where the bridge workflow runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Enclave hosting the chain services.
    pub enclave: String,
    /// Workflow package.
    pub package: String,
    /// Script inside the package with the BTP setup entry points.
    pub bridge_script: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            enclave: DEFAULT_ENCLAVE.to_string(),
            package: DEFAULT_PACKAGE.to_string(),
            bridge_script: BTP_BRIDGE_SCRIPT.to_string(),
        }
    }
}
