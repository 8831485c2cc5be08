//! EVM node launchers (Ethereum and Hardhat).

use std::sync::Arc;

use async_trait::async_trait;
use common::{ChainType, ServiceResponse};
use serde_json::json;

use crate::launcher::{LaunchContext, LaunchError, NodeLauncher, NodeWorkflow};

const START_ETH: NodeWorkflow = NodeWorkflow {
    script: "services/evm/eth/src/node-setup/start-eth-node.star",
    entry_point: "start_eth_node",
};

const START_HARDHAT: NodeWorkflow = NodeWorkflow {
    script: "services/evm/hardhat/src/node-setup/start-hardhat-node.star",
    entry_point: "start_hardhat_node",
};

/// Launches a single EVM node.
pub struct EvmLauncher {
    chain: ChainType,
    workflow: NodeWorkflow,
    context: Arc<LaunchContext>,
}

impl EvmLauncher {
    pub fn eth(context: Arc<LaunchContext>) -> Self {
        Self {
            chain: ChainType::Eth,
            workflow: START_ETH,
            context,
        }
    }

    pub fn hardhat(context: Arc<LaunchContext>) -> Self {
        Self {
            chain: ChainType::Hardhat,
            workflow: START_HARDHAT,
            context,
        }
    }
}

#[async_trait]
impl NodeLauncher for EvmLauncher {
    fn chain_type(&self) -> ChainType {
        self.chain
    }

    async fn launch(&self) -> Result<ServiceResponse, LaunchError> {
        let response = self
            .context
            .start_node(self.chain, self.workflow, &json!({ "args": {} }))
            .await?;

        self.context.record(self.chain, &response)?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launcher::test_support::*;

    #[tokio::test]
    async fn test_hardhat_uses_its_own_workflow() {
        let response = ServiceResponse {
            service_name: "hardhat-node".to_string(),
            private_endpoint: "http://172.16.0.6:8545".to_string(),
            network_id: "0x7a69".to_string(),
            ..Default::default()
        };
        let engine = Arc::new(ScriptedEngine::with_results(vec![Ok(finished_with(&response))]));
        let launcher = EvmLauncher::hardhat(Arc::new(LaunchContext::new(
            engine.clone(),
            "bridge",
            "bridge-packages",
        )));

        assert_eq!(launcher.chain_type(), ChainType::Hardhat);
        assert_eq!(launcher.launch().await.unwrap(), response);

        let requests = engine.requests();
        assert_eq!(requests[0].entry_point, "start_hardhat_node");
        assert_eq!(requests[0].package, "bridge-packages");
    }
}
