//! ICON node launcher.
//!
//! Starting an ICON node is a two step procedure: the node start workflow
//! brings up a single validator, then the decentralization workflow
//! registers it as a main PRep so the network can produce blocks on its own.
//! A node whose decentralization fails is removed again.

use std::sync::Arc;

use async_trait::async_trait;
use common::{ChainType, ServiceResponse};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::launcher::{LaunchContext, LaunchError, NodeLauncher, NodeWorkflow};

const START_NODE: NodeWorkflow = NodeWorkflow {
    script: "services/jvm/icon/src/node-setup/start_icon_node.star",
    entry_point: "start_icon_node",
};

const DECENTRALIZE: NodeWorkflow = NodeWorkflow {
    script: "services/jvm/icon/src/node-setup/setup_icon_node.star",
    entry_point: "configure_node",
};

/// ICON node configuration passed to the start workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconNodeConfig {
    pub private_port: u16,
    pub public_port: u16,
    pub p2p_listen_address: String,
    pub p2p_address: String,
    pub cid: String,
}

impl Default for IconNodeConfig {
    fn default() -> Self {
        Self {
            private_port: 9080,
            public_port: 8090,
            p2p_listen_address: "7080".to_string(),
            p2p_address: "8080".to_string(),
            cid: "0xacbc4e".to_string(),
        }
    }
}

/// Parameters of the decentralization workflow, derived from the launched
/// node's service response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecentralizeParams {
    pub service_name: String,
    pub uri: String,
    pub keystorepath: String,
    pub keypassword: String,
    pub nid: String,
}

impl DecentralizeParams {
    pub fn from_response(response: &ServiceResponse) -> Self {
        Self {
            service_name: response.service_name.clone(),
            uri: response.private_endpoint.clone(),
            keystorepath: response.keystore_path.clone(),
            keypassword: response.key_password.clone(),
            nid: response.network_id.clone(),
        }
    }
}

#[derive(Serialize)]
struct Args<'a, T> {
    args: &'a T,
}

/// Launches an ICON node and decentralizes it.
pub struct IconLauncher {
    context: Arc<LaunchContext>,
    config: IconNodeConfig,
}

impl IconLauncher {
    pub fn new(context: Arc<LaunchContext>) -> Self {
        Self::with_config(context, IconNodeConfig::default())
    }

    pub fn with_config(context: Arc<LaunchContext>, config: IconNodeConfig) -> Self {
        Self { context, config }
    }
}

#[async_trait]
impl NodeLauncher for IconLauncher {
    fn chain_type(&self) -> ChainType {
        ChainType::Icon
    }

    async fn launch(&self) -> Result<ServiceResponse, LaunchError> {
        let response = self
            .context
            .start_node(ChainType::Icon, START_NODE, &Args { args: &self.config })
            .await?;

        info!("Starting decentralization of {}", response.service_name);
        let params = DecentralizeParams::from_response(&response);
        if let Err(err) = self
            .context
            .run_workflow(ChainType::Icon, DECENTRALIZE, &Args { args: &params })
            .await
        {
            // The node is not recorded yet.
            warn!(
                "Decentralization of {} failed, removing the node",
                response.service_name
            );
            self.context
                .remove_services(ChainType::Icon, &[response.service_name.clone()])
                .await?;
            return Err(err);
        }

        self.context.record(ChainType::Icon, &response)?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launcher::test_support::*;
    use common::{EngineError, RunEvent, ServiceStore};

    fn icon_response() -> ServiceResponse {
        ServiceResponse {
            service_name: "icon-node-0xacbc4e".to_string(),
            private_endpoint: "http://172.16.0.3:9080/api/v3/icon_dex".to_string(),
            keystore_path: "keystores/keystore.json".to_string(),
            key_password: "gochain".to_string(),
            network_id: "0xacbc4e".to_string(),
            ..Default::default()
        }
    }

    fn decentralized() -> Vec<RunEvent> {
        vec![RunEvent::RunFinished {
            is_successful: true,
            serialized_output: Some("null".to_string()),
        }]
    }

    #[test]
    fn test_decentralize_params_from_response() {
        let params = DecentralizeParams::from_response(&icon_response());
        assert_eq!(params.service_name, "icon-node-0xacbc4e");
        assert_eq!(params.uri, "http://172.16.0.3:9080/api/v3/icon_dex");
        assert_eq!(params.keystorepath, "keystores/keystore.json");
        assert_eq!(params.keypassword, "gochain");
        assert_eq!(params.nid, "0xacbc4e");
    }

    #[tokio::test]
    async fn test_launch_runs_start_then_decentralization() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(ServiceStore::for_enclave(dir.path(), "bridge"));
        let engine = Arc::new(ScriptedEngine::with_results(vec![
            Ok(finished_with(&icon_response())),
            Ok(decentralized()),
        ]));
        let context = LaunchContext::new(engine.clone(), "bridge", "bridge-packages")
            .with_store(store.clone());

        let response = IconLauncher::new(Arc::new(context)).launch().await.unwrap();
        assert_eq!(response, icon_response());

        let requests = engine.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].entry_point, "start_icon_node");
        assert_eq!(requests[1].entry_point, "configure_node");

        let start: serde_json::Value = serde_json::from_str(&requests[0].params).unwrap();
        assert_eq!(start["args"]["cid"], "0xacbc4e");

        let decentralize: serde_json::Value = serde_json::from_str(&requests[1].params).unwrap();
        assert_eq!(decentralize["args"]["service_name"], "icon-node-0xacbc4e");
        assert_eq!(decentralize["args"]["nid"], "0xacbc4e");

        assert!(is_recorded(&store, "icon-node-0xacbc4e"));
    }

    #[tokio::test]
    async fn test_failed_decentralization_is_not_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(ServiceStore::for_enclave(dir.path(), "bridge"));
        let engine = Arc::new(ScriptedEngine::with_results(vec![
            Ok(finished_with(&icon_response())),
            Err(EngineError::Connection("connection reset".to_string())),
        ]));
        let context = LaunchContext::new(engine.clone(), "bridge", "bridge-packages")
            .with_store(store.clone());

        let err = IconLauncher::new(Arc::new(context)).launch().await.unwrap_err();

        assert!(matches!(
            err,
            LaunchError::Workflow {
                entry_point: "configure_node",
                ..
            }
        ));
        assert!(!is_recorded(&store, "icon-node-0xacbc4e"));
        assert_eq!(engine.removed(), vec![vec!["icon-node-0xacbc4e".to_string()]]);
    }

    #[tokio::test]
    async fn test_failed_decentralization_removes_touched_services_and_node() {
        let engine = Arc::new(ScriptedEngine::with_results(vec![
            Ok(finished_with(&icon_response())),
            Ok(vec![
                RunEvent::ServiceAdded {
                    service_name: "icon-prep-registrar".to_string(),
                },
                RunEvent::ExecutionError {
                    message: "registerPRep reverted".to_string(),
                },
            ]),
        ]));
        let context = LaunchContext::new(engine.clone(), "bridge", "bridge-packages");

        let err = IconLauncher::new(Arc::new(context)).launch().await.unwrap_err();

        assert!(matches!(err, LaunchError::Extraction { .. }));
        assert_eq!(
            engine.removed(),
            vec![
                vec!["icon-prep-registrar".to_string()],
                vec!["icon-node-0xacbc4e".to_string()],
            ]
        );
    }

    fn is_recorded(store: &ServiceStore, name: &str) -> bool {
        store.read_all().unwrap().contains_key(name)
    }
}
