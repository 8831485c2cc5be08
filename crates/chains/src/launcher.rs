//! Launcher capability table.
//!
//! A [`NodeLauncher`] starts a node of one chain type and returns its
//! connection details. The [`LauncherTable`] maps chain types to launchers and
//! is handed to the orchestrator as an immutable value.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{
    ChainType, EngineError, ExecutionReport, ExtractionError, RegistryError, ServiceResponse,
    ServiceStore, WorkflowEngine, WorkflowRequest,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::evm::EvmLauncher;
use crate::icon::IconLauncher;

/// Node launch errors.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("no launcher registered for chain {0}")]
    Unsupported(ChainType),

    #[error("{chain} node parameters could not be encoded: {source}")]
    Params {
        chain: ChainType,
        #[source]
        source: serde_json::Error,
    },

    #[error("{chain} workflow {entry_point} could not be run: {source}")]
    Workflow {
        chain: ChainType,
        entry_point: &'static str,
        #[source]
        source: EngineError,
    },

    #[error("{chain} workflow {entry_point} failed: {source}")]
    Extraction {
        chain: ChainType,
        entry_point: &'static str,
        #[source]
        source: ExtractionError,
    },

    #[error("failed to remove {chain} services after a failed launch: {source}")]
    Cleanup {
        chain: ChainType,
        #[source]
        source: EngineError,
    },

    #[error("{chain} node is already running")]
    AlreadyRunning { chain: ChainType },

    #[error("{chain} node returned an unreadable service response: {source}")]
    InvalidResponse {
        chain: ChainType,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to record {chain} service: {source}")]
    Registry {
        chain: ChainType,
        #[source]
        source: RegistryError,
    },
}

/// Starts a node of one chain type.
#[async_trait]
pub trait NodeLauncher: Send + Sync {
    /// Chain type this launcher starts.
    fn chain_type(&self) -> ChainType;

    /// Start a node and return its connection details.
    async fn launch(&self) -> Result<ServiceResponse, LaunchError>;
}

/// Script and entry point of a node workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeWorkflow {
    pub script: &'static str,
    pub entry_point: &'static str,
}

/// What every standard launcher needs to run its workflows.
pub struct LaunchContext {
    pub engine: Arc<dyn WorkflowEngine>,
    pub enclave: String,
    pub package: String,
    /// Registry launched nodes are recorded in.
    pub store: Option<Arc<ServiceStore>>,
}

impl LaunchContext {
    pub fn new(
        engine: Arc<dyn WorkflowEngine>,
        enclave: impl Into<String>,
        package: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            enclave: enclave.into(),
            package: package.into(),
            store: None,
        }
    }

    pub fn with_store(mut self, store: Arc<ServiceStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Run a node workflow and return its serialized output.
    ///
    /// Services touched by a run whose result cannot be extracted are
    /// removed before the error is returned.
    pub(crate) async fn run_workflow<P: Serialize>(
        &self,
        chain: ChainType,
        workflow: NodeWorkflow,
        params: &P,
    ) -> Result<String, LaunchError> {
        let params =
            serde_json::to_string(params).map_err(|source| LaunchError::Params { chain, source })?;

        let request = WorkflowRequest {
            package: self.package.clone(),
            script: workflow.script.to_string(),
            entry_point: workflow.entry_point.to_string(),
            params,
        };

        debug!("Running {} workflow {}", chain, workflow.entry_point);
        let events = self
            .engine
            .run_workflow(&self.enclave, &request)
            .await
            .map_err(|source| LaunchError::Workflow {
                chain,
                entry_point: workflow.entry_point,
                source,
            })?;

        let report = ExecutionReport::collect(&events);
        let services = report.services().to_vec();

        let outcome = match report.into_outcome() {
            Ok(outcome) => outcome,
            Err(source) => {
                if !services.is_empty() {
                    warn!(
                        "{} workflow {} failed, removing services {:?}",
                        chain, workflow.entry_point, services
                    );
                    self.remove_services(chain, &services).await?;
                }
                return Err(LaunchError::Extraction {
                    chain,
                    entry_point: workflow.entry_point,
                    source,
                });
            }
        };

        if outcome.is_noop() {
            return Err(LaunchError::AlreadyRunning { chain });
        }

        Ok(outcome.serialized_output)
    }

    /// Run a node start workflow and decode the service response it outputs.
    pub(crate) async fn start_node<P: Serialize>(
        &self,
        chain: ChainType,
        workflow: NodeWorkflow,
        params: &P,
    ) -> Result<ServiceResponse, LaunchError> {
        let output = self.run_workflow(chain, workflow, params).await?;
        serde_json::from_str(&output).map_err(|source| LaunchError::InvalidResponse { chain, source })
    }

    /// Remove services a failed launch left behind.
    pub(crate) async fn remove_services(
        &self,
        chain: ChainType,
        services: &[String],
    ) -> Result<(), LaunchError> {
        self.engine
            .remove_services(&self.enclave, services)
            .await
            .map_err(|source| LaunchError::Cleanup { chain, source })
    }

    pub(crate) fn record(
        &self,
        chain: ChainType,
        response: &ServiceResponse,
    ) -> Result<(), LaunchError> {
        match &self.store {
            Some(store) => store
                .record(response)
                .map_err(|source| LaunchError::Registry { chain, source }),
            None => Ok(()),
        }
    }
}

/// Launchers keyed by chain type.
#[derive(Clone, Default)]
pub struct LauncherTable {
    launchers: HashMap<ChainType, Arc<dyn NodeLauncher>>,
}

impl LauncherTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the ICON, Ethereum and Hardhat launchers.
    pub fn standard(context: Arc<LaunchContext>) -> Self {
        Self::new()
            .with_launcher(Arc::new(IconLauncher::new(context.clone())))
            .with_launcher(Arc::new(EvmLauncher::eth(context.clone())))
            .with_launcher(Arc::new(EvmLauncher::hardhat(context)))
    }

    /// Register a launcher under its chain type, replacing any previous one.
    pub fn with_launcher(mut self, launcher: Arc<dyn NodeLauncher>) -> Self {
        self.launchers.insert(launcher.chain_type(), launcher);
        self
    }

    pub fn supports(&self, chain: ChainType) -> bool {
        self.launchers.contains_key(&chain)
    }

    /// Launch a node of the given chain type.
    pub async fn launch(&self, chain: ChainType) -> Result<ServiceResponse, LaunchError> {
        let launcher = self
            .launchers
            .get(&chain)
            .ok_or(LaunchError::Unsupported(chain))?;

        info!("Launching {} node", chain);
        let response = launcher.launch().await?;
        info!("{} node running as service {}", chain, response.service_name);

        Ok(response)
    }
}

impl std::fmt::Debug for LauncherTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut chains: Vec<_> = self.launchers.keys().collect();
        chains.sort();
        f.debug_struct("LauncherTable").field("chains", &chains).finish()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use common::RunEvent;

    use super::*;

    /// Engine answering runs from a script of canned results.
    #[derive(Default)]
    pub struct ScriptedEngine {
        pub results: Mutex<VecDeque<Result<Vec<RunEvent>, EngineError>>>,
        pub requests: Mutex<Vec<WorkflowRequest>>,
        pub removed: Mutex<Vec<Vec<String>>>,
    }

    impl ScriptedEngine {
        pub fn with_results(results: Vec<Result<Vec<RunEvent>, EngineError>>) -> Self {
            Self {
                results: Mutex::new(results.into()),
                ..Default::default()
            }
        }

        pub fn requests(&self) -> Vec<WorkflowRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn removed(&self) -> Vec<Vec<String>> {
            self.removed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WorkflowEngine for ScriptedEngine {
        async fn run_workflow(
            &self,
            _enclave: &str,
            request: &WorkflowRequest,
        ) -> Result<Vec<RunEvent>, EngineError> {
            self.requests.lock().unwrap().push(request.clone());
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(EngineError::Connection("no scripted result".into())))
        }

        async fn remove_services(
            &self,
            _enclave: &str,
            service_names: &[String],
        ) -> Result<(), EngineError> {
            self.removed.lock().unwrap().push(service_names.to_vec());
            Ok(())
        }
    }

    pub fn finished_with(response: &ServiceResponse) -> Vec<RunEvent> {
        vec![
            RunEvent::Instruction {
                description: "add_service".to_string(),
                is_skipped: false,
            },
            RunEvent::ServiceAdded {
                service_name: response.service_name.clone(),
            },
            RunEvent::RunFinished {
                is_successful: true,
                serialized_output: Some(response.encode_to_string().unwrap()),
            },
        ]
    }
}
