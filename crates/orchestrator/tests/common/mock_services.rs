//! Recording fakes of the orchestrator's collaborators.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chains::{LaunchError, NodeLauncher};
use common::{
    ChainType, EngineError, RegistryError, RunEvent, ServiceRegistry, ServiceResponse,
    WorkflowEngine, WorkflowRequest,
};

/// Shared, ordered log of registry lookups and node launches.
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Workflow engine answering runs from a script and recording every call.
#[derive(Default)]
pub struct RecordingEngine {
    results: Mutex<VecDeque<Result<Vec<RunEvent>, EngineError>>>,
    requests: Mutex<Vec<WorkflowRequest>>,
    removed: Mutex<Vec<Vec<String>>>,
    removal_error: Option<EngineError>,
}

impl RecordingEngine {
    pub fn new(results: Vec<Result<Vec<RunEvent>, EngineError>>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            ..Default::default()
        }
    }

    /// Make every service removal fail with `err`.
    pub fn failing_removal(mut self, err: EngineError) -> Self {
        self.removal_error = Some(err);
        self
    }

    pub fn requests(&self) -> Vec<WorkflowRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn removed(&self) -> Vec<Vec<String>> {
        self.removed.lock().unwrap().clone()
    }

    /// Parameters of the last run, decoded.
    pub fn last_params(&self) -> serde_json::Value {
        let requests = self.requests();
        let request = requests.last().expect("no workflow was run");
        serde_json::from_str(&request.params).unwrap()
    }
}

#[async_trait]
impl WorkflowEngine for RecordingEngine {
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
            .unwrap_or_else(|| Err(EngineError::Connection("unexpected workflow run".into())))
    }

    async fn remove_services(
        &self,
        _enclave: &str,
        service_names: &[String],
    ) -> Result<(), EngineError> {
        self.removed.lock().unwrap().push(service_names.to_vec());
        match &self.removal_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// Registry backed by a map, counting lookups.
pub struct InMemoryRegistry {
    services: BTreeMap<String, ServiceResponse>,
    lookups: AtomicUsize,
    log: CallLog,
}

impl InMemoryRegistry {
    pub fn new(log: CallLog) -> Self {
        Self {
            services: BTreeMap::new(),
            lookups: AtomicUsize::new(0),
            log,
        }
    }

    pub fn with_service(mut self, response: ServiceResponse) -> Self {
        self.services.insert(response.service_name.clone(), response);
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl ServiceRegistry for InMemoryRegistry {
    fn lookup(&self, service_name: &str) -> Result<ServiceResponse, RegistryError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push(format!("lookup {service_name}"));
        self.services
            .get(service_name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound {
                service_name: service_name.to_string(),
            })
    }
}

/// Launcher returning a fixed response, counting launches.
pub struct CountingLauncher {
    chain: ChainType,
    response: ServiceResponse,
    fail: bool,
    launches: AtomicUsize,
    log: CallLog,
}

impl CountingLauncher {
    pub fn new(chain: ChainType, response: ServiceResponse, log: CallLog) -> Self {
        Self {
            chain,
            response,
            fail: false,
            launches: AtomicUsize::new(0),
            log,
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NodeLauncher for CountingLauncher {
    fn chain_type(&self) -> ChainType {
        self.chain
    }

    async fn launch(&self) -> Result<ServiceResponse, LaunchError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push(format!("launch {}", self.chain));
        if self.fail {
            return Err(LaunchError::Workflow {
                chain: self.chain,
                entry_point: "start_node",
                source: EngineError::Connection("connection refused".to_string()),
            });
        }
        Ok(self.response.clone())
    }
}
