//! Common test utilities for bridge setup integration tests.

#![allow(dead_code)]

pub mod mock_services;

pub use mock_services::*;

use std::sync::{Arc, Mutex};

use chains::LauncherTable;
use common::{ChainType, RunEvent, ServiceResponse};
use orchestrator::{BridgeConfig, BridgeOrchestrator, BridgeWorkflowRunner, ChainPairResolver};

pub const BRIDGE_OUTPUT: &str = r#"{"bmc":"cx23a91ee3dd290486a9113a6a42429825d813de53","bmv":"0x5fbdb2315678afecb367f032d93f642f64180aa3"}"#;

/// An orchestrator wired to recording fakes.
pub struct Harness {
    pub engine: Arc<RecordingEngine>,
    pub registry: Arc<InMemoryRegistry>,
    pub icon: Arc<CountingLauncher>,
    pub eth: Arc<CountingLauncher>,
    pub hardhat: Arc<CountingLauncher>,
    pub log: CallLog,
    pub orchestrator: BridgeOrchestrator,
}

pub struct HarnessBuilder {
    results: Vec<Result<Vec<RunEvent>, common::EngineError>>,
    removal_error: Option<common::EngineError>,
    running: Vec<ServiceResponse>,
    failing: Vec<ChainType>,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
            removal_error: None,
            running: Vec::new(),
            failing: Vec::new(),
        }
    }

    /// Queue the result of the next workflow run.
    pub fn run_result(mut self, result: Result<Vec<RunEvent>, common::EngineError>) -> Self {
        self.results.push(result);
        self
    }

    pub fn removal_error(mut self, err: common::EngineError) -> Self {
        self.removal_error = Some(err);
        self
    }

    /// Register a running service.
    pub fn running(mut self, response: ServiceResponse) -> Self {
        self.running.push(response);
        self
    }

    pub fn failing_launch(mut self, chain: ChainType) -> Self {
        self.failing.push(chain);
        self
    }

    pub fn build(self) -> Harness {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));

        let mut engine = RecordingEngine::new(self.results);
        if let Some(err) = self.removal_error {
            engine = engine.failing_removal(err);
        }
        let engine = Arc::new(engine);

        let registry = self
            .running
            .into_iter()
            .fold(InMemoryRegistry::new(log.clone()), |registry, response| {
                registry.with_service(response)
            });
        let registry = Arc::new(registry);

        let launcher = |chain: ChainType| {
            let launcher = CountingLauncher::new(chain, launched(chain), log.clone());
            if self.failing.contains(&chain) {
                Arc::new(launcher.failing())
            } else {
                Arc::new(launcher)
            }
        };
        let icon = launcher(ChainType::Icon);
        let eth = launcher(ChainType::Eth);
        let hardhat = launcher(ChainType::Hardhat);

        let launchers = LauncherTable::new()
            .with_launcher(icon.clone())
            .with_launcher(eth.clone())
            .with_launcher(hardhat.clone());

        let orchestrator = BridgeOrchestrator::new(
            ChainPairResolver::new(registry.clone(), launchers),
            BridgeWorkflowRunner::new(engine.clone(), BridgeConfig::default()),
        );

        Harness {
            engine,
            registry,
            icon,
            eth,
            hardhat,
            log,
            orchestrator,
        }
    }
}

impl Harness {
    pub fn total_launches(&self) -> usize {
        self.icon.launches() + self.eth.launches() + self.hardhat.launches()
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

/// Response of a node that is already running under `service_name`.
pub fn running_service(service_name: &str, chain: ChainType) -> ServiceResponse {
    ServiceResponse {
        service_name: service_name.to_string(),
        private_endpoint: format!("http://{service_name}:9080"),
        network: format!("{chain}-local"),
        ..Default::default()
    }
}

/// Response of a node started by a launcher.
pub fn launched(chain: ChainType) -> ServiceResponse {
    ServiceResponse {
        service_name: format!("{chain}-node-launched"),
        private_endpoint: "http://172.16.0.9:8545".to_string(),
        network: format!("{chain}-local"),
        ..Default::default()
    }
}

/// A successful bridge run.
pub fn bridge_finished() -> Vec<RunEvent> {
    vec![
        RunEvent::Instruction {
            description: "deploy_bmc".to_string(),
            is_skipped: false,
        },
        RunEvent::ServiceAdded {
            service_name: "btp-relay".to_string(),
        },
        RunEvent::RunFinished {
            is_successful: true,
            serialized_output: Some(BRIDGE_OUTPUT.to_string()),
        },
    ]
}

/// A bridge run whose every instruction was already applied.
pub fn bridge_skipped() -> Vec<RunEvent> {
    vec![
        RunEvent::Instruction {
            description: "deploy_bmc".to_string(),
            is_skipped: true,
        },
        RunEvent::RunFinished {
            is_successful: true,
            serialized_output: None,
        },
    ]
}

/// A bridge run that touched `services` and then failed.
pub fn bridge_failed(services: &[&str]) -> Vec<RunEvent> {
    let mut events: Vec<RunEvent> = services
        .iter()
        .map(|name| RunEvent::ServiceAdded {
            service_name: name.to_string(),
        })
        .collect();
    events.push(RunEvent::ExecutionError {
        message: "relay configuration failed".to_string(),
    });
    events
}
