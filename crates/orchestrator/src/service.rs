//! Bridge Setup Orchestrator
//!
//! Entry point of a BTP bridge setup. Each call validates the pair, resolves
//! both chains to running nodes and runs the bridge workflow. Failures carry
//! the chain pair and the phase they happened in.

use std::sync::Arc;
use std::time::Instant;

use chains::{LaunchContext, LauncherTable};
use common::{ChainPair, EventType, LogEvent, ServiceRegistry, ServiceStore, WorkflowEngine};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::BridgeConfig;
use crate::error::{BridgeError, SetupError, SetupPhase};
use crate::resolver::ChainPairResolver;
use crate::workflow::BridgeWorkflowRunner;

/// Bridge setup orchestrator.
pub struct BridgeOrchestrator {
    resolver: ChainPairResolver,
    runner: BridgeWorkflowRunner,
}

impl BridgeOrchestrator {
    pub fn new(resolver: ChainPairResolver, runner: BridgeWorkflowRunner) -> Self {
        Self { resolver, runner }
    }

    /// Orchestrator with the standard launchers, all sharing one engine and
    /// recording launched nodes in `store`.
    pub fn standard(
        engine: Arc<dyn WorkflowEngine>,
        store: Arc<ServiceStore>,
        config: BridgeConfig,
    ) -> Self {
        let context = LaunchContext::new(engine.clone(), &config.enclave, &config.package)
            .with_store(store.clone());
        let launchers = LauncherTable::standard(Arc::new(context));
        let registry: Arc<dyn ServiceRegistry> = store;

        Self::new(
            ChainPairResolver::new(registry, launchers),
            BridgeWorkflowRunner::new(engine, config),
        )
    }

    /// Set up a BTP bridge between the chains of `pair`.
    ///
    /// Returns the serialized output of the bridge workflow.
    pub async fn setup_bridge(&self, pair: &ChainPair) -> Result<String, SetupError> {
        let run_id = Uuid::new_v4().to_string();
        let started = Instant::now();
        let event = |event_type: EventType| {
            LogEvent::new(event_type)
                .with_correlation_id(run_id.as_str())
                .with_chain_pair(pair.chain_a().as_str(), pair.chain_b().as_str())
        };

        info!("Setting up BTP bridge {} (run {})", pair, run_id);
        event(EventType::SetupStarted)
            .with_context("bridge", pair.bridge().to_string())
            .emit();

        let result = self.run_phases(pair).await;

        match &result {
            Ok(_) => {
                event(EventType::SetupCompleted)
                    .with_duration(started.elapsed())
                    .emit();
                info!("BTP bridge {} set up", pair);
            }
            Err(err) if err.is_already_running() => {
                event(EventType::AlreadyRunning)
                    .with_duration(started.elapsed())
                    .emit();
                warn!("BTP bridge {} is already running", pair);
            }
            Err(err) => {
                event(EventType::SetupFailed)
                    .with_phase(err.phase.to_string())
                    .with_duration(started.elapsed())
                    .with_error(err.source.to_string())
                    .emit();
            }
        }

        result
    }

    async fn run_phases(&self, pair: &ChainPair) -> Result<String, SetupError> {
        let fail = |phase: SetupPhase| move |source: BridgeError| SetupError::new(pair, phase, source);

        pair.validate()
            .map_err(BridgeError::from)
            .map_err(fail(SetupPhase::Validation))?;

        let resolved = self
            .resolver
            .resolve(pair)
            .await
            .map_err(fail(SetupPhase::Resolution))?;

        self.runner
            .run(&resolved, pair.bridge())
            .await
            .map_err(fail(SetupPhase::Workflow))
    }
}
