//! BTP bridge workflow invocation.
//!
//! Runs the bridge setup entry point on a resolved pair, then interprets the
//! event stream: a run whose result cannot be extracted has its touched
//! services removed, a run with skipped instructions means the bridge is
//! already in place.

use std::sync::Arc;

use common::{ChainType, EventType, ExecutionReport, LogEvent, WorkflowEngine, WorkflowRequest};
use serde::Serialize;
use serde_json::value::RawValue;
use tracing::{debug, error, info, warn};

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::resolver::ResolvedPair;

/// Parameters of the bridge setup entry points.
///
/// The chain configs are service responses embedded as JSON objects.
#[derive(Debug, Serialize)]
pub struct BridgeParams<'a> {
    pub src_chain: ChainType,
    pub dst_chain: ChainType,
    pub src_chain_config: &'a RawValue,
    pub dst_chain_config: &'a RawValue,
    pub bridge: bool,
}

impl<'a> BridgeParams<'a> {
    pub fn new(resolved: &'a ResolvedPair, bridge: bool) -> Result<Self> {
        Ok(Self {
            src_chain: resolved.src_chain,
            dst_chain: resolved.dst_chain,
            src_chain_config: raw(&resolved.src_service_response)?,
            dst_chain_config: raw(&resolved.dst_service_response)?,
            bridge,
        })
    }
}

fn raw(json: &str) -> Result<&RawValue> {
    serde_json::from_str(json).map_err(BridgeError::PayloadEncoding)
}

/// Runs the bridge workflow against the workflow engine.
pub struct BridgeWorkflowRunner {
    engine: Arc<dyn WorkflowEngine>,
    config: BridgeConfig,
}

impl BridgeWorkflowRunner {
    pub fn new(engine: Arc<dyn WorkflowEngine>, config: BridgeConfig) -> Self {
        Self { engine, config }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Build the engine request for a resolved pair.
    pub fn build_request(&self, resolved: &ResolvedPair, bridge: bool) -> Result<WorkflowRequest> {
        let params = BridgeParams::new(resolved, bridge)?;
        let params = serde_json::to_string(&params).map_err(BridgeError::PayloadEncoding)?;

        Ok(WorkflowRequest {
            package: self.config.package.clone(),
            script: self.config.bridge_script.clone(),
            entry_point: resolved.entry_point.function_name().to_string(),
            params,
        })
    }

    /// Run the bridge workflow and return its serialized output.
    pub async fn run(&self, resolved: &ResolvedPair, bridge: bool) -> Result<String> {
        let request = self.build_request(resolved, bridge)?;
        debug!("Bridge workflow parameters: {}", request.params);

        info!(
            "Running {} for {} -> {} in enclave {}",
            request.entry_point, resolved.src_chain, resolved.dst_chain, self.config.enclave
        );
        LogEvent::new(EventType::WorkflowInvoked)
            .with_chain_pair(resolved.src_chain.as_str(), resolved.dst_chain.as_str())
            .with_context("entry_point", request.entry_point.as_str())
            .emit();

        let events = self
            .engine
            .run_workflow(&self.config.enclave, &request)
            .await
            .map_err(BridgeError::WorkflowExecutionFailed)?;

        let report = ExecutionReport::collect(&events);
        let services = report.services().to_vec();

        let outcome = match report.into_outcome() {
            Ok(outcome) => outcome,
            Err(extraction) => {
                LogEvent::new(EventType::WorkflowFailed)
                    .with_chain_pair(resolved.src_chain.as_str(), resolved.dst_chain.as_str())
                    .with_error(extraction.to_string())
                    .emit();
                self.rollback(&services).await?;
                return Err(BridgeError::ResultExtractionFailed(extraction));
            }
        };

        if outcome.is_noop() {
            warn!(
                "Bridge workflow skipped {} instructions, bridge is already running",
                outcome.skipped_instructions
            );
            return Err(BridgeError::AlreadyRunning);
        }

        Ok(outcome.serialized_output)
    }

    async fn rollback(&self, services: &[String]) -> Result<()> {
        if services.is_empty() {
            debug!("Bridge workflow touched no services, nothing to roll back");
            return Ok(());
        }

        warn!("Removing services {:?} of the failed bridge workflow", services);
        LogEvent::new(EventType::RollbackStarted)
            .with_context("services", services.join(","))
            .emit();

        match self.engine.remove_services(&self.config.enclave, services).await {
            Ok(()) => {
                LogEvent::new(EventType::RollbackCompleted)
                    .with_context("services", services.join(","))
                    .emit();
                Ok(())
            }
            Err(source) => {
                error!("Rollback of services {:?} failed: {}", services, source);
                LogEvent::new(EventType::RollbackFailed)
                    .with_context("services", services.join(","))
                    .with_error(source.to_string())
                    .emit();
                Err(BridgeError::RollbackFailed {
                    services: services.to_vec(),
                    source,
                })
            }
        }
    }
}
