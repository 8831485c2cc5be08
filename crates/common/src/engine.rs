//! Remote workflow engine interface.
//!
//! Workflows (node launches, BTP bridge setup) run inside an enclave managed
//! by a remote engine. The engine takes a package, a script inside it, an
//! entry point and JSON parameters, and answers with the run's event stream.
//!
//! ```ignore
//! let engine = HttpWorkflowEngine::new("http://localhost:9710", None)?;
//! let events = engine.run_workflow("bridge", &request).await?;
//! let outcome = ExecutionReport::collect(&events).into_outcome()?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::execution::RunEvent;

/// A workflow to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRequest {
    /// Package holding the workflow scripts.
    pub package: String,
    /// Script path inside the package.
    pub script: String,
    /// Function of the script to run.
    pub entry_point: String,
    /// Serialized JSON parameters.
    pub params: String,
}

/// Workflow engine errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("workflow engine unreachable: {0}")]
    Connection(String),

    #[error("enclave '{0}' not found")]
    EnclaveNotFound(String),

    #[error("workflow engine returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode workflow engine response: {0}")]
    Decode(String),
}

/// Remote workflow execution and service removal.
#[async_trait]
pub trait WorkflowEngine: Send + Sync {
    /// Run a workflow in an enclave and return its events.
    ///
    /// Runs to completion; callers impose no timeout.
    async fn run_workflow(
        &self,
        enclave: &str,
        request: &WorkflowRequest,
    ) -> Result<Vec<RunEvent>, EngineError>;

    /// Remove services from an enclave.
    async fn remove_services(
        &self,
        enclave: &str,
        service_names: &[String],
    ) -> Result<(), EngineError>;
}

#[derive(Serialize)]
struct RemoveServicesRequest<'a> {
    service_names: &'a [String],
}

/// HTTP client of the workflow engine API.
#[derive(Clone)]
pub struct HttpWorkflowEngine {
    base_url: String,
    client: HttpClient,
}

impl HttpWorkflowEngine {
    /// Create a client. Without a timeout requests wait for the engine
    /// indefinitely.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, EngineError> {
        let mut builder = HttpClient::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| EngineError::Connection(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn enclave_url(&self, enclave: &str, path: &str) -> String {
        format!("{}/api/v1/enclaves/{}/{}", self.base_url, enclave, path)
    }

    async fn check_status(
        enclave: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, EngineError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(EngineError::EnclaveNotFound(enclave.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        Err(EngineError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl WorkflowEngine for HttpWorkflowEngine {
    async fn run_workflow(
        &self,
        enclave: &str,
        request: &WorkflowRequest,
    ) -> Result<Vec<RunEvent>, EngineError> {
        let url = self.enclave_url(enclave, "workflows/run");
        debug!(
            "Running {}:{} ({}) in enclave {}",
            request.script, request.entry_point, request.package, enclave
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| EngineError::Connection(e.to_string()))?;

        Self::check_status(enclave, response)
            .await?
            .json::<Vec<RunEvent>>()
            .await
            .map_err(|e| EngineError::Decode(e.to_string()))
    }

    async fn remove_services(
        &self,
        enclave: &str,
        service_names: &[String],
    ) -> Result<(), EngineError> {
        let url = self.enclave_url(enclave, "services/remove");
        debug!("Removing services {:?} from enclave {}", service_names, enclave);

        let response = self
            .client
            .post(&url)
            .json(&RemoveServicesRequest { service_names })
            .send()
            .await
            .map_err(|e| EngineError::Connection(e.to_string()))?;

        Self::check_status(enclave, response).await?;
        Ok(())
    }
}
