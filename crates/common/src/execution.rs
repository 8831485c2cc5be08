//! Workflow run results.
//!
//! The workflow engine answers a run with a stream of [`RunEvent`]s. An
//! [`ExecutionReport`] folds that stream into what callers need: the
//! serialized output, the services the run touched (for rollback) and the
//! instructions it skipped because their effect was already in place.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One event of a workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEvent {
    /// An instruction was planned. Skipped instructions were already applied.
    Instruction {
        description: String,
        #[serde(default)]
        is_skipped: bool,
    },
    InstructionResult {
        message: String,
    },
    /// The run created or updated a service.
    ServiceAdded {
        service_name: String,
    },
    ProgressInfo {
        message: String,
    },
    Warning {
        message: String,
    },
    InterpretationError {
        message: String,
    },
    ValidationError {
        message: String,
    },
    ExecutionError {
        message: String,
    },
    RunFinished {
        is_successful: bool,
        #[serde(default)]
        serialized_output: Option<String>,
    },
}

/// Why a run's result could not be extracted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("workflow interpretation failed: {0}")]
    Interpretation(String),

    #[error("workflow validation failed: {0}")]
    Validation(String),

    #[error("workflow execution failed: {0}")]
    Execution(String),

    #[error("workflow run finished unsuccessfully")]
    Unsuccessful,

    #[error("workflow event stream ended before the run finished")]
    Incomplete,
}

/// Successfully extracted run result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub serialized_output: String,
    pub services: Vec<String>,
    pub skipped_instructions: usize,
}

impl ExecutionOutcome {
    /// The engine found nothing to do.
    pub fn is_noop(&self) -> bool {
        self.skipped_instructions > 0
    }
}

/// Folded view of a run's event stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    serialized_output: Option<String>,
    services: Vec<String>,
    skipped_instructions: usize,
    error: Option<ExtractionError>,
    finished: Option<bool>,
}

impl ExecutionReport {
    pub fn collect<'a>(events: impl IntoIterator<Item = &'a RunEvent>) -> Self {
        let mut report = Self::default();

        for event in events {
            match event {
                RunEvent::Instruction { is_skipped, .. } => {
                    if *is_skipped {
                        report.skipped_instructions += 1;
                    }
                }
                RunEvent::ServiceAdded { service_name } => {
                    if !report.services.contains(service_name) {
                        report.services.push(service_name.clone());
                    }
                }
                RunEvent::InterpretationError { message } => {
                    report.fail(ExtractionError::Interpretation(message.clone()));
                }
                RunEvent::ValidationError { message } => {
                    report.fail(ExtractionError::Validation(message.clone()));
                }
                RunEvent::ExecutionError { message } => {
                    report.fail(ExtractionError::Execution(message.clone()));
                }
                RunEvent::RunFinished {
                    is_successful,
                    serialized_output,
                } => {
                    report.finished = Some(*is_successful);
                    report.serialized_output = serialized_output.clone();
                }
                RunEvent::InstructionResult { .. }
                | RunEvent::ProgressInfo { .. }
                | RunEvent::Warning { .. } => {}
            }
        }

        report
    }

    // The first error is the one worth reporting.
    fn fail(&mut self, error: ExtractionError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Services touched by the run, in the order they appeared.
    pub fn services(&self) -> &[String] {
        &self.services
    }

    pub fn skipped_instructions(&self) -> usize {
        self.skipped_instructions
    }

    pub fn into_outcome(self) -> Result<ExecutionOutcome, ExtractionError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        match self.finished {
            None => Err(ExtractionError::Incomplete),
            Some(false) => Err(ExtractionError::Unsuccessful),
            Some(true) => Ok(ExecutionOutcome {
                serialized_output: self.serialized_output.unwrap_or_default(),
                services: self.services,
                skipped_instructions: self.skipped_instructions,
            }),
        }
    }
}
