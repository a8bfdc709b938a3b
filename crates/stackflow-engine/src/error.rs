//! Engine error taxonomy.
//!
//! Configuration errors are detectable without backend effects; everything
//! else is a runtime failure of one named stack or bucket and halts the
//! graph walk at that node.

use stackflow_cloud::{CloudError, OperationKind, StackStatus};
use stackflow_core::CoreError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] CoreError),

    #[error(
        "stack '{stack}' is in unexpected state {status}; resolve it in the backend before retrying"
    )]
    Conflict { stack: String, status: StackStatus },

    #[error("stack '{stack}' {kind} failed with terminal status {status}")]
    OperationFailed {
        stack: String,
        kind: OperationKind,
        status: StackStatus,
    },

    #[error(
        "timed out after {elapsed:?} waiting for stack '{stack}' (last observed status: {last_status})"
    )]
    Timeout {
        stack: String,
        elapsed: Duration,
        last_status: StackStatus,
    },

    #[error("stack '{stack}' requires output '{key}' of '{source}', which is not available")]
    MissingOutput {
        stack: String,
        source: String,
        key: String,
    },

    #[error(transparent)]
    Provision(#[from] CloudError),
}

impl EngineError {
    /// Configuration problems, as opposed to backend or operator outcomes.
    /// The CLI reports them with a distinct exit code when no backend call
    /// has been made yet.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_) | Self::MissingOutput { .. })
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
