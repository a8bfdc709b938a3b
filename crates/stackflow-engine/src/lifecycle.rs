//! Single-stack lifecycle: create-or-update with blocking completion
//! polling, and idempotent destroy.

use crate::error::{EngineError, Result};
use crate::poll::PollConfig;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use stackflow_cloud::{
    CloudError, OperationKind, ProvisioningClient, StackStatus, UpdateDispatch,
};
use stackflow_core::StackSpec;
use tokio::time::sleep;

/// What `apply` ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppliedAction {
    Created,
    Updated,
    /// The backend reported no changes to apply. Success, not an error.
    Unchanged,
}

#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    pub action: AppliedAction,
    pub status: StackStatus,
    /// Outputs fetched once after the terminal state was reached.
    pub outputs: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyOutcome {
    Destroyed,
    /// The stack did not exist; nothing was dispatched.
    AlreadyAbsent,
}

/// Drives one stack through its lifecycle against the provisioning
/// backend. `apply` and `destroy` are idempotent and block until the
/// operation reaches a terminal status.
pub struct StackLifecycleManager {
    client: Arc<dyn ProvisioningClient>,
    poll: PollConfig,
}

impl StackLifecycleManager {
    pub fn new(client: Arc<dyn ProvisioningClient>, poll: PollConfig) -> Self {
        Self { client, poll }
    }

    /// Create the stack if it does not exist, update it if it sits in a
    /// stable complete state, error on anything else. A failed terminal
    /// status is surfaced as a fatal error; retrying is the operator's
    /// decision, never automatic.
    pub async fn apply(
        &self,
        spec: &StackSpec,
        parameters: &[(String, String)],
    ) -> Result<ApplyOutcome> {
        let capabilities: Vec<&str> = spec.capabilities.iter().map(|c| c.as_str()).collect();

        let action = match self.client.describe(&spec.stack_name).await? {
            None => {
                tracing::info!(stack = %spec.stack_name, "stack absent, creating");
                self.client
                    .create(
                        &spec.stack_name,
                        spec.template.body,
                        parameters,
                        &capabilities,
                    )
                    .await?;
                AppliedAction::Created
            }
            Some(status) if status.is_stable_complete() => {
                tracing::info!(stack = %spec.stack_name, %status, "stack exists, updating");
                match self
                    .client
                    .update(
                        &spec.stack_name,
                        spec.template.body,
                        parameters,
                        &capabilities,
                    )
                    .await?
                {
                    UpdateDispatch::Started(_) => AppliedAction::Updated,
                    UpdateDispatch::NoChanges => {
                        tracing::info!(stack = %spec.stack_name, "no changes to apply");
                        let outputs = self.client.outputs(&spec.stack_name).await?;
                        return Ok(ApplyOutcome {
                            action: AppliedAction::Unchanged,
                            status,
                            outputs,
                        });
                    }
                }
            }
            Some(status) => {
                return Err(EngineError::Conflict {
                    stack: spec.stack_name.clone(),
                    status,
                });
            }
        };

        let kind = match action {
            AppliedAction::Created => OperationKind::Create,
            _ => OperationKind::Update,
        };
        let status = self.wait_for_terminal(&spec.stack_name, kind).await?;
        if status.is_failure() {
            return Err(EngineError::OperationFailed {
                stack: spec.stack_name.clone(),
                kind,
                status,
            });
        }

        let outputs = self.client.outputs(&spec.stack_name).await?;
        Ok(ApplyOutcome {
            action,
            status,
            outputs,
        })
    }

    /// Delete the stack and block until deletion completes. A stack that
    /// does not exist is immediate success with no delete dispatched.
    pub async fn destroy(&self, spec: &StackSpec) -> Result<DestroyOutcome> {
        if self.client.describe(&spec.stack_name).await?.is_none() {
            tracing::info!(stack = %spec.stack_name, "stack already absent");
            return Ok(DestroyOutcome::AlreadyAbsent);
        }

        self.client.delete(&spec.stack_name).await?;
        let status = self
            .wait_for_terminal(&spec.stack_name, OperationKind::Delete)
            .await?;
        if status.is_failure() {
            return Err(EngineError::OperationFailed {
                stack: spec.stack_name.clone(),
                kind: OperationKind::Delete,
                status,
            });
        }
        Ok(DestroyOutcome::Destroyed)
    }

    /// Cooperative polling until the backend reports a terminal status.
    /// The backend owns the operation: there is nothing to cancel locally,
    /// only a ceiling on how long we keep watching.
    async fn wait_for_terminal(
        &self,
        stack_name: &str,
        kind: OperationKind,
    ) -> Result<StackStatus> {
        let started = Instant::now();
        let mut last = StackStatus::Other("UNKNOWN".to_string());

        loop {
            match self.client.describe(stack_name).await? {
                // A stack that vanishes mid-wait is a completed delete;
                // for anything else it means the backend lost our stack.
                None if kind == OperationKind::Delete => return Ok(StackStatus::DeleteComplete),
                None => {
                    return Err(CloudError::StackNotFound(stack_name.to_string()).into());
                }
                Some(status) if status.is_terminal() => return Ok(status),
                Some(status) => {
                    tracing::debug!(stack = stack_name, %status, "waiting for terminal status");
                    last = status;
                }
            }

            if started.elapsed() >= self.poll.timeout {
                return Err(EngineError::Timeout {
                    stack: stack_name.to_string(),
                    elapsed: started.elapsed(),
                    last_status: last,
                });
            }
            sleep(self.poll.interval).await;
        }
    }
}
