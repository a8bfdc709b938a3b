//! Graph walk: apply in topological order, destroy in exact reverse.

use crate::error::{EngineError, Result};
use crate::lifecycle::{AppliedAction, DestroyOutcome, StackLifecycleManager};
use crate::poll::PollConfig;
use crate::purge::BucketPurger;
use std::collections::HashMap;
use std::sync::Arc;
use stackflow_cloud::ProvisioningClient;
use stackflow_core::{DependencyGraph, ParameterValue, StackSpec};

/// What happened to one node during a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAction {
    Created,
    Updated,
    Unchanged,
    Destroyed,
    AlreadyAbsent,
}

impl From<AppliedAction> for NodeAction {
    fn from(action: AppliedAction) -> Self {
        match action {
            AppliedAction::Created => Self::Created,
            AppliedAction::Updated => Self::Updated,
            AppliedAction::Unchanged => Self::Unchanged,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NodeResult {
    pub unit: String,
    pub stack_name: String,
    pub action: NodeAction,
    /// Objects removed by the pre-destroy purge, when the node owns
    /// storage.
    pub purged_objects: usize,
}

/// The node the walk stopped at, with its error.
#[derive(Debug)]
pub struct HaltedNode {
    pub unit: String,
    pub error: EngineError,
}

/// Ordered results of a walk. `halted` carries the first failure; nodes
/// after it were never attempted, since they may depend on the failed
/// one's outputs.
#[derive(Debug)]
pub struct WalkOutcome {
    pub completed: Vec<NodeResult>,
    pub halted: Option<HaltedNode>,
}

impl WalkOutcome {
    pub fn is_success(&self) -> bool {
        self.halted.is_none()
    }
}

/// Walks the dependency graph, driving the lifecycle manager per node and
/// propagating ancestor outputs into dependent parameter sets.
pub struct GraphExecutor {
    client: Arc<dyn ProvisioningClient>,
    lifecycle: StackLifecycleManager,
    purger: BucketPurger,
    graph: DependencyGraph,
    /// Outputs cache, written only by the node that completed and read by
    /// its descendants. Discarded at process exit.
    outputs: HashMap<String, HashMap<String, String>>,
}

impl GraphExecutor {
    pub fn new(client: Arc<dyn ProvisioningClient>, graph: DependencyGraph, poll: PollConfig) -> Self {
        Self {
            lifecycle: StackLifecycleManager::new(client.clone(), poll),
            purger: BucketPurger::new(client.clone()),
            client,
            graph,
            outputs: HashMap::new(),
        }
    }

    /// Cached outputs of a unit, available once it has been applied.
    pub fn outputs_of(&self, unit: &str) -> Option<&HashMap<String, String>> {
        self.outputs.get(unit)
    }

    /// Apply every stack in topological order. The first failure halts
    /// the walk and is returned with the partial results.
    pub async fn apply_all(&mut self) -> WalkOutcome {
        let specs: Vec<StackSpec> = self.graph.apply_order().cloned().collect();
        let mut completed = Vec::new();

        for spec in specs {
            let parameters = match self.effective_parameters(&spec) {
                Ok(parameters) => parameters,
                Err(error) => {
                    return WalkOutcome {
                        completed,
                        halted: Some(HaltedNode {
                            unit: spec.unit,
                            error,
                        }),
                    };
                }
            };

            match self.lifecycle.apply(&spec, &parameters).await {
                Ok(outcome) => {
                    tracing::info!(
                        stack = %spec.stack_name,
                        action = ?outcome.action,
                        status = %outcome.status,
                        "stack applied"
                    );
                    // Any update invalidates previously cached outputs;
                    // this fresh fetch replaces them.
                    self.outputs.insert(spec.unit.clone(), outcome.outputs);
                    completed.push(NodeResult {
                        unit: spec.unit,
                        stack_name: spec.stack_name,
                        action: outcome.action.into(),
                        purged_objects: 0,
                    });
                }
                Err(error) => {
                    return WalkOutcome {
                        completed,
                        halted: Some(HaltedNode {
                            unit: spec.unit,
                            error,
                        }),
                    };
                }
            }
        }

        WalkOutcome {
            completed,
            halted: None,
        }
    }

    /// Destroy every stack in the exact reverse of the apply order,
    /// purging owned buckets before their stack is deleted.
    pub async fn destroy_all(&mut self) -> WalkOutcome {
        let specs: Vec<StackSpec> = self.graph.destroy_order().cloned().collect();
        let mut completed = Vec::new();

        for spec in specs {
            let purged_objects = if spec.owns_storage() {
                match self.purge_node(&spec).await {
                    Ok(count) => count,
                    Err(error) => {
                        return WalkOutcome {
                            completed,
                            halted: Some(HaltedNode {
                                unit: spec.unit,
                                error,
                            }),
                        };
                    }
                }
            } else {
                0
            };

            match self.lifecycle.destroy(&spec).await {
                Ok(outcome) => {
                    tracing::info!(stack = %spec.stack_name, outcome = ?outcome, "stack destroyed");
                    self.outputs.remove(&spec.unit);
                    completed.push(NodeResult {
                        unit: spec.unit,
                        stack_name: spec.stack_name,
                        action: match outcome {
                            DestroyOutcome::Destroyed => NodeAction::Destroyed,
                            DestroyOutcome::AlreadyAbsent => NodeAction::AlreadyAbsent,
                        },
                        purged_objects,
                    });
                }
                Err(error) => {
                    return WalkOutcome {
                        completed,
                        halted: Some(HaltedNode {
                            unit: spec.unit,
                            error,
                        }),
                    };
                }
            }
        }

        WalkOutcome {
            completed,
            halted: None,
        }
    }

    /// Resolve the node's effective parameter set. Output references read
    /// the in-memory cache filled by ancestor applies; a missing value is
    /// a configuration error raised before any provisioning call for this
    /// node.
    fn effective_parameters(&self, spec: &StackSpec) -> Result<Vec<(String, String)>> {
        spec.parameters
            .iter()
            .map(|parameter| {
                let value = match &parameter.value {
                    ParameterValue::Literal(value) => value.clone(),
                    ParameterValue::FromOutput { unit, key } => self
                        .outputs
                        .get(unit)
                        .and_then(|outputs| outputs.get(key))
                        .cloned()
                        .ok_or_else(|| EngineError::MissingOutput {
                            stack: spec.unit.clone(),
                            source: unit.clone(),
                            key: key.clone(),
                        })?,
                };
                Ok((parameter.key.clone(), value))
            })
            .collect()
    }

    /// Purge every bucket derived from the node's outputs. Bucket names
    /// come from the live backend: the output cache does not survive the
    /// process that applied the stack.
    async fn purge_node(&self, spec: &StackSpec) -> Result<usize> {
        if self.client.describe(&spec.stack_name).await?.is_none() {
            return Ok(0);
        }
        let outputs = self.client.outputs(&spec.stack_name).await?;

        let mut total = 0;
        for unit in &spec.storage_units {
            match outputs.get(&unit.output_key) {
                Some(bucket) => total += self.purger.purge(bucket).await?,
                None => {
                    tracing::warn!(
                        stack = %spec.stack_name,
                        output = %unit.output_key,
                        "stack reports no bucket under this output, skipping purge"
                    );
                }
            }
        }
        Ok(total)
    }
}
