//! Stackflow Engine
//!
//! The stack lifecycle orchestration core: decides per unit whether to
//! create, update or leave alone; walks the dependency graph in
//! topological order for apply and exact reverse for destroy; blocks on
//! backend polling until each operation reaches a terminal state; and
//! gates teardown behind escalating confirmation with pre-destroy bucket
//! purge.
//!
//! A single control task drives the walk — stacks have hard ordering
//! dependencies, so node operations are deliberately sequential. The only
//! internal parallelism is the bounded delete pool inside [`BucketPurger`].

pub mod confirm;
pub mod error;
pub mod executor;
pub mod lifecycle;
pub mod poll;
pub mod purge;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports
pub use confirm::{ConfirmationGate, GateState, PRIMARY_TOKEN};
pub use error::{EngineError, Result};
pub use executor::{GraphExecutor, HaltedNode, NodeAction, NodeResult, WalkOutcome};
pub use lifecycle::{ApplyOutcome, AppliedAction, DestroyOutcome, StackLifecycleManager};
pub use poll::PollConfig;
pub use purge::BucketPurger;
