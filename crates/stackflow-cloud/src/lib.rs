//! Stackflow Cloud
//!
//! Provisioning backend abstraction. The engine only ever talks to the
//! backend through the [`ProvisioningClient`] trait defined here; the AWS
//! implementation lives in `stackflow-cloud-aws`, and tests script the
//! trait directly.
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 stackflow CLI                    │
//! │                (stack up/down)                   │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               stackflow-engine                   │
//! │   lifecycle · graph walk · purge · confirm       │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               stackflow-cloud                    │
//! │        trait ProvisioningClient { ... }          │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │             stackflow-cloud-aws                  │
//! │           CloudFormation + S3 SDKs               │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod client;
pub mod error;
pub mod status;
pub mod summary;

// Re-exports
pub use client::{
    ObjectVersion, OperationHandle, OperationKind, ProvisioningClient, UpdateDispatch,
};
pub use error::{CloudError, Result};
pub use status::StackStatus;
pub use summary::{Summary, SummaryStore};
