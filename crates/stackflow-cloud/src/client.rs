//! Provisioning client trait definition

use crate::error::Result;
use crate::status::StackStatus;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;

/// One entry in a versioned bucket listing: a payload version or a delete
/// marker. Both must be removed to fully empty the bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectVersion {
    pub key: String,
    pub version_id: Option<String>,
    pub is_delete_marker: bool,
}

impl ObjectVersion {
    pub fn version(key: impl Into<String>, version_id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            version_id: Some(version_id.into()),
            is_delete_marker: false,
        }
    }

    pub fn delete_marker(key: impl Into<String>, version_id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            version_id: Some(version_id.into()),
            is_delete_marker: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Create,
    Update,
    Delete,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Create => write!(f, "create"),
            OperationKind::Update => write!(f, "update"),
            OperationKind::Delete => write!(f, "delete"),
        }
    }
}

/// Handle for a dispatched stack operation.
///
/// The backend owns the operation once dispatched; the handle exists for
/// reporting while the caller polls [`ProvisioningClient::describe`] for a
/// terminal status.
#[derive(Debug, Clone)]
pub struct OperationHandle {
    pub stack_name: String,
    pub kind: OperationKind,
}

impl OperationHandle {
    pub fn new(stack_name: impl Into<String>, kind: OperationKind) -> Self {
        Self {
            stack_name: stack_name.into(),
            kind,
        }
    }
}

/// Outcome of dispatching a stack update.
#[derive(Debug, Clone)]
pub enum UpdateDispatch {
    Started(OperationHandle),
    /// The backend signalled there is nothing to change. Success, not an
    /// error.
    NoChanges,
}

/// Narrow interface to the provisioning backend.
///
/// The engine never reaches past this trait: stack operations go through
/// CloudFormation-shaped calls, bucket purging through the object-storage
/// calls. Waiting for a terminal status is the caller's concern (a
/// describe/sleep loop), which keeps this trait a thin mirror of the
/// backend and trivially scriptable in tests.
#[async_trait]
pub trait ProvisioningClient: Send + Sync {
    /// Current status of a named stack, or `None` if it does not exist.
    async fn describe(&self, stack_name: &str) -> Result<Option<StackStatus>>;

    /// Dispatch stack creation.
    async fn create(
        &self,
        stack_name: &str,
        template_body: &str,
        parameters: &[(String, String)],
        capabilities: &[&str],
    ) -> Result<OperationHandle>;

    /// Dispatch a stack update. Returns [`UpdateDispatch::NoChanges`] when
    /// the backend reports there is nothing to apply.
    async fn update(
        &self,
        stack_name: &str,
        template_body: &str,
        parameters: &[(String, String)],
        capabilities: &[&str],
    ) -> Result<UpdateDispatch>;

    /// Dispatch stack deletion.
    async fn delete(&self, stack_name: &str) -> Result<OperationHandle>;

    /// Output key/value map of a complete stack.
    async fn outputs(&self, stack_name: &str) -> Result<HashMap<String, String>>;

    async fn bucket_exists(&self, bucket: &str) -> Result<bool>;

    /// All object versions and delete markers in the bucket.
    async fn list_object_versions(&self, bucket: &str) -> Result<Vec<ObjectVersion>>;

    /// Delete one version or delete marker. `version_id: None` deletes the
    /// current object unversioned.
    async fn delete_object_version(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
    ) -> Result<()>;

    /// Keys visible in an unversioned listing, for the final sweep.
    async fn list_objects(&self, bucket: &str) -> Result<Vec<String>>;
}
