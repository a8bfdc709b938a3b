//! Scripted provisioning backend for engine tests.
//!
//! Stacks advance through a scripted status sequence: each `describe`
//! while an operation is in flight pops the next status, and the last one
//! sticks. Buckets are plain in-memory listings. Every backend call is
//! recorded so tests can assert on ordering and on calls that must never
//! happen.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use stackflow_cloud::{
    CloudError, ObjectVersion, OperationHandle, OperationKind, ProvisioningClient, Result,
    StackStatus, UpdateDispatch,
};
use stackflow_core::{StackSpec, Template};

const TEST_TEMPLATE: Template = Template {
    name: "test",
    body: "{}",
};

/// Minimal spec builder for engine tests; stack names are `t-<unit>`.
pub(crate) fn spec(unit: &str, depends_on: &[&str]) -> StackSpec {
    StackSpec {
        unit: unit.to_string(),
        stack_name: format!("t-{unit}"),
        template: TEST_TEMPLATE,
        parameters: Vec::new(),
        capabilities: Vec::new(),
        depends_on: depends_on.iter().map(|s| s.to_string()).collect(),
        storage_units: Vec::new(),
    }
}

#[derive(Default)]
struct MockStack {
    current: Option<StackStatus>,
    pending: VecDeque<StackStatus>,
    in_flight: bool,
    outputs: HashMap<String, String>,
    no_changes: bool,
}

#[derive(Default)]
struct MockBucket {
    versions: Vec<ObjectVersion>,
    plain: Vec<String>,
    fail_keys: HashSet<String>,
}

#[derive(Default)]
struct Inner {
    stacks: HashMap<String, MockStack>,
    buckets: HashMap<String, MockBucket>,
    calls: Vec<String>,
    params: HashMap<String, Vec<(String, String)>>,
}

#[derive(Default)]
pub(crate) struct MockBackend {
    inner: Mutex<Inner>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stack that already exists in the given status.
    pub fn with_existing(&self, name: &str, status: StackStatus, outputs: &[(&str, &str)]) {
        let mut inner = self.inner.lock().unwrap();
        let stack = inner.stacks.entry(name.to_string()).or_default();
        stack.current = Some(status);
        stack.outputs = outputs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
    }

    /// Outputs the stack will report once it exists.
    pub fn set_outputs(&self, name: &str, outputs: &[(&str, &str)]) {
        let mut inner = self.inner.lock().unwrap();
        let stack = inner.stacks.entry(name.to_string()).or_default();
        stack.outputs = outputs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
    }

    /// Statuses successive polls observe after the next dispatch.
    pub fn script(&self, name: &str, statuses: Vec<StackStatus>) {
        let mut inner = self.inner.lock().unwrap();
        let stack = inner.stacks.entry(name.to_string()).or_default();
        stack.pending = statuses.into();
    }

    /// Make the next update report the backend's no-change signal.
    pub fn report_no_changes(&self, name: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.stacks.entry(name.to_string()).or_default().no_changes = true;
    }

    pub fn add_bucket(&self, name: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.buckets.entry(name.to_string()).or_default();
    }

    pub fn add_version(&self, bucket: &str, entry: ObjectVersion) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .buckets
            .entry(bucket.to_string())
            .or_default()
            .versions
            .push(entry);
    }

    pub fn add_plain_object(&self, bucket: &str, key: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .buckets
            .entry(bucket.to_string())
            .or_default()
            .plain
            .push(key.to_string());
    }

    /// Deletions of this key fail persistently.
    pub fn fail_delete(&self, bucket: &str, key: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .buckets
            .entry(bucket.to_string())
            .or_default()
            .fail_keys
            .insert(key.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Parameters of the last create/update dispatched for a stack.
    pub fn params_for(&self, name: &str) -> Option<Vec<(String, String)>> {
        self.inner.lock().unwrap().params.get(name).cloned()
    }

    /// Remaining entries (versions + plain objects) in a bucket.
    pub fn bucket_entry_count(&self, bucket: &str) -> usize {
        let inner = self.inner.lock().unwrap();
        inner
            .buckets
            .get(bucket)
            .map(|b| b.versions.len() + b.plain.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl ProvisioningClient for MockBackend {
    async fn describe(&self, stack_name: &str) -> Result<Option<StackStatus>> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(format!("describe {stack_name}"));
        let Some(stack) = inner.stacks.get_mut(stack_name) else {
            return Ok(None);
        };
        if stack.in_flight {
            if let Some(next) = stack.pending.pop_front() {
                stack.current = Some(next);
            }
        }
        Ok(stack.current.clone())
    }

    async fn create(
        &self,
        stack_name: &str,
        _template_body: &str,
        parameters: &[(String, String)],
        _capabilities: &[&str],
    ) -> Result<OperationHandle> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(format!("create {stack_name}"));
        inner
            .params
            .insert(stack_name.to_string(), parameters.to_vec());
        let stack = inner.stacks.entry(stack_name.to_string()).or_default();
        if stack.pending.is_empty() {
            stack.pending = vec![StackStatus::CreateComplete].into();
        }
        stack.current = Some(StackStatus::CreateInProgress);
        stack.in_flight = true;
        Ok(OperationHandle::new(stack_name, OperationKind::Create))
    }

    async fn update(
        &self,
        stack_name: &str,
        _template_body: &str,
        parameters: &[(String, String)],
        _capabilities: &[&str],
    ) -> Result<UpdateDispatch> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(format!("update {stack_name}"));
        inner
            .params
            .insert(stack_name.to_string(), parameters.to_vec());
        let stack = inner.stacks.entry(stack_name.to_string()).or_default();
        if stack.no_changes {
            return Ok(UpdateDispatch::NoChanges);
        }
        if stack.pending.is_empty() {
            stack.pending = vec![StackStatus::UpdateComplete].into();
        }
        stack.current = Some(StackStatus::UpdateInProgress);
        stack.in_flight = true;
        Ok(UpdateDispatch::Started(OperationHandle::new(
            stack_name,
            OperationKind::Update,
        )))
    }

    async fn delete(&self, stack_name: &str) -> Result<OperationHandle> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(format!("delete {stack_name}"));
        let stack = inner.stacks.entry(stack_name.to_string()).or_default();
        if stack.pending.is_empty() {
            stack.pending = vec![StackStatus::DeleteComplete].into();
        }
        stack.current = Some(StackStatus::DeleteInProgress);
        stack.in_flight = true;
        Ok(OperationHandle::new(stack_name, OperationKind::Delete))
    }

    async fn outputs(&self, stack_name: &str) -> Result<HashMap<String, String>> {
        let inner = self.inner.lock().unwrap();
        inner
            .stacks
            .get(stack_name)
            .map(|s| s.outputs.clone())
            .ok_or_else(|| CloudError::StackNotFound(stack_name.to_string()))
    }

    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.buckets.contains_key(bucket))
    }

    async fn list_object_versions(&self, bucket: &str) -> Result<Vec<ObjectVersion>> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(format!("list_versions {bucket}"));
        Ok(inner
            .buckets
            .get(bucket)
            .map(|b| b.versions.clone())
            .unwrap_or_default())
    }

    async fn delete_object_version(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
    ) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(format!("delete_object {bucket}/{key}"));
        let Some(b) = inner.buckets.get_mut(bucket) else {
            return Err(CloudError::Storage(format!("no such bucket: {bucket}")));
        };
        if b.fail_keys.contains(key) {
            return Err(CloudError::Storage(format!("access denied: {key}")));
        }
        match version_id {
            Some(version) => b
                .versions
                .retain(|e| !(e.key == key && e.version_id.as_deref() == Some(version))),
            None => b.plain.retain(|k| k != key),
        }
        Ok(())
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<String>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .buckets
            .get(bucket)
            .map(|b| b.plain.clone())
            .unwrap_or_default())
    }
}
