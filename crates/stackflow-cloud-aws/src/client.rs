//! CloudFormation/S3-backed provisioning client

use async_trait::async_trait;
use aws_sdk_cloudformation::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_cloudformation::types::{Capability, Parameter};
use std::collections::HashMap;

use stackflow_cloud::{
    CloudError, ObjectVersion, OperationHandle, OperationKind, ProvisioningClient, Result,
    StackStatus, UpdateDispatch,
};

/// Provisioning client backed by AWS CloudFormation and S3.
pub struct AwsProvisioner {
    cfn: aws_sdk_cloudformation::Client,
    s3: aws_sdk_s3::Client,
}

impl AwsProvisioner {
    /// Build a client from the ambient AWS configuration (environment
    /// variables, shared config files, instance metadata).
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self {
            cfn: aws_sdk_cloudformation::Client::new(&config),
            s3: aws_sdk_s3::Client::new(&config),
        }
    }
}

/// Service-reported message if present, otherwise the transport-level
/// rendering.
fn error_message<E, R>(err: &SdkError<E, R>) -> String
where
    E: ProvideErrorMetadata,
{
    err.as_service_error()
        .and_then(ProvideErrorMetadata::message)
        .map(str::to_string)
        .unwrap_or_else(|| err.to_string())
}

/// CloudFormation reports a missing stack as a validation error rather
/// than a distinct error type; the message text is the only signal.
fn is_missing_stack<E, R>(err: &SdkError<E, R>) -> bool
where
    E: ProvideErrorMetadata,
{
    err.as_service_error()
        .and_then(ProvideErrorMetadata::message)
        .is_some_and(|m| m.contains("does not exist"))
}

fn to_parameters(parameters: &[(String, String)]) -> Vec<Parameter> {
    parameters
        .iter()
        .map(|(key, value)| {
            Parameter::builder()
                .parameter_key(key)
                .parameter_value(value)
                .build()
        })
        .collect()
}

fn to_capabilities(capabilities: &[&str]) -> Option<Vec<Capability>> {
    if capabilities.is_empty() {
        None
    } else {
        Some(capabilities.iter().map(|c| Capability::from(*c)).collect())
    }
}

#[async_trait]
impl ProvisioningClient for AwsProvisioner {
    async fn describe(&self, stack_name: &str) -> Result<Option<StackStatus>> {
        match self
            .cfn
            .describe_stacks()
            .stack_name(stack_name)
            .send()
            .await
        {
            Ok(out) => Ok(out
                .stacks()
                .first()
                .and_then(|s| s.stack_status())
                .map(|s| StackStatus::from(s.as_str()))),
            Err(err) if is_missing_stack(&err) => Ok(None),
            Err(err) => Err(CloudError::Api(format!(
                "describe {stack_name}: {}",
                error_message(&err)
            ))),
        }
    }

    async fn create(
        &self,
        stack_name: &str,
        template_body: &str,
        parameters: &[(String, String)],
        capabilities: &[&str],
    ) -> Result<OperationHandle> {
        self.cfn
            .create_stack()
            .stack_name(stack_name)
            .template_body(template_body)
            .set_parameters(Some(to_parameters(parameters)))
            .set_capabilities(to_capabilities(capabilities))
            .send()
            .await
            .map_err(|err| {
                CloudError::Api(format!("create {stack_name}: {}", error_message(&err)))
            })?;

        tracing::info!(stack = stack_name, "dispatched stack create");
        Ok(OperationHandle::new(stack_name, OperationKind::Create))
    }

    async fn update(
        &self,
        stack_name: &str,
        template_body: &str,
        parameters: &[(String, String)],
        capabilities: &[&str],
    ) -> Result<UpdateDispatch> {
        match self
            .cfn
            .update_stack()
            .stack_name(stack_name)
            .template_body(template_body)
            .set_parameters(Some(to_parameters(parameters)))
            .set_capabilities(to_capabilities(capabilities))
            .send()
            .await
        {
            Ok(_) => {
                tracing::info!(stack = stack_name, "dispatched stack update");
                Ok(UpdateDispatch::Started(OperationHandle::new(
                    stack_name,
                    OperationKind::Update,
                )))
            }
            // "No updates are to be performed." is the backend's way of
            // saying the stack already matches the template.
            Err(err)
                if err
                    .as_service_error()
                    .and_then(ProvideErrorMetadata::message)
                    .is_some_and(|m| m.contains("No updates are to be performed")) =>
            {
                Ok(UpdateDispatch::NoChanges)
            }
            Err(err) => Err(CloudError::Api(format!(
                "update {stack_name}: {}",
                error_message(&err)
            ))),
        }
    }

    async fn delete(&self, stack_name: &str) -> Result<OperationHandle> {
        self.cfn
            .delete_stack()
            .stack_name(stack_name)
            .send()
            .await
            .map_err(|err| {
                CloudError::Api(format!("delete {stack_name}: {}", error_message(&err)))
            })?;

        tracing::info!(stack = stack_name, "dispatched stack delete");
        Ok(OperationHandle::new(stack_name, OperationKind::Delete))
    }

    async fn outputs(&self, stack_name: &str) -> Result<HashMap<String, String>> {
        let out = self
            .cfn
            .describe_stacks()
            .stack_name(stack_name)
            .send()
            .await
            .map_err(|err| {
                CloudError::Api(format!("outputs {stack_name}: {}", error_message(&err)))
            })?;

        let stack = out
            .stacks()
            .first()
            .ok_or_else(|| CloudError::StackNotFound(stack_name.to_string()))?;

        Ok(stack
            .outputs()
            .iter()
            .filter_map(|o| Some((o.output_key()?.to_string(), o.output_value()?.to_string())))
            .collect())
    }

    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        match self.s3.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(err) if err.as_service_error().is_some_and(|e| e.is_not_found()) => Ok(false),
            Err(err) => Err(CloudError::Storage(format!(
                "head bucket {bucket}: {}",
                error_message(&err)
            ))),
        }
    }

    async fn list_object_versions(&self, bucket: &str) -> Result<Vec<ObjectVersion>> {
        let mut entries = Vec::new();
        let mut key_marker: Option<String> = None;
        let mut version_marker: Option<String> = None;

        loop {
            let out = self
                .s3
                .list_object_versions()
                .bucket(bucket)
                .set_key_marker(key_marker.take())
                .set_version_id_marker(version_marker.take())
                .send()
                .await
                .map_err(|err| {
                    CloudError::Storage(format!(
                        "list versions {bucket}: {}",
                        error_message(&err)
                    ))
                })?;

            for v in out.versions() {
                if let Some(key) = v.key() {
                    entries.push(ObjectVersion {
                        key: key.to_string(),
                        version_id: v.version_id().map(str::to_string),
                        is_delete_marker: false,
                    });
                }
            }
            for m in out.delete_markers() {
                if let Some(key) = m.key() {
                    entries.push(ObjectVersion {
                        key: key.to_string(),
                        version_id: m.version_id().map(str::to_string),
                        is_delete_marker: true,
                    });
                }
            }

            if out.is_truncated() == Some(true) {
                key_marker = out.next_key_marker().map(str::to_string);
                version_marker = out.next_version_id_marker().map(str::to_string);
            } else {
                return Ok(entries);
            }
        }
    }

    async fn delete_object_version(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
    ) -> Result<()> {
        let mut req = self.s3.delete_object().bucket(bucket).key(key);
        if let Some(version) = version_id {
            req = req.version_id(version);
        }
        req.send().await.map_err(|err| {
            CloudError::Storage(format!(
                "delete {bucket}/{key}: {}",
                error_message(&err)
            ))
        })?;
        Ok(())
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let out = self
                .s3
                .list_objects_v2()
                .bucket(bucket)
                .set_continuation_token(token.take())
                .send()
                .await
                .map_err(|err| {
                    CloudError::Storage(format!("list {bucket}: {}", error_message(&err)))
                })?;

            keys.extend(out.contents().iter().filter_map(|o| o.key().map(str::to_string)));

            if out.is_truncated() == Some(true) {
                token = out.next_continuation_token().map(str::to_string);
            } else {
                return Ok(keys);
            }
        }
    }
}
