//! AWS implementation of the stackflow provisioning backend.
//!
//! Stacks map to CloudFormation stacks, storage units to S3 buckets. All
//! SDK error detail is funneled into `CloudError` strings at this boundary;
//! the engine never sees SDK types.

pub mod client;

pub use client::AwsProvisioner;
