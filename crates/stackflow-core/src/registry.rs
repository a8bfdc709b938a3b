//! The fixed infrastructure topology.
//!
//! Four units, applied in dependency order: the compute cluster first, then
//! the worker pools and the object storage, and finally the identity
//! bindings that tie service accounts to the cluster's OIDC provider and to
//! the data bucket.
//!
//! Template bodies are embedded at compile time and passed to the backend
//! verbatim.

use crate::error::Result;
use crate::graph::DependencyGraph;
use crate::model::{Capability, Environment, ParameterSpec, StackSpec, StorageUnit, Template};

pub const PROJECT: &str = "stackflow";

const CLUSTER_TEMPLATE: Template = Template {
    name: "cluster",
    body: include_str!("../../../templates/cluster.yaml"),
};

const WORKERS_TEMPLATE: Template = Template {
    name: "workers",
    body: include_str!("../../../templates/workers.yaml"),
};

const STORAGE_TEMPLATE: Template = Template {
    name: "storage",
    body: include_str!("../../../templates/storage.yaml"),
};

const IDENTITY_TEMPLATE: Template = Template {
    name: "identity",
    body: include_str!("../../../templates/identity.yaml"),
};

/// Physical stack name at the backend.
pub fn stack_name(env: Environment, unit: &str) -> String {
    format!("{PROJECT}-{env}-{unit}")
}

/// Build the validated dependency graph for one environment.
pub fn topology(env: Environment) -> Result<DependencyGraph> {
    DependencyGraph::build(vec![cluster(env), workers(env), storage(env), identity(env)])
}

fn cluster(env: Environment) -> StackSpec {
    let vpc_cidr = match env {
        Environment::Dev => "10.10.0.0/16",
        Environment::Staging => "10.20.0.0/16",
        Environment::Prod => "10.30.0.0/16",
    };
    StackSpec {
        unit: "cluster".to_string(),
        stack_name: stack_name(env, "cluster"),
        template: CLUSTER_TEMPLATE,
        parameters: vec![
            ParameterSpec::literal("EnvironmentName", env.as_str()),
            ParameterSpec::literal("KubernetesVersion", "1.31"),
            ParameterSpec::literal("VpcCidr", vpc_cidr),
        ],
        capabilities: Vec::new(),
        depends_on: Vec::new(),
        storage_units: Vec::new(),
    }
}

fn workers(env: Environment) -> StackSpec {
    let (instance_type, desired, max) = match env {
        Environment::Dev => ("t3.medium", "2", "4"),
        Environment::Staging => ("m5.large", "3", "6"),
        Environment::Prod => ("m5.xlarge", "6", "12"),
    };
    StackSpec {
        unit: "workers".to_string(),
        stack_name: stack_name(env, "workers"),
        template: WORKERS_TEMPLATE,
        parameters: vec![
            ParameterSpec::from_output("ClusterName", "cluster", "ClusterName"),
            ParameterSpec::literal("NodeInstanceType", instance_type),
            ParameterSpec::literal("DesiredCapacity", desired),
            ParameterSpec::literal("MaxCapacity", max),
        ],
        capabilities: Vec::new(),
        depends_on: vec!["cluster".to_string()],
        storage_units: Vec::new(),
    }
}

fn storage(env: Environment) -> StackSpec {
    let log_retention_days = match env {
        Environment::Dev => 14,
        Environment::Staging => 30,
        Environment::Prod => 365,
    };
    StackSpec {
        unit: "storage".to_string(),
        stack_name: stack_name(env, "storage"),
        template: STORAGE_TEMPLATE,
        parameters: vec![
            ParameterSpec::from_output("ClusterName", "cluster", "ClusterName"),
            ParameterSpec::literal("LogRetentionDays", log_retention_days.to_string()),
        ],
        capabilities: Vec::new(),
        depends_on: vec!["cluster".to_string()],
        storage_units: vec![
            StorageUnit::new("DataBucketName"),
            StorageUnit::new("LogBucketName").with_retention_days(log_retention_days),
        ],
    }
}

fn identity(env: Environment) -> StackSpec {
    StackSpec {
        unit: "identity".to_string(),
        stack_name: stack_name(env, "identity"),
        template: IDENTITY_TEMPLATE,
        parameters: vec![
            ParameterSpec::from_output("OidcProviderArn", "cluster", "OidcProviderArn"),
            ParameterSpec::from_output("NodeRoleArn", "workers", "NodeInstanceRoleArn"),
            ParameterSpec::from_output("DataBucketName", "storage", "DataBucketName"),
        ],
        capabilities: vec![Capability::NamedIam],
        depends_on: vec!["workers".to_string(), "storage".to_string()],
        storage_units: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ParameterValue;

    #[test]
    fn topology_builds_for_every_environment() {
        for env in Environment::ALL {
            let graph = topology(env).unwrap();
            assert_eq!(graph.len(), 4);
        }
    }

    #[test]
    fn apply_order_is_cluster_workers_storage_identity() {
        let graph = topology(Environment::Dev).unwrap();
        let order: Vec<&str> = graph.apply_order().map(|s| s.unit.as_str()).collect();
        assert_eq!(order, vec!["cluster", "workers", "storage", "identity"]);
    }

    #[test]
    fn identity_requires_named_iam_capability() {
        let graph = topology(Environment::Dev).unwrap();
        let identity = graph.get("identity").unwrap();
        assert_eq!(identity.capabilities, vec![Capability::NamedIam]);
    }

    #[test]
    fn only_storage_owns_buckets() {
        let graph = topology(Environment::Staging).unwrap();
        for spec in graph.apply_order() {
            assert_eq!(spec.owns_storage(), spec.unit == "storage");
        }
        assert_eq!(graph.get("storage").unwrap().storage_units.len(), 2);
    }

    #[test]
    fn prod_scales_beyond_dev() {
        let dev = topology(Environment::Dev).unwrap();
        let prod = topology(Environment::Prod).unwrap();
        let capacity = |g: &DependencyGraph| {
            g.get("workers")
                .unwrap()
                .parameters
                .iter()
                .find_map(|p| match (&p.key[..], &p.value) {
                    ("DesiredCapacity", ParameterValue::Literal(v)) => Some(v.clone()),
                    _ => None,
                })
                .unwrap()
        };
        assert_eq!(capacity(&dev), "2");
        assert_eq!(capacity(&prod), "6");
    }

    #[test]
    fn stack_names_carry_project_and_environment() {
        assert_eq!(
            stack_name(Environment::Prod, "cluster"),
            "stackflow-prod-cluster"
        );
    }
}
