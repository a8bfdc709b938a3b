use super::storage::StorageUnit;

/// Reference to a provisioning template.
///
/// The body is carried opaque: stackflow never parses or validates template
/// content, it only submits it to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub name: &'static str,
    pub body: &'static str,
}

/// Value of a single stack parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterValue {
    /// Fixed value from the environment's parameter set.
    Literal(String),

    /// Resolved at apply time from an ancestor stack's output.
    FromOutput { unit: String, key: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpec {
    pub key: String,
    pub value: ParameterValue,
}

impl ParameterSpec {
    pub fn literal(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: ParameterValue::Literal(value.into()),
        }
    }

    pub fn from_output(
        key: impl Into<String>,
        unit: impl Into<String>,
        output_key: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            value: ParameterValue::FromOutput {
                unit: unit.into(),
                key: output_key.into(),
            },
        }
    }
}

/// Capability acknowledgments a stack requires from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// The stack may create named identity-binding resources (roles,
    /// policies) and the operator explicitly acknowledges that.
    NamedIam,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NamedIam => "CAPABILITY_NAMED_IAM",
        }
    }
}

/// Static description of one stack: everything the engine needs to decide
/// whether and how to apply or destroy the unit.
#[derive(Debug, Clone)]
pub struct StackSpec {
    /// Logical unit name within the topology (e.g. "cluster").
    pub unit: String,

    /// Physical stack name at the backend (e.g. "stackflow-dev-cluster").
    pub stack_name: String,

    pub template: Template,

    /// Ordered parameter set; `FromOutput` entries are resolved against
    /// cached ancestor outputs right before apply.
    pub parameters: Vec<ParameterSpec>,

    pub capabilities: Vec<Capability>,

    /// Units that must reach a complete state before this one is applied,
    /// and that outlive this one on teardown.
    pub depends_on: Vec<String>,

    /// Buckets owned by this stack that must be purged before destroy.
    pub storage_units: Vec<StorageUnit>,
}

impl StackSpec {
    pub fn owns_storage(&self) -> bool {
        !self.storage_units.is_empty()
    }

    /// Units whose outputs this spec's parameters reference.
    pub fn referenced_units(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().filter_map(|p| match &p.value {
            ParameterValue::FromOutput { unit, .. } => Some(unit.as_str()),
            ParameterValue::Literal(_) => None,
        })
    }
}
