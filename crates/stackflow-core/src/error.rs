use thiserror::Error;

/// Configuration-level errors.
///
/// Everything in here is detectable before a single provisioning call is
/// made, which is what separates it from the engine's runtime errors.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("unknown environment '{0}' (expected one of: dev, staging, prod)")]
    UnknownEnvironment(String),

    #[error("dependency cycle detected among stacks: {0}")]
    DependencyCycle(String),

    #[error("stack '{stack}' depends on unknown unit '{dependency}'")]
    UnknownDependency { stack: String, dependency: String },

    #[error(
        "stack '{stack}' references output '{key}' of '{source}', which is not among its ancestors"
    )]
    InvalidReference {
        stack: String,
        source: String,
        key: String,
    },

    #[error("unknown stack unit: {0}")]
    UnknownUnit(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
