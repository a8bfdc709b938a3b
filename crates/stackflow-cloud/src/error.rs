//! Provisioning backend error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CloudError {
    #[error("stack not found: {0}")]
    StackNotFound(String),

    #[error("provisioning API error: {0}")]
    Api(String),

    #[error("object storage API error: {0}")]
    Storage(String),

    #[error("summary file error: {0}")]
    Summary(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CloudError>;
