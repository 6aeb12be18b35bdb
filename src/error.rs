// Error types for surge.
// Covers configuration loading, gh subprocess failures, and general IO.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SurgeError {
    #[error("no configuration found (looked for .surge.yml, the user config file, and .surge.local.yml)")]
    NoConfig,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("gh command failed: {0}")]
    Gh(String),

    #[error("gh command timed out after {0}s")]
    Timeout(u64),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SurgeError>;
