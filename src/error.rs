// file: src/error.rs
// version: 1.0.0
// guid: 3f0c9a21-6d4e-4b7a-9c12-8e5d0b7f4a61

//! Error types for the devbox provisioner

use thiserror::Error;

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, ProvisionError>;

/// Every failure the provisioning pipeline can report
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Precondition failed: {0}")]
    PreconditionError(String),

    #[error("Command '{command}' failed (exit code {exit_code:?}): {stderr}")]
    ProcessError {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Template error: {0}")]
    TemplateError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Payload error: {0}")]
    PayloadError(String),

    #[error("Prompt error: {0}")]
    PromptError(String),

    #[error("Interrupted by user")]
    Interrupted,

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl ProvisionError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a new precondition error
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::PreconditionError(msg.into())
    }

    /// Create a new template error
    pub fn template(msg: impl Into<String>) -> Self {
        Self::TemplateError(msg.into())
    }

    /// Create a new network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::NetworkError(msg.into())
    }

    /// Create a new payload error
    pub fn payload(msg: impl Into<String>) -> Self {
        Self::PayloadError(msg.into())
    }

    /// Create a new prompt error
    pub fn prompt(msg: impl Into<String>) -> Self {
        Self::PromptError(msg.into())
    }

    /// Process exit code reported for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Interrupted => 130,
            _ => 1,
        }
    }
}

impl From<validator::ValidationErrors> for ProvisionError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::ValidationError(errors.to_string())
    }
}
