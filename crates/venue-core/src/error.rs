//! Error types for typed-data construction, hashing and recovery.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration file error: {0}")]
    ConfigFile(#[from] config::ConfigError),

    #[error("EIP-712 error: {0}")]
    Eip712(#[from] alloy_dyn_abi::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid domain: {message}")]
    InvalidDomain { message: String },

    #[error("Unsupported operation: {kind}")]
    UnsupportedOperation { kind: String },

    #[error("Missing field '{field}' for {type_name}")]
    MissingField { type_name: String, field: String },

    #[error("Invalid value for field '{field}': {message}")]
    InvalidField { field: String, message: String },

    #[error("Unsupported EIP-712 type '{type_name}'")]
    UnsupportedType { type_name: String },

    #[error("Invalid typed message: {message}")]
    InvalidMessage { message: String },

    #[error("Signature recovery failed: {message}")]
    RecoveryFailed { message: String },
}

impl Error {
    pub(crate) fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub(crate) fn recovery(message: impl Into<String>) -> Self {
        Self::RecoveryFailed {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
