//! Error types for identity verification

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Not a valid email address or domain name: {0}")]
    InvalidIdentity(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("AWS SES error: {0}")]
    AwsSes(String),

    #[error("Verification template error: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for IdentityError {
    fn from(err: serde_json::Error) -> Self {
        IdentityError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for IdentityError {
    fn from(err: serde_yaml::Error) -> Self {
        IdentityError::Serialization(err.to_string())
    }
}
