//! Verification status codes and the adapter from provider records

use serde::{Deserialize, Serialize};

use crate::providers::IdentityRecord;

/// Verification status of an identity as reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    /// Identity is verified for sending
    Success,
    /// Verification in progress
    Pending,
    /// Verification not yet started
    NotStarted,
    /// Verification failed
    Failed,
    /// Previously verified but the DNS records are no longer valid
    TemporaryFailure,
    /// Identity was just created with the provider
    Created,
    /// Provider does not know the identity
    NotFound,
    /// The request could not be completed
    Error,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Success => "SUCCESS",
            VerificationStatus::Pending => "PENDING",
            VerificationStatus::NotStarted => "NOT_STARTED",
            VerificationStatus::Failed => "FAILED",
            VerificationStatus::TemporaryFailure => "TEMPORARY_FAILURE",
            VerificationStatus::Created => "CREATED",
            VerificationStatus::NotFound => "NOT_FOUND",
            VerificationStatus::Error => "ERROR",
        }
    }

    /// Map a provider signing (DKIM) status string.
    pub fn from_signing_status(status: &str) -> Self {
        match status {
            "SUCCESS" => VerificationStatus::Success,
            "PENDING" => VerificationStatus::Pending,
            "FAILED" => VerificationStatus::Failed,
            "TEMPORARY_FAILURE" => VerificationStatus::TemporaryFailure,
            "NOT_STARTED" => VerificationStatus::NotStarted,
            _ => VerificationStatus::NotStarted,
        }
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// DKIM signing attributes returned by the provider for an identity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningAttributes {
    pub signing_enabled: bool,
    /// Raw provider status, e.g. "PENDING"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Tokens used to build the DKIM CNAME records
    #[serde(default)]
    pub tokens: Vec<String>,
    /// AWS_SES or EXTERNAL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signing_attributes_origin: Option<String>,
}

/// Result handed back to the caller of every verification operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub code: VerificationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<SigningAttributes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl VerificationResult {
    pub fn new(code: VerificationStatus) -> Self {
        Self {
            code,
            data: None,
            message: None,
        }
    }

    pub fn with_data(mut self, data: Option<SigningAttributes>) -> Self {
        self.data = data;
        self
    }

    /// The single shape used for every failed operation
    pub fn error() -> Self {
        Self::new(VerificationStatus::Error)
    }
}

/// Derive the status of an identity from the provider record
pub fn classify(record: &IdentityRecord) -> VerificationStatus {
    if record.verified_for_sending {
        return VerificationStatus::Success;
    }

    match record.signing.as_ref().and_then(|s| s.status.as_deref()) {
        Some(status) => VerificationStatus::from_signing_status(status),
        None => VerificationStatus::NotStarted,
    }
}

/// Signing attributes block of the record, if the provider returned one
pub fn signing_attributes(record: &IdentityRecord) -> Option<SigningAttributes> {
    record.signing.clone()
}
