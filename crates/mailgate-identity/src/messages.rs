//! User-facing status messages

use std::collections::HashMap;
use std::path::Path;

use crate::errors::IdentityError;
use crate::status::VerificationStatus;

pub const VERIFIED_IDENTITY: &str = "mailgate.identity.verified";
pub const VERIFICATION_PENDING: &str = "mailgate.identity.verification_pending";
pub const VERIFICATION_NOT_STARTED: &str = "mailgate.identity.verification_not_started";
pub const UNVERIFIED_IDENTITY: &str = "mailgate.identity.unverified";
pub const IDENTITY_NOT_FOUND: &str = "mailgate.identity.not_found";
pub const VERIFICATION_ERROR: &str = "mailgate.identity.verification_error";
pub const INVALID_IDENTITY: &str = "mailgate.identity.invalid";

/// Placeholder replaced with the identity in parameterised messages
pub const IDENTITY_PLACEHOLDER: &str = "%email%";

/// Host translation service
pub trait Translator: Send + Sync {
    fn translate(&self, key: &str, params: &[(&str, &str)]) -> String;
}

/// Flat key → message catalog with `%placeholder%` substitution.
///
/// Unknown keys translate to the key itself.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    messages: HashMap<String, String>,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        let messages = [
            (
                VERIFIED_IDENTITY,
                "The identity is verified and can be used to send email.",
            ),
            (
                VERIFICATION_PENDING,
                "Verification is pending. Follow the link in the verification email or check your DNS records.",
            ),
            (
                VERIFICATION_NOT_STARTED,
                "Verification has not started yet.",
            ),
            (
                UNVERIFIED_IDENTITY,
                "%email% is not verified. Check the address or its DNS records and try again.",
            ),
            (
                IDENTITY_NOT_FOUND,
                "%email% is not registered with the email provider.",
            ),
            (
                VERIFICATION_ERROR,
                "An error occurred while verifying the identity. Please try again later.",
            ),
            (
                INVALID_IDENTITY,
                "%email% is not a valid email address or domain name.",
            ),
        ]
        .into_iter()
        .map(|(key, message)| (key.to_string(), message.to_string()))
        .collect();

        Self { messages }
    }
}

impl MessageCatalog {
    /// Default catalog with the given YAML mapping layered on top
    pub fn from_yaml_str(yaml: &str) -> Result<Self, IdentityError> {
        let overrides: HashMap<String, String> = serde_yaml::from_str(yaml)?;
        let mut catalog = Self::default();
        catalog.messages.extend(overrides);
        Ok(catalog)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, IdentityError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }
}

impl Translator for MessageCatalog {
    fn translate(&self, key: &str, params: &[(&str, &str)]) -> String {
        let mut message = self
            .messages
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string());

        for (placeholder, value) in params {
            message = message.replace(placeholder, value);
        }

        message
    }
}

/// Message for a status code; the identity is only used by FAILED,
/// TEMPORARY_FAILURE and NOT_FOUND.
pub fn status_message(
    translator: &dyn Translator,
    status: VerificationStatus,
    identity: &str,
) -> String {
    match status {
        VerificationStatus::Success => translator.translate(VERIFIED_IDENTITY, &[]),
        VerificationStatus::Pending | VerificationStatus::Created => {
            translator.translate(VERIFICATION_PENDING, &[])
        }
        VerificationStatus::NotStarted => translator.translate(VERIFICATION_NOT_STARTED, &[]),
        VerificationStatus::Failed | VerificationStatus::TemporaryFailure => {
            translator.translate(UNVERIFIED_IDENTITY, &[(IDENTITY_PLACEHOLDER, identity)])
        }
        VerificationStatus::NotFound => {
            translator.translate(IDENTITY_NOT_FOUND, &[(IDENTITY_PLACEHOLDER, identity)])
        }
        VerificationStatus::Error => translator.translate(VERIFICATION_ERROR, &[]),
    }
}

/// Message for a value that is neither an email address nor a domain
pub fn invalid_identity_message(translator: &dyn Translator, value: &str) -> String {
    translator.translate(INVALID_IDENTITY, &[(IDENTITY_PLACEHOLDER, value)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_message_contains_identity() {
        let catalog = MessageCatalog::default();

        let message = status_message(&catalog, VerificationStatus::Failed, "x@y.com");
        assert!(message.contains("x@y.com"));

        let message = status_message(&catalog, VerificationStatus::TemporaryFailure, "y.com");
        assert!(message.contains("y.com"));

        let message = status_message(&catalog, VerificationStatus::NotFound, "x@y.com");
        assert!(message.contains("x@y.com"));
    }

    #[test]
    fn test_unverified_message_makes_no_resend_claim() {
        let catalog = MessageCatalog::default();

        for status in [VerificationStatus::Failed, VerificationStatus::TemporaryFailure] {
            let message = status_message(&catalog, status, "example.com");
            assert!(message.contains("example.com"));
            assert!(!message.contains("sent"));
        }
    }

    #[test]
    fn test_invalid_identity_message() {
        let catalog = MessageCatalog::default();
        assert_eq!(
            invalid_identity_message(&catalog, "not valid"),
            "not valid is not a valid email address or domain name."
        );
    }

    #[test]
    fn test_pending_and_created_share_a_message() {
        let catalog = MessageCatalog::default();
        assert_eq!(
            status_message(&catalog, VerificationStatus::Pending, ""),
            status_message(&catalog, VerificationStatus::Created, "")
        );
    }

    #[test]
    fn test_error_uses_generic_message() {
        let catalog = MessageCatalog::default();
        let message = status_message(&catalog, VerificationStatus::Error, "x@y.com");
        assert_eq!(message, catalog.translate(VERIFICATION_ERROR, &[]));
        assert!(!message.contains("x@y.com"));
    }

    #[test]
    fn test_yaml_overrides() {
        let catalog = MessageCatalog::from_yaml_str(
            "mailgate.identity.unverified: \"Échec de la vérification de %email%\"",
        )
        .unwrap();

        assert_eq!(
            status_message(&catalog, VerificationStatus::Failed, "x@y.com"),
            "Échec de la vérification de x@y.com"
        );
        // Untouched keys keep the defaults
        assert!(status_message(&catalog, VerificationStatus::Success, "").contains("verified"));
    }

    #[test]
    fn test_unknown_key_translates_to_itself() {
        let catalog = MessageCatalog::default();
        assert_eq!(catalog.translate("some.key", &[]), "some.key");
    }
}
