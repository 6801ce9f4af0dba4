//! Identity provider trait definitions

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::errors::IdentityError;
use crate::identity::IdentityType;
use crate::status::SigningAttributes;
use crate::template::VerificationTemplate;

/// Identity as known by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub identity: String,
    pub identity_type: Option<IdentityType>,
    /// Whether the provider allows sending from this identity
    pub verified_for_sending: bool,
    /// DKIM block, only present when the provider returned one
    pub signing: Option<SigningAttributes>,
}

/// Optional parameters for identity creation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIdentityOptions {
    pub configuration_set_name: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// What the provider does when the custom MAIL FROM domain has no MX record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MxFailureBehavior {
    UseDefaultValue,
    RejectMessage,
}

impl MxFailureBehavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            MxFailureBehavior::UseDefaultValue => "USE_DEFAULT_VALUE",
            MxFailureBehavior::RejectMessage => "REJECT_MESSAGE",
        }
    }
}

impl FromStr for MxFailureBehavior {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "USE_DEFAULT_VALUE" | "DEFAULT" => Ok(MxFailureBehavior::UseDefaultValue),
            "REJECT_MESSAGE" | "REJECT" => Ok(MxFailureBehavior::RejectMessage),
            _ => Err(IdentityError::Config(format!(
                "Unknown MX failure behavior: {}",
                s
            ))),
        }
    }
}

/// Notification published to an SNS topic for an identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Bounce,
    Complaint,
    Delivery,
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationType::Bounce => write!(f, "Bounce"),
            NotificationType::Complaint => write!(f, "Complaint"),
            NotificationType::Delivery => write!(f, "Delivery"),
        }
    }
}

impl FromStr for NotificationType {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bounce" => Ok(NotificationType::Bounce),
            "complaint" => Ok(NotificationType::Complaint),
            "delivery" => Ok(NotificationType::Delivery),
            _ => Err(IdentityError::Config(format!(
                "Unknown notification type: {}",
                s
            ))),
        }
    }
}

/// Provider operations needed by the verification workflow
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Look up an identity; `Ok(None)` when the provider does not know it
    async fn get_identity(&self, identity: &str) -> Result<Option<IdentityRecord>, IdentityError>;

    /// Register an identity and start its verification
    async fn create_identity(
        &self,
        identity: &str,
        options: &CreateIdentityOptions,
    ) -> Result<IdentityRecord, IdentityError>;

    /// Check whether a custom verification email template exists
    async fn verification_template_exists(&self, template_name: &str)
        -> Result<bool, IdentityError>;

    /// Upload a custom verification email template
    async fn create_verification_template(
        &self,
        template: &VerificationTemplate,
    ) -> Result<(), IdentityError>;

    /// Send the custom verification email, returning the provider message ID
    async fn send_verification_email(
        &self,
        email_address: &str,
        template_name: &str,
        configuration_set_name: Option<&str>,
    ) -> Result<Option<String>, IdentityError>;

    /// Enable or disable DKIM signing for an identity
    async fn put_dkim_signing(&self, identity: &str, signing_enabled: bool)
        -> Result<(), IdentityError>;

    /// Configure the custom MAIL FROM domain of an identity
    async fn put_mail_from(
        &self,
        identity: &str,
        mail_from_domain: Option<&str>,
        behavior_on_mx_failure: Option<MxFailureBehavior>,
    ) -> Result<(), IdentityError>;

    /// Enable or disable bounce/complaint forwarding by email
    async fn put_feedback_forwarding(
        &self,
        identity: &str,
        email_forwarding_enabled: bool,
    ) -> Result<(), IdentityError>;
}

/// Routing of identity notifications to SNS topics
#[async_trait]
pub trait NotificationProvider: Send + Sync {
    /// Publish one notification type of the identity to the topic
    async fn set_notification_topic(
        &self,
        identity: &str,
        notification_type: NotificationType,
        sns_topic: &str,
    ) -> Result<(), IdentityError>;
}
