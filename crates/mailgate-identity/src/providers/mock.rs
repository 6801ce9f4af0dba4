//! Mock identity provider for testing

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::IdentityError;
use crate::identity::{is_valid_email, IdentityType};
use crate::providers::{
    CreateIdentityOptions, IdentityProvider, IdentityRecord, MxFailureBehavior,
    NotificationProvider, NotificationType,
};
use crate::status::SigningAttributes;
use crate::template::VerificationTemplate;

/// In-memory provider that behaves like SES for the calls the workflow makes
#[derive(Debug, Clone, Default)]
pub struct MockIdentityProvider {
    /// Counters for tracking calls
    pub get_identity_count: Arc<AtomicUsize>,
    pub create_identity_count: Arc<AtomicUsize>,
    pub create_template_count: Arc<AtomicUsize>,
    pub send_verification_count: Arc<AtomicUsize>,
    pub admin_call_count: Arc<AtomicUsize>,

    /// Provider-side state
    pub identities: Arc<Mutex<HashMap<String, IdentityRecord>>>,
    pub templates: Arc<Mutex<HashSet<String>>>,

    /// Configurable failures
    pub should_fail_get: bool,
    pub should_fail_create: bool,
    pub should_fail_send: bool,
    pub should_fail_template_create: bool,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(self, identity: &str, verified: bool, dkim_status: Option<&str>) -> Self {
        let record = IdentityRecord {
            identity: identity.to_string(),
            identity_type: Some(if is_valid_email(identity) {
                IdentityType::EmailAddress
            } else {
                IdentityType::Domain
            }),
            verified_for_sending: verified,
            signing: dkim_status.map(|status| SigningAttributes {
                signing_enabled: true,
                status: Some(status.to_string()),
                tokens: vec!["mocktoken1".to_string(), "mocktoken2".to_string()],
                signing_attributes_origin: Some("AWS_SES".to_string()),
            }),
        };
        self.identities
            .lock()
            .unwrap()
            .insert(identity.to_string(), record);
        self
    }

    pub fn with_template(self, template_name: &str) -> Self {
        self.templates
            .lock()
            .unwrap()
            .insert(template_name.to_string());
        self
    }

    pub fn with_get_failure(mut self) -> Self {
        self.should_fail_get = true;
        self
    }

    pub fn with_create_failure(mut self) -> Self {
        self.should_fail_create = true;
        self
    }

    pub fn with_send_failure(mut self) -> Self {
        self.should_fail_send = true;
        self
    }

    pub fn with_template_create_failure(mut self) -> Self {
        self.should_fail_template_create = true;
        self
    }

    pub fn get_identity_call_count(&self) -> usize {
        self.get_identity_count.load(Ordering::SeqCst)
    }

    pub fn create_identity_call_count(&self) -> usize {
        self.create_identity_count.load(Ordering::SeqCst)
    }

    pub fn create_template_call_count(&self) -> usize {
        self.create_template_count.load(Ordering::SeqCst)
    }

    pub fn send_verification_call_count(&self) -> usize {
        self.send_verification_count.load(Ordering::SeqCst)
    }

    pub fn admin_call_count(&self) -> usize {
        self.admin_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn get_identity(&self, identity: &str) -> Result<Option<IdentityRecord>, IdentityError> {
        self.get_identity_count.fetch_add(1, Ordering::SeqCst);

        if self.should_fail_get {
            return Err(IdentityError::Provider("Mock lookup failure".to_string()));
        }

        Ok(self.identities.lock().unwrap().get(identity).cloned())
    }

    async fn create_identity(
        &self,
        identity: &str,
        _options: &CreateIdentityOptions,
    ) -> Result<IdentityRecord, IdentityError> {
        self.create_identity_count.fetch_add(1, Ordering::SeqCst);

        if self.should_fail_create {
            return Err(IdentityError::AwsSes("Mock create failure".to_string()));
        }

        let record = IdentityRecord {
            identity: identity.to_string(),
            identity_type: Some(IdentityType::Domain),
            verified_for_sending: false,
            signing: Some(SigningAttributes {
                signing_enabled: true,
                status: Some("PENDING".to_string()),
                tokens: vec!["mocktoken1".to_string()],
                signing_attributes_origin: Some("AWS_SES".to_string()),
            }),
        };
        self.identities
            .lock()
            .unwrap()
            .insert(identity.to_string(), record.clone());

        Ok(record)
    }

    async fn verification_template_exists(
        &self,
        template_name: &str,
    ) -> Result<bool, IdentityError> {
        Ok(self.templates.lock().unwrap().contains(template_name))
    }

    async fn create_verification_template(
        &self,
        template: &VerificationTemplate,
    ) -> Result<(), IdentityError> {
        self.create_template_count.fetch_add(1, Ordering::SeqCst);

        if self.should_fail_template_create {
            return Err(IdentityError::AwsSes(
                "Mock template create failure".to_string(),
            ));
        }

        self.templates
            .lock()
            .unwrap()
            .insert(template.template_name.clone());
        Ok(())
    }

    async fn send_verification_email(
        &self,
        email_address: &str,
        template_name: &str,
        _configuration_set_name: Option<&str>,
    ) -> Result<Option<String>, IdentityError> {
        self.send_verification_count.fetch_add(1, Ordering::SeqCst);

        if self.should_fail_send {
            return Err(IdentityError::AwsSes("Mock send failure".to_string()));
        }
        if !self.templates.lock().unwrap().contains(template_name) {
            return Err(IdentityError::AwsSes(format!(
                "Template {} does not exist",
                template_name
            )));
        }

        // SES adds the address as an unverified identity
        self.identities
            .lock()
            .unwrap()
            .entry(email_address.to_string())
            .or_insert_with(|| IdentityRecord {
                identity: email_address.to_string(),
                identity_type: Some(IdentityType::EmailAddress),
                verified_for_sending: false,
                signing: None,
            });

        Ok(Some(format!("mock-message-{}", uuid::Uuid::new_v4())))
    }

    async fn put_dkim_signing(
        &self,
        _identity: &str,
        _signing_enabled: bool,
    ) -> Result<(), IdentityError> {
        self.admin_call_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn put_mail_from(
        &self,
        _identity: &str,
        _mail_from_domain: Option<&str>,
        _behavior_on_mx_failure: Option<MxFailureBehavior>,
    ) -> Result<(), IdentityError> {
        self.admin_call_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn put_feedback_forwarding(
        &self,
        _identity: &str,
        _email_forwarding_enabled: bool,
    ) -> Result<(), IdentityError> {
        self.admin_call_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Notification provider recording every topic assignment
#[derive(Debug, Clone, Default)]
pub struct MockNotificationProvider {
    pub call_count: Arc<AtomicUsize>,
    /// Applied (identity, type, topic) triples, in call order
    pub applied: Arc<Mutex<Vec<(String, NotificationType, String)>>>,
    /// Type whose call fails
    pub fail_on: Option<NotificationType>,
}

impl MockNotificationProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure_on(mut self, notification_type: NotificationType) -> Self {
        self.fail_on = Some(notification_type);
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn applied(&self) -> Vec<(String, NotificationType, String)> {
        self.applied.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationProvider for MockNotificationProvider {
    async fn set_notification_topic(
        &self,
        identity: &str,
        notification_type: NotificationType,
        sns_topic: &str,
    ) -> Result<(), IdentityError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if self.fail_on == Some(notification_type) {
            return Err(IdentityError::AwsSes(format!(
                "Mock {} topic failure",
                notification_type
            )));
        }

        self.applied.lock().unwrap().push((
            identity.to_string(),
            notification_type,
            sns_topic.to_string(),
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_unknown_identity() {
        let provider = MockIdentityProvider::new();

        let record = provider.get_identity("example.com").await.unwrap();

        assert!(record.is_none());
        assert_eq!(provider.get_identity_call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_provider_create_identity() {
        let provider = MockIdentityProvider::new();

        provider
            .create_identity("example.com", &CreateIdentityOptions::default())
            .await
            .unwrap();
        let record = provider.get_identity("example.com").await.unwrap().unwrap();

        assert!(!record.verified_for_sending);
        assert_eq!(provider.create_identity_call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_provider_send_requires_template() {
        let provider = MockIdentityProvider::new();

        let result = provider
            .send_verification_email("user@example.com", "Missing", None)
            .await;

        assert!(result.is_err());
        assert_eq!(provider.send_verification_call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_provider_get_failure() {
        let provider = MockIdentityProvider::new().with_get_failure();

        assert!(provider.get_identity("example.com").await.is_err());
    }
}
