//! Identity verification service
//!
//! Decides, for an email address or a domain, what state it is in with the
//! provider and what has to happen next. Every public verification operation
//! returns a [`VerificationResult`]; failures are logged and reported through
//! its `code`, never as an error.

use std::sync::Arc;
use tracing::{debug, error, info};

use crate::config::{is_domain_verified, is_email_verified, write_verified_flag, ConfigStore};
use crate::errors::IdentityError;
use crate::events::{IdentityEvents, IdentityVerificationEvent, IdentityVerificationListener};
use crate::identity::{domain_of, is_valid_email, is_valid_identity, IdentityType};
use crate::messages::{status_message, Translator};
use crate::providers::{CreateIdentityOptions, IdentityProvider, MxFailureBehavior};
use crate::status::{classify, signing_attributes, VerificationResult, VerificationStatus};
use crate::template::VerificationTemplate;

/// Service orchestrating identity verification against the provider
pub struct IdentityService {
    provider: Arc<dyn IdentityProvider>,
    config_store: Arc<dyn ConfigStore>,
    translator: Arc<dyn Translator>,
    template: VerificationTemplate,
    identity_options: CreateIdentityOptions,
    events: IdentityEvents,
}

impl IdentityService {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        config_store: Arc<dyn ConfigStore>,
        translator: Arc<dyn Translator>,
        template: VerificationTemplate,
    ) -> Self {
        Self {
            provider,
            config_store,
            translator,
            template,
            identity_options: CreateIdentityOptions::default(),
            events: IdentityEvents::new(),
        }
    }

    /// Configuration set and tags used when creating identities
    pub fn with_identity_options(mut self, options: CreateIdentityOptions) -> Self {
        self.identity_options = options;
        self
    }

    /// Register a listener for `ON_VERIFY_IDENTITY`
    pub fn subscribe(&mut self, listener: Arc<dyn IdentityVerificationListener>) {
        self.events.subscribe(listener);
    }

    /// Check the identity, re-send or create as needed and attach a message.
    pub async fn verify(&self, identity: &str, identity_type: IdentityType) -> VerificationResult {
        let mut result = self.check_identity(identity, identity_type).await;

        if identity_type == IdentityType::EmailAddress
            && matches!(
                result.code,
                VerificationStatus::Failed | VerificationStatus::Pending
            )
        {
            // Provider deduplicates, so a repeated send is harmless
            if let Err(e) = self.send_verification_email(identity).await {
                error!("Failed to re-send verification email to {}: {}", identity, e);
            }
        }

        // Unknown to the provider: create it
        if result.code == VerificationStatus::NotFound {
            result = self.create_identity(identity, identity_type).await;
        }

        result.message = Some(self.status_message(result.code, identity));
        result
    }

    /// Ask the provider for the identity status and persist the verified flag
    pub async fn check_identity(
        &self,
        identity: &str,
        identity_type: IdentityType,
    ) -> VerificationResult {
        match self.try_check_identity(identity, identity_type).await {
            Ok(result) => result,
            Err(e) => {
                error!("Identity check failed for {}: {}", identity, e);
                VerificationResult::error()
            }
        }
    }

    async fn try_check_identity(
        &self,
        identity: &str,
        identity_type: IdentityType,
    ) -> Result<VerificationResult, IdentityError> {
        let identity = resolve_identity(identity, identity_type)?;

        let Some(record) = self.provider.get_identity(&identity).await? else {
            debug!("Identity {} not found with the provider", identity);
            write_verified_flag(self.config_store.as_ref(), identity_type, &identity, false)?;
            return Ok(VerificationResult::new(VerificationStatus::NotFound));
        };

        let code = classify(&record);
        let result = VerificationResult::new(code).with_data(signing_attributes(&record));

        write_verified_flag(
            self.config_store.as_ref(),
            identity_type,
            &identity,
            code == VerificationStatus::Success,
        )?;

        debug!("Identity {} status: {}", identity, code);
        Ok(result)
    }

    /// Register the identity with the provider and start its verification
    pub async fn create_identity(
        &self,
        identity: &str,
        identity_type: IdentityType,
    ) -> VerificationResult {
        match self.try_create_identity(identity, identity_type).await {
            Ok(result) => result,
            Err(e) => {
                error!("Identity creation failed for {}: {}", identity, e);
                VerificationResult::error()
            }
        }
    }

    async fn try_create_identity(
        &self,
        identity: &str,
        identity_type: IdentityType,
    ) -> Result<VerificationResult, IdentityError> {
        let identity = resolve_identity(identity, identity_type)?;

        let signing = match identity_type {
            IdentityType::EmailAddress => {
                self.send_verification_email(&identity).await?;
                None
            }
            IdentityType::Domain => {
                let record = self
                    .provider
                    .create_identity(&identity, &self.identity_options)
                    .await?;
                signing_attributes(&record)
            }
        };

        self.events
            .dispatch(&IdentityVerificationEvent::new(&identity, identity_type));

        let code = signing
            .as_ref()
            .and_then(|s| s.status.as_deref())
            .map(VerificationStatus::from_signing_status)
            .unwrap_or(VerificationStatus::Created);

        write_verified_flag(self.config_store.as_ref(), identity_type, &identity, false)?;

        info!("Identity created: {} ({})", identity, identity_type);
        Ok(VerificationResult::new(code).with_data(signing))
    }

    /// Translated message for a status code
    pub fn status_message(&self, status: VerificationStatus, identity: &str) -> String {
        status_message(self.translator.as_ref(), status, identity)
    }

    /// Whether the stored verified domain matches the domain of `email` and is verified
    pub fn is_domain_verified(&self, email: &str) -> bool {
        is_domain_verified(self.config_store.as_ref(), email)
    }

    /// Whether the stored verified email address is `email` and is verified
    pub fn is_email_verified(&self, email: &str) -> bool {
        is_email_verified(self.config_store.as_ref(), email)
    }

    /// Enable or disable DKIM signing for an identity
    pub async fn put_dkim_signing(
        &self,
        identity: &str,
        signing_enabled: bool,
    ) -> Result<(), IdentityError> {
        ensure_valid(identity)?;
        self.provider.put_dkim_signing(identity, signing_enabled).await
    }

    /// Configure the custom MAIL FROM domain for an identity
    pub async fn put_mail_from(
        &self,
        identity: &str,
        mail_from_domain: Option<&str>,
        behavior_on_mx_failure: Option<MxFailureBehavior>,
    ) -> Result<(), IdentityError> {
        ensure_valid(identity)?;
        if let Some(domain) = mail_from_domain {
            ensure_valid(domain)?;
        }
        self.provider
            .put_mail_from(identity, mail_from_domain, behavior_on_mx_failure)
            .await
    }

    /// Enable or disable feedback forwarding for an identity
    pub async fn put_feedback_forwarding(
        &self,
        identity: &str,
        email_forwarding_enabled: bool,
    ) -> Result<(), IdentityError> {
        ensure_valid(identity)?;
        self.provider
            .put_feedback_forwarding(identity, email_forwarding_enabled)
            .await
    }

    /// Make sure the verification template exists, then send the custom
    /// verification email to the address.
    async fn send_verification_email(&self, email: &str) -> Result<Option<String>, IdentityError> {
        let template_name = &self.template.template_name;

        if !self.provider.verification_template_exists(template_name).await? {
            info!(
                "Verification template {} does not exist. Creating it now",
                template_name
            );
            // A failed upload is not fatal here; the send reports the missing template
            if let Err(e) = self.create_template().await {
                error!("Failed to create verification template {}: {}", template_name, e);
            }
        }

        self.provider
            .send_verification_email(
                email,
                template_name,
                self.identity_options.configuration_set_name.as_deref(),
            )
            .await
    }

    async fn create_template(&self) -> Result<(), IdentityError> {
        self.template.validate()?;
        self.provider
            .create_verification_template(&self.template)
            .await
    }
}

/// Validate the identity for its type; domains given as an email resolve to
/// their domain part.
fn resolve_identity(identity: &str, identity_type: IdentityType) -> Result<String, IdentityError> {
    match identity_type {
        IdentityType::Domain => domain_of(identity),
        IdentityType::EmailAddress if is_valid_email(identity) => Ok(identity.to_string()),
        IdentityType::EmailAddress => Err(IdentityError::InvalidIdentity(identity.to_string())),
    }
}

fn ensure_valid(identity: &str) -> Result<(), IdentityError> {
    if is_valid_identity(identity) {
        Ok(())
    } else {
        Err(IdentityError::InvalidIdentity(identity.to_string()))
    }
}
