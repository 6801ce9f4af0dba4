//! AWS SES v1 client
//!
//! Only used for SNS notification topics: `SetIdentityNotificationTopic`
//! exists in SES v1 and has no SES v2 equivalent.

use async_trait::async_trait;
use aws_sdk_ses::{
    error::DisplayErrorContext, types::NotificationType as SesNotificationType, Client,
};
use tracing::{debug, error};

use super::ses::load_sdk_config;
use super::traits::{NotificationProvider, NotificationType};
use crate::errors::IdentityError;
use crate::settings::SesSettings;

fn notification_type_to_sdk(notification_type: NotificationType) -> SesNotificationType {
    match notification_type {
        NotificationType::Bounce => SesNotificationType::Bounce,
        NotificationType::Complaint => SesNotificationType::Complaint,
        NotificationType::Delivery => SesNotificationType::Delivery,
    }
}

/// AWS SES v1 provider
pub struct SesV1Provider {
    client: Client,
}

impl SesV1Provider {
    pub async fn new(settings: &SesSettings) -> Result<Self, IdentityError> {
        let config = load_sdk_config(settings).await;

        Ok(Self {
            client: Client::new(&config),
        })
    }
}

#[async_trait]
impl NotificationProvider for SesV1Provider {
    async fn set_notification_topic(
        &self,
        identity: &str,
        notification_type: NotificationType,
        sns_topic: &str,
    ) -> Result<(), IdentityError> {
        debug!(
            "Setting {} notification topic for {} to {}",
            notification_type, identity, sns_topic
        );

        self.client
            .set_identity_notification_topic()
            .identity(identity)
            .notification_type(notification_type_to_sdk(notification_type))
            .sns_topic(sns_topic)
            .send()
            .await
            .map_err(|e| {
                let error_message = DisplayErrorContext(&e).to_string();
                error!(
                    "Failed to set {} notification topic for {}: {}",
                    notification_type, identity, error_message
                );
                IdentityError::AwsSes(error_message)
            })?;

        Ok(())
    }
}
