//! SNS notification topics for verified identities

use std::sync::Arc;
use tracing::info;

use crate::errors::IdentityError;
use crate::identity::is_valid_identity;
use crate::providers::{NotificationProvider, NotificationType};

pub struct NotificationService {
    provider: Arc<dyn NotificationProvider>,
}

impl NotificationService {
    pub fn new(provider: Arc<dyn NotificationProvider>) -> Self {
        Self { provider }
    }

    /// Route the given notification types of an identity to an SNS topic.
    ///
    /// One provider call is made per type, in order; the first failure stops
    /// the loop. Returns how many types were applied.
    pub async fn set_identity_notification_topic(
        &self,
        identity: &str,
        notification_types: &[NotificationType],
        sns_topic: &str,
    ) -> Result<usize, IdentityError> {
        if !is_valid_identity(identity) {
            return Err(IdentityError::InvalidIdentity(identity.to_string()));
        }

        for notification_type in notification_types {
            self.provider
                .set_notification_topic(identity, *notification_type, sns_topic)
                .await?;
        }

        info!(
            "Routed {} notification type(s) for {} to {}",
            notification_types.len(),
            identity,
            sns_topic
        );
        Ok(notification_types.len())
    }
}
