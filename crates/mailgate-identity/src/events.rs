//! Identity verification extension point
//!
//! Listeners registered here are notified after an identity has been created
//! with the provider, e.g. to send a host-specific verification email.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::identity::IdentityType;

pub const ON_VERIFY_IDENTITY: &str = "mailgate.on_verify_identity";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityVerificationEvent {
    pub identity: String,
    pub identity_type: IdentityType,
    pub occurred_at: DateTime<Utc>,
}

impl IdentityVerificationEvent {
    pub fn new(identity: &str, identity_type: IdentityType) -> Self {
        Self {
            identity: identity.to_string(),
            identity_type,
            occurred_at: Utc::now(),
        }
    }
}

/// Listener for `ON_VERIFY_IDENTITY`
pub trait IdentityVerificationListener: Send + Sync {
    fn on_verify_identity(&self, event: &IdentityVerificationEvent);
}

impl<F> IdentityVerificationListener for F
where
    F: Fn(&IdentityVerificationEvent) + Send + Sync,
{
    fn on_verify_identity(&self, event: &IdentityVerificationEvent) {
        self(event)
    }
}

/// Ordered list of listeners, called synchronously in registration order
#[derive(Clone, Default)]
pub struct IdentityEvents {
    listeners: Vec<Arc<dyn IdentityVerificationListener>>,
}

impl IdentityEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Arc<dyn IdentityVerificationListener>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn dispatch(&self, event: &IdentityVerificationEvent) {
        debug!(
            "Dispatching {} for {} to {} listener(s)",
            ON_VERIFY_IDENTITY,
            event.identity,
            self.listeners.len()
        );

        for listener in &self.listeners {
            listener.on_verify_identity(event);
        }
    }
}

impl std::fmt::Debug for IdentityEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityEvents")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
