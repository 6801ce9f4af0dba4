//! Sender identity verification for Amazon SES
//!
//! This crate decides, for an email address or a domain, whether it may be
//! used as a "from" identity and what has to happen next:
//! - Identity validation and classification (email vs domain)
//! - Provider status lookup through the SES v2 API
//! - Identity creation and custom verification emails
//! - Verified flags persisted into a local configuration store
//! - User-facing status messages
//!
//! SES v1 is only used for SNS notification topics, which have no v2
//! equivalent.

pub mod config;
pub mod errors;
pub mod events;
pub mod identity;
pub mod messages;
pub mod providers;
pub mod services;
pub mod settings;
pub mod status;
pub mod template;

// Re-export main types
pub use config::{ConfigStore, FileConfigStore, MemoryConfigStore};
pub use errors::IdentityError;
pub use events::{IdentityEvents, IdentityVerificationEvent, IdentityVerificationListener};
pub use identity::{
    classify_identity, domain_of, is_valid_domain, is_valid_email, is_valid_identity,
    same_email_address, username_of, Identity, IdentityType,
};
pub use messages::{MessageCatalog, Translator};
pub use providers::{
    IdentityProvider, NotificationProvider, SesCredentials, SesV1Provider, SesV2Provider,
};
pub use services::{IdentityService, NotificationService};
pub use settings::Settings;
pub use status::{SigningAttributes, VerificationResult, VerificationStatus};
pub use template::VerificationTemplate;
