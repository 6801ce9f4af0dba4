//! Services for identity verification

mod identity_service;
mod notification_service;

pub use identity_service::IdentityService;
pub use notification_service::NotificationService;
