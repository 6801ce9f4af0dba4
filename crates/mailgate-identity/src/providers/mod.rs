//! Identity provider abstractions and implementations

mod ses;
mod ses_v1;
mod traits;

#[cfg(test)]
pub mod mock;

pub use ses::{SesCredentials, SesV2Provider};
pub use ses_v1::SesV1Provider;
pub use traits::*;

#[cfg(test)]
pub use mock::{MockIdentityProvider, MockNotificationProvider};
