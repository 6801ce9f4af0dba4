//! Identity validation and classification
//!
//! An identity is either an email address (`user@example.com`) or a bare
//! domain (`example.com`). Everything here is pure: no provider calls.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::IdentityError;

const MAX_LOCAL_PART_LEN: usize = 64;
const MAX_HOSTNAME_LEN: usize = 253;

static LOCAL_PART: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*$"#,
    )
    .expect("local part pattern is valid")
});

// At least two labels; a single label such as "localhost" is not a sending domain.
static HOSTNAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?$",
    )
    .expect("hostname pattern is valid")
});

/// Kind of identity registered with the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdentityType {
    /// A single mailbox, verified through a custom verification email
    EmailAddress,
    /// A whole domain, verified through DKIM DNS records
    Domain,
}

impl IdentityType {
    /// Segment used in configuration keys (`email_address` / `domain`)
    pub fn config_segment(&self) -> &'static str {
        match self {
            IdentityType::EmailAddress => "email_address",
            IdentityType::Domain => "domain",
        }
    }
}

impl std::fmt::Display for IdentityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentityType::EmailAddress => write!(f, "EMAIL_ADDRESS"),
            IdentityType::Domain => write!(f, "DOMAIN"),
        }
    }
}

impl FromStr for IdentityType {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "email" | "email_address" | "email-address" => Ok(IdentityType::EmailAddress),
            "domain" => Ok(IdentityType::Domain),
            _ => Err(IdentityError::Config(format!("Unknown identity type: {}", s))),
        }
    }
}

/// A validated identity together with its classified type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub value: String,
    pub identity_type: IdentityType,
}

impl Identity {
    /// Validate and classify a raw value
    pub fn parse(value: &str) -> Result<Self, IdentityError> {
        let identity_type = classify_identity(value)
            .ok_or_else(|| IdentityError::InvalidIdentity(value.to_string()))?;

        Ok(Self {
            value: value.to_string(),
            identity_type,
        })
    }
}

/// Check whether the value is a hostname usable as a sending domain
pub fn is_valid_domain(value: &str) -> bool {
    value.len() <= MAX_HOSTNAME_LEN && HOSTNAME.is_match(value)
}

/// Check whether the value is an email address
pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };

    local.len() <= MAX_LOCAL_PART_LEN && LOCAL_PART.is_match(local) && is_valid_domain(domain)
}

/// Check if the value is either a valid email address or a valid domain
pub fn is_valid_identity(value: &str) -> bool {
    is_valid_email(value) || is_valid_domain(value)
}

/// Classify a value, `None` when it is neither an email nor a domain
pub fn classify_identity(value: &str) -> Option<IdentityType> {
    if is_valid_email(value) {
        Some(IdentityType::EmailAddress)
    } else if is_valid_domain(value) {
        Some(IdentityType::Domain)
    } else {
        None
    }
}

/// Local part of an email address
pub fn username_of(email: &str) -> Option<String> {
    if !is_valid_email(email) {
        return None;
    }

    email.split('@').next().map(str::to_string)
}

/// If the value is an email, return its domain; a domain is returned as is.
pub fn domain_of(value: &str) -> Result<String, IdentityError> {
    if !is_valid_identity(value) {
        return Err(IdentityError::InvalidIdentity(value.to_string()));
    }

    match value.rsplit_once('@') {
        Some((_, domain)) if is_valid_email(value) => Ok(domain.to_string()),
        _ => Ok(value.to_string()),
    }
}

/// Whether two email addresses name the same mailbox: local parts compare
/// exactly, domains ignore case.
pub fn same_email_address(a: &str, b: &str) -> bool {
    match (a.rsplit_once('@'), b.rsplit_once('@')) {
        (Some((local_a, domain_a)), Some((local_b, domain_b))) => {
            local_a == local_b && domain_a.eq_ignore_ascii_case(domain_b)
        }
        _ => false,
    }
}
