//! Custom verification email template
//!
//! SES sends verification emails for email identities through a template
//! stored in the account. The host provides the content; it is uploaded the
//! first time an email identity is created.

use serde::{Deserialize, Serialize};

use crate::errors::IdentityError;

pub const DEFAULT_TEMPLATE_NAME: &str = "MailgateVerificationTemplate";

/// SES custom verification templates are limited to 10 MB of content.
const MAX_TEMPLATE_CONTENT_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationTemplate {
    #[serde(default = "default_template_name")]
    pub template_name: String,
    #[serde(default)]
    pub from_email_address: String,
    #[serde(default = "default_subject")]
    pub template_subject: String,
    #[serde(default = "default_content")]
    pub template_content: String,
    #[serde(default)]
    pub success_redirection_url: String,
    #[serde(default)]
    pub failure_redirection_url: String,
}

fn default_template_name() -> String {
    DEFAULT_TEMPLATE_NAME.to_string()
}

fn default_subject() -> String {
    "Please confirm your sender address".to_string()
}

fn default_content() -> String {
    "<html><body><p>Please confirm that you want to send email from this address \
     by clicking the link below.</p></body></html>"
        .to_string()
}

impl Default for VerificationTemplate {
    fn default() -> Self {
        Self {
            template_name: default_template_name(),
            from_email_address: String::new(),
            template_subject: default_subject(),
            template_content: default_content(),
            success_redirection_url: String::new(),
            failure_redirection_url: String::new(),
        }
    }
}

impl VerificationTemplate {
    /// Check the template before uploading it to the provider
    pub fn validate(&self) -> Result<(), IdentityError> {
        if self.template_name.trim().is_empty() {
            return Err(IdentityError::Template("template name is empty".to_string()));
        }
        if !crate::identity::is_valid_email(&self.from_email_address) {
            return Err(IdentityError::Template(format!(
                "invalid from address: '{}'",
                self.from_email_address
            )));
        }
        if self.template_content.len() > MAX_TEMPLATE_CONTENT_BYTES {
            return Err(IdentityError::Template(
                "template content exceeds 10 MB".to_string(),
            ));
        }
        Ok(())
    }
}
