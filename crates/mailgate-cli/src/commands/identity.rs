//! Identity verification commands

use clap::Args;
use colored::{ColoredString, Colorize};
use mailgate_identity::config::{is_domain_verified, is_email_verified};
use mailgate_identity::messages::{invalid_identity_message, status_message};
use mailgate_identity::{
    classify_identity, domain_of, is_valid_identity, username_of, IdentityService, IdentityType,
    VerificationResult, VerificationStatus,
};
use serde::Serialize;

use super::{build_service, config_store, message_catalog, print_json, SesArgs};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityAction {
    Check,
    Create,
    Verify,
}

/// Check, create or verify an identity
#[derive(Args)]
pub struct IdentityCommand {
    /// Email address or domain
    pub identity: String,

    /// Identity type: email or domain (inferred from the value when omitted)
    #[arg(long = "type", short = 't')]
    pub identity_type: Option<IdentityType>,

    #[command(flatten)]
    pub ses: SesArgs,
}

impl IdentityCommand {
    pub fn execute(self, action: IdentityAction) -> anyhow::Result<()> {
        let identity_type = match self.identity_type {
            Some(identity_type) => identity_type,
            None => classify_identity(&self.identity).ok_or_else(|| {
                anyhow::anyhow!(
                    "'{}' is not a valid email address or domain name",
                    self.identity
                )
            })?,
        };

        let settings = self.ses.load_settings()?;
        let rt = tokio::runtime::Runtime::new()?;

        let result = rt.block_on(async {
            let service = build_service(&settings).await?;
            Ok::<_, anyhow::Error>(run(&service, action, &self.identity, identity_type).await)
        })?;

        if self.ses.json {
            print_json(&result)?;
        } else {
            print_result(&self.identity, identity_type, &result);
        }

        if result.code == VerificationStatus::Error {
            anyhow::bail!("Verification of {} failed", self.identity);
        }
        Ok(())
    }
}

async fn run(
    service: &IdentityService,
    action: IdentityAction,
    identity: &str,
    identity_type: IdentityType,
) -> VerificationResult {
    match action {
        IdentityAction::Check => {
            let mut result = service.check_identity(identity, identity_type).await;
            result.message = Some(service.status_message(result.code, identity));
            result
        }
        IdentityAction::Create => {
            let mut result = service.create_identity(identity, identity_type).await;
            result.message = Some(service.status_message(result.code, identity));
            result
        }
        IdentityAction::Verify => service.verify(identity, identity_type).await,
    }
}

fn colored_status(status: VerificationStatus) -> ColoredString {
    match status {
        VerificationStatus::Success => status.as_str().green().bold(),
        VerificationStatus::Pending
        | VerificationStatus::Created
        | VerificationStatus::NotStarted => status.as_str().yellow().bold(),
        VerificationStatus::Failed
        | VerificationStatus::TemporaryFailure
        | VerificationStatus::NotFound
        | VerificationStatus::Error => status.as_str().red().bold(),
    }
}

fn print_result(identity: &str, identity_type: IdentityType, result: &VerificationResult) {
    println!();
    println!(
        "{} {} ({})",
        "→".bright_blue(),
        identity.bold(),
        identity_type
    );
    println!("  Status:  {}", colored_status(result.code));

    if let Some(ref message) = result.message {
        println!("  Message: {}", message);
    }

    if let Some(ref signing) = result.data {
        println!(
            "  DKIM:    signing {}, status {}",
            if signing.signing_enabled {
                "enabled".green()
            } else {
                "disabled".yellow()
            },
            signing.status.as_deref().unwrap_or("-")
        );

        if let Ok(domain) = domain_of(identity) {
            for token in &signing.tokens {
                println!(
                    "           CNAME {}._domainkey.{} → {}.dkim.amazonses.com",
                    token, domain, token
                );
            }
        }
    }
    println!();
}

/// Check whether a value is a valid email address or domain
#[derive(Args)]
pub struct ValidateCommand {
    /// Value to validate
    pub value: String,

    #[command(flatten)]
    pub ses: SesArgs,
}

#[derive(Debug, Serialize)]
struct ValidationOutput {
    value: String,
    valid: bool,
    identity_type: Option<IdentityType>,
    username: Option<String>,
    domain: Option<String>,
}

impl ValidateCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let output = ValidationOutput {
            valid: is_valid_identity(&self.value),
            identity_type: classify_identity(&self.value),
            username: username_of(&self.value),
            domain: domain_of(&self.value).ok(),
            value: self.value,
        };

        if self.ses.json {
            print_json(&output)?;
        } else if output.valid {
            println!(
                "{} {} is a valid {}",
                "✓".green(),
                output.value.bold(),
                match output.identity_type {
                    Some(IdentityType::EmailAddress) => "email address",
                    _ => "domain",
                }
            );
        } else {
            let catalog = message_catalog(&self.ses.load_settings()?)?;
            println!(
                "{} {}",
                "✗".red(),
                invalid_identity_message(&catalog, &output.value)
            );
        }

        if !output.valid {
            anyhow::bail!("Invalid identity: {}", output.value);
        }
        Ok(())
    }
}

/// Show whether a sender address is allowed by the stored verified flags
#[derive(Args)]
pub struct StatusCommand {
    /// Sender email address
    pub email: String,

    #[command(flatten)]
    pub ses: SesArgs,
}

#[derive(Debug, Serialize)]
struct SenderStatus {
    email: String,
    email_verified: bool,
    domain_verified: bool,
}

impl StatusCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let settings = self.ses.load_settings()?;
        let store = config_store(&settings)?;

        let status = SenderStatus {
            email_verified: is_email_verified(&store, &self.email),
            domain_verified: is_domain_verified(&store, &self.email),
            email: self.email,
        };

        if self.ses.json {
            return print_json(&status);
        }

        let mark = |verified: bool| {
            if verified {
                "verified".green().bold()
            } else {
                "not verified".red().bold()
            }
        };
        println!("{}", status.email.bold());
        println!("  Email address: {}", mark(status.email_verified));
        println!("  Domain:        {}", mark(status.domain_verified));
        println!("  Local config:  {}", store.path().display());

        if !status.email_verified && !status.domain_verified {
            let catalog = message_catalog(&settings)?;
            println!(
                "  {}",
                status_message(
                    &catalog,
                    VerificationStatus::NotStarted,
                    &status.email
                )
            );
        }
        Ok(())
    }
}
