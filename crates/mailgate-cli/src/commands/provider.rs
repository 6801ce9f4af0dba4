//! Identity attribute commands (DKIM, MAIL FROM, feedback, SNS topics)

use clap::{Args, ValueEnum};
use colored::Colorize;
use mailgate_identity::providers::{MxFailureBehavior, NotificationType};
use mailgate_identity::{NotificationService, SesV1Provider};
use std::sync::Arc;

use super::{build_service, SesArgs};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn enabled(self) -> bool {
        self == Toggle::On
    }
}

fn done(message: String) {
    println!("{} {}", "✓".green(), message);
}

/// Enable or disable DKIM signing
#[derive(Args)]
pub struct DkimCommand {
    /// Email address or domain
    pub identity: String,

    /// DKIM signing: on or off
    #[arg(value_enum)]
    pub state: Toggle,

    #[command(flatten)]
    pub ses: SesArgs,
}

impl DkimCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let settings = self.ses.load_settings()?;
        let rt = tokio::runtime::Runtime::new()?;

        rt.block_on(async {
            let service = build_service(&settings).await?;
            service
                .put_dkim_signing(&self.identity, self.state.enabled())
                .await?;
            Ok::<_, anyhow::Error>(())
        })?;

        done(format!(
            "DKIM signing {} for {}",
            if self.state.enabled() { "enabled" } else { "disabled" },
            self.identity.bold()
        ));
        Ok(())
    }
}

/// Configure the custom MAIL FROM domain
#[derive(Args)]
pub struct MailFromCommand {
    /// Email address or domain
    pub identity: String,

    /// MAIL FROM domain (e.g. "send.example.com"); omit to reset
    #[arg(long)]
    pub domain: Option<String>,

    /// Behavior when the MX record is missing: use-default-value, reject-message
    #[arg(long)]
    pub behavior: Option<MxFailureBehavior>,

    #[command(flatten)]
    pub ses: SesArgs,
}

impl MailFromCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let settings = self.ses.load_settings()?;
        let rt = tokio::runtime::Runtime::new()?;

        rt.block_on(async {
            let service = build_service(&settings).await?;
            service
                .put_mail_from(&self.identity, self.domain.as_deref(), self.behavior)
                .await?;
            Ok::<_, anyhow::Error>(())
        })?;

        done(format!(
            "MAIL FROM for {} set to {}",
            self.identity.bold(),
            self.domain.as_deref().unwrap_or("the default domain")
        ));
        Ok(())
    }
}

/// Enable or disable feedback forwarding
#[derive(Args)]
pub struct FeedbackCommand {
    /// Email address or domain
    pub identity: String,

    /// Forward bounces and complaints by email: on or off
    #[arg(value_enum)]
    pub state: Toggle,

    #[command(flatten)]
    pub ses: SesArgs,
}

impl FeedbackCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let settings = self.ses.load_settings()?;
        let rt = tokio::runtime::Runtime::new()?;

        rt.block_on(async {
            let service = build_service(&settings).await?;
            service
                .put_feedback_forwarding(&self.identity, self.state.enabled())
                .await?;
            Ok::<_, anyhow::Error>(())
        })?;

        done(format!(
            "Feedback forwarding {} for {}",
            if self.state.enabled() { "enabled" } else { "disabled" },
            self.identity.bold()
        ));
        Ok(())
    }
}

/// Route notifications to an SNS topic (SES v1)
#[derive(Args)]
pub struct NotificationsCommand {
    /// Verified email address or domain
    pub identity: String,

    /// ARN of the SNS topic
    #[arg(long)]
    pub topic: String,

    /// Notification types, comma separated
    #[arg(long, value_delimiter = ',', default_value = "bounce,complaint")]
    pub types: Vec<NotificationType>,

    #[command(flatten)]
    pub ses: SesArgs,
}

impl NotificationsCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let settings = self.ses.load_settings()?;
        let rt = tokio::runtime::Runtime::new()?;

        let applied = rt.block_on(async {
            let provider = SesV1Provider::new(&settings.ses).await?;
            NotificationService::new(Arc::new(provider))
                .set_identity_notification_topic(&self.identity, &self.types, &self.topic)
                .await
        })?;

        done(format!(
            "{} notification topic(s) for {} set to {}",
            applied,
            self.identity.bold(),
            self.topic
        ));
        Ok(())
    }
}
