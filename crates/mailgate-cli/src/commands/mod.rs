mod identity;
mod provider;

pub use identity::{IdentityAction, IdentityCommand, StatusCommand, ValidateCommand};
pub use provider::{DkimCommand, FeedbackCommand, MailFromCommand, NotificationsCommand};

use anyhow::Context;
use clap::Args;
use mailgate_identity::{
    FileConfigStore, IdentityService, IdentityVerificationEvent, MessageCatalog, SesCredentials,
    SesV2Provider, Settings,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Settings and AWS connection options shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct SesArgs {
    /// Settings file (YAML)
    #[arg(long, env = "MAILGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// AWS region, overrides the settings file
    #[arg(long, env = "MAILGATE_AWS_REGION")]
    pub region: Option<String>,

    /// AWS access key ID, overrides the settings file
    #[arg(long, env = "MAILGATE_AWS_ACCESS_KEY_ID")]
    pub access_key_id: Option<String>,

    /// AWS secret access key, overrides the settings file
    #[arg(long, env = "MAILGATE_AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub secret_access_key: Option<String>,

    /// Custom SES endpoint (e.g. LocalStack)
    #[arg(long, env = "MAILGATE_SES_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// Local configuration file the verified flags are written to
    #[arg(long, env = "MAILGATE_LOCAL_CONFIG")]
    pub local_config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, default_value = "false")]
    pub json: bool,
}

impl SesArgs {
    /// Load the settings file and apply command line overrides
    pub fn load_settings(&self) -> anyhow::Result<Settings> {
        let path = match self.config {
            Some(ref path) => path.clone(),
            None => Settings::default_path()?,
        };
        debug!("Loading settings from {}", path.display());

        let mut settings = Settings::load(&path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?;

        if let Some(ref region) = self.region {
            settings.ses.region = region.clone();
        }
        if let (Some(access_key_id), Some(secret_access_key)) =
            (&self.access_key_id, &self.secret_access_key)
        {
            settings.ses.credentials = Some(SesCredentials {
                access_key_id: access_key_id.clone(),
                secret_access_key: secret_access_key.clone(),
                session_token: None,
            });
        }
        if let Some(ref endpoint_url) = self.endpoint_url {
            settings.ses.endpoint_url = Some(endpoint_url.clone());
        }
        if let Some(ref local_config) = self.local_config {
            settings.config_store_path = Some(local_config.clone());
        }

        Ok(settings)
    }
}

/// Local configuration store for the settings
pub fn config_store(settings: &Settings) -> anyhow::Result<FileConfigStore> {
    Ok(FileConfigStore::new(settings.config_store_path()?))
}

/// Message catalog, with the configured overrides if any
pub fn message_catalog(settings: &Settings) -> anyhow::Result<MessageCatalog> {
    match settings.messages_path {
        Some(ref path) => MessageCatalog::from_yaml_file(path)
            .with_context(|| format!("Failed to load messages from {}", path.display())),
        None => Ok(MessageCatalog::default()),
    }
}

/// Wire the identity service from settings
pub async fn build_service(settings: &Settings) -> anyhow::Result<IdentityService> {
    let provider = SesV2Provider::new(&settings.ses).await?;
    debug!("Using SES v2 in region {}", provider.region());

    let mut service = IdentityService::new(
        Arc::new(provider),
        Arc::new(config_store(settings)?),
        Arc::new(message_catalog(settings)?),
        settings.verification_template.clone(),
    )
    .with_identity_options(settings.ses.create_identity_options());

    service.subscribe(Arc::new(|event: &IdentityVerificationEvent| {
        info!(
            "Verification started for {} ({})",
            event.identity, event.identity_type
        );
    }));

    Ok(service)
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
