//! Settings file
//!
//! Settings live in a YAML file, by default `~/.mailgate/mailgate.yaml`. A
//! missing file yields the defaults so that everything can also be supplied
//! through CLI flags and environment variables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::IdentityError;
use crate::providers::{CreateIdentityOptions, SesCredentials};
use crate::template::VerificationTemplate;

pub const DATA_DIR_NAME: &str = ".mailgate";
pub const SETTINGS_FILE_NAME: &str = "mailgate.yaml";
pub const LOCAL_CONFIG_FILE_NAME: &str = "local.json";

/// SES connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SesSettings {
    #[serde(default = "default_region")]
    pub region: String,
    /// Static credentials; the AWS default provider chain is used when absent
    #[serde(default)]
    pub credentials: Option<SesCredentials>,
    /// Custom endpoint URL (LocalStack or other AWS-compatible services)
    #[serde(default)]
    pub endpoint_url: Option<String>,
    /// Configuration set applied to created identities and verification emails
    #[serde(default)]
    pub configuration_set_name: Option<String>,
    /// Tags applied to created domain identities
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

impl Default for SesSettings {
    fn default() -> Self {
        Self {
            region: default_region(),
            credentials: None,
            endpoint_url: None,
            configuration_set_name: None,
            tags: BTreeMap::new(),
        }
    }
}

impl SesSettings {
    pub fn create_identity_options(&self) -> CreateIdentityOptions {
        CreateIdentityOptions {
            configuration_set_name: self.configuration_set_name.clone(),
            tags: self.tags.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub ses: SesSettings,
    #[serde(default)]
    pub verification_template: VerificationTemplate,
    /// JSON file the verified flags are written to
    #[serde(default)]
    pub config_store_path: Option<PathBuf>,
    /// YAML message catalog overriding the built-in messages
    #[serde(default)]
    pub messages_path: Option<PathBuf>,
}

impl Settings {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, IdentityError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load settings from a file, falling back to defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self, IdentityError> {
        if !path.exists() {
            debug!("Settings file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Directory holding the settings and the local configuration
    pub fn data_dir() -> Result<PathBuf, IdentityError> {
        if let Ok(dir) = std::env::var("MAILGATE_DATA_DIR") {
            return Ok(PathBuf::from(dir));
        }

        dirs::home_dir()
            .map(|home| home.join(DATA_DIR_NAME))
            .ok_or_else(|| IdentityError::Config("Could not find home directory".to_string()))
    }

    pub fn default_path() -> Result<PathBuf, IdentityError> {
        Ok(Self::data_dir()?.join(SETTINGS_FILE_NAME))
    }

    /// Configured local config path, or `local.json` in the data directory
    pub fn config_store_path(&self) -> Result<PathBuf, IdentityError> {
        match self.config_store_path {
            Some(ref path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join(LOCAL_CONFIG_FILE_NAME)),
        }
    }
}
