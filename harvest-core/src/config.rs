//! Runtime configuration.
//!
//! Credentials come from the environment (optionally seeded from a `.env`
//! file). The search sweep and output targets come from an optional TOML
//! file and fall back to built-in defaults.

use crate::error::{ConfigError, CoreError};
use crate::types::SearchConfiguration;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CLIENT_ID_VAR: &str = "REDDIT_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "REDDIT_CLIENT_SECRET";
pub const USER_AGENT_VAR: &str = "REDDIT_USER_AGENT";

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "harvest.toml";

const DEFAULT_TARGETS: &[&str] = &[
    "reddit_api_galaxy.csv",
    "reddit_api_googlepixel.csv",
    "reddit_api_iPhone.csv",
];

/// Reddit application credentials. Values are carried as read; the Reddit
/// client rejects missing ones when it connects.
#[derive(Clone, Default)]
pub struct RedditCredentials {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub user_agent: Option<String>,
}

impl RedditCredentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            client_id: Some(client_id.into()),
            client_secret: Some(client_secret.into()),
            user_agent: Some(user_agent.into()),
        }
    }

    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }

        Self {
            client_id: std::env::var(CLIENT_ID_VAR).ok(),
            client_secret: std::env::var(CLIENT_SECRET_VAR).ok(),
            user_agent: std::env::var(USER_AGENT_VAR).ok(),
        }
    }

    pub fn require_client_id(&self) -> Result<&str, ConfigError> {
        require(&self.client_id, CLIENT_ID_VAR)
    }

    pub fn require_client_secret(&self) -> Result<&str, ConfigError> {
        require(&self.client_secret, CLIENT_SECRET_VAR)
    }

    pub fn require_user_agent(&self) -> Result<&str, ConfigError> {
        require(&self.user_agent, USER_AGENT_VAR)
    }
}

fn require<'a>(value: &'a Option<String>, var_name: &str) -> Result<&'a str, ConfigError> {
    value
        .as_deref()
        .ok_or_else(|| ConfigError::MissingEnvironmentVariable {
            var_name: var_name.to_string(),
        })
}

impl fmt::Debug for RedditCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedditCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Every target receives the full result table.
    pub targets: Vec<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            targets: DEFAULT_TARGETS.iter().map(|target| PathBuf::from(*target)).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarvestConfig {
    pub search: SearchConfiguration,
    pub output: OutputConfig,
}

impl HarvestConfig {
    /// Load from `path`, or from `harvest.toml` in the working directory when
    /// present, or fall back to the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, CoreError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    debug!("No {} found, using built-in configuration", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, CoreError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }
}
