use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::sdb::{Client, ClientConfig, Codec, CodecConfig, Dialect};

/// Account credentials and the API dialect they talk to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// AWS access key ID
    pub access_key: String,

    /// AWS secret access key
    pub secret_key: String,

    /// API dialect: sdb or sds (default: sdb)
    #[serde(default)]
    pub dialect: Dialect,

    /// Endpoint override; the dialect's endpoint when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Named credential profiles
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,

    /// Profile used when none is named
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,

    /// Attribute encoding settings
    #[serde(default)]
    pub codec: CodecConfig,

    /// Request settings
    #[serde(default)]
    pub client: ClientConfig,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a profile by name, or the default profile if not specified
    pub fn get_profile(&self, name: Option<&str>) -> Option<&Profile> {
        if let Some(name) = name {
            self.profiles.get(name)
        } else if let Some(default) = &self.default_profile {
            self.profiles.get(default)
        } else {
            self.profiles.values().next()
        }
    }

    /// Reject settings that could never serve a request
    pub fn validate(&self) -> Result<()> {
        if self.codec.number_padding == 0 {
            anyhow::bail!("codec.number_padding must be at least 1");
        }
        if self.client.max_pages == Some(0) {
            anyhow::bail!("client.max_pages must be at least 1 when set");
        }
        Ok(())
    }

    /// Build a client for the named (or default) profile
    pub fn build_client(&self, profile_name: Option<&str>) -> Result<Client> {
        let profile = self.get_profile(profile_name).with_context(|| match profile_name {
            Some(name) => format!("Profile '{}' not found", name),
            None => "No profile configured".to_string(),
        })?;

        let mut builder = Client::builder(&profile.access_key, &profile.secret_key)
            .dialect(profile.dialect)
            .codec(Codec::from(self.codec))
            .config(self.client.clone());

        if let Some(endpoint) = &profile.endpoint {
            builder = builder.endpoint(endpoint);
        }

        builder.build().context("Failed to create client")
    }
}

/// Load configuration from a YAML file
pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path.as_ref())
        .context(format!("Failed to read config file: {:?}", path.as_ref()))?;

    let config: Config = serde_yaml::from_str(&content)
        .context("Failed to parse YAML configuration")?;

    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// Supports both AWS standard variables and SDB_ prefixed ones:
/// - AWS_ACCESS_KEY_ID / SDB_ACCESS_KEY
/// - AWS_SECRET_ACCESS_KEY / SDB_SECRET_KEY
/// - SDB_DIALECT (optional, sdb or sds)
/// - SDB_ENDPOINT (optional)
/// - SDB_NUMBER_PADDING, SDB_FLOAT_PRECISION (optional)
/// - SDB_REQUEST_TIMEOUT, SDB_MAX_PAGES (optional)
pub fn load_from_env() -> Result<Config> {
    // Try to load .env file if it exists (don't fail if it doesn't)
    let _ = dotenvy::dotenv();

    let mut config = Config::new();

    let access_key = std::env::var("AWS_ACCESS_KEY_ID")
        .or_else(|_| std::env::var("SDB_ACCESS_KEY"))
        .context("Neither AWS_ACCESS_KEY_ID nor SDB_ACCESS_KEY environment variable is set")?;

    let secret_key = std::env::var("AWS_SECRET_ACCESS_KEY")
        .or_else(|_| std::env::var("SDB_SECRET_KEY"))
        .context("Neither AWS_SECRET_ACCESS_KEY nor SDB_SECRET_KEY environment variable is set")?;

    let dialect = match std::env::var("SDB_DIALECT") {
        Ok(value) => value
            .parse::<Dialect>()
            .map_err(anyhow::Error::msg)
            .context("Invalid SDB_DIALECT")?,
        Err(_) => Dialect::default(),
    };

    let endpoint = std::env::var("SDB_ENDPOINT").ok();

    let profile = Profile {
        access_key,
        secret_key,
        dialect,
        endpoint,
    };

    config.profiles.insert("default".to_string(), profile);
    config.default_profile = Some("default".to_string());

    if let Ok(padding) = std::env::var("SDB_NUMBER_PADDING") {
        if let Ok(val) = padding.parse() {
            config.codec.number_padding = val;
        }
    }

    if let Ok(precision) = std::env::var("SDB_FLOAT_PRECISION") {
        if let Ok(val) = precision.parse() {
            config.codec.float_precision = val;
        }
    }

    if let Ok(timeout) = std::env::var("SDB_REQUEST_TIMEOUT") {
        if let Ok(val) = timeout.parse() {
            config.client.request_timeout = val;
        }
    }

    if let Ok(max_pages) = std::env::var("SDB_MAX_PAGES") {
        if let Ok(val) = max_pages.parse() {
            config.client.max_pages = Some(val);
        }
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from file or environment
///
/// Tries the YAML file first, then falls back to environment variables if no
/// file is specified.
///
/// # Arguments
/// * `config_path` - Optional path to YAML config file
/// * `profile_name` - Optional profile name to use (only relevant for YAML configs)
pub fn load_config(config_path: Option<&str>, profile_name: Option<&str>) -> Result<Config> {
    if let Some(path) = config_path {
        let mut config = load_from_yaml(path)?;

        // If a specific profile is requested, make it the default
        if let Some(name) = profile_name {
            if !config.profiles.contains_key(name) {
                anyhow::bail!("Profile '{}' not found in config file", name);
            }
            config.default_profile = Some(name.to_string());
        }

        Ok(config)
    } else {
        load_from_env()
    }
}
