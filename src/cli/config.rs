use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::arm::MANAGEMENT_ENDPOINT;

pub const CONFIG_FILENAME: &str = ".armrg.toml";

/// Optional per-project defaults, read from ./.armrg.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub subscription: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_config_from_path(CONFIG_FILENAME)
    }
}

pub fn load_config_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let content = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read {}", path.as_ref().display()))?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

pub fn try_load_config() -> Option<Config> {
    Config::load().ok()
}

/// Default subscription recorded in the local az profile, if any.
fn azure_profile_subscription() -> Option<String> {
    #[derive(Deserialize)]
    struct Profile {
        subscriptions: Vec<ProfileSubscription>,
    }

    #[derive(Deserialize)]
    struct ProfileSubscription {
        id: String,
        #[serde(rename = "isDefault", default)]
        is_default: bool,
    }

    let path = dirs::home_dir()?.join(".azure/azureProfile.json");
    let content = std::fs::read_to_string(path).ok()?;
    // az writes the profile with a UTF-8 BOM
    let profile: Profile = serde_json::from_str(content.trim_start_matches('\u{feff}')).ok()?;

    profile
        .subscriptions
        .into_iter()
        .find(|s| s.is_default)
        .map(|s| s.id)
}

/// Fully resolved configuration for one run. Built once from args, env,
/// config file and the az profile, then passed down explicitly.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub subscription_id: String,
    pub endpoint: String,
    pub location: Option<String>,
}

impl RunConfig {
    /// Resolution order per field: CLI arg / env (clap), .armrg.toml,
    /// then the az profile for the subscription id. A run with no
    /// resolvable subscription id fails here, before any network work.
    pub fn resolve(subscription: Option<String>, endpoint: Option<String>) -> Result<Self> {
        let file = try_load_config();

        let subscription_id = subscription
            .filter(|s| !s.trim().is_empty())
            .or_else(|| file.as_ref().and_then(|c| c.subscription.clone()))
            .or_else(azure_profile_subscription);

        let Some(subscription_id) = subscription_id else {
            bail!(
                "no subscription id configured; set AZURE_SUBSCRIPTION_ID, \
                 pass --subscription, or run 'az login'"
            );
        };

        let endpoint = endpoint
            .or_else(|| file.as_ref().and_then(|c| c.endpoint.clone()))
            .unwrap_or_else(|| MANAGEMENT_ENDPOINT.to_string());

        Ok(RunConfig {
            subscription_id,
            endpoint,
            location: file.and_then(|c| c.location),
        })
    }
}
