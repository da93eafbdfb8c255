//! Configuration system for Researchant.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> environment -> overrides.
//! Configuration is loaded from `~/.config/researchant/config.toml` and/or
//! `.researchant/config.toml` in the workspace directory.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default base URL of the hosted research service.
pub const DEFAULT_BASE_URL: &str =
    "https://ai-market-researcher-977121587860.europe-west1.run.app";

/// Top-level configuration for the Researchant client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub poll: PollConfig,
}

/// Configuration for the HTTP API client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the research service, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Configuration for the status poll loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Seconds between status checks while a task is outstanding.
    pub interval_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { interval_secs: 3 }
    }
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `RESEARCHANT_`)
/// 3. Workspace-local config (`.researchant/config.toml`)
/// 4. User config (`~/.config/researchant/config.toml`)
/// 5. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<&ClientConfig>,
) -> Result<ClientConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(ClientConfig::default()));

    // User-level config
    if let Some(config_dir) = directories::ProjectDirs::from("dev", "researchant", "researchant") {
        let user_config = config_dir.config_dir().join("config.toml");
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    // Workspace-level config
    if let Some(ws) = workspace {
        let ws_config = ws.join(".researchant").join("config.toml");
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // Environment variables (RESEARCHANT_API__BASE_URL, RESEARCHANT_POLL__INTERVAL_SECS, etc.)
    figment = figment.merge(Env::prefixed("RESEARCHANT_").split("__"));

    // Explicit overrides
    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    figment.extract().map_err(Box::new)
}

/// Check whether any Researchant configuration file exists (user-level or
/// workspace-level).
pub fn config_exists(workspace: Option<&Path>) -> bool {
    if let Some(config_dir) = directories::ProjectDirs::from("dev", "researchant", "researchant") {
        if config_dir.config_dir().join("config.toml").exists() {
            return true;
        }
    }

    if let Some(ws) = workspace {
        if ws.join(".researchant").join("config.toml").exists() {
            return true;
        }
    }

    false
}
