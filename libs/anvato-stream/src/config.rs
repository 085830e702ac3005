use std::path::Path;
use std::time::Duration;

use platform_dirs::AppDirs;
use serde::{Deserialize, Serialize};

use crate::AnvatoStreamError;

const APP_NAME: &str = "anvato-stream";
const CONFIG_FILE_NAME: &str = "Conf.toml";
/// Upper bound for every interval, one day
const MAX_INTERVAL_SECS: u64 = 24 * 60 * 60;

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Config {
    /// Host of the metadata API, e.g. `tkx.mp.lura.live`
    #[serde(default = "default_api_host")]
    pub api_host: String,
    /// Seconds between two successful URL refreshes
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    /// Seconds to wait before retrying after a failed refresh
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_api_host() -> String {
    "tkx.mp.lura.live".to_string()
}

fn default_refresh_interval_secs() -> u64 {
    30
}

fn default_backoff_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_host: default_api_host(),
            refresh_interval_secs: default_refresh_interval_secs(),
            backoff_secs: default_backoff_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    /// Load `Conf.toml` from the platform config directory, falling back to
    /// defaults when it is missing or unreadable.
    pub fn load() -> Self {
        let Some(app_dirs) = AppDirs::new(Some(APP_NAME), false) else {
            return Self::default();
        };
        let config_path = app_dirs.config_dir.join(CONFIG_FILE_NAME);
        match Self::load_from(&config_path) {
            Ok(config) => config,
            Err(e) => {
                log::debug!("Using default config ({}): {}", config_path.display(), e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, AnvatoStreamError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AnvatoStreamError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, AnvatoStreamError> {
        let config: Self =
            toml::from_str(content).map_err(|e| AnvatoStreamError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject intervals outside `1..=MAX_INTERVAL_SECS` seconds.
    pub fn validate(&self) -> Result<(), AnvatoStreamError> {
        for (name, secs) in [
            ("refresh_interval_secs", self.refresh_interval_secs),
            ("backoff_secs", self.backoff_secs),
            ("request_timeout_secs", self.request_timeout_secs),
        ] {
            if !(1..=MAX_INTERVAL_SECS).contains(&secs) {
                return Err(AnvatoStreamError::Config(format!(
                    "{name} must be between 1 and {MAX_INTERVAL_SECS}, got {secs}"
                )));
            }
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        clamped_secs(self.refresh_interval_secs)
    }

    pub fn backoff(&self) -> Duration {
        clamped_secs(self.backoff_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        clamped_secs(self.request_timeout_secs)
    }
}

fn clamped_secs(secs: u64) -> Duration {
    Duration::from_secs(secs.min(MAX_INTERVAL_SECS))
}
