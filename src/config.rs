use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GoldApiConfig {
    pub base_url: String,
    /// Overridden by the GOLD_API_KEY environment variable when set.
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExchangeApiConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub goldapi: Option<GoldApiConfig>,
    pub exchange: Option<ExchangeApiConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            goldapi: Some(GoldApiConfig {
                base_url: "https://www.goldapi.io/api".to_string(),
                api_key: None,
            }),
            exchange: Some(ExchangeApiConfig {
                base_url: "https://open.er-api.com".to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_fallback_rate")]
    pub fallback_rate: f64,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_port")]
    pub port: u16,
    pub data_path: Option<String>,
}

fn default_currency() -> String {
    "SAR".to_string()
}

fn default_fallback_rate() -> f64 {
    3.75
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_port() -> u16 {
    8080
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            currency: default_currency(),
            fallback_rate: default_fallback_rate(),
            cache_ttl_secs: default_cache_ttl_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            port: default_port(),
            data_path: None,
        }
    }
}

impl AppConfig {
    /// Loads from the default config path, falling back to defaults when no
    /// config file exists.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config file found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "goldtrack", "goldtrack")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "goldtrack", "goldtrack")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// GoldAPI credential: environment takes precedence over the config file.
    pub fn gold_api_key(&self) -> String {
        std::env::var("GOLD_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .or_else(|| {
                self.providers
                    .goldapi
                    .as_ref()
                    .and_then(|g| g.api_key.clone())
            })
            .unwrap_or_default()
    }

    pub fn goldapi_base_url(&self) -> &str {
        self.providers
            .goldapi
            .as_ref()
            .map_or("https://www.goldapi.io/api", |g| &g.base_url)
    }

    pub fn exchange_base_url(&self) -> &str {
        self.providers
            .exchange
            .as_ref()
            .map_or("https://open.er-api.com", |e| &e.base_url)
    }
}
