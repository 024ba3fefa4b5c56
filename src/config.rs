use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;
use crate::downloader::{MediaFormat, Quality};
use crate::errors::{AppError, Result};

/// Resolver endpoints, most stable first.
pub const DEFAULT_PROVIDERS: [&str; 4] = [
    "https://api.server.social/api/json",
    "https://co.wuk.sh/api/json",
    "https://cobalt.cascade.fun/api/json",
    "https://api.cobalt.tools/api/json",
];

pub const DEFAULT_SOCIAL_API: &str = "https://api.fxtwitter.com";
pub const DEFAULT_THUMBNAIL_BASE: &str = "https://img.youtube.com/vi";

const ENV_PREFIX: &str = "UNISTREAM";

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub providers: Vec<String>,
    pub social_api_base: String,
    pub thumbnail_base: String,
    pub provider_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
    pub proxy: Option<String>,
    /// Honor HTTP_PROXY/HTTPS_PROXY from the environment when no proxy is set.
    pub use_system_proxy: bool,
    pub save_dir: PathBuf,
    pub default_format: MediaFormat,
    pub default_quality: Quality,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            providers: DEFAULT_PROVIDERS.iter().map(|p| p.to_string()).collect(),
            social_api_base: DEFAULT_SOCIAL_API.to_string(),
            thumbnail_base: DEFAULT_THUMBNAIL_BASE.to_string(),
            provider_timeout_secs: 20,
            connect_timeout_secs: 15,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            proxy: None,
            use_system_proxy: true,
            save_dir: dirs::download_dir()
                .unwrap_or_else(|| PathBuf::from("./downloads")),
            default_format: MediaFormat::Mp4,
            default_quality: Quality::Best,
        }
    }
}

impl AppConfig {
    /// Defaults, then the user config file if present, then `UNISTREAM_*` variables.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        Self::load_layers(config_path, ENV_PREFIX)
    }

    fn load_layers(config_path: &Path, env_prefix: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(
                config::File::from(config_path)
                    .format(config::FileFormat::Json)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(env_prefix)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("providers"),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(config_dir) = config_path.parent() {
            if !config_dir.exists() {
                std::fs::create_dir_all(config_dir)?;
            }
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AppError::Validation("Could not find config directory".to_string()))?;

        Ok(config_dir.join("unistream").join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        for endpoint in &self.providers {
            let parsed = Url::parse(endpoint)
                .map_err(|e| AppError::Validation(format!("Invalid provider endpoint '{}': {}", endpoint, e)))?;
            if parsed.host_str().is_none() {
                return Err(AppError::Validation(format!("Provider endpoint '{}' has no host", endpoint)));
            }
        }

        Url::parse(&self.social_api_base)
            .map_err(|e| AppError::Validation(format!("Invalid social API base: {}", e)))?;

        if self.provider_timeout_secs == 0 {
            return Err(AppError::Validation("provider_timeout_secs must be greater than zero".to_string()));
        }

        Ok(())
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
