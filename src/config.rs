use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CatalogError, Result};

/// Configuration for the catalog client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalog REST API settings
    pub api: ApiConfig,

    /// Bearer token settings
    pub auth: AuthConfig,

    /// Ingestion settings
    pub upload: UploadConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the catalog API, without trailing slash
    pub base_url: String,

    /// Request timeout in seconds (0 = transport default, no timeout)
    pub timeout_seconds: u64,

    /// User agent sent with every request
    pub user_agent: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Fixed bearer token
    pub token: Option<String>,

    /// Environment variable holding the bearer token
    pub token_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Require a video on every episode before a show can be submitted
    pub strict_video_check: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is not set
    pub level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            // Video payloads can be large; keep the default generous.
            timeout_seconds: 300,
            user_agent: format!("catalog-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            strict_video_check: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            auth: AuthConfig {
                token: None,
                token_env: Some("CATALOG_API_TOKEN".to_string()),
            },
            upload: UploadConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the first readable file, falling back to the environment
    pub fn load() -> Result<Self> {
        let config_paths = ["catalog-client.toml", "config/catalog-client.toml"];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str::<Config>(&config_str) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return Ok(config.with_env_overrides());
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Ok(Self::from_env())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&config_str)
            .map_err(|e| CatalogError::Config(format!("{}: {}", path.display(), e)))?;
        tracing::info!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Defaults overridden by environment variables
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("CATALOG_API_URL") {
            self.api.base_url = url;
        }

        if let Ok(token) = std::env::var("CATALOG_API_TOKEN") {
            if !token.trim().is_empty() {
                self.auth.token = Some(token);
            }
        }

        if let Ok(level) = std::env::var("CATALOG_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(timeout) = std::env::var("CATALOG_TIMEOUT_SECONDS") {
            match timeout.parse() {
                Ok(seconds) => self.api.timeout_seconds = seconds,
                Err(_) => tracing::warn!("Ignoring invalid CATALOG_TIMEOUT_SECONDS: {}", timeout),
            }
        }

        self
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)
            .map_err(|e| CatalogError::Config(e.to_string()))?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.api.base_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(CatalogError::Config(format!(
                "base_url must be http(s), got {}",
                url.scheme()
            )));
        }

        if self.logging.level.trim().is_empty() {
            return Err(CatalogError::Config("logging.level must not be empty".to_string()));
        }

        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Catalog Client Configuration:\n\
            - API: {}\n\
            - Timeout: {}s\n\
            - Token: {}\n\
            - Strict video check: {}\n\
            - Log level: {}",
            self.api.base_url,
            self.api.timeout_seconds,
            if self.auth.token.is_some() {
                "configured".to_string()
            } else {
                match &self.auth.token_env {
                    Some(var) => format!("from ${}", var),
                    None => "none".to_string(),
                }
            },
            self.upload.strict_video_check,
            self.logging.level,
        )
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.config.api.timeout_seconds = seconds;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.config.auth.token = Some(token.into());
        self
    }

    pub fn strict_video_check(mut self, strict: bool) -> Self {
        self.config.upload.strict_video_check = strict;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
