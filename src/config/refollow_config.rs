//! Refollow configuration file handling
//!
//! Loads the optional ~/.config/refollow/config.yaml file and layers
//! environment variables on top of it.

use crate::cache::CacheConfig;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Production mode marks the freshness cookie `Secure`
    #[serde(default)]
    pub production: bool,
}

fn default_port() -> u16 {
    3001
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            production: false,
        }
    }
}

/// Upstream provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamSettings {
    /// Base URL of the provider API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Service credential; usually supplied through NEYNAR_API_KEY
    #[serde(default)]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.neynar.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Result cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Seconds a cached result stays servable
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_ttl_secs() -> u64 {
    300
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

/// Creator follow gate settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSettings {
    /// Whether to resolve creators and enforce the gate at all
    #[serde(default = "default_gate_enabled")]
    pub enabled: bool,

    /// Handles every caller must follow
    #[serde(default = "default_creators")]
    pub creators: Vec<String>,
}

fn default_gate_enabled() -> bool {
    true
}

fn default_creators() -> Vec<String> {
    vec!["dwr.eth".to_string(), "v".to_string()]
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            enabled: default_gate_enabled(),
            creators: default_creators(),
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    /// tracing filter directive; `RUST_LOG` takes precedence
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    crate::logging::DEFAULT_FILTER.to_string()
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

/// Refollow configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefollowConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub upstream: UpstreamSettings,

    #[serde(default)]
    pub cache: CacheSettings,

    #[serde(default)]
    pub gate: GateSettings,

    #[serde(default)]
    pub log: LogSettings,
}

impl RefollowConfig {
    /// Create a configuration with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a specific path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(crate::RefollowError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        tracing::info!(path = %path.display(), "Loading refollow configuration");

        let content = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;

        tracing::debug!(
            port = config.server.port,
            ttl_secs = config.cache.ttl_secs,
            creators = config.gate.creators.len(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Load an explicit path, or the default path if it exists, or defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default = Self::default_path();
                if default.exists() {
                    Self::load(&default)
                } else {
                    Ok(Self::new())
                }
            }
        }
    }

    /// Get the default config path (~/.config/refollow/config.yaml)
    pub fn default_path() -> PathBuf {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".config");
        path.push("refollow");
        path.push("config.yaml");
        path
    }

    /// Override settings from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Override settings from `lookup`
    ///
    /// Recognized variables: `NEYNAR_API_KEY`, `NEYNAR_BASE_URL`, `PORT`,
    /// `NODE_ENV`, `REFOLLOW_PRODUCTION`, `REFOLLOW_CACHE_TTL_SECS`,
    /// `REFOLLOW_CREATORS` (comma-separated), `REFOLLOW_GATE_ENABLED`.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(key) = lookup("NEYNAR_API_KEY") {
            self.upstream.api_key = Some(key);
        }
        if let Some(url) = lookup("NEYNAR_BASE_URL") {
            self.upstream.base_url = url;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = parse_var("PORT", &port)?;
        }
        if let Some(env) = lookup("NODE_ENV") {
            self.server.production = env.eq_ignore_ascii_case("production");
        }
        if let Some(flag) = lookup("REFOLLOW_PRODUCTION") {
            self.server.production = parse_bool("REFOLLOW_PRODUCTION", &flag)?;
        }
        if let Some(ttl) = lookup("REFOLLOW_CACHE_TTL_SECS") {
            self.cache.ttl_secs = parse_var("REFOLLOW_CACHE_TTL_SECS", &ttl)?;
        }
        if let Some(creators) = lookup("REFOLLOW_CREATORS") {
            self.gate.creators = creators
                .split(',')
                .map(|h| h.trim().trim_start_matches('@').to_string())
                .filter(|h| !h.is_empty())
                .collect();
        }
        if let Some(flag) = lookup("REFOLLOW_GATE_ENABLED") {
            self.gate.enabled = parse_bool("REFOLLOW_GATE_ENABLED", &flag)?;
        }
        Ok(())
    }

    /// The service credential, or a startup error if it is missing
    pub fn api_key(&self) -> Result<&str> {
        self.upstream
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                crate::RefollowError::Startup(
                    "NEYNAR_API_KEY is not set; refusing to start".to_string(),
                )
            })
    }

    /// Check that the configuration can serve traffic
    pub fn validate(&self) -> Result<()> {
        self.api_key()?;
        if self.upstream.base_url.trim().is_empty() {
            return Err(crate::RefollowError::Config(
                "upstream.base_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Cache configuration derived from these settings
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            ttl: Duration::from_secs(self.cache.ttl_secs),
        }
    }

    /// Socket address string to bind
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        crate::RefollowError::Config(format!("Invalid value for {}: {:?}", name, value))
    })
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(crate::RefollowError::Config(format!(
            "Invalid value for {}: {:?}",
            name, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::NamedTempFile;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RefollowConfig::new();
        assert_eq!(config.server.port, 3001);
        assert!(!config.server.production);
        assert_eq!(config.cache.ttl_secs, 300);
        assert_eq!(config.gate.creators.len(), 2);
        assert!(config.gate.enabled);
        assert_eq!(config.cache_config().ttl, Duration::from_secs(300));
        assert_eq!(config.log.filter, crate::logging::DEFAULT_FILTER);
    }

    #[test]
    fn test_missing_api_key_is_startup_error() {
        let config = RefollowConfig::new();
        assert!(matches!(
            config.validate(),
            Err(crate::RefollowError::Startup(_))
        ));

        let mut blank = RefollowConfig::new();
        blank.upstream.api_key = Some("   ".to_string());
        assert!(blank.api_key().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = RefollowConfig::new();
        config
            .apply_env_with(env(&[
                ("NEYNAR_API_KEY", "abc"),
                ("PORT", "8080"),
                ("NODE_ENV", "production"),
                ("REFOLLOW_CACHE_TTL_SECS", "60"),
                ("REFOLLOW_CREATORS", "@alice, bob ,"),
            ]))
            .unwrap();

        assert_eq!(config.api_key().unwrap(), "abc");
        assert_eq!(config.server.port, 8080);
        assert!(config.server.production);
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.gate.creators, vec!["alice", "bob"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_env_value() {
        let mut config = RefollowConfig::new();
        let result = config.apply_env_with(env(&[("PORT", "not-a-port")]));
        assert!(matches!(result, Err(crate::RefollowError::Config(_))));

        let result = config.apply_env_with(env(&[("REFOLLOW_GATE_ENABLED", "maybe")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_partial_yaml() {
        let file = NamedTempFile::new().unwrap();
        fs::write(
            file.path(),
            "server:\n  port: 4000\ngate:\n  enabled: false\nlog:\n  filter: refollow=debug\n",
        )
        .unwrap();

        let config = RefollowConfig::load(file.path()).unwrap();
        assert_eq!(config.server.port, 4000);
        assert!(!config.gate.enabled);
        assert_eq!(config.log.filter, "refollow=debug");
        // Unspecified sections keep their defaults
        assert_eq!(config.cache.ttl_secs, 300);
        assert_eq!(config.upstream.base_url, "https://api.neynar.com");
    }

    #[test]
    fn test_load_missing_file() {
        let result = RefollowConfig::load("/nonexistent/refollow.yaml");
        assert!(matches!(result, Err(crate::RefollowError::Config(_))));
    }
}
