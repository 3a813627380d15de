//! # Configuration
//!
//! Application configuration, built once at startup and passed down
//! explicitly (through [`crate::api::AppState`] for the server).
//!
//! ## Sources (later wins)
//!
//! 1. Built-in defaults
//! 2. TOML file given by `--config` or `MIS_CONFIG`
//! 3. Environment overrides:
//!    - `MIS_HOST`, `MIS_PORT`
//!    - `MIS_CORS_ORIGINS`: comma-separated origins, or "*" for all
//!    - `MIS_RATE_LIMIT`: requests per second (0 disables)
//!    - `MIS_API_KEY`: if set, requires Bearer token authentication
//!
//! ## Example
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 5000
//!
//! [security]
//! cors_origins = ["https://schoolmis.edu.gh"]
//! rate_limit = 50
//!
//! [promotion]
//! promoted_min_average = 50
//! promoted_max_failed = 2
//! conditional_min_average = 40
//! conditional_max_failed = 3
//! ```

use mis_core::{MisError, PromotionPolicy, Score};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default bind host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default bind port.
pub const DEFAULT_PORT: u16 = 5000;

/// Default rate limit: 100 requests per second.
pub const DEFAULT_RATE_LIMIT: u32 = 100;

/// Maximum size of a configuration file (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// SECTIONS
// =============================================================================

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// `host:port` for binding.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `[security]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecurityConfig {
    /// Allowed CORS origins. `None` means localhost only; `["*"]` allows all.
    pub cors_origins: Option<Vec<String>>,
    /// Requests per second; 0 disables rate limiting.
    pub rate_limit: u32,
    /// Bearer API key; `None` or empty disables authentication.
    pub api_key: Option<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            cors_origins: None,
            rate_limit: DEFAULT_RATE_LIMIT,
            api_key: None,
        }
    }
}

/// `[promotion]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PromotionConfig {
    pub promoted_min_average: Score,
    pub promoted_max_failed: u32,
    pub conditional_min_average: Score,
    pub conditional_max_failed: u32,
}

impl Default for PromotionConfig {
    fn default() -> Self {
        let policy = PromotionPolicy::default();
        Self {
            promoted_min_average: policy.promoted_min_average(),
            promoted_max_failed: policy.promoted_max_failed(),
            conditional_min_average: policy.conditional_min_average(),
            conditional_max_failed: policy.conditional_max_failed(),
        }
    }
}

impl PromotionConfig {
    /// Build the validated policy these thresholds describe.
    pub fn to_policy(&self) -> Result<PromotionPolicy, MisError> {
        PromotionPolicy::with_thresholds(
            self.promoted_min_average,
            self.promoted_max_failed,
            self.conditional_min_average,
            self.conditional_max_failed,
        )
    }
}

// =============================================================================
// APP CONFIG
// =============================================================================

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub promotion: PromotionConfig,
}

impl AppConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, MisError> {
        let config: AppConfig =
            toml::from_str(text).map_err(|e| MisError::ConfigError(e.to_string()))?;
        config.promotion.to_policy()?;
        Ok(config)
    }

    /// Load configuration from `path` (or `MIS_CONFIG`), then apply
    /// environment overrides.
    ///
    /// A path that was asked for explicitly must exist; with no path at all
    /// the defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self, MisError> {
        let path: Option<PathBuf> = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("MIS_CONFIG").ok().map(PathBuf::from));

        let mut config = match path {
            Some(path) => {
                tracing::info!("Loading configuration from {:?}", path);
                Self::from_file(&path)?
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, MisError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            MisError::ConfigError(format!("Cannot read {}: {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(MisError::ConfigError(format!(
                "Config file size {} bytes exceeds maximum {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let text = std::fs::read_to_string(path)
            .map_err(|e| MisError::IoError(format!("Read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Apply `MIS_*` overrides from `lookup`.
    ///
    /// `lookup` is the environment in production; tests pass a closure.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), MisError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("MIS_HOST").filter(|h| !h.trim().is_empty()) {
            self.server.host = host.trim().to_string();
        }

        if let Some(port) = lookup("MIS_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| MisError::ConfigError(format!("Invalid MIS_PORT: {:?}", port)))?;
        }

        if let Some(origins) = lookup("MIS_CORS_ORIGINS") {
            let parsed: Vec<String> = origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            self.security.cors_origins = Some(parsed);
        }

        if let Some(rate) = lookup("MIS_RATE_LIMIT") {
            match rate.trim().parse() {
                Ok(value) => self.security.rate_limit = value,
                Err(_) => {
                    tracing::warn!(
                        "Ignoring invalid MIS_RATE_LIMIT {:?}, keeping {}",
                        rate,
                        self.security.rate_limit
                    );
                }
            }
        }

        if let Some(key) = lookup("MIS_API_KEY") {
            self.security.api_key = Some(key);
        }

        Ok(())
    }

    /// The configured API key, if authentication is enabled.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.security
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
    }

    /// The promotion policy for this deployment.
    pub fn policy(&self) -> Result<PromotionPolicy, MisError> {
        self.promotion.to_policy()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind_addr(), "127.0.0.1:5000");
        assert_eq!(config.security.rate_limit, 100);
        assert!(config.api_key().is_none());
        assert_eq!(config.policy().expect("policy"), PromotionPolicy::default());
    }

    #[test]
    fn parses_partial_toml() {
        let config = AppConfig::from_toml_str(
            r#"
            [server]
            port = 8080

            [promotion]
            promoted_min_average = 55.5
            "#,
        )
        .expect("parse");

        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.promotion.promoted_min_average.hundredths(), 5550);
        assert_eq!(config.promotion.conditional_max_failed, 3);
    }

    #[test]
    fn rejects_contradictory_policy() {
        let result = AppConfig::from_toml_str(
            r#"
            [promotion]
            promoted_min_average = 40
            conditional_min_average = 60
            "#,
        );
        assert!(matches!(result, Err(MisError::InvalidPolicy(_))));
    }

    #[test]
    fn rejects_unknown_keys_and_bad_scores() {
        assert!(matches!(
            AppConfig::from_toml_str("[server]\nprot = 1\n"),
            Err(MisError::ConfigError(_))
        ));
        assert!(matches!(
            AppConfig::from_toml_str("[promotion]\npromoted_min_average = 120\n"),
            Err(MisError::ConfigError(_))
        ));
    }

    #[test]
    fn env_overrides_win() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(env(&[
                ("MIS_HOST", "0.0.0.0"),
                ("MIS_PORT", "9000"),
                ("MIS_CORS_ORIGINS", "http://a.example, http://b.example,"),
                ("MIS_RATE_LIMIT", "0"),
                ("MIS_API_KEY", "secret"),
            ]))
            .expect("overrides");

        assert_eq!(config.server.bind_addr(), "0.0.0.0:9000");
        assert_eq!(
            config.security.cors_origins,
            Some(vec![
                "http://a.example".to_string(),
                "http://b.example".to_string()
            ])
        );
        assert_eq!(config.security.rate_limit, 0);
        assert_eq!(config.api_key(), Some("secret"));
    }

    #[test]
    fn bad_port_override_is_an_error() {
        let mut config = AppConfig::default();
        assert!(config.apply_overrides(env(&[("MIS_PORT", "http")])).is_err());
    }

    #[test]
    fn empty_api_key_disables_auth() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(env(&[("MIS_API_KEY", "")]))
            .expect("overrides");
        assert!(config.api_key().is_none());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("mis.toml");
        std::fs::write(&path, "[security]\nrate_limit = 7\n").expect("write");

        let config = AppConfig::from_file(&path).expect("load");
        assert_eq!(config.security.rate_limit, 7);

        assert!(AppConfig::from_file(&dir.path().join("missing.toml")).is_err());
    }
}
