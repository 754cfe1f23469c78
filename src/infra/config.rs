// src/infra/config.rs - Configuration loading (TOML + environment)

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::infra::paths;

/// Environment variable that overrides `api.base_url`.
pub const API_URL_ENV: &str = "KUBO_API_URL";

/// Draft offsets are bounded to a week either side of now.
pub const MAX_OFFSET_MINUTES: i64 = 7 * 24 * 60;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub booking: BookingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Per-request timeout. Unset means the HTTP client's default (none).
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.into(),
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Default draft start, relative to now.
    pub start_offset_minutes: i64,
    /// Default draft end, relative to now.
    pub end_offset_minutes: i64,
    /// How long a success status stays visible.
    pub status_clear_secs: u64,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            start_offset_minutes: 30,
            end_offset_minutes: 90,
            status_clear_secs: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
        }
    }
}

impl Config {
    /// Load config from file, falling back to defaults, then apply the environment.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup` (injectable for tests).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.api.base_url = url;
        }
    }

    /// Validate fields that would otherwise fail later in surprising ways.
    pub fn validate(&self) -> anyhow::Result<()> {
        url::Url::parse(&self.api.base_url)
            .map_err(|e| anyhow::anyhow!("invalid api.base_url '{}': {e}", self.api.base_url))?;
        for (name, value) in [
            ("start_offset_minutes", self.booking.start_offset_minutes),
            ("end_offset_minutes", self.booking.end_offset_minutes),
        ] {
            if !(-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&value) {
                anyhow::bail!(
                    "booking.{name} ({value}) must be within {MAX_OFFSET_MINUTES} minutes of now"
                );
            }
        }
        if self.booking.end_offset_minutes <= self.booking.start_offset_minutes {
            anyhow::bail!(
                "booking.end_offset_minutes ({}) must be greater than start_offset_minutes ({})",
                self.booking.end_offset_minutes,
                self.booking.start_offset_minutes
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_reasonable() {
        let c = Config::default();
        assert_eq!(c.api.base_url, "http://localhost:8000");
        assert!(c.api.timeout().is_none());
        assert_eq!(c.booking.start_offset_minutes, 30);
        assert_eq!(c.booking.end_offset_minutes, 90);
        assert_eq!(c.booking.status_clear_secs, 4);
        assert_eq!(c.logging.level, "warn");
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.api.base_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[api]
base_url = "https://pods.example.com"
timeout_secs = 15

[booking]
start_offset_minutes = 10
end_offset_minutes = 70
status_clear_secs = 2

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.base_url, "https://pods.example.com");
        assert_eq!(config.api.timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.booking.start_offset_minutes, 10);
        assert_eq!(config.booking.status_clear_secs, 2);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_env_overrides_base_url() {
        let mut config = Config::default();
        config.apply_env(|key| (key == API_URL_ENV).then(|| "http://10.0.0.5:9000".to_string()));
        assert_eq!(config.api.base_url, "http://10.0.0.5:9000");
    }

    #[test]
    fn test_blank_env_is_ignored() {
        let mut config = Config::default();
        config.apply_env(|_| Some("   ".to_string()));
        assert_eq!(config.api.base_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_validate_rejects_inverted_window() {
        let mut config = Config::default();
        config.booking.end_offset_minutes = 30;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = Config::default();
        config.api.base_url = "not a url".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nbase_url = \"http://127.0.0.1:8123\"").unwrap();
        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.api.base_url, "http://127.0.0.1:8123");
        assert_eq!(config.booking.end_offset_minutes, 90);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_huge_offsets() {
        let mut config = Config::default();
        config.booking.end_offset_minutes = i64::MAX;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.booking.start_offset_minutes = -MAX_OFFSET_MINUTES - 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.booking.end_offset_minutes = MAX_OFFSET_MINUTES;
        assert!(config.validate().is_ok());
    }
}
