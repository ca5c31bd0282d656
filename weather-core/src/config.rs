use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

use crate::provider::{GEOCODING_URL, OPEN_WEATHER_URL};

fn default_country() -> String {
    "IN".to_string()
}

fn default_weather_url() -> String {
    OPEN_WEATHER_URL.to_string()
}

fn default_geocoding_url() -> String {
    GEOCODING_URL.to_string()
}

fn default_database_url() -> String {
    "sqlite://weather.db".to_string()
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// country = "IN"
/// database_url = "sqlite://weather.db"
/// bind_addr = "127.0.0.1:8080"
/// ```
///
/// Only `api_key` is required; every other field has a default. The provider
/// base URLs are overridable so deployments (and tests) can point the service
/// at a different host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OpenWeather API key, sent as `appid` on every outbound call.
    pub api_key: String,

    /// Country qualifier appended to the postal code on geocoding calls.
    #[serde(default = "default_country")]
    pub country: String,

    /// Base URL of the current-weather endpoint.
    #[serde(default = "default_weather_url")]
    pub weather_url: String,

    /// Base URL of the zip geocoding endpoint.
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,

    /// SQLite database URL backing the cache.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Socket address the HTTP server listens on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Config {
    /// Load config from the platform config directory.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Err(anyhow!(
                "No configuration file found at {}.\n\
                 Hint: create it with at least `api_key = \"<your OpenWeather key>\"`.",
                path.display()
            ));
        }

        Self::load_from(&path)
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-server")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_gets_defaults() {
        let cfg: Config = toml::from_str(r#"api_key = "KEY""#).expect("minimal config must parse");

        assert_eq!(cfg.api_key, "KEY");
        assert_eq!(cfg.country, "IN");
        assert_eq!(cfg.weather_url, OPEN_WEATHER_URL);
        assert_eq!(cfg.geocoding_url, GEOCODING_URL);
        assert_eq!(cfg.database_url, "sqlite://weather.db");
        assert_eq!(cfg.bind_addr, "127.0.0.1:8080");
    }

    #[test]
    fn missing_api_key_fails_to_parse() {
        let err = toml::from_str::<Config>(r#"country = "IN""#).unwrap_err();
        assert!(err.to_string().contains("api_key"));
    }

    #[test]
    fn explicit_values_override_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            api_key = "KEY"
            country = "GB"
            weather_url = "http://localhost:9000/weather"
            bind_addr = "0.0.0.0:3000"
            "#,
        )
        .expect("config must parse");

        assert_eq!(cfg.country, "GB");
        assert_eq!(cfg.weather_url, "http://localhost:9000/weather");
        assert_eq!(cfg.bind_addr, "0.0.0.0:3000");
    }

    #[test]
    fn load_from_reads_a_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_key = \"FILE_KEY\"\n").expect("write config");

        let cfg = Config::load_from(&path).expect("load_from must succeed");
        assert_eq!(cfg.api_key, "FILE_KEY");
    }

    #[test]
    fn load_from_missing_file_errors() {
        let err = Config::load_from(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
