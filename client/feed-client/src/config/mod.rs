use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::time::Duration;

use crate::theme::ColorScheme;

const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Feed API
    pub api_base_url: String,
    pub request_timeout_secs: u64,

    // Author attached to posts from this device
    pub author_name: String,

    // Realtime refresh channel
    pub realtime_enabled: bool,
    pub realtime_url: String,
    pub realtime_channel: String,

    // Presentation
    pub color_scheme: ColorScheme,

    // Observability
    pub error_log_path: String,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .set_default("api_base_url", "http://10.0.2.2:8080")? // Android emulator host loopback
            .set_default("request_timeout_secs", 10)?
            .set_default("author_name", "Anonymous")?
            .set_default("realtime_enabled", false)?
            .set_default("realtime_url", "ws://localhost:8000/connection/websocket")?
            .set_default("realtime_channel", "feed")?
            .set_default("color_scheme", "light")?
            .set_default("error_log_path", "error-log.txt")?
            .set_default("log_level", "info")?
            .add_source(config::Environment::with_prefix("ECHO").try_parsing(true))
            .build()?;

        config.try_deserialize()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(anyhow!(
                "API base URL must start with http:// or https://, got {}",
                self.api_base_url
            ));
        }

        if self.request_timeout_secs == 0 || self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(anyhow!(
                "Request timeout must be between 1 and {} seconds",
                MAX_REQUEST_TIMEOUT_SECS
            ));
        }

        if self.author_name.trim().is_empty() {
            return Err(anyhow!("Author name is required"));
        }

        if self.realtime_enabled {
            if !(self.realtime_url.starts_with("ws://") || self.realtime_url.starts_with("wss://"))
            {
                return Err(anyhow!("Realtime URL must start with ws:// or wss://"));
            }

            if self.realtime_channel.is_empty() {
                return Err(anyhow!("Realtime channel is required when realtime is enabled"));
            }
        }

        if self.error_log_path.is_empty() {
            return Err(anyhow!("Error log path is required"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn test_config() -> Config {
        Config {
            api_base_url: "http://localhost:8080".to_string(),
            request_timeout_secs: 10,
            author_name: "Anonymous".to_string(),
            realtime_enabled: false,
            realtime_url: "ws://localhost:8000/connection/websocket".to_string(),
            realtime_channel: "feed".to_string(),
            color_scheme: ColorScheme::Light,
            error_log_path: "error-log.txt".to_string(),
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_invalid_base_url() {
        let mut config = test_config();
        config.api_base_url = "localhost:8080".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_timeout() {
        let mut config = test_config();
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        config.request_timeout_secs = 301;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_realtime_url_checked_only_when_enabled() {
        let mut config = test_config();
        config.realtime_url = "http://localhost:8000".to_string();
        assert!(config.validate().is_ok());

        config.realtime_enabled = true;
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        std::env::remove_var("ECHO_API_BASE_URL");
        std::env::remove_var("ECHO_REALTIME_ENABLED");

        let config = Config::from_env().expect("Failed to load config");

        assert_eq!(config.api_base_url, "http://10.0.2.2:8080");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert!(!config.realtime_enabled);
        assert_eq!(config.realtime_channel, "feed");
    }

    #[test]
    #[serial]
    fn test_color_scheme_from_env_ignores_case() {
        std::env::set_var("ECHO_COLOR_SCHEME", "Dark");
        let dark = Config::from_env();

        std::env::set_var("ECHO_COLOR_SCHEME", "sepia");
        let unknown = Config::from_env();

        std::env::remove_var("ECHO_COLOR_SCHEME");

        assert_eq!(dark.expect("Failed to load config").color_scheme, ColorScheme::Dark);
        assert!(unknown.is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        std::env::set_var("ECHO_API_BASE_URL", "http://192.168.1.20:8080");
        std::env::set_var("ECHO_REALTIME_ENABLED", "true");

        let config = Config::from_env().expect("Failed to load config");

        std::env::remove_var("ECHO_API_BASE_URL");
        std::env::remove_var("ECHO_REALTIME_ENABLED");

        assert_eq!(config.api_base_url, "http://192.168.1.20:8080");
        assert!(config.realtime_enabled);
    }
}
