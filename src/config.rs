//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration file (config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;
use std::{net::IpAddr, path::PathBuf};

/// Default template for the custom post content option
pub const DEFAULT_CUSTOM_POST_CONTENT: &str =
    "<p><strong>%title%</strong></p>\n\n%content%\n\n<p>%hashtags%</p>\n\n<p>%shortlink%</p>";

/// Default allow-list for the allowed HTML option
pub const DEFAULT_ALLOWED_HTML: &str = "<strong><a><p><ul><ol><li><code><blockquote><pre><img>";

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 8080)
    pub port: u16,
    /// Public domain (e.g., "blog.example.com")
    pub domain: String,
    /// Protocol ("http" or "https")
    pub protocol: String,
}

impl ServerConfig {
    /// Get the base URL for the instance
    ///
    /// # Returns
    /// Full URL like "https://blog.example.com"
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.protocol, self.domain)
    }
}

/// Database configuration (SQLite only)
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub path: PathBuf,
}

/// Session token configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Session secret key (32+ bytes)
    pub session_secret: String,
    /// Longest session lifetime accepted, in seconds (default: 604800 = 7 days)
    pub session_max_age: i64,
}

/// Site-level defaults for options whose default is host-provided
#[derive(Debug, Clone, Deserialize)]
pub struct DefaultsConfig {
    /// Default for `activitypub_custom_post_content`
    #[serde(default = "default_custom_post_content")]
    pub custom_post_content: String,
    /// Default for `activitypub_allowed_html`
    #[serde(default = "default_allowed_html")]
    pub allowed_html: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            custom_post_content: default_custom_post_content(),
            allowed_html: default_allowed_html(),
        }
    }
}

fn default_custom_post_content() -> String {
    DEFAULT_CUSTOM_POST_CONTENT.to_string()
}

fn default_allowed_html() -> String {
    DEFAULT_ALLOWED_HTML.to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (ACTIVITYPUB_SETTINGS__*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.protocol", "http")?
            .set_default("database.path", "data/activitypub-settings.db")?
            .set_default("auth.session_max_age", 604800)?
            .set_default("defaults.custom_post_content", DEFAULT_CUSTOM_POST_CONTENT)?
            .set_default("defaults.allowed_html", DEFAULT_ALLOWED_HTML)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // Load from config/default.toml if it exists
            .add_source(File::with_name("config/default").required(false))
            // Load from config/local.toml if it exists (overrides default)
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables (ACTIVITYPUB_SETTINGS__*)
            .add_source(
                Environment::with_prefix("ACTIVITYPUB_SETTINGS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    pub(crate) fn validate(&self) -> Result<(), crate::error::AppError> {
        const MIN_SESSION_SECRET_BYTES: usize = 32;

        if self.auth.session_secret.as_bytes().len() < MIN_SESSION_SECRET_BYTES {
            return Err(crate::error::AppError::Config(format!(
                "auth.session_secret must be at least {} bytes",
                MIN_SESSION_SECRET_BYTES
            )));
        }

        if self.auth.session_max_age <= 0 {
            return Err(crate::error::AppError::Config(
                "auth.session_max_age must be greater than 0".to_string(),
            ));
        }

        if !self.server.protocol.eq_ignore_ascii_case("https") {
            if !is_local_server_domain(&self.server.domain) {
                return Err(crate::error::AppError::Config(
                    "server.protocol must be https for non-local server domains".to_string(),
                ));
            }
            tracing::warn!(
                host = %normalized_server_host(&self.server.domain),
                protocol = %self.server.protocol,
                "Serving session tokens over plain http for local development"
            );
        }

        Ok(())
    }
}

fn normalized_server_host(domain: &str) -> String {
    let trimmed = domain.trim();
    let parsed_host = url::Url::parse(&format!("http://{trimmed}"))
        .ok()
        .and_then(|url| url.host_str().map(|host| host.to_string()));
    let host = parsed_host.unwrap_or_else(|| trimmed.to_string());
    host.trim_end_matches('.').to_ascii_lowercase()
}

fn is_local_server_domain(domain: &str) -> bool {
    let host = normalized_server_host(domain);
    if host == "localhost" || host.ends_with(".localhost") {
        return true;
    }

    if let Ok(ip) = host.parse::<IpAddr>() {
        return ip.is_loopback() || ip.is_unspecified();
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                domain: "localhost".to_string(),
                protocol: "http".to_string(),
            },
            database: DatabaseConfig {
                path: PathBuf::from("/tmp/activitypub-settings-test.db"),
            },
            auth: AuthConfig {
                session_secret: "x".repeat(32),
                session_max_age: 604_800,
            },
            defaults: DefaultsConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }

    #[test]
    fn validate_accepts_http_on_localhost() {
        let config = valid_config();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_short_session_secret() {
        let mut config = valid_config();
        config.auth.session_secret = "short-secret".to_string();

        let error = config
            .validate()
            .expect_err("session secret shorter than 32 bytes must fail");
        assert!(matches!(
            error,
            crate::error::AppError::Config(message)
                if message.contains("auth.session_secret")
        ));
    }

    #[test]
    fn validate_rejects_http_for_non_local_domain() {
        let mut config = valid_config();
        config.server.domain = "blog.example.com".to_string();
        config.server.protocol = "http".to_string();

        let error = config
            .validate()
            .expect_err("public domains must require https");
        assert!(matches!(
            error,
            crate::error::AppError::Config(message)
                if message.contains("server.protocol must be https")
        ));
    }

    #[test]
    fn validate_rejects_non_positive_session_max_age() {
        let mut config = valid_config();
        config.auth.session_max_age = 0;

        assert!(matches!(
            config.validate(),
            Err(crate::error::AppError::Config(message))
                if message.contains("auth.session_max_age")
        ));
    }

    #[test]
    fn defaults_section_is_optional() {
        let defaults: DefaultsConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(defaults.custom_post_content, DEFAULT_CUSTOM_POST_CONTENT);
        assert_eq!(defaults.allowed_html, DEFAULT_ALLOWED_HTML);
    }
}
