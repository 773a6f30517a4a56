//! Application configuration from file and environment variables
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Environment variables (prefixed with MOVIEDB_, sections split by `__`)
//! 2. Config file (config.toml)
//! 3. Default values
//!
//! The database URL and the session signing key may also come from the
//! conventional `DATABASE_URL` and `SECRET_KEY` variables; see the binaries.

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Global application configuration
pub static APP_CONFIG: Lazy<RwLock<AppConfig>> = Lazy::new(|| {
    RwLock::new(AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config file, using defaults: {}", e);
        AppConfig::default()
    }))
});

/// Site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,
    /// Absolute URL prefix used when serializing detail links.
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "MovieDB".to_string(),
            base_url: "http://localhost:8080".to_string(),
        }
    }
}

/// Listener addresses for the two binaries
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Full application (pages + REST sub-API)
    pub bind: String,
    /// Minimal typed API
    pub api_bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            api_bind: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    /// Create missing tables from the entity definitions on start-up.
    pub create_schema: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://moviedb.sqlite3?mode=rwc".to_string(),
            create_schema: true,
        }
    }
}

/// Page sizes and content limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub actors_per_page: u32,
    pub directors_per_page: u32,
    /// Page size of the REST sub-API
    pub api_page_size: u32,
    /// Entries per "top" block on the index page
    pub top_count: u32,
    pub similar_movies: u32,
    pub max_comment_length: u32,
    pub max_message_length: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            actors_per_page: 6,
            directors_per_page: 6,
            api_page_size: 20,
            top_count: 6,
            similar_movies: 3,
            max_comment_length: 5000,
            max_message_length: 5000,
        }
    }
}

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SecurityConfig {
    /// Only send the session cookie over HTTPS
    pub cookie_secure: bool,
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub limits: LimitsConfig,
    pub security: SecurityConfig,
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &str) -> Result<Self, ConfigError> {
        use config::FileFormat;

        let config = Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(File::new(path, FileFormat::Toml).required(false))
            // e.g. MOVIEDB_SITE__NAME, MOVIEDB_LIMITS__ACTORS_PER_PAGE
            .add_source(
                Environment::with_prefix("MOVIEDB")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Reload configuration from file
    pub fn reload() -> Result<(), ConfigError> {
        let new_config = Self::load()?;
        if let Ok(mut config) = APP_CONFIG.write() {
            *config = new_config;
            log::info!("Configuration reloaded");
        }
        Ok(())
    }
}

/// Initialize application configuration
///
/// Triggers the lazy load and logs the result. Call early in start-up.
pub fn init() {
    let config = get_config();
    log::info!("Configuration loaded: site.name = {}", config.site.name);
}

/// Get the current application configuration
pub fn get_config() -> AppConfig {
    APP_CONFIG.read().map(|c| c.clone()).unwrap_or_default()
}

pub fn site() -> SiteConfig {
    get_config().site
}

pub fn server() -> ServerConfig {
    get_config().server
}

pub fn database() -> DatabaseConfig {
    get_config().database
}

pub fn limits() -> LimitsConfig {
    get_config().limits
}

pub fn security() -> SecurityConfig {
    get_config().security
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.site.name, "MovieDB");
        assert_eq!(config.limits.actors_per_page, 6);
        assert_eq!(config.limits.directors_per_page, 6);
        assert_eq!(config.limits.similar_movies, 3);
        assert!(config.database.create_schema);
        assert!(!config.security.cookie_secure);
    }

    #[test]
    #[serial]
    fn test_load_from_toml_file() {
        let mut temp_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[site]
name = "Test Movies"
base_url = "https://movies.example.com"

[database]
url = "postgres://localhost/movies"

[limits]
actors_per_page = 12
"#
        )
        .unwrap();

        let config = AppConfig::load_from_path(temp_file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.site.name, "Test Movies");
        assert_eq!(config.site.base_url, "https://movies.example.com");
        assert_eq!(config.database.url, "postgres://localhost/movies");
        assert_eq!(config.limits.actors_per_page, 12);
        // Unspecified values keep their defaults
        assert_eq!(config.limits.directors_per_page, 6);
        assert_eq!(config.server.api_bind, "0.0.0.0:8000");
    }

    #[test]
    #[serial]
    fn test_missing_config_file_uses_defaults() {
        let config = AppConfig::load_from_path("/nonexistent/config.toml").unwrap();
        assert_eq!(config.site.name, "MovieDB");
        assert_eq!(config.limits.api_page_size, 20);
    }

    #[test]
    #[serial]
    fn test_environment_overrides_file() {
        std::env::set_var("MOVIEDB_LIMITS__DIRECTORS_PER_PAGE", "9");
        let config = AppConfig::load_from_path("/nonexistent/config.toml");
        std::env::remove_var("MOVIEDB_LIMITS__DIRECTORS_PER_PAGE");

        let config = config.unwrap();
        assert_eq!(config.limits.directors_per_page, 9);
        assert_eq!(config.limits.actors_per_page, 6);
    }
}
