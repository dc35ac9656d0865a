//! Configuration management for PaperDash
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default, config/{APP_ENV}, config/local)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Cross-origin policy for the dashboard frontend
    #[serde(default)]
    pub cors: CorsConfig,

    /// Durable rating slot configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Paper fetch configuration
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Chat stub configuration
    #[serde(default)]
    pub chat: ChatConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    /// Allowed origins; `*` allows any
    #[serde(default = "default_cors_origins")]
    pub origins: Vec<String>,

    /// Allowed request methods
    #[serde(default = "default_cors_methods")]
    pub methods: Vec<String>,

    /// Whether browsers may send credentials
    #[serde(default = "default_allow_credentials")]
    pub allow_credentials: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Slot backend: file, memory
    #[serde(default = "default_storage_backend")]
    pub backend: String,

    /// Directory holding slot files
    #[serde(default = "default_storage_dir")]
    pub dir: String,

    /// Slot key of the rating array
    #[serde(default = "default_ratings_key")]
    pub ratings_key: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchConfig {
    /// Paper source: bundled, files, http
    #[serde(default = "default_fetch_source")]
    pub source: String,

    /// Base paper list (path for `files`, URL for `http`)
    pub papers_location: Option<String>,

    /// Enrichment mapping (path for `files`, URL for `http`)
    pub summaries_location: Option<String>,

    /// Simulated latency before every fetch, in milliseconds
    #[serde(default = "default_fetch_delay")]
    pub delay_ms: u64,

    /// Upper bound for a whole fetch, in seconds
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,

    /// `max_results` used when the caller gives none
    #[serde(default = "default_max_results")]
    pub default_max_results: usize,

    /// Largest `max_results` the gateway accepts
    #[serde(default = "default_max_results_limit")]
    pub max_results_limit: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatConfig {
    /// Delay before the canned reply, in milliseconds
    #[serde(default = "default_reply_delay")]
    pub reply_delay_ms: u64,

    /// Reply text of the stub assistant
    #[serde(default = "default_canned_reply")]
    pub canned_reply: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error) or a full EnvFilter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Metrics port (0 to disable)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Service name for logs
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_cors_origins() -> Vec<String> { vec!["http://localhost:3000".to_string()] }
fn default_cors_methods() -> Vec<String> {
    ["GET", "POST", "PUT", "DELETE"].iter().map(|m| m.to_string()).collect()
}
fn default_allow_credentials() -> bool { true }
fn default_storage_backend() -> String { "file".to_string() }
fn default_storage_dir() -> String { ".paperdash".to_string() }
fn default_ratings_key() -> String { crate::ratings::DEFAULT_RATINGS_KEY.to_string() }
fn default_fetch_source() -> String { "bundled".to_string() }
fn default_fetch_delay() -> u64 { 500 }
fn default_fetch_timeout() -> u64 { 10 }
fn default_max_results() -> usize { crate::papers::GRID_SIZE }
fn default_max_results_limit() -> usize { 100 }
fn default_reply_delay() -> u64 { 1000 }
fn default_canned_reply() -> String { crate::chat::CANNED_REPLY.to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_port() -> u16 { 0 }
fn default_service_name() -> String { "paperdash".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: default_cors_origins(),
            methods: default_cors_methods(),
            allow_credentials: default_allow_credentials(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            dir: default_storage_dir(),
            ratings_key: default_ratings_key(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            source: default_fetch_source(),
            papers_location: None,
            summaries_location: None,
            delay_ms: default_fetch_delay(),
            timeout_secs: default_fetch_timeout(),
            default_max_results: default_max_results(),
            max_results_limit: default_max_results_limit(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            reply_delay_ms: default_reply_delay(),
            canned_reply: default_canned_reply(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_port: default_metrics_port(),
            service_name: default_service_name(),
        }
    }
}

/// `APP__` variables; CORS lists are comma separated,
/// e.g. `APP__CORS__ORIGINS=http://a.test,http://b.test`
fn env_source() -> Environment {
    Environment::with_prefix("APP")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("cors.origins")
        .with_list_parse_key("cors.methods")
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))
            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // Load local overrides
            .add_source(File::with_name("config/local").required(false))
            // e.g., APP__FETCH__DELAY_MS=0
            .add_source(env_source())
            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(env_source())
            .build()?;

        config.try_deserialize()
    }

    /// Simulated fetch latency as Duration
    pub fn fetch_delay(&self) -> Duration {
        Duration::from_millis(self.fetch.delay_ms)
    }

    /// Fetch timeout as Duration
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.timeout_secs)
    }

    /// Chat reply delay as Duration
    pub fn chat_reply_delay(&self) -> Duration {
        Duration::from_millis(self.chat.reply_delay_ms)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            cors: CorsConfig::default(),
            storage: StorageConfig::default(),
            fetch: FetchConfig::default(),
            chat: ChatConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.ratings_key, "paperRatings");
        assert_eq!(config.fetch.default_max_results, 10);
        assert_eq!(config.fetch_delay(), Duration::from_millis(500));
        assert_eq!(config.chat_reply_delay(), Duration::from_secs(1));
        assert_eq!(config.cors.origins, vec!["http://localhost:3000"]);
        assert_eq!(config.cors.methods, vec!["GET", "POST", "PUT", "DELETE"]);
        assert!(config.cors.allow_credentials);
    }

    #[test]
    fn test_cors_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[cors]\norigins = [\"https://dash.example.org\", \"*\"]\nallow_credentials = false"
        )
        .unwrap();

        let config = AppConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.cors.origins, vec!["https://dash.example.org", "*"]);
        assert!(!config.cors.allow_credentials);
        assert_eq!(config.cors.methods.len(), 4);
    }

    #[test]
    fn test_from_file_fills_missing_sections() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[fetch]\ndelay_ms = 0\nsource = \"files\"").unwrap();

        let config = AppConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.fetch.delay_ms, 0);
        assert_eq!(config.fetch.source, "files");
        assert_eq!(config.fetch.default_max_results, 10);
        assert_eq!(config.storage.backend, "file");
        assert_eq!(config.server.port, 8080);
    }
}
