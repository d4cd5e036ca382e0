//! Configuration management for Datachat
//!
//! Supports environment variables, config files, and runtime overrides.
//! Credentials are read from the environment (or `.env`) and never written
//! back to disk.
//!
//! Config file location: ~/.config/datachat/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::{DatachatError, Result};

/// Main configuration for Datachat
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Gemini configuration
    #[serde(default)]
    pub gemini: GeminiConfig,
    /// SQL warehouse configuration
    #[serde(default)]
    pub warehouse: WarehouseConfig,
    /// Agent configuration
    #[serde(default)]
    pub agent: AgentConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Gemini API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API key (GOOGLE_API_KEY)
    #[serde(skip_serializing)]
    pub api_key: String,
    /// Model used by the SQL agent
    /// Default: gemini-2.5-flash
    pub model: String,
    /// REST endpoint
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Sampling temperature for agent steps
    pub temperature: f32,
}

/// Databricks SQL warehouse configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WarehouseConfig {
    /// Workspace hostname or URL (DATABRICKS_WORKSPACE)
    pub host: String,
    /// Warehouse HTTP path, e.g. /sql/1.0/warehouses/abc123 (DATABRICKS_SQL_WAREHOUSE)
    pub http_path: String,
    /// Personal access token (DATABRICKS_PAT)
    #[serde(skip_serializing)]
    pub token: String,
    /// Unity Catalog catalog
    /// Default: workspace
    pub catalog: String,
    /// Schema within the catalog
    /// Default: eurostat
    pub schema: String,
    /// Server-side wait for a statement, in seconds (5..=50)
    pub wait_timeout_secs: u64,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
}

/// Agent behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Maximum reasoning loop iterations before stopping
    /// Default: 15
    pub max_iterations: usize,
    /// Row limit the agent is told to apply to its queries
    /// Default: 10
    pub top_k: usize,
    /// Sample rows included with each table schema
    /// Default: 3
    pub sample_rows: usize,
    /// Whether to show debug output
    pub debug: bool,
    /// Greeting that opens every chat session
    pub opening_message: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level or filter directive (DATACHAT_LOG)
    pub level: String,
    /// Emit ANSI colours on stderr
    pub ansi: bool,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: env::var("GOOGLE_API_KEY").unwrap_or_default(),
            model: env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string()),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 120,
            temperature: 0.0,
        }
    }
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            host: env::var("DATABRICKS_WORKSPACE").unwrap_or_default(),
            http_path: env::var("DATABRICKS_SQL_WAREHOUSE").unwrap_or_default(),
            token: env::var("DATABRICKS_PAT").unwrap_or_default(),
            catalog: env::var("DATABRICKS_CATALOG").unwrap_or_else(|_| "workspace".to_string()),
            schema: env::var("DATABRICKS_SCHEMA").unwrap_or_else(|_| "eurostat".to_string()),
            wait_timeout_secs: 30,
            timeout_secs: 90,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 15,
            top_k: 10,
            sample_rows: 3,
            debug: env::var("DATACHAT_DEBUG")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            opening_message: "Hello, I'm a helpful chatbot that can help you to explain the data \
                              in this warehouse. Please, feel free to ask!"
                .to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: env::var("DATACHAT_LOG").unwrap_or_else(|_| "warn".to_string()),
            ansi: true,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("datachat")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > config file > env vars > defaults
    pub fn load() -> Self {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        match Self::load_from(&Self::config_file()) {
            Ok(config) => config,
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file
    ///
    /// Fields missing from the file fall back to their env-aware defaults,
    /// which is also how credentials are filled in.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DatachatError::config("Config file not found"));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| DatachatError::config(format!("Failed to read config: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| DatachatError::config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file();
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save configuration to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| DatachatError::config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| DatachatError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| DatachatError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Check that every credential needed to build the agent is present
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("GOOGLE_API_KEY", self.gemini.api_key.as_str()),
            ("DATABRICKS_WORKSPACE", self.warehouse.host.as_str()),
            ("DATABRICKS_SQL_WAREHOUSE", self.warehouse.http_path.as_str()),
            ("DATABRICKS_PAT", self.warehouse.token.as_str()),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DatachatError::config(format!(
                "missing settings: {}",
                missing.join(", ")
            )))
        }
    }

    /// Generate a default config file content for display
    pub fn default_config_toml() -> String {
        toml::to_string_pretty(&Config::default())
            .unwrap_or_else(|_| String::from("# Error generating config"))
    }
}

impl WarehouseConfig {
    /// Warehouse id, the last segment of the HTTP path
    pub fn warehouse_id(&self) -> &str {
        self.http_path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
    }

    /// Workspace base URL, accepting bare hostnames
    pub fn workspace_url(&self) -> Result<url::Url> {
        let host = self.host.trim().trim_end_matches('/');
        let raw = if host.contains("://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        };

        url::Url::parse(&raw)
            .map_err(|e| DatachatError::config(format!("Invalid workspace host '{}': {}", host, e)))
    }

    /// Fully qualified schema name
    pub fn qualified_schema(&self) -> String {
        format!("{}.{}", self.catalog, self.schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.agent.max_iterations, 15);
        assert_eq!(config.agent.top_k, 10);
        assert_eq!(config.agent.sample_rows, 3);
        assert_eq!(config.warehouse.wait_timeout_secs, 30);
    }

    #[test]
    fn test_warehouse_id_from_http_path() {
        let mut warehouse = WarehouseConfig::default();
        warehouse.http_path = "/sql/1.0/warehouses/abc123".to_string();
        assert_eq!(warehouse.warehouse_id(), "abc123");

        warehouse.http_path = "/sql/1.0/warehouses/abc123/".to_string();
        assert_eq!(warehouse.warehouse_id(), "abc123");
    }

    #[test]
    fn test_workspace_url_accepts_bare_host() {
        let mut warehouse = WarehouseConfig::default();
        warehouse.host = "dbc-1234.cloud.databricks.com".to_string();
        let url = warehouse.workspace_url().unwrap();
        assert_eq!(url.as_str(), "https://dbc-1234.cloud.databricks.com/");

        warehouse.host = "http://localhost:8080/".to_string();
        let url = warehouse.workspace_url().unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/");
    }

    #[test]
    fn test_secrets_not_serialized() {
        let mut config = Config::default();
        config.gemini.api_key = "secret-key".to_string();
        config.warehouse.token = "secret-token".to_string();

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(!toml_str.contains("secret-key"));
        assert!(!toml_str.contains("secret-token"));
        assert!(toml_str.contains("model"));
    }

    #[test]
    fn test_save_and_load_roundtrip_keeps_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.warehouse.schema = "finance".to_string();
        config.agent.max_iterations = 4;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.warehouse.schema, "finance");
        assert_eq!(loaded.agent.max_iterations, 4);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[agent]\ntop_k = 25\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.agent.top_k, 25);
        assert_eq!(loaded.agent.max_iterations, 15);
    }

    #[test]
    fn test_validate_lists_missing_settings() {
        let mut config = Config::default();
        config.gemini.api_key = String::new();
        config.warehouse.host = "host".to_string();
        config.warehouse.http_path = "/sql/1.0/warehouses/x".to_string();
        config.warehouse.token = String::new();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("GOOGLE_API_KEY"));
        assert!(err.contains("DATABRICKS_PAT"));
        assert!(!err.contains("DATABRICKS_WORKSPACE"));
    }
}
