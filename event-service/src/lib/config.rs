use std::env;
use std::path::PathBuf;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

/// Headroom on top of the largest image for the other form fields.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub uploads: UploadsConfig,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Mongodb,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    #[serde(default)]
    pub url: String,
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
    #[serde(default)]
    pub cors_origin: Option<String>,
}

impl ServerConfig {
    pub fn cors_origin(&self) -> Option<&str> {
        self.cors_origin
            .as_deref()
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadsConfig {
    pub dir: PathBuf,
    pub allowed_types: String,
    pub max_file_size: usize,
}

impl UploadsConfig {
    /// MIME types from the comma-separated allow-list.
    pub fn allowed_types(&self) -> Vec<String> {
        self.allowed_types
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Largest request body accepted by the HTTP layer.
    pub fn body_limit(&self) -> usize {
        self.max_file_size.saturating_add(FORM_OVERHEAD_BYTES)
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Plain variables of the previous deployment (MONGODB_URI, JWT_SECRET, PORT, ...)
    /// 2. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 3. Environment-specific config file (config/{environment}.toml)
    /// 4. Default config file (config/default.toml)
    /// 5. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .set_default("database.backend", "mongodb")?
            .set_default("database.name", "college_events")?
            .set_default("server.http_port", 3001_i64)?
            .set_default("jwt.expiration_hours", auth::DEFAULT_TOKEN_TTL_HOURS)?
            .set_default("uploads.dir", "uploads")?
            .set_default("uploads.allowed_types", "image/jpeg,image/png,image/gif")?
            .set_default("uploads.max_file_size", 5_i64 * 1024 * 1024)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: DATABASE__URL=mongodb://... overrides database.url
            .add_source(Environment::default().separator("__"))
            .set_override_option("database.url", env::var("MONGODB_URI").ok())?
            .set_override_option("jwt.secret", env::var("JWT_SECRET").ok())?
            .set_override_option("uploads.dir", env::var("UPLOAD_DIR").ok())?
            .set_override_option("uploads.allowed_types", env::var("ALLOWED_FILE_TYPES").ok())?
            .set_override_option("uploads.max_file_size", env::var("MAX_FILE_SIZE").ok())?
            .set_override_option("server.http_port", env::var("PORT").ok())?
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject configurations the service cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.trim().is_empty() {
            return Err(ConfigError::Message(
                "jwt.secret must be set (JWT__SECRET or JWT_SECRET)".to_string(),
            ));
        }

        if self.jwt.expiration_hours <= 0 {
            return Err(ConfigError::Message(
                "jwt.expiration_hours must be positive".to_string(),
            ));
        }

        if self.database.backend == DatabaseBackend::Mongodb && self.database.url.trim().is_empty()
        {
            return Err(ConfigError::Message(
                "database.url must be set for the mongodb backend".to_string(),
            ));
        }

        Ok(())
    }
}
