//! Daemon settings for `labhubd`.
//!
//! Read from an optional `labhub.toml` next to the process, then overridden
//! by `LABHUB_*` variables (and `RUST_LOG` for the log filter). Without a
//! signing secret the daemon still serves the open routes.

use std::path::Path;

use serde::Deserialize;

/// Upper bound on issued token lifetimes (one year).
const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Everything `labhubd` needs to start.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the REST API listens.
    pub server: ServerConfig,
    /// Reservation store.
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    /// Access token settings.
    pub auth: AuthConfig,
    /// Uploaded image storage.
    pub uploads: UploadsConfig,
}

/// Listener for the REST API and `/uploads`.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// `SQLite` file holding laboratories, materials and reservations.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// sqlx connection URL, e.g. `sqlite:labhub.db?mode=rwc`.
    pub url: String,
}

/// `tracing` output.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive.
    pub filter: String,
}

/// Bearer token configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret. Privileged routes are closed when unset.
    pub jwt_secret: Option<String>,
    /// Lifetime of tokens issued by `labhubd token`.
    pub token_ttl_secs: u64,
}

/// Upload storage configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct UploadsConfig {
    /// Directory receiving uploaded images, served under `/uploads`.
    pub dir: String,
}

impl Config {
    /// Read `labhub.toml`, apply `LABHUB_*` overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("labhub.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("LABHUB_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("LABHUB_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("LABHUB_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Ok(val) = std::env::var("LABHUB_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("LABHUB_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("LABHUB_JWT_SECRET") {
            self.auth.jwt_secret = Some(val);
        }
        if let Some(ttl) = std::env::var("LABHUB_TOKEN_TTL_SECS")
            .ok()
            .and_then(|val| val.parse().ok())
        {
            self.auth.token_ttl_secs = ttl;
        }
        if let Ok(val) = std::env::var("LABHUB_UPLOADS_DIR") {
            self.uploads.dir = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.auth.token_ttl_secs == 0 || self.auth.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(ConfigError::Validation(format!(
                "token ttl must be between 1 and {MAX_TOKEN_TTL_SECS} seconds"
            )));
        }
        if self.uploads.dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "uploads directory must not be empty".to_string(),
            ));
        }
        if self
            .auth
            .jwt_secret
            .as_deref()
            .is_some_and(|secret| secret.is_empty())
        {
            return Err(ConfigError::Validation(
                "jwt secret must not be empty when set".to_string(),
            ));
        }
        Ok(())
    }

    /// `host:port` handed to the TCP listener.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    #[must_use]
    pub fn uploads_dir(&self) -> &Path {
        Path::new(&self.uploads.dir)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:labhub.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "labhubd=info,labhub=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_secs: 24 * 60 * 60,
        }
    }
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: "uploads".to_string(),
        }
    }
}

/// Why `labhubd` refused to start.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Validation(String),
}
