//! Daemon settings for `freightd`.
//!
//! Values come from an optional `freightd.toml` in the working directory,
//! then from `FREIGHTD_*` variables, which win over the file. `RUST_LOG`
//! wins over both for the log filter.

use serde::Deserialize;

/// Everything `freightd` reads at startup, one table per TOML section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub events: EventsConfig,
}

/// Where the REST API listens. Defaults to every interface on port 8000.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Freight terminal store.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// sqlx URL of the store, created on first start with `mode=rwc`.
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directives, such as
    /// `freight_terminal=debug`.
    pub filter: String,
}

/// Terminal events fan-out.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Freight and service events a listener may fall behind by before it
    /// starts missing them.
    pub capacity: usize,
}

impl Config {
    /// Read `freightd.toml`, layer the environment on top and check the
    /// result.
    ///
    /// # Errors
    ///
    /// Fails on an unreadable or malformed `freightd.toml`, or when a port,
    /// pool size or event capacity ends up zero.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("freightd.toml")?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
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

    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("FREIGHTD_HOST") {
            self.server.host = val;
        }
        if let Some(port) = var("FREIGHTD_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = var("FREIGHTD_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Some(val) = var("FREIGHTD_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = var("FREIGHTD_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.events.capacity == 0 {
            return Err(ConfigError::Validation(
                "event capacity must be non-zero".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Validation(
                "max_connections must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Listener address handed to `TcpListener::bind`.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:freight.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "freightd=info,freight_terminal=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

/// Why `freightd` refused to start.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse freightd.toml")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read freightd.toml")]
    Io(#[from] std::io::Error),
    /// A value parsed but cannot run the terminal.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
