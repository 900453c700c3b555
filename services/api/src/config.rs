//! Server configuration

use anyhow::Result;
use config::{Config, Environment};
use serde::Deserialize;

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Fixed listening port
    pub port: u16,
    /// Origin allowed by CORS; any origin when unset
    #[serde(default)]
    pub cors_origin: Option<String>,
}

impl ServerConfig {
    /// Load the server configuration
    ///
    /// # Environment Variables
    /// - `SERVER_HOST`: Interface to bind (default: "0.0.0.0")
    /// - `SERVER_PORT`: Listening port (default: 5000)
    /// - `SERVER_CORS_ORIGIN`: Allowed browser origin (default: any)
    pub fn from_env() -> Result<Self> {
        let settings = Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 5000_i64)?
            .add_source(Environment::with_prefix("SERVER").try_parsing(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// `host:port` string to bind
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
