//! Server settings read from the environment.

use crate::error::ConfigError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_CURRENCY: &str = "USD";

#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Currency label for groups that have no expenses yet.
    pub default_currency: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            default_currency: DEFAULT_CURRENCY.to_owned(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = ServerConfig::default();
        if let Some(host) = lookup("QUICKSPLIT_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("QUICKSPLIT_PORT") {
            config.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                name: "QUICKSPLIT_PORT",
                value: port,
            })?;
        }
        if let Some(currency) = lookup("QUICKSPLIT_DEFAULT_CURRENCY") {
            let currency = currency.trim().to_uppercase();
            if currency.is_empty() {
                return Err(ConfigError::InvalidValue {
                    name: "QUICKSPLIT_DEFAULT_CURRENCY",
                    value: currency,
                });
            }
            config.default_currency = currency;
        }
        Ok(config)
    }
}
