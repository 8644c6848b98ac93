//! Configuration from the environment

use std::net::SocketAddr;

use anyhow::Result;

use crate::utils::env_flag;
use crate::utils::env_var;
use crate::utils::env_var_or_else;

const DEFAULT_ADDRESS: &str = "0.0.0.0:6000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ENVIRONMENT: &str = "development";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5000,http://localhost:5173";

/// Service configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Address to listen on
    pub address: SocketAddr,

    /// Postgres connection string, the memory storage is used without one
    pub database_url: Option<String>,

    /// Size of the Postgres connection pool
    pub max_connections: u32,

    /// Seed the default stations in an empty storage
    pub seed_stations: bool,

    /// Origins allowed to make cross-origin requests
    pub cors_origins: Vec<String>,

    /// Name of the environment, like `development` or `production`
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 6000))),
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            seed_stations: false,
            cors_origins: parse_origins(DEFAULT_CORS_ORIGINS),
            environment: DEFAULT_ENVIRONMENT.to_string(),
        }
    }
}

impl Config {
    /// Read the configuration from the environment
    ///
    /// # Errors
    ///
    /// Will return `Err` when the address, port or pool size can not be parsed
    pub fn from_env() -> Result<Self> {
        let mut address = env_var_or_else("ADDRESS", || String::from(DEFAULT_ADDRESS))
            .parse::<SocketAddr>()?;

        // optional override of just the port
        if let Some(port) = env_var("PORT") {
            address.set_port(port.parse::<u16>()?);
        }

        let max_connections = env_var("DATABASE_MAX_CONNECTIONS")
            .map(|max_connections| max_connections.parse::<u32>())
            .transpose()?
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);

        let cors_origins = parse_origins(&env_var_or_else("CORS_ORIGINS", || {
            String::from(DEFAULT_CORS_ORIGINS)
        }));

        Ok(Self {
            address,
            database_url: env_var("DATABASE_URL"),
            max_connections,
            seed_stations: env_flag("SEED_STATIONS"),
            cors_origins,
            environment: env_var_or_else("APP_ENV", || String::from(DEFAULT_ENVIRONMENT)),
        })
    }
}

/// Split a comma separated list of origins
fn parse_origins(origins: &str) -> Vec<String> {
    origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            vec!["http://localhost:3000", "https://example.com"],
            parse_origins(" http://localhost:3000 ,, https://example.com,")
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_default() {
        let config = Config::default();

        assert_eq!(6000, config.address.port());
        assert!(config.database_url.is_none());
        assert!(!config.seed_stations);
        assert_eq!(3, config.cors_origins.len());
    }
}
