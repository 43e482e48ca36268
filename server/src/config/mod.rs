use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";
const DEFAULT_DATABASE_URL: &str = "postgres://localhost/events";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_TABLE: &str = "events";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres,
    Dynamo,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "postgres" => Ok(StoreBackend::Postgres),
            "dynamo" | "dynamodb" => Ok(StoreBackend::Dynamo),
            _ => Err(ConfigError::Invalid {
                name: "STORE_BACKEND",
                value: s.to_string(),
            }),
        }
    }
}

/// Settings fixed at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub store_backend: StoreBackend,
    pub database_url: String,
    pub max_connections: u32,
    pub table_name: String,
    pub region: Option<String>,
    pub dynamo_endpoint: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Self {
            bind_addr: parse_var(&var, "BIND_ADDR", DEFAULT_BIND_ADDR)?,
            store_backend: parse_var(&var, "STORE_BACKEND", "memory")?,
            database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            max_connections: match var("DATABASE_MAX_CONNECTIONS") {
                Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                    name: "DATABASE_MAX_CONNECTIONS",
                    value: raw,
                })?,
                None => DEFAULT_MAX_CONNECTIONS,
            },
            table_name: var("EVENTS_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            region: var("AWS_REGION"),
            dynamo_endpoint: var("DYNAMO_ENDPOINT_URL"),
        })
    }
}

fn parse_var<T, F>(var: &F, name: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = var(name).unwrap_or_else(|| default.to_string());
    raw.trim().parse().map_err(|_| ConfigError::Invalid { name, value: raw })
}
