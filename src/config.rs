// Service configuration loaded from the environment (optionally via a .env file)
use crate::provider::{ClientConfig, Credentials, ProviderEnvironment};
use thiserror::Error;

pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // None when either half is unset; searches then fail with a configuration error
    pub credentials: Option<Credentials>,
    pub environment: ProviderEnvironment,
    pub allowed_origins: Vec<String>,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            credentials: None,
            environment: ProviderEnvironment::Test,
            allowed_origins: parse_origins(DEFAULT_ALLOWED_ORIGINS),
            port: DEFAULT_PORT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = Credentials::from_parts(
            lookup("AMADEUS_CLIENT_ID"),
            lookup("AMADEUS_CLIENT_SECRET"),
        );

        let environment = lookup("AMADEUS_ENV")
            .map(|value| ProviderEnvironment::parse(&value))
            .unwrap_or_default();

        let allowed_origins = parse_origins(
            lookup("ALLOWED_ORIGINS")
                .as_deref()
                .unwrap_or(DEFAULT_ALLOWED_ORIGINS),
        );

        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidValue {
                    name: "PORT",
                    value: value.clone(),
                })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            credentials,
            environment,
            allowed_origins,
            port,
        })
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::for_environment(self.environment)
    }
}

pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
