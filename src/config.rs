//! Runtime configuration, read from the environment at startup.
//!
//! A `.env` file in the working directory is honoured for local development.

use std::{env, net::SocketAddr, path::PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub data_path: PathBuf,
    pub supabase_url: String,
    pub service_role_key: String,
    pub anon_key: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|err| ConfigError::InvalidValue("PORT", err.to_string()))?,
            None => 8080,
        };

        let data_path = lookup("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/study_log.json"));

        let supabase_url = lookup("SUPABASE_URL")
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingVar("SUPABASE_URL"))?;
        let service_role_key = lookup("SUPABASE_SERVICE_ROLE_KEY")
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingVar("SUPABASE_SERVICE_ROLE_KEY"))?;
        let anon_key = lookup("SUPABASE_ANON_KEY").unwrap_or_else(|| service_role_key.clone());

        Ok(Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], port)),
            data_path,
            supabase_url: supabase_url.trim_end_matches('/').to_string(),
            service_role_key,
            anon_key,
        })
    }
}
