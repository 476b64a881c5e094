use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub api_prefix: String,
    pub db_max_connections: u32,

    /// Create tables and run the defensive migrations on startup
    pub db_auto_migrate: bool,
    /// Insert the default departments, sample employees and welcome announcement
    pub db_seed: bool,

    // Rate limiting
    pub rate_api_per_min: u32,

    // Logging
    pub log_dir: String,
    pub log_level: tracing::Level,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").context("SERVER_ADDR must be set")?,
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 10)?,
            db_auto_migrate: parse_or("DB_AUTO_MIGRATE", true)?,
            db_seed: parse_or("DB_SEED", false)?,
            rate_api_per_min: parse_or("RATE_API_PER_MIN", 1000)?,
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            log_level: parse_or("LOG_LEVEL", tracing::Level::DEBUG)?,
        })
    }
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{key} has an invalid value {raw:?}: {e}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_falls_back_to_default() {
        let value: u32 = parse_or("EMS_TEST_KEY_THAT_IS_NEVER_SET", 42).unwrap();
        assert_eq!(value, 42);
    }
}
