use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::env;
use std::ops::RangeInclusive;

/// Costs bcrypt accepts when hashing.
pub const BCRYPT_COST_RANGE: RangeInclusive<u32> = 4..=31;

/// One hour up to ten years; also bounds the cookie Max-Age.
pub const SESSION_TTL_HOURS_RANGE: RangeInclusive<i64> = 1..=87_600;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub session_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub static_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://tunr.db?mode=rwc".to_string()),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            session_ttl_hours: env::var("SESSION_TTL_HOURS")
                .unwrap_or_else(|_| "336".to_string())
                .parse()
                .context("SESSION_TTL_HOURS must be a whole number of hours")?,
            bcrypt_cost: env::var("BCRYPT_COST")
                .unwrap_or_else(|_| bcrypt::DEFAULT_COST.to_string())
                .parse()
                .context("BCRYPT_COST must be a number between 4 and 31")?,
            static_dir: env::var("STATIC_DIR")
                .unwrap_or_else(|_| "static".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would otherwise fail at the first signup or login.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            BCRYPT_COST_RANGE.contains(&self.bcrypt_cost),
            "BCRYPT_COST must be a number between 4 and 31, got {}",
            self.bcrypt_cost
        );
        ensure!(
            SESSION_TTL_HOURS_RANGE.contains(&self.session_ttl_hours),
            "SESSION_TTL_HOURS must be between 1 and 87600, got {}",
            self.session_ttl_hours
        );
        Ok(())
    }
}
