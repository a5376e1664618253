use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::db::{ClassDeletePolicy, StoreSettings};

/// Runtime settings read from the environment (and `.env`)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub bcrypt_cost: u32,
    pub class_delete_policy: ClassDeletePolicy,
    /// When set, the `admin` account is created at startup if missing
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "PORT", 3000).context("Invalid PORT")?;
        let max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)
            .context("Invalid DB_MAX_CONNECTIONS")?;
        let acquire_timeout_secs = parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 3)
            .context("Invalid DB_ACQUIRE_TIMEOUT_SECS")?;
        let bcrypt_cost: u32 = parse_or(&lookup, "BCRYPT_COST", 10).context("Invalid BCRYPT_COST")?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(anyhow!("BCRYPT_COST must be between 4 and 31, got {}", bcrypt_cost));
        }
        let class_delete_policy = match lookup("CLASS_DELETE_POLICY") {
            Some(raw) => raw.parse().map_err(|e: String| anyhow!(e))?,
            None => ClassDeletePolicy::default(),
        };
        let admin_password = lookup("ADMIN_PASSWORD").filter(|p| !p.is_empty());

        Ok(Self {
            database_url,
            host,
            port,
            max_connections,
            acquire_timeout: Duration::from_secs(acquire_timeout_secs),
            bcrypt_cost,
            class_delete_policy,
            admin_password,
        })
    }

    pub fn store_settings(&self) -> StoreSettings {
        StoreSettings {
            bcrypt_cost: self.bcrypt_cost,
            class_delete_policy: self.class_delete_policy,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => Ok(raw.trim().parse::<T>()?),
        None => Ok(default),
    }
}
