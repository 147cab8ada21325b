use std::{env, str::FromStr};

use anyhow::Context;
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    /// Applied to the subtotal by both quote and commit.
    pub tax_rate: Decimal,
    pub request_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|n| n.parse::<u32>().ok())
            .unwrap_or(10);
        let tax_rate = match env::var("TAX_RATE") {
            Ok(raw) => parse_tax_rate(&raw)?,
            Err(_) => default_tax_rate(),
        };
        let request_timeout_secs = env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);
        Ok(Self {
            port,
            database_url,
            host,
            max_connections,
            tax_rate,
            request_timeout_secs,
        })
    }
}

pub fn default_tax_rate() -> Decimal {
    Decimal::new(10, 2)
}

/// Accepts a fraction in `[0, 1)`, e.g. `0.10`.
pub fn parse_tax_rate(raw: &str) -> anyhow::Result<Decimal> {
    let rate = Decimal::from_str(raw.trim()).context("TAX_RATE must be a decimal number")?;
    if rate.is_sign_negative() || rate >= Decimal::ONE {
        anyhow::bail!("TAX_RATE must be between 0 and 1, got {rate}");
    }
    Ok(rate)
}
