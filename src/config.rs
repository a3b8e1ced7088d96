//! Runtime configuration loaded from the environment (and `.env` if present).

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

use crate::calendar::ReferenceZone;
use crate::pricing::services::MAX_HORIZON_MONTHS;

/// Asia/Jakarta, UTC+07:00 with no daylight saving.
const DEFAULT_UTC_OFFSET_MINUTES: i32 = 7 * 60;

pub const DEFAULT_HORIZON_MONTHS: u32 = 6;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub database_max_connections: u32,
    pub reference_zone: ReferenceZone,
    pub horizon_months: u32,
    pub pricing_cache_ttl: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let bind_addr = parse_var("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?;
        let database_max_connections = parse_var("DATABASE_MAX_CONNECTIONS", 5u32)?;
        let offset_minutes = parse_var("REFERENCE_UTC_OFFSET_MINUTES", DEFAULT_UTC_OFFSET_MINUTES)?;
        let reference_zone = ReferenceZone::from_offset_minutes(offset_minutes)
            .with_context(|| format!("REFERENCE_UTC_OFFSET_MINUTES out of range: {offset_minutes}"))?;
        let horizon_months = parse_var("AVAILABILITY_HORIZON_MONTHS", DEFAULT_HORIZON_MONTHS)?;
        ensure_horizon_months(horizon_months)?;
        let cache_ttl_secs = parse_var("PRICING_CACHE_TTL_SECS", 600u64)?;

        Ok(Self {
            database_url,
            bind_addr,
            database_max_connections,
            reference_zone,
            horizon_months,
            pricing_cache_ttl: Duration::from_secs(cache_ttl_secs),
        })
    }
}

fn ensure_horizon_months(months: u32) -> anyhow::Result<()> {
    if !(1..=MAX_HORIZON_MONTHS).contains(&months) {
        anyhow::bail!(
            "AVAILABILITY_HORIZON_MONTHS must be between 1 and {MAX_HORIZON_MONTHS}, got {months}"
        );
    }
    Ok(())
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {name}: {raw:?}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var_falls_back_to_default() {
        let value = parse_var("ROOMRATE_TEST_UNSET_VAR", 42u32).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_parse_var_reads_and_trims() {
        env::set_var("ROOMRATE_TEST_MONTHS", " 12 ");
        let value = parse_var("ROOMRATE_TEST_MONTHS", DEFAULT_HORIZON_MONTHS).unwrap();
        assert_eq!(value, 12);
    }

    #[test]
    fn test_horizon_months_bounds() {
        assert!(ensure_horizon_months(DEFAULT_HORIZON_MONTHS).is_ok());
        assert!(ensure_horizon_months(1).is_ok());
        assert!(ensure_horizon_months(MAX_HORIZON_MONTHS).is_ok());

        let err = ensure_horizon_months(0).unwrap_err();
        assert!(err.to_string().contains("AVAILABILITY_HORIZON_MONTHS"));
        assert!(ensure_horizon_months(99).is_err());
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        env::set_var("ROOMRATE_TEST_BAD_ADDR", "not-an-addr");
        let err = parse_var("ROOMRATE_TEST_BAD_ADDR", SocketAddr::from(([127, 0, 0, 1], 80)))
            .unwrap_err();
        assert!(err.to_string().contains("ROOMRATE_TEST_BAD_ADDR"));
    }
}
