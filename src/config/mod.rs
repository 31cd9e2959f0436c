use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub reaper: ReaperConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
}

// Настройки базы данных
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

// Настройки Redis
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    pub seats_ttl_seconds: u64,
}

// Настройки фоновой сверки броней
#[derive(Debug, Clone, Deserialize)]
pub struct ReaperConfig {
    pub enabled: bool,
    pub interval_seconds: u64,
}

impl ReaperConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    lookup(name).ok_or(ConfigError::Missing(name))
}

fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: &str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    let value = lookup(name).unwrap_or_else(|| default.to_string());
    value.parse().map_err(|_| ConfigError::Invalid { name, expected, value })
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Собирает конфигурацию из произвольного источника переменных.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let interval_seconds: u64 = parsed(&lookup, "REAPER_INTERVAL_SECONDS", "60", "number")?;
        if interval_seconds == 0 {
            return Err(ConfigError::Invalid {
                name: "REAPER_INTERVAL_SECONDS",
                expected: "positive number",
                value: "0".to_string(),
            });
        }

        Ok(Config {
            app: AppConfig {
                host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parsed(&lookup, "PORT", "8000", "number")?,
                rust_log: lookup("RUST_LOG")
                    .unwrap_or_else(|| "seat_hold=debug,tower_http=debug".to_string()),
            },
            database: DatabaseConfig {
                url: required(&lookup, "DATABASE_URL")?,
                pool_size: parsed(&lookup, "DB_POOL_SIZE", "20", "number")?,
            },
            redis: RedisConfig {
                url: required(&lookup, "REDIS_URL")?,
                seats_ttl_seconds: parsed(&lookup, "SEATS_CACHE_TTL_SECONDS", "86400", "number")?,
            },
            reaper: ReaperConfig {
                enabled: parsed(&lookup, "REAPER_ENABLED", "true", "boolean")?,
                interval_seconds,
            },
        })
    }
}
