//! Configuration module
//!
//! [`AppConfig`] is read from a TOML file. Every value is optional; market
//! settings that are missing are reported and replaced by their defaults
//! when resolved into a [`MarketConfig`].

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::domain::TariffSpecification;

pub const DEFAULT_PUBLICATION_INTERVAL: u32 = 6;
pub const MAX_PUBLICATION_INTERVAL: u32 = 24;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub market: MarketSettings,
    pub simulation: SimulationConfig,
    pub logging: LoggingConfig,
    /// Installed as per-power-type defaults at startup
    pub default_tariffs: Vec<TariffSpecification>,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}

/// `<config dir>/tariff-market/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tariff-market")
        .join("config.toml")
}

/// Market settings as written in the config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSettings {
    pub tariff_publication_fee: Option<Decimal>,
    pub tariff_revocation_fee: Option<Decimal>,
    /// Hours between publication boundaries
    pub publication_interval: Option<u32>,
}

impl MarketSettings {
    pub fn resolve(&self) -> MarketConfig {
        let publication_fee = self.tariff_publication_fee.unwrap_or_else(|| {
            error!("Tariff publication fee not specified. Default to {}", Decimal::ZERO);
            Decimal::ZERO
        });
        let revocation_fee = self.tariff_revocation_fee.unwrap_or_else(|| {
            error!("Tariff revocation fee not specified. Default to {}", Decimal::ZERO);
            Decimal::ZERO
        });
        let interval = self.publication_interval.unwrap_or_else(|| {
            error!(
                "Tariff publication interval not specified. Default to {}",
                DEFAULT_PUBLICATION_INTERVAL
            );
            DEFAULT_PUBLICATION_INTERVAL
        });
        MarketConfig::new(publication_fee, revocation_fee, interval)
    }
}

/// Effective market configuration
#[derive(Debug, Clone, PartialEq)]
pub struct MarketConfig {
    tariff_publication_fee: Decimal,
    tariff_revocation_fee: Decimal,
    publication_interval: u32,
}

impl MarketConfig {
    /// Intervals outside `1..=24` hours are corrected, never rejected.
    pub fn new(tariff_publication_fee: Decimal, tariff_revocation_fee: Decimal, publication_interval: u32) -> Self {
        let publication_interval = if publication_interval > MAX_PUBLICATION_INTERVAL {
            error!(
                "tariff publication interval {} > {} hr",
                publication_interval, MAX_PUBLICATION_INTERVAL
            );
            MAX_PUBLICATION_INTERVAL
        } else if publication_interval == 0 {
            error!("tariff publication interval must be at least 1 hr");
            1
        } else {
            publication_interval
        };
        Self {
            tariff_publication_fee,
            tariff_revocation_fee,
            publication_interval,
        }
    }

    pub fn tariff_publication_fee(&self) -> Decimal {
        self.tariff_publication_fee
    }

    pub fn tariff_revocation_fee(&self) -> Decimal {
        self.tariff_revocation_fee
    }

    pub fn publication_interval(&self) -> u32 {
        self.publication_interval
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self::new(Decimal::ZERO, Decimal::ZERO, DEFAULT_PUBLICATION_INTERVAL)
    }
}

/// Simulated clock settings for the runner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Start of the first timeslot
    pub base_time: DateTime<Utc>,
    pub timeslot_minutes: u32,
    /// Number of timeslots to run
    pub timeslots: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            // 2010-01-01T00:00:00Z
            base_time: DateTime::UNIX_EPOCH + Duration::days(14_610),
            timeslot_minutes: 60,
            timeslots: 48,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
