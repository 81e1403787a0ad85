//! Tariff fee transactions

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::tariff::TariffId;
use super::Broker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TariffTransactionType {
    Publish,
    Revoke,
}

impl std::fmt::Display for TariffTransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Publish => write!(f, "PUBLISH"),
            Self::Revoke => write!(f, "REVOKE"),
        }
    }
}

/// Fee charge announced to the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffTransaction {
    pub id: i64,
    pub kind: TariffTransactionType,
    pub tariff_id: TariffId,
    pub broker: Broker,
    pub charge: Decimal,
    pub posted_at: DateTime<Utc>,
}
