//! Tariff specification: the immutable terms of a tariff offer

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{Broker, PowerType};

pub type TariffId = i64;
pub type RateId = i64;

/// One rate component of a tariff.
///
/// A fixed rate always charges `value`. A variable rate is priced through
/// [`HourlyCharge`]s announced by the broker, which must stay inside
/// `min_value..=max_value` and arrive at least `notice_interval` hours ahead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rate {
    pub id: RateId,
    #[serde(default = "default_true")]
    pub is_fixed: bool,
    #[serde(default)]
    pub value: Decimal,
    #[serde(default)]
    pub min_value: Decimal,
    #[serde(default)]
    pub max_value: Decimal,
    /// Hours of advance notice required for a new hourly charge
    #[serde(default)]
    pub notice_interval: i64,
    #[serde(default)]
    pub daily_begin: Option<u32>,
    #[serde(default)]
    pub daily_end: Option<u32>,
    #[serde(default)]
    pub weekly_begin: Option<u32>,
    #[serde(default)]
    pub weekly_end: Option<u32>,
    #[serde(default)]
    pub tier_threshold: Decimal,
}

fn default_true() -> bool {
    true
}

impl Rate {
    pub fn fixed(id: RateId, value: Decimal) -> Self {
        Self {
            id,
            is_fixed: true,
            value,
            min_value: value,
            max_value: value,
            notice_interval: 0,
            daily_begin: None,
            daily_end: None,
            weekly_begin: None,
            weekly_end: None,
            tier_threshold: Decimal::ZERO,
        }
    }

    pub fn variable(id: RateId, min_value: Decimal, max_value: Decimal, notice_interval: i64) -> Self {
        Self {
            is_fixed: false,
            value: min_value,
            min_value,
            max_value,
            notice_interval,
            ..Self::fixed(id, Decimal::ZERO)
        }
    }

    /// Whether `value` lies between the rate bounds, whichever order they were given in
    pub fn admits(&self, value: Decimal) -> bool {
        let (lo, hi) = if self.min_value <= self.max_value {
            (self.min_value, self.max_value)
        } else {
            (self.max_value, self.min_value)
        };
        value >= lo && value <= hi
    }
}

/// Price announced by a broker for one hour of a variable rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyCharge {
    pub rate_id: RateId,
    pub value: Decimal,
    pub at_time: DateTime<Utc>,
}

impl HourlyCharge {
    pub fn new(rate_id: RateId, value: Decimal, at_time: DateTime<Utc>) -> Self {
        Self {
            rate_id,
            value,
            at_time,
        }
    }
}

/// Terms of a tariff offer. Never mutated once published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffSpecification {
    pub id: TariffId,
    pub broker: Broker,
    pub power_type: PowerType,
    #[serde(default)]
    pub expiration: Option<DateTime<Utc>>,
    /// Minimum subscription duration in hours
    #[serde(default)]
    pub min_duration: i64,
    #[serde(default)]
    pub signup_payment: Decimal,
    #[serde(default)]
    pub early_withdraw_payment: Decimal,
    #[serde(default)]
    pub periodic_payment: Decimal,
    #[serde(default)]
    pub rates: Vec<Rate>,
    #[serde(default)]
    pub supersedes: Vec<TariffId>,
}

impl TariffSpecification {
    pub fn new(id: TariffId, broker: Broker, power_type: PowerType) -> Self {
        Self {
            id,
            broker,
            power_type,
            expiration: None,
            min_duration: 0,
            signup_payment: Decimal::ZERO,
            early_withdraw_payment: Decimal::ZERO,
            periodic_payment: Decimal::ZERO,
            rates: Vec::new(),
            supersedes: Vec::new(),
        }
    }

    pub fn with_rate(mut self, rate: Rate) -> Self {
        self.rates.push(rate);
        self
    }

    pub fn with_expiration(mut self, expiration: DateTime<Utc>) -> Self {
        self.expiration = Some(expiration);
        self
    }

    pub fn find_rate(&self, rate_id: RateId) -> Option<&Rate> {
        self.rates.iter().find(|r| r.id == rate_id)
    }

    pub fn has_variable_rate(&self) -> bool {
        self.rates.iter().any(|r| !r.is_fixed)
    }
}
