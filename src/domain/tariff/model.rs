//! Tariff domain entity

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::specification::{HourlyCharge, RateId, TariffId, TariffSpecification};
use crate::domain::{Broker, PowerType};

/// Lifecycle state of a tariff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TariffState {
    /// Published by a broker, waiting for the next publication boundary
    Pending,
    /// Visible to customers and open for subscription
    Offered,
    /// Revoked by its broker. Terminal.
    Killed,
}

impl Default for TariffState {
    fn default() -> Self {
        Self::Pending
    }
}

impl std::fmt::Display for TariffState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Offered => write!(f, "OFFERED"),
            Self::Killed => write!(f, "KILLED"),
        }
    }
}

/// Why an hourly charge was refused by a tariff's rate structure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RateUpdateError {
    #[error("tariff {0} has no variable rate")]
    NotVariable(TariffId),

    #[error("no rate {0} in tariff")]
    UnknownRate(RateId),

    #[error("rate {0} is fixed")]
    FixedRate(RateId),

    #[error("charge {value} outside rate bounds [{min}, {max}]")]
    OutOfRange {
        value: Decimal,
        min: Decimal,
        max: Decimal,
    },

    #[error("charge for {at_time} arrives inside the {notice_hours}h notice interval")]
    InsufficientNotice {
        at_time: DateTime<Utc>,
        notice_hours: i64,
    },
}

/// Live instance of a published tariff specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tariff {
    specification: TariffSpecification,
    pub state: TariffState,
    /// Starts as the specification's expiration; brokers may move it later
    pub expiration: Option<DateTime<Utc>>,
    pub offered_at: Option<DateTime<Utc>>,
    hourly_charges: BTreeMap<RateId, BTreeMap<DateTime<Utc>, HourlyCharge>>,
}

impl Tariff {
    pub fn new(specification: TariffSpecification) -> Self {
        let expiration = specification.expiration;
        Self {
            specification,
            state: TariffState::Pending,
            expiration,
            offered_at: None,
            hourly_charges: BTreeMap::new(),
        }
    }

    /// Same id as the specification it wraps
    pub fn id(&self) -> TariffId {
        self.specification.id
    }

    pub fn specification(&self) -> &TariffSpecification {
        &self.specification
    }

    pub fn broker(&self) -> &Broker {
        &self.specification.broker
    }

    pub fn power_type(&self) -> PowerType {
        self.specification.power_type
    }

    /// Expired once the expiration time is not after `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration.is_some_and(|exp| exp <= now)
    }

    pub fn is_revoked(&self) -> bool {
        self.state == TariffState::Killed
    }

    pub fn is_subscribable(&self, now: DateTime<Utc>) -> bool {
        self.state == TariffState::Offered && !self.is_expired(now)
    }

    pub fn offer(&mut self, now: DateTime<Utc>) {
        self.state = TariffState::Offered;
        self.offered_at = Some(now);
    }

    pub fn kill(&mut self) {
        self.state = TariffState::Killed;
    }

    /// Add or replace an hourly charge on one of this tariff's variable rates.
    pub fn add_hourly_charge(
        &mut self,
        charge: HourlyCharge,
        rate_id: RateId,
        now: DateTime<Utc>,
    ) -> Result<(), RateUpdateError> {
        if !self.specification.has_variable_rate() {
            return Err(RateUpdateError::NotVariable(self.id()));
        }
        let rate = self
            .specification
            .find_rate(rate_id)
            .ok_or(RateUpdateError::UnknownRate(rate_id))?;
        if rate.is_fixed {
            return Err(RateUpdateError::FixedRate(rate_id));
        }
        if !rate.admits(charge.value) {
            return Err(RateUpdateError::OutOfRange {
                value: charge.value,
                min: rate.min_value,
                max: rate.max_value,
            });
        }
        let earliest = Duration::try_hours(rate.notice_interval)
            .and_then(|notice| now.checked_add_signed(notice));
        if earliest.map_or(true, |earliest| charge.at_time < earliest) {
            return Err(RateUpdateError::InsufficientNotice {
                at_time: charge.at_time,
                notice_hours: rate.notice_interval,
            });
        }

        let charge = HourlyCharge { rate_id, ..charge };
        self.hourly_charges
            .entry(rate_id)
            .or_default()
            .insert(charge.at_time, charge);
        Ok(())
    }

    /// Most recent hourly charge for `rate_id` taking effect at or before `at`
    pub fn current_hourly_charge(&self, rate_id: RateId, at: DateTime<Utc>) -> Option<&HourlyCharge> {
        self.hourly_charges
            .get(&rate_id)?
            .range(..=at)
            .next_back()
            .map(|(_, charge)| charge)
    }

    pub fn hourly_charges(&self, rate_id: RateId) -> impl Iterator<Item = &HourlyCharge> {
        self.hourly_charges
            .get(&rate_id)
            .into_iter()
            .flat_map(|charges| charges.values())
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tariff::Rate;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2010, 1, 1, 0, 0, 0).unwrap()
    }

    fn variable_tariff() -> Tariff {
        let spec = TariffSpecification::new(1, Broker::new("b1"), PowerType::Consumption)
            .with_rate(Rate::fixed(10, Decimal::new(12, 2)))
            .with_rate(Rate::variable(11, Decimal::new(5, 2), Decimal::new(30, 2), 2));
        Tariff::new(spec)
    }

    #[test]
    fn new_tariff_is_pending_with_spec_expiration() {
        let spec = TariffSpecification::new(3, Broker::new("b1"), PowerType::Production)
            .with_expiration(t0() + Duration::hours(5));
        let tariff = Tariff::new(spec);
        assert_eq!(tariff.id(), 3);
        assert_eq!(tariff.state, TariffState::Pending);
        assert_eq!(tariff.expiration, Some(t0() + Duration::hours(5)));
    }

    #[test]
    fn expired_when_expiration_not_after_now() {
        let mut tariff = variable_tariff();
        assert!(!tariff.is_expired(t0()));
        tariff.expiration = Some(t0());
        assert!(tariff.is_expired(t0()));
        assert!(!tariff.is_expired(t0() - Duration::hours(1)));
    }

    #[test]
    fn subscribable_only_when_offered_and_live() {
        let mut tariff = variable_tariff();
        assert!(!tariff.is_subscribable(t0()));
        tariff.offer(t0());
        assert!(tariff.is_subscribable(t0()));
        tariff.kill();
        assert!(!tariff.is_subscribable(t0()));
    }

    #[test]
    fn hourly_charge_accepted_and_replaced() {
        let mut tariff = variable_tariff();
        let at = t0() + Duration::hours(3);
        tariff
            .add_hourly_charge(HourlyCharge::new(11, Decimal::new(10, 2), at), 11, t0())
            .unwrap();
        tariff
            .add_hourly_charge(HourlyCharge::new(11, Decimal::new(20, 2), at), 11, t0())
            .unwrap();
        assert_eq!(tariff.hourly_charges(11).count(), 1);
        let current = tariff.current_hourly_charge(11, at + Duration::hours(1)).unwrap();
        assert_eq!(current.value, Decimal::new(20, 2));
        assert!(tariff.current_hourly_charge(11, t0()).is_none());
    }

    #[test]
    fn hourly_charge_rejections() {
        let mut tariff = variable_tariff();
        let at = t0() + Duration::hours(3);

        let err = tariff
            .add_hourly_charge(HourlyCharge::new(99, Decimal::new(10, 2), at), 99, t0())
            .unwrap_err();
        assert_eq!(err, RateUpdateError::UnknownRate(99));

        let err = tariff
            .add_hourly_charge(HourlyCharge::new(10, Decimal::new(10, 2), at), 10, t0())
            .unwrap_err();
        assert_eq!(err, RateUpdateError::FixedRate(10));

        let err = tariff
            .add_hourly_charge(HourlyCharge::new(11, Decimal::new(50, 2), at), 11, t0())
            .unwrap_err();
        assert!(matches!(err, RateUpdateError::OutOfRange { .. }));

        let soon = t0() + Duration::hours(1);
        let err = tariff
            .add_hourly_charge(HourlyCharge::new(11, Decimal::new(10, 2), soon), 11, t0())
            .unwrap_err();
        assert!(matches!(err, RateUpdateError::InsufficientNotice { notice_hours: 2, .. }));

        assert_eq!(tariff.hourly_charges(11).count(), 0);
    }

    #[test]
    fn unbounded_notice_interval_is_insufficient_notice() {
        let spec = TariffSpecification::new(5, Broker::new("b1"), PowerType::Consumption)
            .with_rate(Rate::variable(51, Decimal::ZERO, Decimal::ONE, i64::MAX));
        let mut tariff = Tariff::new(spec);
        let far = t0() + Duration::days(365 * 100);

        let err = tariff
            .add_hourly_charge(HourlyCharge::new(51, Decimal::new(5, 1), far), 51, t0())
            .unwrap_err();
        assert!(matches!(
            err,
            RateUpdateError::InsufficientNotice { notice_hours: i64::MAX, .. }
        ));
        assert_eq!(tariff.hourly_charges(51).count(), 0);
    }

    #[test]
    fn killed_tariff_is_revoked() {
        let mut tariff = variable_tariff();
        tariff.offer(t0());
        assert!(!tariff.is_revoked());
        tariff.kill();
        assert!(tariff.is_revoked());
    }

    #[test]
    fn fixed_only_tariff_is_not_variable() {
        let spec = TariffSpecification::new(4, Broker::new("b1"), PowerType::Consumption)
            .with_rate(Rate::fixed(40, Decimal::new(12, 2)));
        let mut tariff = Tariff::new(spec);
        let err = tariff
            .add_hourly_charge(HourlyCharge::new(40, Decimal::ONE, t0()), 40, t0())
            .unwrap_err();
        assert_eq!(err, RateUpdateError::NotVariable(4));
    }

    #[test]
    fn tariff_state_display() {
        assert_eq!(TariffState::Pending.to_string(), "PENDING");
        assert_eq!(TariffState::Killed.to_string(), "KILLED");
    }
}
