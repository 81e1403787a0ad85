//! Outbound ports: interfaces the market calls out through
//!
//! None of these report failure back to the market: replies, broadcasts and
//! ledger records are fire-and-forget from the market's point of view.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::inbound::BrokerMessageListener;
use crate::domain::{
    Broker, Tariff, TariffSpecification, TariffStatus, TariffTransaction, TariffTransactionType,
};

/// Length of one simulated hour in milliseconds
pub const HOUR_MILLIS: i64 = 3_600_000;

/// Source of simulation time
pub trait TimeService: Send + Sync {
    fn current_time(&self) -> DateTime<Utc>;
}

/// Ledger that records monetary side effects
#[async_trait]
pub trait Accounting: Send + Sync {
    async fn add_tariff_transaction(
        &self,
        kind: TariffTransactionType,
        tariff: &Tariff,
        charge: Decimal,
    ) -> TariffTransaction;
}

/// Transport between the market and the brokers
#[async_trait]
pub trait BrokerProxy: Send + Sync {
    /// Send one message to a single broker
    async fn send_message(&self, broker: &Broker, status: TariffStatus);

    /// Send newly published specifications to every broker
    async fn broadcast_tariffs(&self, specifications: Vec<TariffSpecification>);

    /// Route inbound tariff traffic to `listener`
    fn register_broker_tariff_listener(&self, listener: Arc<dyn BrokerMessageListener>);
}

/// Customer-side hook that learns about newly offered tariffs
#[async_trait]
pub trait NewTariffListener: Send + Sync {
    async fn publish_new_tariffs(&self, tariffs: &[Tariff]);
}
