//! Ledger that keeps every tariff fee in memory

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::info;

use crate::application::ports::{Accounting, TimeService};
use crate::domain::{Tariff, TariffTransaction, TariffTransactionType};
use crate::notifications::{Event, SharedEventBus, TariffTransactionPostedEvent};

pub struct RecordingAccounting {
    clock: Arc<dyn TimeService>,
    transactions: DashMap<i64, TariffTransaction>,
    counter: AtomicI64,
    event_bus: Option<SharedEventBus>,
}

impl RecordingAccounting {
    pub fn new(clock: Arc<dyn TimeService>) -> Self {
        Self {
            clock,
            transactions: DashMap::new(),
            counter: AtomicI64::new(1),
            event_bus: None,
        }
    }

    /// Also announce every posting on `bus`
    pub fn with_event_bus(mut self, bus: SharedEventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Posted transactions in posting order
    pub fn transactions(&self) -> Vec<TariffTransaction> {
        let mut txs: Vec<_> = self.transactions.iter().map(|e| e.value().clone()).collect();
        txs.sort_by_key(|t| t.id);
        txs
    }

    pub fn total_charged(&self) -> Decimal {
        self.transactions.iter().map(|e| e.value().charge).sum()
    }
}

#[async_trait]
impl Accounting for RecordingAccounting {
    async fn add_tariff_transaction(
        &self,
        kind: TariffTransactionType,
        tariff: &Tariff,
        charge: Decimal,
    ) -> TariffTransaction {
        let tx = TariffTransaction {
            id: self.counter.fetch_add(1, Ordering::SeqCst),
            kind,
            tariff_id: tariff.id(),
            broker: tariff.broker().clone(),
            charge,
            posted_at: self.clock.current_time(),
        };
        info!(
            transaction_id = tx.id,
            kind = %tx.kind,
            tariff_id = tx.tariff_id,
            broker = %tx.broker,
            charge = %tx.charge,
            "Tariff transaction posted"
        );
        self.transactions.insert(tx.id, tx.clone());

        if let Some(bus) = &self.event_bus {
            bus.publish(Event::TariffTransactionPosted(TariffTransactionPostedEvent {
                transaction_id: tx.id,
                kind: tx.kind,
                tariff_id: tx.tariff_id,
                broker: tx.broker.clone(),
                charge: tx.charge,
                timestamp: tx.posted_at,
            }));
        }
        tx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Broker, PowerType, TariffSpecification};
    use crate::infrastructure::SimulationClock;
    use crate::notifications::create_event_bus;
    use chrono::Utc;

    fn tariff() -> Tariff {
        Tariff::new(TariffSpecification::new(3, Broker::new("b1"), PowerType::Consumption))
    }

    #[tokio::test]
    async fn transactions_are_numbered_and_timestamped() {
        let now = Utc::now();
        let ledger = RecordingAccounting::new(Arc::new(SimulationClock::new(now)));

        let first = ledger
            .add_tariff_transaction(TariffTransactionType::Publish, &tariff(), Decimal::from(-5))
            .await;
        let second = ledger
            .add_tariff_transaction(TariffTransactionType::Revoke, &tariff(), Decimal::from(-2))
            .await;

        assert_eq!(first.id + 1, second.id);
        assert_eq!(first.broker, Broker::new("b1"));
        assert_eq!(first.posted_at.timestamp_millis(), now.timestamp_millis());
        assert_eq!(ledger.transactions(), vec![first, second]);
        assert_eq!(ledger.total_charged(), Decimal::from(-7));
    }

    #[tokio::test]
    async fn postings_are_announced_on_the_bus() {
        let bus = create_event_bus();
        let mut subscriber = bus.subscribe();
        let ledger = RecordingAccounting::new(Arc::new(SimulationClock::new(Utc::now())))
            .with_event_bus(bus.clone());

        ledger
            .add_tariff_transaction(TariffTransactionType::Publish, &tariff(), Decimal::ONE)
            .await;

        let message = subscriber.try_recv().unwrap();
        assert_eq!(message.event.event_type(), "tariff_transaction_posted");
    }
}
