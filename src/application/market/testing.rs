//! Shared fixtures for the market tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use super::context::{MarketContext, MarketDependencies, SharedMarketContext};
use super::subscriptions::SubscriptionRegistry;
use crate::application::ports::{BrokerMessageListener, BrokerProxy, NewTariffListener};
use crate::config::{MarketConfig, SimulationConfig};
use crate::domain::{
    Broker, CustomerId, CustomerInfo, PowerType, Rate, Tariff, TariffId, TariffSpecification,
    TariffStatus, TariffSubscription,
};
use crate::infrastructure::{
    InMemorySubscriptionRepository, InMemoryTariffRepository, RecordingAccounting, SimulationClock,
};

/// Broker transport that keeps everything it was asked to send
#[derive(Default)]
pub struct RecordingBrokerProxy {
    sent: Mutex<Vec<(Broker, TariffStatus)>>,
    broadcasts: Mutex<Vec<Vec<TariffSpecification>>>,
    listeners: Mutex<Vec<Arc<dyn BrokerMessageListener>>>,
}

impl RecordingBrokerProxy {
    pub fn sent(&self) -> Vec<(Broker, TariffStatus)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn broadcasts(&self) -> Vec<Vec<TariffSpecification>> {
        self.broadcasts.lock().unwrap().clone()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }
}

#[async_trait]
impl BrokerProxy for RecordingBrokerProxy {
    async fn send_message(&self, broker: &Broker, status: TariffStatus) {
        self.sent.lock().unwrap().push((broker.clone(), status));
    }

    async fn broadcast_tariffs(&self, specifications: Vec<TariffSpecification>) {
        self.broadcasts.lock().unwrap().push(specifications);
    }

    fn register_broker_tariff_listener(&self, listener: Arc<dyn BrokerMessageListener>) {
        self.listeners.lock().unwrap().push(listener);
    }
}

/// Customer listener that remembers the ids of every batch
#[derive(Default)]
pub struct RecordingListener {
    batches: Mutex<Vec<Vec<TariffId>>>,
}

impl RecordingListener {
    pub fn batches(&self) -> Vec<Vec<TariffId>> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl NewTariffListener for RecordingListener {
    async fn publish_new_tariffs(&self, tariffs: &[Tariff]) {
        self.batches
            .lock()
            .unwrap()
            .push(tariffs.iter().map(|t| t.id()).collect());
    }
}

/// Customer that signs one unit up to every new tariff it hears about
pub struct SubscribingListener {
    registry: Arc<SubscriptionRegistry>,
    customer: CustomerInfo,
}

impl SubscribingListener {
    pub fn new(registry: Arc<SubscriptionRegistry>, customer: CustomerInfo) -> Self {
        Self { registry, customer }
    }
}

#[async_trait]
impl NewTariffListener for SubscribingListener {
    async fn publish_new_tariffs(&self, tariffs: &[Tariff]) {
        for tariff in tariffs {
            self.registry
                .subscribe_to_tariff(tariff, &self.customer, 1)
                .await
                .unwrap();
        }
    }
}

pub struct Harness {
    pub ctx: SharedMarketContext,
    pub clock: Arc<SimulationClock>,
    pub ledger: Arc<RecordingAccounting>,
    pub proxy: Arc<RecordingBrokerProxy>,
    pub tariffs: Arc<InMemoryTariffRepository>,
    pub subscriptions: Arc<InMemorySubscriptionRepository>,
    base_time: DateTime<Utc>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(MarketConfig::default())
    }

    pub fn with_fees(publication_fee: Decimal, revocation_fee: Decimal) -> Self {
        Self::with_config(MarketConfig::new(publication_fee, revocation_fee, 6))
    }

    pub fn with_config(config: MarketConfig) -> Self {
        let base_time = SimulationConfig::default().base_time;
        let clock = Arc::new(SimulationClock::new(base_time));
        let ledger = Arc::new(RecordingAccounting::new(clock.clone()));
        let proxy = Arc::new(RecordingBrokerProxy::default());
        let tariffs = Arc::new(InMemoryTariffRepository::new());
        let subscriptions = Arc::new(InMemorySubscriptionRepository::new());
        let deps = MarketDependencies {
            clock: clock.clone(),
            accounting: ledger.clone(),
            broker_proxy: proxy.clone(),
            tariffs: tariffs.clone(),
            subscriptions: subscriptions.clone(),
        };
        Self {
            ctx: MarketContext::shared(deps, config),
            clock,
            ledger,
            proxy,
            tariffs,
            subscriptions,
            base_time,
        }
    }

    pub fn deps(&self) -> MarketDependencies {
        MarketDependencies {
            clock: self.clock.clone(),
            accounting: self.ledger.clone(),
            broker_proxy: self.proxy.clone(),
            tariffs: self.tariffs.clone(),
            subscriptions: self.subscriptions.clone(),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.ctx.now()
    }

    pub fn at_hour(&self, hour: i64) -> DateTime<Utc> {
        self.base_time + Duration::hours(hour)
    }

    pub fn set_hour(&self, hour: i64) {
        self.clock.set_current_time(self.at_hour(hour));
    }

    /// Consumption tariff from broker `b1` with one fixed rate
    pub fn spec(&self, id: TariffId) -> TariffSpecification {
        TariffSpecification::new(id, Broker::new("b1"), PowerType::Consumption)
            .with_rate(Rate::fixed(id * 10, Decimal::new(12, 2)))
    }

    pub fn customer(&self, id: CustomerId) -> CustomerInfo {
        CustomerInfo::new(id, format!("customer-{}", id), PowerType::Consumption, 100)
    }

    /// Store `spec` as a pending tariff, bypassing the dispatcher
    pub async fn store_tariff(&self, spec: TariffSpecification) -> Tariff {
        use crate::domain::TariffRepository;
        self.tariffs.add_specification(spec.clone()).await.unwrap();
        let tariff = Tariff::new(spec);
        self.tariffs.add_tariff(tariff.clone()).await.unwrap();
        tariff
    }

    pub async fn store_offered_tariff(&self, spec: TariffSpecification) -> Tariff {
        use crate::domain::TariffRepository;
        let mut tariff = self.store_tariff(spec).await;
        tariff.offer(self.now());
        self.tariffs.update_tariff(tariff.clone()).await.unwrap();
        tariff
    }

    pub async fn store_subscription(&self, customer_id: CustomerId, tariff_id: TariffId, committed: u32) {
        use crate::domain::TariffSubscriptionRepository;
        let mut sub = TariffSubscription::new(self.customer(customer_id), tariff_id);
        sub.subscribe(committed);
        self.subscriptions.save(sub).await.unwrap();
    }

    pub async fn tariff(&self, id: TariffId) -> Option<Tariff> {
        self.ctx.tariffs.find_tariff_by_id(id).await.unwrap()
    }
}
