//! Composition root.
//!
//! [`MarketRuntime`] wires the tariff market to the in-memory
//! infrastructure: simulation clock, recording ledger, event-bus broker
//! transport and the timeslot driver. Both the CLI and the integration
//! tests start the market through it.

use std::sync::Arc;

use chrono::Duration;
use tracing::info;

use crate::application::market::{MarketDependencies, TariffMarket};
use crate::config::AppConfig;
use crate::domain::{BrokerMessage, DomainResult};
use crate::infrastructure::{
    EventBusBrokerProxy, InMemorySubscriptionRepository, InMemoryTariffRepository,
    RecordingAccounting, SimulationClock, SimulationDriver,
};
use crate::notifications::{create_event_bus, SharedEventBus};

/// A running market with everything it talks to.
pub struct MarketRuntime {
    /// Outbound broker traffic and ledger postings.
    pub event_bus: SharedEventBus,
    pub market: TariffMarket,
    pub clock: Arc<SimulationClock>,
    pub ledger: Arc<RecordingAccounting>,
    pub broker_proxy: Arc<EventBusBrokerProxy>,
    pub driver: Arc<SimulationDriver>,
    pub config: AppConfig,
}

impl MarketRuntime {
    /// Build the market, register it with the driver and install the
    /// configured default tariffs.
    pub async fn build(config: &AppConfig) -> DomainResult<Self> {
        let market_config = config.market.resolve();
        let event_bus = create_event_bus();
        let clock = Arc::new(SimulationClock::new(config.simulation.base_time));
        let ledger = Arc::new(RecordingAccounting::new(clock.clone()).with_event_bus(event_bus.clone()));
        let broker_proxy = Arc::new(EventBusBrokerProxy::new(event_bus.clone(), clock.clone()));
        let timeslot = Duration::minutes(i64::from(config.simulation.timeslot_minutes.max(1)));
        let driver = Arc::new(SimulationDriver::new(clock.clone(), timeslot));

        let market = TariffMarket::new(
            MarketDependencies {
                clock: clock.clone(),
                accounting: ledger.clone(),
                broker_proxy: broker_proxy.clone(),
                tariffs: Arc::new(InMemoryTariffRepository::new()),
                subscriptions: Arc::new(InMemorySubscriptionRepository::new()),
            },
            market_config,
        );
        market.init(driver.as_ref());

        for spec in &config.default_tariffs {
            market.registry().set_default_tariff(spec.clone()).await?;
        }

        info!(
            base_time = %config.simulation.base_time,
            timeslot_minutes = config.simulation.timeslot_minutes,
            default_tariffs = config.default_tariffs.len(),
            "Market runtime ready"
        );

        Ok(Self {
            event_bus,
            market,
            clock,
            ledger,
            broker_proxy,
            driver,
            config: config.clone(),
        })
    }

    /// Hand a broker message to the market as the transport would
    pub async fn deliver(&self, message: BrokerMessage) {
        self.broker_proxy.deliver(message).await;
    }

    pub async fn run(&self, timeslots: u32) {
        self.driver.run(timeslots).await;
    }
}

/// Initialize tracing subscriber based on config.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}
