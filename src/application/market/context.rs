//! Dependencies shared by the market components

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard};

use crate::application::ports::{Accounting, BrokerProxy, TimeService};
use crate::config::MarketConfig;
use crate::domain::{TariffRepository, TariffSubscriptionRepository};

/// Collaborators injected into the market by the composition root
#[derive(Clone)]
pub struct MarketDependencies {
    pub clock: Arc<dyn TimeService>,
    pub accounting: Arc<dyn Accounting>,
    pub broker_proxy: Arc<dyn BrokerProxy>,
    pub tariffs: Arc<dyn TariffRepository>,
    pub subscriptions: Arc<dyn TariffSubscriptionRepository>,
}

/// State shared by the dispatcher, scheduler and registry.
///
/// Every change to tariffs, subscriptions or defaults happens while holding
/// the guard returned by [`MarketContext::begin_mutation`], so at most one
/// mutation is in flight at a time. Replies, broadcasts and listener calls
/// are made after the guard is dropped.
pub struct MarketContext {
    pub(crate) config: MarketConfig,
    pub(crate) clock: Arc<dyn TimeService>,
    pub(crate) accounting: Arc<dyn Accounting>,
    pub(crate) broker_proxy: Arc<dyn BrokerProxy>,
    pub(crate) tariffs: Arc<dyn TariffRepository>,
    pub(crate) subscriptions: Arc<dyn TariffSubscriptionRepository>,
    mutation: Mutex<()>,
}

/// Shared, reference-counted market context
pub type SharedMarketContext = Arc<MarketContext>;

impl MarketContext {
    pub fn new(deps: MarketDependencies, config: MarketConfig) -> Self {
        Self {
            config,
            clock: deps.clock,
            accounting: deps.accounting,
            broker_proxy: deps.broker_proxy,
            tariffs: deps.tariffs,
            subscriptions: deps.subscriptions,
            mutation: Mutex::new(()),
        }
    }

    pub fn shared(deps: MarketDependencies, config: MarketConfig) -> SharedMarketContext {
        Arc::new(Self::new(deps, config))
    }

    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.current_time()
    }

    pub(crate) async fn begin_mutation(&self) -> MutexGuard<'_, ()> {
        self.mutation.lock().await
    }
}
