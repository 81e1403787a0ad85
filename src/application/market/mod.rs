//! Tariff market
//!
//! Brokers publish, amend and revoke tariffs through the
//! [`MessageDispatcher`]; the [`PublicationScheduler`] releases pending
//! tariffs to customers at publication boundaries; customers subscribe
//! through the [`SubscriptionRegistry`]. [`TariffMarket`] builds and wires
//! the three around one shared [`MarketContext`].

pub mod context;
pub mod dispatcher;
pub mod lifecycle;
pub mod publication;
pub mod subscriptions;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

pub use context::{MarketContext, MarketDependencies, SharedMarketContext};
pub use dispatcher::MessageDispatcher;
pub use lifecycle::TariffLifecycle;
pub use publication::PublicationScheduler;
pub use subscriptions::SubscriptionRegistry;
pub use validation::ValidationResult;

use crate::application::ports::{CompetitionControl, NewTariffListener};
use crate::config::MarketConfig;

pub struct TariffMarket {
    context: SharedMarketContext,
    dispatcher: Arc<MessageDispatcher>,
    scheduler: Arc<PublicationScheduler>,
    registry: Arc<SubscriptionRegistry>,
}

impl TariffMarket {
    pub fn new(deps: MarketDependencies, config: MarketConfig) -> Self {
        let context = MarketContext::shared(deps, config);
        Self {
            dispatcher: Arc::new(MessageDispatcher::new(context.clone())),
            scheduler: Arc::new(PublicationScheduler::new(context.clone())),
            registry: Arc::new(SubscriptionRegistry::new(context.clone())),
            context,
        }
    }

    /// Register for broker tariff traffic and for the publication phase
    pub fn init(&self, competition_control: &dyn CompetitionControl) {
        self.context
            .broker_proxy
            .register_broker_tariff_listener(self.dispatcher.clone());
        competition_control.register_timeslot_phase(self.scheduler.clone(), PublicationScheduler::PHASE);
        info!(
            phase = PublicationScheduler::PHASE,
            publication_interval = self.publication_interval(),
            publication_fee = %self.tariff_publication_fee(),
            revocation_fee = %self.tariff_revocation_fee(),
            "Tariff market initialized"
        );
    }

    pub fn dispatcher(&self) -> &Arc<MessageDispatcher> {
        &self.dispatcher
    }

    pub fn scheduler(&self) -> &Arc<PublicationScheduler> {
        &self.scheduler
    }

    pub fn registry(&self) -> &Arc<SubscriptionRegistry> {
        &self.registry
    }

    pub fn context(&self) -> &SharedMarketContext {
        &self.context
    }

    pub async fn register_new_tariff_listener(&self, listener: Arc<dyn NewTariffListener>) {
        self.scheduler.register_new_tariff_listener(listener).await;
    }

    pub fn tariff_publication_fee(&self) -> Decimal {
        self.context.config().tariff_publication_fee()
    }

    pub fn tariff_revocation_fee(&self) -> Decimal {
        self.context.config().tariff_revocation_fee()
    }

    pub fn publication_interval(&self) -> u32 {
        self.context.config().publication_interval()
    }

    pub fn simulation_phase(&self) -> u32 {
        PublicationScheduler::PHASE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::market::testing::{Harness, RecordingListener, SubscribingListener};
    use crate::application::ports::TimeslotPhaseProcessor;
    use crate::domain::{
        Broker, TariffMessage, TariffRevoke, TariffState, TariffTransactionType,
    };
    use crate::infrastructure::SimulationDriver;

    fn market(h: &Harness) -> TariffMarket {
        TariffMarket::new(h.deps(), h.ctx.config().clone())
    }

    #[tokio::test]
    async fn init_registers_scheduler_and_dispatcher() {
        let h = Harness::new();
        let market = market(&h);
        let driver = SimulationDriver::new(h.clock.clone(), chrono::Duration::hours(1));
        market.init(&driver);

        assert_eq!(driver.processor_count(PublicationScheduler::PHASE), 1);
        assert_eq!(h.proxy.listener_count(), 1);
        assert_eq!(market.simulation_phase(), 2);
    }

    #[tokio::test]
    async fn publish_then_release_at_boundary() {
        let h = Harness::with_fees(Decimal::from(10), Decimal::ZERO);
        let market = market(&h);
        let listener = Arc::new(RecordingListener::default());
        market.register_new_tariff_listener(listener.clone()).await;

        h.set_hour(1);
        let status = market
            .dispatcher()
            .receive_message(Some(TariffMessage::Publish(h.spec(1)).into()))
            .await
            .unwrap();
        assert!(status.is_success());
        assert_eq!(h.tariff(1).await.unwrap().state, TariffState::Pending);
        let txs = h.ledger.transactions();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].kind, TariffTransactionType::Publish);
        assert_eq!(txs[0].charge, Decimal::from(10));

        h.set_hour(3);
        market.scheduler().activate(h.now(), 2).await;
        assert_eq!(h.tariff(1).await.unwrap().state, TariffState::Pending);
        assert!(listener.batches().is_empty());

        h.set_hour(6);
        market.scheduler().activate(h.now(), 2).await;
        assert_eq!(h.tariff(1).await.unwrap().state, TariffState::Offered);
        assert_eq!(listener.batches(), vec![vec![1]]);
        let broadcasts = h.proxy.broadcasts();
        assert_eq!(broadcasts.len(), 1);
        assert_eq!(broadcasts[0][0], h.spec(1));
    }

    #[tokio::test]
    async fn subscribe_then_revoke() {
        let h = Harness::with_fees(Decimal::ZERO, Decimal::from(20));
        let market = market(&h);
        let tariff = h.store_offered_tariff(h.spec(5)).await;
        let customer = h.customer(3);

        let sub = market
            .registry()
            .subscribe_to_tariff(&tariff, &customer, 5)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sub.customers_committed, 5);

        let status = market
            .dispatcher()
            .receive_message(Some(
                TariffMessage::Revoke(TariffRevoke {
                    id: 11,
                    broker: Broker::new("b1"),
                    tariff_id: 5,
                })
                .into(),
            ))
            .await
            .unwrap();
        assert!(status.is_success());
        assert_eq!(h.tariff(5).await.unwrap().state, TariffState::Killed);

        let txs = h.ledger.transactions();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].kind, TariffTransactionType::Revoke);
        assert_eq!(txs[0].charge, Decimal::from(20));

        let revoked = market
            .registry()
            .get_revoked_subscription_list(&customer)
            .await
            .unwrap();
        assert_eq!(revoked.len(), 1);
        assert_eq!(revoked[0].tariff_id, 5);
        assert_eq!(revoked[0].customers_committed, 5);

        // killed tariffs drop out of the active list
        assert!(market
            .registry()
            .get_active_tariff_list(tariff.power_type())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn listener_may_subscribe_while_being_notified() {
        let h = Harness::new();
        let market = Arc::new(market(&h));
        let listener = Arc::new(SubscribingListener::new(
            market.registry().clone(),
            h.customer(9),
        ));
        market.register_new_tariff_listener(listener).await;
        h.store_tariff(h.spec(1)).await;

        h.set_hour(0);
        market.scheduler().activate(h.now(), 2).await;

        let subs = market.registry().get_customer_subscriptions(9).await.unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].customers_committed, 1);
    }
}
