//! Broker transport backed by the notification bus

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::application::ports::{BrokerMessageListener, BrokerProxy, TimeService};
use crate::domain::{Broker, BrokerMessage, TariffSpecification, TariffStatus};
use crate::notifications::{Event, SharedEventBus, TariffStatusSentEvent, TariffsPublishedEvent};

/// Outbound traffic goes to the event bus; inbound traffic is handed to
/// the registered tariff listeners through [`EventBusBrokerProxy::deliver`].
pub struct EventBusBrokerProxy {
    bus: SharedEventBus,
    clock: Arc<dyn TimeService>,
    listeners: RwLock<Vec<Arc<dyn BrokerMessageListener>>>,
}

impl EventBusBrokerProxy {
    pub fn new(bus: SharedEventBus, clock: Arc<dyn TimeService>) -> Self {
        Self {
            bus,
            clock,
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Hand an inbound broker message to every registered listener
    pub async fn deliver(&self, message: BrokerMessage) {
        let listeners: Vec<_> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if listeners.is_empty() {
            warn!("Broker message arrived before any tariff listener registered");
            return;
        }
        for listener in listeners {
            listener.handle_broker_message(message.clone()).await;
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl BrokerProxy for EventBusBrokerProxy {
    async fn send_message(&self, broker: &Broker, status: TariffStatus) {
        debug!(%broker, tariff_id = status.tariff_id, status = %status.status, "Sending tariff status");
        self.bus.publish(Event::TariffStatusSent(TariffStatusSentEvent {
            broker: broker.clone(),
            status,
            timestamp: self.clock.current_time(),
        }));
    }

    async fn broadcast_tariffs(&self, specifications: Vec<TariffSpecification>) {
        debug!(count = specifications.len(), "Broadcasting tariff specifications");
        self.bus.publish(Event::TariffsPublished(TariffsPublishedEvent {
            specifications,
            timestamp: self.clock.current_time(),
        }));
    }

    fn register_broker_tariff_listener(&self, listener: Arc<dyn BrokerMessageListener>) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }
}
