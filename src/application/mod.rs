//! Application layer: the tariff market and its ports

pub mod market;
pub mod ports;

pub use market::{
    MessageDispatcher, PublicationScheduler, SubscriptionRegistry, TariffLifecycle, TariffMarket,
};
pub use ports::{
    Accounting, BrokerMessageListener, BrokerProxy, CompetitionControl, NewTariffListener,
    TimeService, TimeslotPhaseProcessor,
};
