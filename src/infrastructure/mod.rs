//! Infrastructure: in-memory adapters for the market's ports

pub mod broker_proxy;
pub mod clock;
pub mod ledger;
pub mod simulation;
pub mod storage;

pub use broker_proxy::EventBusBrokerProxy;
pub use clock::SimulationClock;
pub use ledger::RecordingAccounting;
pub use simulation::SimulationDriver;
pub use storage::{InMemorySubscriptionRepository, InMemoryTariffRepository};
