//! # Tariff Market
//!
//! Coordinator for a simulated retail electricity market: brokers publish,
//! amend and revoke tariffs, the market releases them to customers at fixed
//! publication boundaries, and customers subscribe to them.
//!
//! ## Architecture
//!
//! - **domain**: tariffs, specifications, subscriptions, broker messages
//!   and the repository traits
//! - **application**: the market itself (dispatcher, lifecycle, publication
//!   scheduler, subscription registry) and the ports it is driven through
//! - **infrastructure**: in-memory repositories, simulation clock, ledger,
//!   broker transport and timeslot driver
//! - **notifications**: event bus carrying outbound market traffic
//! - **runtime**: wiring and tracing setup

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod notifications;
pub mod runtime;

pub use config::{default_config_path, AppConfig, MarketConfig};

pub use application::market::TariffMarket;
pub use runtime::{init_tracing, MarketRuntime};

pub use notifications::{create_event_bus, Event, EventBus, SharedEventBus};
