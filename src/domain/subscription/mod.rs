//! Tariff subscription aggregate

pub mod model;
pub mod repository;

pub use model::TariffSubscription;
pub use repository::TariffSubscriptionRepository;
