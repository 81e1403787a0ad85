//! Repository implementations

mod memory;

pub use memory::{InMemorySubscriptionRepository, InMemoryTariffRepository};
