//! Tariff aggregate
//!
//! Contains the immutable [`TariffSpecification`], the live [`Tariff`]
//! that tracks its lifecycle, and the repository interface.

pub mod model;
pub mod repository;
pub mod specification;

pub use model::{RateUpdateError, Tariff, TariffState};
pub use repository::TariffRepository;
pub use specification::{HourlyCharge, Rate, RateId, TariffId, TariffSpecification};
