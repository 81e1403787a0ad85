//! Tariff repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{Tariff, TariffState};
use super::specification::{TariffId, TariffSpecification};
use crate::domain::{DomainResult, PowerType};

/// Durable store of tariffs and their specifications.
///
/// Queries returning several tariffs are ordered by tariff id.
#[async_trait]
pub trait TariffRepository: Send + Sync {
    async fn add_specification(&self, spec: TariffSpecification) -> DomainResult<()>;
    async fn find_specification_by_id(&self, id: TariffId) -> DomainResult<Option<TariffSpecification>>;
    async fn add_tariff(&self, tariff: Tariff) -> DomainResult<()>;
    async fn update_tariff(&self, tariff: Tariff) -> DomainResult<()>;
    async fn find_tariff_by_id(&self, id: TariffId) -> DomainResult<Option<Tariff>>;
    async fn find_tariffs_by_state(&self, state: TariffState) -> DomainResult<Vec<Tariff>>;
    /// Offered, unexpired tariffs of the given power type
    async fn find_active_tariffs(
        &self,
        power_type: PowerType,
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<Tariff>>;
    async fn find_all_tariffs(&self) -> DomainResult<Vec<Tariff>>;
}
