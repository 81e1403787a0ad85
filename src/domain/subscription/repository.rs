//! Subscription repository interface

use async_trait::async_trait;

use super::model::TariffSubscription;
use crate::domain::tariff::TariffId;
use crate::domain::{CustomerId, CustomerInfo, DomainResult};

/// Durable store of (customer, tariff) subscriptions.
///
/// There is at most one record per pair. Lists are ordered by tariff id,
/// then customer id.
#[async_trait]
pub trait TariffSubscriptionRepository: Send + Sync {
    async fn find_subscription(
        &self,
        customer_id: CustomerId,
        tariff_id: TariffId,
    ) -> DomainResult<Option<TariffSubscription>>;
    /// Existing record for the pair, or a fresh one with nothing committed
    async fn get_or_create(
        &self,
        customer: &CustomerInfo,
        tariff_id: TariffId,
    ) -> DomainResult<TariffSubscription>;
    async fn save(&self, subscription: TariffSubscription) -> DomainResult<()>;
    async fn remove(&self, customer_id: CustomerId, tariff_id: TariffId) -> DomainResult<()>;
    async fn find_subscriptions_for_tariff(&self, tariff_id: TariffId) -> DomainResult<Vec<TariffSubscription>>;
    async fn find_subscriptions_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> DomainResult<Vec<TariffSubscription>>;
}
