//! In-memory repositories for simulations and testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::domain::{
    CustomerId, CustomerInfo, DomainError, DomainResult, PowerType, Tariff, TariffId,
    TariffRepository, TariffSpecification, TariffState, TariffSubscription,
    TariffSubscriptionRepository,
};

/// Tariffs and specifications keyed by id
pub struct InMemoryTariffRepository {
    specifications: DashMap<TariffId, TariffSpecification>,
    tariffs: DashMap<TariffId, Tariff>,
}

impl InMemoryTariffRepository {
    pub fn new() -> Self {
        Self {
            specifications: DashMap::new(),
            tariffs: DashMap::new(),
        }
    }

    fn collect_sorted(&self, filter: impl Fn(&Tariff) -> bool) -> Vec<Tariff> {
        let mut tariffs: Vec<Tariff> = self
            .tariffs
            .iter()
            .filter(|e| filter(e.value()))
            .map(|e| e.value().clone())
            .collect();
        tariffs.sort_by_key(Tariff::id);
        tariffs
    }
}

impl Default for InMemoryTariffRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TariffRepository for InMemoryTariffRepository {
    async fn add_specification(&self, spec: TariffSpecification) -> DomainResult<()> {
        self.specifications.insert(spec.id, spec);
        Ok(())
    }

    async fn find_specification_by_id(&self, id: TariffId) -> DomainResult<Option<TariffSpecification>> {
        Ok(self.specifications.get(&id).map(|s| s.clone()))
    }

    async fn add_tariff(&self, tariff: Tariff) -> DomainResult<()> {
        if self.tariffs.contains_key(&tariff.id()) {
            return Err(DomainError::Conflict(format!("tariff {}", tariff.id())));
        }
        self.tariffs.insert(tariff.id(), tariff);
        Ok(())
    }

    async fn update_tariff(&self, tariff: Tariff) -> DomainResult<()> {
        match self.tariffs.get_mut(&tariff.id()) {
            Some(mut existing) => {
                *existing = tariff;
                Ok(())
            }
            None => Err(DomainError::tariff_not_found(tariff.id())),
        }
    }

    async fn find_tariff_by_id(&self, id: TariffId) -> DomainResult<Option<Tariff>> {
        Ok(self.tariffs.get(&id).map(|t| t.clone()))
    }

    async fn find_tariffs_by_state(&self, state: TariffState) -> DomainResult<Vec<Tariff>> {
        Ok(self.collect_sorted(|t| t.state == state))
    }

    async fn find_active_tariffs(
        &self,
        power_type: PowerType,
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<Tariff>> {
        Ok(self.collect_sorted(|t| t.power_type() == power_type && t.is_subscribable(now)))
    }

    async fn find_all_tariffs(&self) -> DomainResult<Vec<Tariff>> {
        Ok(self.collect_sorted(|_| true))
    }
}

/// Subscriptions keyed by (customer, tariff)
pub struct InMemorySubscriptionRepository {
    subscriptions: DashMap<(CustomerId, TariffId), TariffSubscription>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self {
            subscriptions: DashMap::new(),
        }
    }

    fn collect_sorted(&self, filter: impl Fn(&TariffSubscription) -> bool) -> Vec<TariffSubscription> {
        let mut subs: Vec<TariffSubscription> = self
            .subscriptions
            .iter()
            .filter(|e| filter(e.value()))
            .map(|e| e.value().clone())
            .collect();
        subs.sort_by_key(|s| (s.tariff_id, s.customer.id));
        subs
    }
}

impl Default for InMemorySubscriptionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TariffSubscriptionRepository for InMemorySubscriptionRepository {
    async fn find_subscription(
        &self,
        customer_id: CustomerId,
        tariff_id: TariffId,
    ) -> DomainResult<Option<TariffSubscription>> {
        Ok(self.subscriptions.get(&(customer_id, tariff_id)).map(|s| s.clone()))
    }

    async fn get_or_create(
        &self,
        customer: &CustomerInfo,
        tariff_id: TariffId,
    ) -> DomainResult<TariffSubscription> {
        let entry = self
            .subscriptions
            .entry((customer.id, tariff_id))
            .or_insert_with(|| TariffSubscription::new(customer.clone(), tariff_id));
        Ok(entry.value().clone())
    }

    async fn save(&self, subscription: TariffSubscription) -> DomainResult<()> {
        self.subscriptions
            .insert((subscription.customer.id, subscription.tariff_id), subscription);
        Ok(())
    }

    async fn remove(&self, customer_id: CustomerId, tariff_id: TariffId) -> DomainResult<()> {
        self.subscriptions.remove(&(customer_id, tariff_id));
        Ok(())
    }

    async fn find_subscriptions_for_tariff(&self, tariff_id: TariffId) -> DomainResult<Vec<TariffSubscription>> {
        Ok(self.collect_sorted(|s| s.tariff_id == tariff_id))
    }

    async fn find_subscriptions_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> DomainResult<Vec<TariffSubscription>> {
        Ok(self.collect_sorted(|s| s.customer.id == customer_id))
    }
}
