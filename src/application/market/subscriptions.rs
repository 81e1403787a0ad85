//! Subscription registry, the customer-facing side of the market
//!
//! Customers subscribe blocks of their population to tariffs, poll for
//! revoked subscriptions they still have to leave, and fall back on a
//! default tariff per power type.

use dashmap::DashMap;
use tracing::{info, warn};

use super::context::SharedMarketContext;
use crate::domain::{
    CustomerId, CustomerInfo, DomainError, DomainResult, PowerType, Tariff, TariffId,
    TariffSpecification, TariffSubscription,
};

pub struct SubscriptionRegistry {
    ctx: SharedMarketContext,
    default_tariffs: DashMap<PowerType, TariffId>,
}

impl SubscriptionRegistry {
    pub fn new(ctx: SharedMarketContext) -> Self {
        Self {
            ctx,
            default_tariffs: DashMap::new(),
        }
    }

    /// Commit `customer_count` more customers to `tariff`.
    ///
    /// Returns `None` without touching any subscription when the tariff has
    /// expired. The expiration is read from the repository, not from the
    /// caller's copy.
    pub async fn subscribe_to_tariff(
        &self,
        tariff: &Tariff,
        customer: &CustomerInfo,
        customer_count: u32,
    ) -> DomainResult<Option<TariffSubscription>> {
        let _guard = self.ctx.begin_mutation().await;
        let current = self
            .ctx
            .tariffs
            .find_tariff_by_id(tariff.id())
            .await?
            .ok_or_else(|| DomainError::tariff_not_found(tariff.id()))?;

        if current.is_expired(self.ctx.now()) {
            warn!(tariff_id = current.id(), customer = customer.name.as_str(), "subscription to expired tariff refused");
            return Ok(None);
        }

        let mut subscription = self.ctx.subscriptions.get_or_create(customer, current.id()).await?;
        subscription.subscribe(customer_count);
        if subscription.is_active() {
            self.ctx.subscriptions.save(subscription.clone()).await?;
        } else {
            self.ctx.subscriptions.remove(customer.id, current.id()).await?;
        }
        info!(
            tariff_id = current.id(),
            customer = customer.name.as_str(),
            customer_count,
            committed = subscription.customers_committed,
            "customers subscribed"
        );
        Ok(Some(subscription))
    }

    /// Withdraw `customer_count` customers. A subscription that drops to
    /// zero is removed; the returned copy shows the final count.
    pub async fn unsubscribe(
        &self,
        customer: &CustomerInfo,
        tariff_id: TariffId,
        customer_count: u32,
    ) -> DomainResult<TariffSubscription> {
        let _guard = self.ctx.begin_mutation().await;
        let mut subscription = self
            .ctx
            .subscriptions
            .find_subscription(customer.id, tariff_id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity: "TariffSubscription",
                field: "customer_id,tariff_id",
                value: format!("{},{}", customer.id, tariff_id),
            })?;

        subscription.unsubscribe(customer_count)?;
        if subscription.is_active() {
            self.ctx.subscriptions.save(subscription.clone()).await?;
        } else {
            self.ctx.subscriptions.remove(customer.id, tariff_id).await?;
        }
        info!(
            tariff_id,
            customer = customer.name.as_str(),
            customer_count,
            committed = subscription.customers_committed,
            "customers unsubscribed"
        );
        Ok(subscription)
    }

    /// Subscriptions of `customer` to killed tariffs that still hold customers
    pub async fn get_revoked_subscription_list(
        &self,
        customer: &CustomerInfo,
    ) -> DomainResult<Vec<TariffSubscription>> {
        let mut revoked = Vec::new();
        for subscription in self.ctx.subscriptions.find_subscriptions_for_customer(customer.id).await? {
            if !subscription.is_active() {
                continue;
            }
            let killed = self
                .ctx
                .tariffs
                .find_tariff_by_id(subscription.tariff_id)
                .await?
                .is_some_and(|t| t.is_revoked());
            if killed {
                revoked.push(subscription);
            }
        }
        Ok(revoked)
    }

    /// Offered, unexpired tariffs for `power_type`
    pub async fn get_active_tariff_list(&self, power_type: PowerType) -> DomainResult<Vec<Tariff>> {
        self.ctx.tariffs.find_active_tariffs(power_type, self.ctx.now()).await
    }

    /// Any tariff by id, killed ones included
    pub async fn get_tariff(&self, tariff_id: TariffId) -> DomainResult<Option<Tariff>> {
        self.ctx.tariffs.find_tariff_by_id(tariff_id).await
    }

    pub async fn get_customer_subscriptions(
        &self,
        customer_id: CustomerId,
    ) -> DomainResult<Vec<TariffSubscription>> {
        self.ctx.subscriptions.find_subscriptions_for_customer(customer_id).await
    }

    /// Install `spec` as the default tariff for its power type.
    ///
    /// The tariff is offered immediately, without waiting for a
    /// publication boundary, and replaces any earlier default.
    pub async fn set_default_tariff(&self, spec: TariffSpecification) -> DomainResult<Tariff> {
        let _guard = self.ctx.begin_mutation().await;
        if self.ctx.tariffs.find_tariff_by_id(spec.id).await?.is_some() {
            return Err(DomainError::Conflict(format!("tariff {}", spec.id)));
        }
        let mut tariff = Tariff::new(spec.clone());
        tariff.offer(self.ctx.now());
        self.ctx.tariffs.add_tariff(tariff.clone()).await?;
        self.ctx.tariffs.add_specification(spec).await?;

        let previous = self.default_tariffs.insert(tariff.power_type(), tariff.id());
        info!(
            tariff_id = tariff.id(),
            power_type = %tariff.power_type(),
            ?previous,
            "default tariff set"
        );
        Ok(tariff)
    }

    pub async fn get_default_tariff(&self, power_type: PowerType) -> DomainResult<Option<Tariff>> {
        let Some(id) = self.default_tariffs.get(&power_type).map(|entry| *entry) else {
            return Ok(None);
        };
        self.ctx.tariffs.find_tariff_by_id(id).await
    }
}
