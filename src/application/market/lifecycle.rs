//! Tariff lifecycle: PENDING → OFFERED → KILLED
//!
//! Handlers for the four broker commands. Each one assumes the caller holds
//! the market's mutation guard and returns the status to reply with.

use tracing::{info, warn};

use super::context::SharedMarketContext;
use super::validation::{charge_fee, validate_update};
use crate::domain::{
    DomainResult, Tariff, TariffExpire, TariffRevoke, TariffSpecification, TariffStatus,
    TariffStatusCode, TariffTransactionType, VariableRateUpdate,
};

pub struct TariffLifecycle {
    ctx: SharedMarketContext,
}

impl TariffLifecycle {
    pub fn new(ctx: SharedMarketContext) -> Self {
        Self { ctx }
    }

    /// Register a newly published specification as a PENDING tariff and
    /// charge the publication fee.
    pub async fn publish(&self, spec: TariffSpecification) -> DomainResult<TariffStatus> {
        let broker = spec.broker.clone();
        let spec_id = spec.id;

        if self.ctx.tariffs.find_tariff_by_id(spec_id).await?.is_some() {
            warn!(tariff_id = spec_id, %broker, "attempt to republish existing tariff id");
            return Ok(
                TariffStatus::new(broker, spec_id, spec_id, TariffStatusCode::InvalidUpdate)
                    .with_message("tariff id already in use"),
            );
        }

        self.ctx.tariffs.add_specification(spec.clone()).await?;
        let tariff = Tariff::new(spec);
        self.ctx.tariffs.add_tariff(tariff.clone()).await?;
        info!(tariff_id = spec_id, %broker, power_type = %tariff.power_type(), "new tariff");

        charge_fee(
            &self.ctx,
            TariffTransactionType::Publish,
            &tariff,
            self.ctx.config.tariff_publication_fee(),
        )
        .await;

        Ok(TariffStatus::new(broker, spec_id, spec_id, TariffStatusCode::Success))
    }

    /// Move a tariff's expiration. Times in the past are refused.
    pub async fn expire(&self, update: TariffExpire) -> DomainResult<TariffStatus> {
        let mut tariff = match validate_update(&self.ctx, &update).await? {
            Ok(tariff) => tariff,
            Err(status) => return Ok(status),
        };

        let now = self.ctx.now();
        if let Some(new_exp) = update.new_expiration {
            if new_exp < now {
                warn!(
                    tariff_id = tariff.id(),
                    new_expiration = %new_exp,
                    "attempt to set expiration in the past"
                );
                return Ok(TariffStatus::for_update(&update, TariffStatusCode::InvalidUpdate)
                    .with_message("attempt to set expiration in the past"));
            }
        }

        tariff.expiration = update.new_expiration;
        self.ctx.tariffs.update_tariff(tariff).await?;
        match update.new_expiration {
            Some(exp) => info!(tariff_id = update.tariff_id, expiration = %exp, "tariff expiration updated"),
            None => info!(tariff_id = update.tariff_id, "tariff expiration cleared"),
        }
        Ok(TariffStatus::for_update(&update, TariffStatusCode::Success))
    }

    /// Kill a tariff. Customers disengage on their own by polling
    /// the revoked-subscription list; the fee is due only if some customer
    /// is still committed.
    pub async fn revoke(&self, update: TariffRevoke) -> DomainResult<TariffStatus> {
        let mut tariff = match validate_update(&self.ctx, &update).await? {
            Ok(tariff) => tariff,
            Err(status) => return Ok(status),
        };

        tariff.kill();
        self.ctx.tariffs.update_tariff(tariff.clone()).await?;
        info!(tariff_id = tariff.id(), broker = %tariff.broker(), "revoke tariff");

        let active = self
            .ctx
            .subscriptions
            .find_subscriptions_for_tariff(tariff.id())
            .await?
            .into_iter()
            .filter(|sub| sub.is_active())
            .count();

        if active > 0 {
            info!(tariff_id = tariff.id(), active, "revoked tariff has active subscriptions");
            charge_fee(
                &self.ctx,
                TariffTransactionType::Revoke,
                &tariff,
                self.ctx.config.tariff_revocation_fee(),
            )
            .await;
        }

        Ok(TariffStatus::for_update(&update, TariffStatusCode::Success))
    }

    /// Apply a new hourly charge to one of the tariff's variable rates
    pub async fn update_variable_rate(&self, update: VariableRateUpdate) -> DomainResult<TariffStatus> {
        let mut tariff = match validate_update(&self.ctx, &update).await? {
            Ok(tariff) => tariff,
            Err(status) => return Ok(status),
        };

        let now = self.ctx.now();
        match tariff.add_hourly_charge(update.hourly_charge.clone(), update.rate_id, now) {
            Ok(()) => {
                self.ctx.tariffs.update_tariff(tariff).await?;
                info!(
                    tariff_id = update.tariff_id,
                    rate_id = update.rate_id,
                    at_time = %update.hourly_charge.at_time,
                    value = %update.hourly_charge.value,
                    "hourly charge added"
                );
                Ok(TariffStatus::for_update(&update, TariffStatusCode::Success))
            }
            Err(e) => {
                warn!(tariff_id = update.tariff_id, rate_id = update.rate_id, error = %e, "could not add hourly charge");
                Ok(TariffStatus::for_update(&update, TariffStatusCode::InvalidUpdate)
                    .with_message(format!("update: could not add hourly charge: {}", e)))
            }
        }
    }
}
