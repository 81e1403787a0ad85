//! Publication scheduler: releases pending tariffs at clock-aligned boundaries.
//!
//! Runs in timeslot phase [`PublicationScheduler::PHASE`]. A boundary is an
//! instant whose time since the epoch is an exact multiple of the
//! publication interval, so publication does not depend on when the
//! simulation started.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use super::context::SharedMarketContext;
use crate::application::ports::{NewTariffListener, TimeslotPhaseProcessor, HOUR_MILLIS};
use crate::domain::{DomainResult, Tariff, TariffSpecification, TariffState};

pub struct PublicationScheduler {
    ctx: SharedMarketContext,
    listeners: RwLock<Vec<Arc<dyn NewTariffListener>>>,
}

impl PublicationScheduler {
    /// Timeslot phase the scheduler registers for
    pub const PHASE: u32 = 2;

    pub fn new(ctx: SharedMarketContext) -> Self {
        Self {
            ctx,
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub async fn register_new_tariff_listener(&self, listener: Arc<dyn NewTariffListener>) {
        self.listeners.write().await.push(listener);
    }

    pub async fn listener_count(&self) -> usize {
        self.listeners.read().await.len()
    }

    pub fn is_publication_boundary(&self, time: DateTime<Utc>) -> bool {
        let period = i64::from(self.ctx.config.publication_interval()) * HOUR_MILLIS;
        time.timestamp_millis().rem_euclid(period) == 0
    }

    /// Offer every pending tariff, tell the customer listeners, then
    /// broadcast the specifications to the brokers.
    pub async fn publish_pending_tariffs(&self) -> DomainResult<Vec<Tariff>> {
        let now = self.ctx.now();
        let published = {
            let _guard = self.ctx.begin_mutation().await;
            let pending = self.ctx.tariffs.find_tariffs_by_state(TariffState::Pending).await?;
            info!(count = pending.len(), "publishing new tariffs");

            let mut published = Vec::with_capacity(pending.len());
            for mut tariff in pending {
                tariff.offer(now);
                self.ctx.tariffs.update_tariff(tariff.clone()).await?;
                published.push(tariff);
            }
            published
        };

        let specifications: Vec<TariffSpecification> = published
            .iter()
            .map(|tariff| {
                let spec = tariff.specification();
                info!(
                    tariff_id = spec.id,
                    broker = %spec.broker,
                    expiration = ?spec.expiration,
                    "publishing spec"
                );
                spec.clone()
            })
            .collect();

        let listeners: Vec<_> = self.listeners.read().await.clone();
        for listener in listeners {
            listener.publish_new_tariffs(&published).await;
        }
        self.ctx.broker_proxy.broadcast_tariffs(specifications).await;

        metrics::counter!("tariff_market_tariffs_published_total").increment(published.len() as u64);
        Ok(published)
    }
}

#[async_trait]
impl TimeslotPhaseProcessor for PublicationScheduler {
    async fn activate(&self, time: DateTime<Utc>, phase: u32) {
        let now = self.ctx.now();
        if !self.is_publication_boundary(now) {
            debug!(%time, phase, "not a publication boundary");
            return;
        }
        if let Err(e) = self.publish_pending_tariffs().await {
            error!(%time, error = %e, "tariff publication failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::market::testing::{Harness, RecordingListener};
    use rust_decimal::Decimal;

    fn scheduler(h: &Harness) -> PublicationScheduler {
        PublicationScheduler::new(h.ctx.clone())
    }

    #[tokio::test]
    async fn fires_only_on_interval_boundaries() {
        let h = Harness::new();
        let scheduler = scheduler(&h);
        let listener = Arc::new(RecordingListener::default());
        scheduler.register_new_tariff_listener(listener.clone()).await;

        for hour in [0, 3, 6, 9, 12] {
            h.set_hour(hour);
            scheduler.activate(h.now(), PublicationScheduler::PHASE).await;
        }

        assert_eq!(listener.batches().len(), 3);
        assert_eq!(h.proxy.broadcasts().len(), 3);
    }

    #[tokio::test]
    async fn boundary_is_clock_aligned_not_start_aligned() {
        let h = Harness::with_config(crate::config::MarketConfig::new(
            Decimal::ZERO,
            Decimal::ZERO,
            6,
        ));
        let scheduler = scheduler(&h);
        // base time is midnight, so 06:00 is a boundary and 01:00 + 6h is not
        assert!(scheduler.is_publication_boundary(h.at_hour(6)));
        assert!(!scheduler.is_publication_boundary(h.at_hour(7)));
        assert!(!scheduler.is_publication_boundary(h.at_hour(6) + chrono::Duration::minutes(15)));
    }

    #[tokio::test]
    async fn clamped_interval_publishes_daily() {
        let h = Harness::with_config(crate::config::MarketConfig::new(
            Decimal::ZERO,
            Decimal::ZERO,
            30,
        ));
        let scheduler = scheduler(&h);
        assert!(scheduler.is_publication_boundary(h.at_hour(24)));
        assert!(!scheduler.is_publication_boundary(h.at_hour(30)));
    }

    #[tokio::test]
    async fn pending_tariffs_become_offered_and_are_announced() {
        let h = Harness::new();
        h.store_tariff(h.spec(1)).await;
        h.store_tariff(h.spec(2)).await;
        let scheduler = scheduler(&h);
        let listener = Arc::new(RecordingListener::default());
        scheduler.register_new_tariff_listener(listener.clone()).await;

        h.set_hour(1);
        scheduler.activate(h.now(), PublicationScheduler::PHASE).await;
        assert_eq!(h.tariff(1).await.unwrap().state, TariffState::Pending);
        assert!(listener.batches().is_empty());

        h.set_hour(6);
        scheduler.activate(h.now(), PublicationScheduler::PHASE).await;
        assert_eq!(h.tariff(1).await.unwrap().state, TariffState::Offered);
        assert_eq!(h.tariff(2).await.unwrap().offered_at, Some(h.now()));

        let batches = listener.batches();
        assert_eq!(batches, vec![vec![1, 2]]);
        let broadcasts = h.proxy.broadcasts();
        assert_eq!(broadcasts.len(), 1);
        assert_eq!(
            broadcasts[0].iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[tokio::test]
    async fn offered_tariffs_are_not_republished() {
        let h = Harness::new();
        h.store_tariff(h.spec(1)).await;
        let scheduler = scheduler(&h);

        h.set_hour(6);
        assert_eq!(scheduler.publish_pending_tariffs().await.unwrap().len(), 1);
        h.set_hour(12);
        assert!(scheduler.publish_pending_tariffs().await.unwrap().is_empty());
    }
}
