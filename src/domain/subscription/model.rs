//! Tariff subscription entity

use serde::{Deserialize, Serialize};

use crate::domain::tariff::TariffId;
use crate::domain::{CustomerInfo, DomainError, DomainResult};

/// Binding between one customer model and one tariff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffSubscription {
    pub customer: CustomerInfo,
    pub tariff_id: TariffId,
    pub customers_committed: u32,
}

impl TariffSubscription {
    pub fn new(customer: CustomerInfo, tariff_id: TariffId) -> Self {
        Self {
            customer,
            tariff_id,
            customers_committed: 0,
        }
    }

    pub fn subscribe(&mut self, customer_count: u32) {
        self.customers_committed = self.customers_committed.saturating_add(customer_count);
    }

    pub fn unsubscribe(&mut self, customer_count: u32) -> DomainResult<()> {
        if customer_count > self.customers_committed {
            return Err(DomainError::Validation(format!(
                "cannot remove {} customers from subscription to tariff {} with {} committed",
                customer_count, self.tariff_id, self.customers_committed
            )));
        }
        self.customers_committed -= customer_count;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.customers_committed > 0
    }
}
