//! Notification events
//!
//! Everything the market sends outward, as seen by bus subscribers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Broker, TariffId, TariffSpecification, TariffStatus, TariffTransactionType,
};

/// Event types for notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    /// Reply sent to a single broker
    TariffStatusSent(TariffStatusSentEvent),
    /// Batch of new specifications broadcast to all brokers
    TariffsPublished(TariffsPublishedEvent),
    /// Fee posted to the ledger
    TariffTransactionPosted(TariffTransactionPostedEvent),
}

impl Event {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::TariffStatusSent(_) => "tariff_status_sent",
            Event::TariffsPublished(_) => "tariffs_published",
            Event::TariffTransactionPosted(_) => "tariff_transaction_posted",
        }
    }

    /// Broker the event is addressed to, if any
    pub fn broker(&self) -> Option<&Broker> {
        match self {
            Event::TariffStatusSent(e) => Some(&e.broker),
            Event::TariffsPublished(_) => None,
            Event::TariffTransactionPosted(e) => Some(&e.broker),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffStatusSentEvent {
    pub broker: Broker,
    pub status: TariffStatus,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffsPublishedEvent {
    pub specifications: Vec<TariffSpecification>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffTransactionPostedEvent {
    pub transaction_id: i64,
    pub kind: TariffTransactionType,
    pub tariff_id: TariffId,
    pub broker: Broker,
    pub charge: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// Event envelope with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    /// Unique event ID
    pub id: String,
    /// Event timestamp
    pub timestamp: DateTime<Utc>,
    /// Event payload
    #[serde(flatten)]
    pub event: Event,
}

impl EventMessage {
    pub fn new(event: Event) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event,
        }
    }
}
