//! Inbound ports: entry points the simulation uses to drive the market

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::BrokerMessage;

/// Receives messages delivered by the broker transport
#[async_trait]
pub trait BrokerMessageListener: Send + Sync {
    async fn handle_broker_message(&self, message: BrokerMessage);
}

/// Work scheduled at a fixed phase of every timeslot
#[async_trait]
pub trait TimeslotPhaseProcessor: Send + Sync {
    async fn activate(&self, time: DateTime<Utc>, phase: u32);
}

/// Simulation controller that advances the clock and runs phase processors
pub trait CompetitionControl: Send + Sync {
    fn register_timeslot_phase(&self, processor: Arc<dyn TimeslotPhaseProcessor>, phase: u32);
}
