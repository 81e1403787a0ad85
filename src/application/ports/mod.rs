//! Ports: narrow interfaces to the collaborators around the market
//!
//! - [`inbound`]: how the simulation drives the market (broker traffic,
//!   timeslot phases)
//! - [`outbound`]: what the market calls out to (clock, ledger, broker
//!   transport, customer listeners)

pub mod inbound;
pub mod outbound;

pub use inbound::{BrokerMessageListener, CompetitionControl, TimeslotPhaseProcessor};
pub use outbound::{Accounting, BrokerProxy, NewTariffListener, TimeService, HOUR_MILLIS};
