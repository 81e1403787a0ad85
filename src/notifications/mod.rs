//! Notifications
//!
//! Outbound market traffic (broker replies, tariff broadcasts, fee postings)
//! is published on an [`EventBus`] so that transports and observers can
//! subscribe without the market knowing about them.
//!
//! ```ignore
//! let bus = create_event_bus();
//! let mut subscriber = bus.subscribe();
//! while let Some(message) = subscriber.recv().await {
//!     println!("{}", message.event.event_type());
//! }
//! ```

pub mod event_bus;
pub mod events;

pub use event_bus::{create_event_bus, EventBus, EventSubscriber, SharedEventBus};
pub use events::*;
