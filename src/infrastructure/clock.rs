//! Simulation clock

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, Utc};

use crate::application::ports::TimeService;

/// Clock that only moves when the simulation moves it.
///
/// Stored as epoch milliseconds so it can be shared without locking.
pub struct SimulationClock {
    millis: AtomicI64,
}

impl SimulationClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(start.timestamp_millis()),
        }
    }

    pub fn set_current_time(&self, time: DateTime<Utc>) {
        self.millis.store(time.timestamp_millis(), Ordering::SeqCst);
    }

    /// Move the clock forward by `step` and return the new time
    pub fn advance(&self, step: Duration) -> DateTime<Utc> {
        let step = step.num_milliseconds();
        let millis = self.millis.fetch_add(step, Ordering::SeqCst) + step;
        from_millis(millis)
    }
}

impl TimeService for SimulationClock {
    fn current_time(&self) -> DateTime<Utc> {
        from_millis(self.millis.load(Ordering::SeqCst))
    }
}

fn from_millis(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or(DateTime::<Utc>::MAX_UTC)
}
