//! Timeslot driver for running the market without a full competition

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use super::clock::SimulationClock;
use crate::application::ports::{CompetitionControl, TimeService, TimeslotPhaseProcessor};

type PhaseTable = BTreeMap<u32, Vec<Arc<dyn TimeslotPhaseProcessor>>>;

/// Activates registered processors phase by phase, one timeslot at a time.
pub struct SimulationDriver {
    clock: Arc<SimulationClock>,
    timeslot: Duration,
    phases: RwLock<PhaseTable>,
}

impl SimulationDriver {
    pub fn new(clock: Arc<SimulationClock>, timeslot: Duration) -> Self {
        Self {
            clock,
            timeslot,
            phases: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn processor_count(&self, phase: u32) -> usize {
        self.phases
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&phase)
            .map_or(0, Vec::len)
    }

    pub fn current_time(&self) -> DateTime<Utc> {
        self.clock.current_time()
    }

    /// Run every phase for the current timeslot, then advance the clock.
    ///
    /// Returns the time of the timeslot that was run.
    pub async fn step(&self) -> DateTime<Utc> {
        let now = self.clock.current_time();
        let phases: Vec<(u32, Vec<Arc<dyn TimeslotPhaseProcessor>>)> = self
            .phases
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(phase, processors)| (*phase, processors.clone()))
            .collect();

        debug!(%now, "timeslot start");
        for (phase, processors) in phases {
            for processor in processors {
                processor.activate(now, phase).await;
            }
        }
        self.clock.advance(self.timeslot);
        now
    }

    pub async fn run(&self, timeslots: u32) {
        info!(timeslots, start = %self.current_time(), "running simulation");
        for _ in 0..timeslots {
            self.step().await;
        }
    }
}

impl CompetitionControl for SimulationDriver {
    fn register_timeslot_phase(&self, processor: Arc<dyn TimeslotPhaseProcessor>, phase: u32) {
        self.phases
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(phase)
            .or_default()
            .push(processor);
    }
}
