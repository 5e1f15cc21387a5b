//! Observer fakes for exercising flows in tests.

use std::sync::Mutex;

use timeline::TrackId;

use crate::error::FlowError;
use crate::observer::{FlowObserver, SessionOutcome};
use crate::phase::PhaseId;

/// Observer that records every event it receives.
#[derive(Default)]
pub struct RecordingObserver {
    phase_changes: Mutex<Vec<(PhaseId, PhaseId)>>,
    errors: Mutex<Vec<String>>,
    closed: Mutex<Vec<SessionOutcome>>,
    ticks: Mutex<usize>,
}

impl RecordingObserver {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every phase change so far, oldest first.
    pub fn phase_changes(&self) -> Vec<(PhaseId, PhaseId)> {
        self.phase_changes.lock().unwrap().clone()
    }

    /// Rendered message of every error so far.
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    /// Every close outcome so far. More than one entry is a bug.
    pub fn closed(&self) -> Vec<SessionOutcome> {
        self.closed.lock().unwrap().clone()
    }

    /// Number of timeline ticks observed.
    pub fn tick_count(&self) -> usize {
        *self.ticks.lock().unwrap()
    }
}

impl FlowObserver for RecordingObserver {
    fn on_phase_changed(&self, from: PhaseId, to: PhaseId) {
        self.phase_changes.lock().unwrap().push((from, to));
    }

    fn on_timeline_tick(&self, _track: &TrackId, _value: f64) {
        *self.ticks.lock().unwrap() += 1;
    }

    fn on_error(&self, _phase: PhaseId, error: &FlowError) {
        self.errors.lock().unwrap().push(error.to_string());
    }

    fn on_session_closed(&self, outcome: &SessionOutcome) {
        self.closed.lock().unwrap().push(outcome.clone());
    }
}
