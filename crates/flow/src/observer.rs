//! Host-facing event surface.
//!
//! The host UI subscribes to these events to drive actual pixel rendering;
//! the controller itself never touches a rendering surface.

use bridge::EntityId;
use timeline::TrackId;

use crate::error::FlowError;
use crate::phase::PhaseId;

/// Result of a completed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The user confirmed; the payload was persisted under `entity`.
    Confirmed {
        /// Identifier of the persisted record.
        entity: EntityId,
    },
    /// The user dismissed, or the host force-closed the interaction.
    Cancelled,
}

/// Events the host UI subscribes to.
///
/// Callbacks run outside the controller's internal lock, in the order the
/// events occurred. Default implementations do nothing, so hosts implement
/// only what they render.
pub trait FlowObserver: Send + Sync {
    /// The current phase changed.
    fn on_phase_changed(&self, from: PhaseId, to: PhaseId) {
        let _ = (from, to);
    }

    /// A running timeline produced a new value this tick.
    fn on_timeline_tick(&self, track: &TrackId, value: f64) {
        let _ = (track, value);
    }

    /// A non-fatal error occurred; the session remains usable.
    fn on_error(&self, phase: PhaseId, error: &FlowError) {
        let _ = (phase, error);
    }

    /// The session closed. Fires exactly once per session.
    fn on_session_closed(&self, outcome: &SessionOutcome) {
        let _ = outcome;
    }
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl FlowObserver for NullObserver {}
