//! Interaction session state.
//!
//! One session spans one invocation of an interaction, from open to close.
//! The session exclusively owns its timelines — none outlives it — and the
//! controller is the sole mutator of its phase and draft.

use std::collections::VecDeque;
use std::time::Duration;

use serde::Serialize;
use timeline::{HandleId, TimelineSet};
use uuid::Uuid;

use crate::draft::TripDraft;
use crate::phase::PhaseId;

/// Mutable state of one interaction session. Internal to the controller.
#[derive(Debug)]
pub(crate) struct SessionState {
    pub id: Uuid,
    pub phase: PhaseId,
    /// Past phases, oldest first, for debugging and telemetry.
    pub history: Vec<PhaseId>,
    pub draft: TripDraft,
    pub timelines: TimelineSet,
    /// Timeline time as of the last tick.
    pub now: Duration,
    /// Bumped on close; pending bridge results from an older epoch are
    /// discarded instead of being applied to a destroyed session.
    pub epoch: u64,
    pub closed: bool,
    /// Armed auto-advance timer: fire deadline and target.
    pub auto_advance: Option<(Duration, PhaseId)>,
    /// Timelines started by the current phase's entry actions, with their
    /// carry-over flag.
    pub entry_handles: Vec<(HandleId, bool)>,
    /// Transition requests that arrived while one was being applied.
    pub queued: VecDeque<PhaseId>,
    pub applying: bool,
}

impl SessionState {
    pub fn new(initial: PhaseId) -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: initial,
            history: Vec::new(),
            draft: TripDraft::new(),
            timelines: TimelineSet::new(),
            now: Duration::ZERO,
            epoch: 0,
            closed: false,
            auto_advance: None,
            entry_handles: Vec::new(),
            queued: VecDeque::new(),
            applying: false,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            phase: self.phase,
            history: self.history.clone(),
            closed: self.closed,
            draft: self.draft.clone(),
        }
    }
}

/// Read-only view of a session for debugging and host rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    /// Session identifier.
    pub id: Uuid,
    /// Current phase.
    pub phase: PhaseId,
    /// Past phases, oldest first.
    pub history: Vec<PhaseId>,
    /// Whether the session has closed.
    pub closed: bool,
    /// Current draft payload.
    pub draft: TripDraft,
}
