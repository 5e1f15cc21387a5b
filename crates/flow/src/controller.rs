//! The phase controller.
//!
//! Owns one interaction session: serializes phase transitions, runs entry
//! actions, arms auto-advance timers, and routes bridge results back into
//! the machine. Exactly one phase is active at any instant; transition
//! requests are validated against the current phase's allowed set and
//! invalid ones are a defensive no-op.
//!
//! Locking discipline: session state lives behind one lock that is never
//! held across an `.await`. Bridge calls capture the session epoch before
//! the lock is released; when they resolve they re-validate, and a result
//! from a closed session is discarded rather than applied.

use std::sync::Arc;
use std::time::Duration;

use bridge::{Bridge, HapticKind, MediaPick, NavTarget};
use parking_lot::Mutex;
use timeline::{TimelineEvent, TrackId};

use crate::draft::DraftField;
use crate::error::{FlowError, Result};
use crate::intent::{IgnoreReason, Intent, IntentOutcome};
use crate::observer::{FlowObserver, SessionOutcome};
use crate::phase::{BindingAction, EntryAction, FlowConfig, PhaseId, PhaseSpec};
use crate::session::{SessionSnapshot, SessionState};

/// Deferred observer/bridge work collected inside the state lock and
/// performed after it is released.
enum FlowEvent {
    PhaseChanged { from: PhaseId, to: PhaseId },
    Tick { track: TrackId, value: f64 },
    Error { phase: PhaseId, error: FlowError },
    Closed(SessionOutcome),
    Haptic(HapticKind),
}

/// A bridge-backed continuation, resolved with the lock released.
enum PendingWork {
    Pick {
        epoch: u64,
        busy: PhaseId,
        applied: PhaseId,
        fallback: PhaseId,
    },
    Persist {
        epoch: u64,
        busy: PhaseId,
        fallback: PhaseId,
        record: serde_json::Value,
    },
}

/// Drives one interaction session over a flow definition.
///
/// One controller manages one session, from open to close; create a fresh
/// controller for the next invocation of the interaction. Methods take
/// `&self`, so hosts share the controller behind an `Arc` between their
/// input, frame, and bridge-callback paths.
pub struct FlowController {
    config: Arc<FlowConfig>,
    bridge: Bridge,
    observer: Arc<dyn FlowObserver>,
    state: Mutex<SessionState>,
}

impl FlowController {
    /// Validate `config` and create a session resting in its initial phase.
    /// The initial phase's entry actions run immediately.
    pub fn new(
        config: FlowConfig,
        bridge: Bridge,
        observer: Arc<dyn FlowObserver>,
    ) -> Result<Self> {
        config.validate()?;
        let state = Mutex::new(SessionState::new(config.initial));
        let controller = Self { config: Arc::new(config), bridge, observer, state };

        let events = {
            let mut state = controller.state.lock();
            let mut events = Vec::new();
            if let Some(spec) = controller.config.get(controller.config.initial) {
                controller.enter_phase(&mut state, spec, &mut events);
            }
            events
        };
        controller.emit(events);
        Ok(controller)
    }

    /// The phase currently active.
    pub fn current_phase(&self) -> PhaseId {
        self.state.lock().phase
    }

    /// Whether the session has closed.
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Current value of an animated track.
    pub fn value(&self, track: &TrackId) -> Option<f64> {
        self.state.lock().timelines.value(track)
    }

    /// Read-only view of the session.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.lock().snapshot()
    }

    /// Submit one intent.
    ///
    /// Pure transitions resolve immediately; media picks and persists hold
    /// the session in their busy phase for as long as the bridge call takes,
    /// and this future resolves when the call does. A result that lands
    /// after the session closed is discarded and reported as
    /// [`IgnoreReason::Superseded`].
    pub async fn handle_intent(&self, intent: Intent) -> IntentOutcome {
        let (outcome, events, pending) = {
            let mut state = self.state.lock();
            if state.closed {
                return IntentOutcome::Ignored(IgnoreReason::SessionClosed);
            }
            let mut events = Vec::new();
            let mut pending = None;
            let outcome = match &intent {
                Intent::Cancel => self.apply_cancel(&mut state, &mut events),
                Intent::AdjustContinuous { control, value } => {
                    self.apply_adjust(&mut state, control, *value)
                }
                Intent::FormFieldChanged { field, value } => {
                    self.apply_form_field(&mut state, *field, value)
                }
                Intent::Open
                | Intent::SelectCover
                | Intent::Confirm
                | Intent::ToggleSecondaryMode => {
                    self.apply_bound(&mut state, &intent, &mut events, &mut pending)
                }
            };
            (outcome, events, pending)
        };
        self.emit(events);

        match pending {
            None => outcome,
            Some(PendingWork::Pick { epoch, busy, applied, fallback }) => {
                self.finish_pick(epoch, busy, applied, fallback).await
            }
            Some(PendingWork::Persist { epoch, busy, fallback, record }) => {
                self.finish_persist(epoch, busy, fallback, record).await
            }
        }
    }

    /// Advance the session's timelines to `now` (host-provided, monotonic)
    /// and fire any due settle- or timer-driven transitions.
    pub fn tick(&self, now: Duration) {
        let events = {
            let mut state = self.state.lock();
            let mut events = Vec::new();

            let timeline_events = state.timelines.advance(now);
            state.now = state.timelines.now();
            for event in timeline_events {
                if let TimelineEvent::Tick { track, value } = event {
                    events.push(FlowEvent::Tick { track, value });
                }
            }

            if !state.closed {
                self.check_settle_advance(&mut state, &mut events);
            }
            if !state.closed {
                if let Some((deadline, target)) = state.auto_advance {
                    if state.now >= deadline {
                        state.auto_advance = None;
                        self.request_transition(&mut state, target, &mut events);
                    }
                }
            }
            events
        };
        self.emit(events);
    }

    /// Force-close the session as cancelled (e.g. the app backgrounded).
    /// Idempotent; the closed event fires at most once.
    pub fn close(&self) {
        let events = {
            let mut state = self.state.lock();
            let mut events = Vec::new();
            self.close_session(&mut state, SessionOutcome::Cancelled, &mut events);
            events
        };
        self.emit(events);
    }

    fn apply_bound(
        &self,
        state: &mut SessionState,
        intent: &Intent,
        events: &mut Vec<FlowEvent>,
        pending: &mut Option<PendingWork>,
    ) -> IntentOutcome {
        let phase = state.phase;
        let not_allowed = IntentOutcome::Ignored(IgnoreReason::NotAllowed { phase });

        let Some(kind) = intent.kind() else {
            return not_allowed;
        };
        let Some(spec) = self.config.get(phase) else {
            return not_allowed;
        };
        let Some(action) = spec
            .bindings
            .iter()
            .find(|(bound, _)| *bound == kind)
            .map(|(_, action)| action.clone())
        else {
            tracing::debug!(
                flow = self.config.name,
                %phase,
                ?intent,
                "intent not bound in current phase"
            );
            return not_allowed;
        };

        match action {
            BindingAction::Goto(target) => {
                if self.request_transition(state, target, events) {
                    IntentOutcome::Applied
                } else {
                    not_allowed
                }
            }
            BindingAction::ToggleFlag { flag, haptic } => {
                let value = state.draft.toggle_flag(flag);
                tracing::debug!(flow = self.config.name, flag, value, "toggled secondary mode");
                if let Some(kind) = haptic {
                    events.push(FlowEvent::Haptic(kind));
                }
                IntentOutcome::Applied
            }
            BindingAction::PickMedia { busy, applied } => {
                if !self.request_transition(state, busy, events) {
                    return not_allowed;
                }
                *pending = Some(PendingWork::Pick {
                    epoch: state.epoch,
                    busy,
                    applied,
                    fallback: self.config.fallback_for(busy, phase),
                });
                IntentOutcome::Applied
            }
            BindingAction::Persist { busy } => {
                let missing = state.draft.missing(&self.config.required_fields);
                if !missing.is_empty() {
                    tracing::debug!(
                        flow = self.config.name,
                        ?missing,
                        "confirm refused; required fields missing"
                    );
                    return IntentOutcome::Ignored(IgnoreReason::MissingFields(missing));
                }
                if !self.request_transition(state, busy, events) {
                    return not_allowed;
                }
                *pending = Some(PendingWork::Persist {
                    epoch: state.epoch,
                    busy,
                    fallback: self.config.fallback_for(busy, phase),
                    record: state.draft.to_record(),
                });
                IntentOutcome::Applied
            }
        }
    }

    async fn finish_pick(
        &self,
        epoch: u64,
        busy: PhaseId,
        applied: PhaseId,
        fallback: PhaseId,
    ) -> IntentOutcome {
        let result = self.bridge.media.pick_media().await;

        let events = {
            let mut state = self.state.lock();
            if state.closed || state.epoch != epoch {
                tracing::debug!(flow = self.config.name, "discarding media pick; session moved on");
                return IntentOutcome::Ignored(IgnoreReason::Superseded);
            }
            let mut events = Vec::new();
            match result {
                Ok(MediaPick::Selected(media)) => {
                    state.draft.cover = Some(media);
                    self.request_transition(&mut state, applied, &mut events);
                }
                Ok(MediaPick::Cancelled) => {
                    tracing::debug!(flow = self.config.name, "media pick dismissed; falling back");
                    self.request_transition(&mut state, fallback, &mut events);
                }
                Err(source) => {
                    events.push(FlowEvent::Error {
                        phase: busy,
                        error: FlowError::Bridge { phase: busy, source },
                    });
                    self.request_transition(&mut state, fallback, &mut events);
                }
            }
            events
        };
        self.emit(events);
        IntentOutcome::Applied
    }

    async fn finish_persist(
        &self,
        epoch: u64,
        busy: PhaseId,
        fallback: PhaseId,
        record: serde_json::Value,
    ) -> IntentOutcome {
        let result = self.bridge.persistence.persist(record).await;

        let (events, navigate) = {
            let mut state = self.state.lock();
            if state.closed || state.epoch != epoch {
                tracing::debug!(
                    flow = self.config.name,
                    "discarding persist result; session moved on"
                );
                return IntentOutcome::Ignored(IgnoreReason::Superseded);
            }
            let mut events = Vec::new();
            let mut navigate = None;
            match result {
                Ok(entity) => {
                    navigate = self
                        .config
                        .confirm_route
                        .clone()
                        .map(|route| NavTarget::new(route).with_param("id", entity.to_string()));
                    self.close_session(
                        &mut state,
                        SessionOutcome::Confirmed { entity },
                        &mut events,
                    );
                }
                Err(source) => {
                    events.push(FlowEvent::Error {
                        phase: busy,
                        error: FlowError::Bridge { phase: busy, source },
                    });
                    self.request_transition(&mut state, fallback, &mut events);
                }
            }
            (events, navigate)
        };
        self.emit(events);

        if let Some(target) = navigate {
            if let Err(error) = self.bridge.navigator.navigate(target).await {
                // Session already closed with a confirmed outcome; log only.
                tracing::warn!(flow = self.config.name, %error, "post-confirm navigation failed");
            }
        }
        IntentOutcome::Applied
    }

    fn apply_cancel(&self, state: &mut SessionState, events: &mut Vec<FlowEvent>) -> IntentOutcome {
        let phase = state.phase;
        let dismissible = self
            .config
            .get(phase)
            .map_or(true, |spec| spec.dismissible && !spec.terminal);
        if !dismissible {
            tracing::debug!(flow = self.config.name, %phase, "cancel refused; phase not dismissible");
            return IntentOutcome::Ignored(IgnoreReason::NotAllowed { phase });
        }
        self.close_session(state, SessionOutcome::Cancelled, events);
        IntentOutcome::Applied
    }

    fn apply_adjust(
        &self,
        state: &mut SessionState,
        control: &str,
        value: f64,
    ) -> IntentOutcome {
        if !value.is_finite() {
            return IntentOutcome::Ignored(IgnoreReason::NonFinite);
        }
        let Some((_, track)) = self.config.controls.iter().find(|(name, _)| name == control)
        else {
            tracing::debug!(flow = self.config.name, control, "unknown continuous control");
            return IntentOutcome::Ignored(IgnoreReason::UnknownControl(control.to_string()));
        };
        // Continuous adjustments bypass the phase machine entirely.
        state.timelines.set(track.clone(), value.clamp(0.0, 1.0));
        IntentOutcome::Applied
    }

    fn apply_form_field(
        &self,
        state: &mut SessionState,
        field: DraftField,
        value: &str,
    ) -> IntentOutcome {
        let phase = state.phase;
        let accepts = self.config.get(phase).is_some_and(|spec| spec.accepts_input);
        if !accepts {
            tracing::debug!(
                flow = self.config.name,
                %phase,
                %field,
                "form input ignored outside editable phase"
            );
            return IntentOutcome::Ignored(IgnoreReason::NotAllowed { phase });
        }
        match state.draft.apply_field(field, value) {
            Ok(()) => IntentOutcome::Applied,
            Err(error) => {
                tracing::debug!(flow = self.config.name, %error, "rejected form value");
                IntentOutcome::Ignored(IgnoreReason::InvalidFieldValue {
                    field,
                    value: value.to_string(),
                })
            }
        }
    }

    /// Request a phase transition, validating against the current phase's
    /// allowed set. Invalid requests are a no-op. A request landing while a
    /// transition is being applied queues and re-validates against the phase
    /// it finds when it runs.
    fn request_transition(
        &self,
        state: &mut SessionState,
        target: PhaseId,
        events: &mut Vec<FlowEvent>,
    ) -> bool {
        if state.closed {
            return false;
        }
        if !self.allows(state.phase, target) {
            tracing::debug!(
                flow = self.config.name,
                from = %state.phase,
                to = %target,
                "ignoring invalid transition request"
            );
            return false;
        }
        if state.applying {
            state.queued.push_back(target);
            return true;
        }

        state.applying = true;
        self.apply_transition(state, target, events);
        while let Some(next) = state.queued.pop_front() {
            if state.closed {
                break;
            }
            if self.allows(state.phase, next) {
                self.apply_transition(state, next, events);
            } else {
                tracing::debug!(
                    flow = self.config.name,
                    from = %state.phase,
                    to = %next,
                    "dropping queued transition"
                );
            }
        }
        state.applying = false;
        true
    }

    fn allows(&self, from: PhaseId, to: PhaseId) -> bool {
        self.config
            .get(from)
            .is_some_and(|spec| spec.transitions.contains(&to))
    }

    fn apply_transition(
        &self,
        state: &mut SessionState,
        target: PhaseId,
        events: &mut Vec<FlowEvent>,
    ) {
        // Cancel the leaving phase's timelines, minus carry-overs.
        for (handle, carry_over) in std::mem::take(&mut state.entry_handles) {
            if !carry_over {
                state.timelines.cancel(handle);
            }
        }
        state.auto_advance = None;

        let from = state.phase;
        state.history.push(from);
        state.phase = target;
        events.push(FlowEvent::PhaseChanged { from, to: target });

        if let Some(spec) = self.config.get(target) {
            self.enter_phase(state, spec, events);
        }
    }

    /// Run a phase's entry actions in declared order and arm its timer.
    /// Entry actions schedule and return; nothing here blocks.
    fn enter_phase(&self, state: &mut SessionState, spec: &PhaseSpec, events: &mut Vec<FlowEvent>) {
        for action in &spec.entry {
            match action {
                EntryAction::Set { track, value } => state.timelines.set(track.clone(), *value),
                EntryAction::Animate { track, to, transition, carry_over } => {
                    let handle = state.timelines.animate_to(track.clone(), *to, *transition);
                    state.entry_handles.push((handle, *carry_over));
                }
                EntryAction::Sequence { track, steps, carry_over } => {
                    let handle = state.timelines.sequence(track.clone(), steps.clone());
                    state.entry_handles.push((handle, *carry_over));
                }
                EntryAction::Haptic(kind) => events.push(FlowEvent::Haptic(*kind)),
            }
        }
        if let Some(auto) = spec.auto_advance {
            state.auto_advance = Some((state.now + auto.after, auto.to));
        }
    }

    fn check_settle_advance(&self, state: &mut SessionState, events: &mut Vec<FlowEvent>) {
        let Some(spec) = self.config.get(state.phase) else { return };
        let Some(target) = spec.advance_on_settle else { return };

        let all_settled = state
            .entry_handles
            .iter()
            .filter(|(_, carry_over)| !carry_over)
            .all(|(handle, _)| state.timelines.is_settled(*handle));
        if all_settled {
            self.request_transition(state, target, events);
        }
    }

    /// Close the session: cancel every outstanding timeline and timer, bump
    /// the epoch so in-flight bridge results are discarded, and enter the
    /// closing phase. Idempotent; the closed event fires exactly once.
    fn close_session(
        &self,
        state: &mut SessionState,
        outcome: SessionOutcome,
        events: &mut Vec<FlowEvent>,
    ) {
        if state.closed {
            return;
        }
        state.closed = true;
        state.epoch += 1;
        state.auto_advance = None;
        state.queued.clear();
        state.timelines.cancel_all();
        state.entry_handles.clear();

        let from = state.phase;
        if from != self.config.closing {
            state.history.push(from);
            state.phase = self.config.closing;
            events.push(FlowEvent::PhaseChanged { from, to: self.config.closing });
            // The closing phase's exit animation still plays; it just cannot
            // transition anywhere.
            if let Some(spec) = self.config.get(self.config.closing) {
                self.enter_phase(state, spec, events);
            }
        }
        tracing::debug!(
            flow = self.config.name,
            session = %state.id,
            ?outcome,
            "session closed"
        );
        events.push(FlowEvent::Closed(outcome));
    }

    /// Fire deferred events. Runs with the state lock released so observer
    /// callbacks may call back into the controller.
    fn emit(&self, events: Vec<FlowEvent>) {
        for event in events {
            match event {
                FlowEvent::PhaseChanged { from, to } => self.observer.on_phase_changed(from, to),
                FlowEvent::Tick { track, value } => self.observer.on_timeline_tick(&track, value),
                FlowEvent::Error { phase, error } => {
                    tracing::warn!(flow = self.config.name, %phase, %error, "bridge failure; falling back");
                    self.observer.on_error(phase, &error);
                }
                FlowEvent::Closed(outcome) => self.observer.on_session_closed(&outcome),
                FlowEvent::Haptic(kind) => self.bridge.haptics.pulse(kind),
            }
        }
    }
}
