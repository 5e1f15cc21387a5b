//! Phase definitions for guided interactions.
//!
//! A flow is a set of named phases: each declares the timelines it starts on
//! entry, the phases it may transition to, the intents it binds, and how it
//! advances on its own (timer or settle). Definitions are plain data; the
//! controller interprets them.

use std::fmt;
use std::time::Duration;

use bridge::HapticKind;
use serde::{Serialize, Serializer};
use timeline::{Keyframe, TrackId, Transition};

use crate::draft::DraftField;
use crate::error::{FlowError, Result};

/// Stable identifier of one phase of a guided interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhaseId(&'static str);

impl PhaseId {
    /// Create a phase id from a stable static name.
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// The phase name.
    pub fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for PhaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl Serialize for PhaseId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

/// Work triggered automatically when a phase is entered.
///
/// Entry actions schedule and return; they never block the machine. They
/// start in declared order but run concurrently with each other.
#[derive(Debug, Clone)]
pub enum EntryAction {
    /// Immediately assign a track value.
    Set {
        /// Track to assign.
        track: TrackId,
        /// Value assigned.
        value: f64,
    },
    /// Start an eased or spring transition on a track.
    Animate {
        /// Track to animate.
        track: TrackId,
        /// Target value.
        to: f64,
        /// How to get there.
        transition: Transition,
        /// Keep running across the next phase transition instead of being
        /// cancelled with the rest of this phase's timelines. Used for
        /// continuous effects like a persistent backdrop fade.
        carry_over: bool,
    },
    /// Run ordered keyframes on a track.
    Sequence {
        /// Track to animate.
        track: TrackId,
        /// Steps, run strictly in order.
        steps: Vec<Keyframe>,
        /// Survives the next phase transition (see [`EntryAction::Animate`]).
        carry_over: bool,
    },
    /// Emit one haptic pulse.
    Haptic(HapticKind),
}

/// Scheduled transition out of a phase after a delay, unless something else
/// transitions first.
#[derive(Debug, Clone, Copy)]
pub struct AutoAdvance {
    /// Phase to advance to.
    pub to: PhaseId,
    /// Delay after phase entry.
    pub after: Duration,
}

/// Intents a phase may bind (payload-free discriminants of
/// [`Intent`](crate::Intent)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentKind {
    /// [`Intent::Open`](crate::Intent::Open).
    Open,
    /// [`Intent::SelectCover`](crate::Intent::SelectCover).
    SelectCover,
    /// [`Intent::Confirm`](crate::Intent::Confirm).
    Confirm,
    /// [`Intent::ToggleSecondaryMode`](crate::Intent::ToggleSecondaryMode).
    ToggleSecondaryMode,
}

/// What a bound intent does when it arrives in a phase.
#[derive(Debug, Clone)]
pub enum BindingAction {
    /// Transition to another phase.
    Goto(PhaseId),
    /// Open the media picker: hold in `busy` while the pick is pending,
    /// advance to `applied` on selection, fall back on cancel or failure.
    PickMedia {
        /// Phase held while the picker is open.
        busy: PhaseId,
        /// Phase entered once media is applied to the draft.
        applied: PhaseId,
    },
    /// Persist the draft: hold in `busy` while pending. Success closes the
    /// session as confirmed; failure falls back.
    Persist {
        /// Phase held while the persist is pending.
        busy: PhaseId,
    },
    /// Toggle a named draft flag, with optional haptic feedback.
    ToggleFlag {
        /// Flag name in the draft.
        flag: &'static str,
        /// Pulse emitted on toggle.
        haptic: Option<HapticKind>,
    },
}

/// Definition of one phase.
#[derive(Debug, Clone)]
pub struct PhaseSpec {
    /// Phase identifier.
    pub id: PhaseId,
    /// Work started on entry, in declared order.
    pub entry: Vec<EntryAction>,
    /// Phases reachable from here. Transition requests outside this set are
    /// ignored.
    pub transitions: Vec<PhaseId>,
    /// Intent bindings active while this phase is current.
    pub bindings: Vec<(IntentKind, BindingAction)>,
    /// Timed transition armed on entry.
    pub auto_advance: Option<AutoAdvance>,
    /// Transition fired once every non-carry-over entry timeline settles.
    pub advance_on_settle: Option<PhaseId>,
    /// Phase to return to when a bridge call fails while this phase is held.
    pub fallback: Option<PhaseId>,
    /// Whether `Cancel` may close the session from this phase.
    pub dismissible: bool,
    /// Whether form-field intents mutate the draft here.
    pub accepts_input: bool,
    /// Terminal phases end the session; nothing transitions out of them.
    pub terminal: bool,
}

impl PhaseSpec {
    /// Create a phase with no entry work and no outgoing transitions.
    pub fn new(id: PhaseId) -> Self {
        Self {
            id,
            entry: Vec::new(),
            transitions: Vec::new(),
            bindings: Vec::new(),
            auto_advance: None,
            advance_on_settle: None,
            fallback: None,
            dismissible: true,
            accepts_input: false,
            terminal: false,
        }
    }

    /// Set the entry actions.
    pub fn entry(mut self, actions: Vec<EntryAction>) -> Self {
        self.entry = actions;
        self
    }

    /// Allow transitions to `targets`.
    pub fn goes_to(mut self, targets: &[PhaseId]) -> Self {
        self.transitions.extend_from_slice(targets);
        self
    }

    /// Bind an intent to an action while this phase is current.
    pub fn on(mut self, intent: IntentKind, action: BindingAction) -> Self {
        self.bindings.push((intent, action));
        self
    }

    /// Arm a timed transition on entry.
    pub fn auto_advance(mut self, to: PhaseId, after: Duration) -> Self {
        self.auto_advance = Some(AutoAdvance { to, after });
        self
    }

    /// Transition once every non-carry-over entry timeline settles.
    pub fn advance_on_settle(mut self, to: PhaseId) -> Self {
        self.advance_on_settle = Some(to);
        self
    }

    /// Phase to return to when a bridge call fails here.
    pub fn fallback(mut self, to: PhaseId) -> Self {
        self.fallback = Some(to);
        self
    }

    /// Refuse `Cancel` while this phase is current.
    pub fn not_dismissible(mut self) -> Self {
        self.dismissible = false;
        self
    }

    /// Accept form-field intents while this phase is current.
    pub fn accepts_input(mut self) -> Self {
        self.accepts_input = true;
        self
    }

    /// Mark this phase terminal.
    pub fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }
}

/// Complete definition of a guided interaction flow.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Flow name, used in logs.
    pub name: &'static str,
    /// Phase the session starts in.
    pub initial: PhaseId,
    /// Terminal phase entered when the session closes. Reached only through
    /// cancel, confirmed persistence, or a forced host close — never through
    /// a plain transition.
    pub closing: PhaseId,
    /// All phases.
    pub phases: Vec<PhaseSpec>,
    /// Draft fields required before `Confirm` is accepted.
    pub required_fields: Vec<DraftField>,
    /// Continuous controls adjustable at any time, mapped to their track.
    pub controls: Vec<(String, TrackId)>,
    /// Route navigated to after a confirmed close, with the new entity id as
    /// the `id` parameter.
    pub confirm_route: Option<String>,
}

impl FlowConfig {
    /// Create an empty flow definition.
    pub fn new(name: &'static str, initial: PhaseId, closing: PhaseId) -> Self {
        Self {
            name,
            initial,
            closing,
            phases: Vec::new(),
            required_fields: Vec::new(),
            controls: Vec::new(),
            confirm_route: None,
        }
    }

    /// Add a phase.
    pub fn phase(mut self, spec: PhaseSpec) -> Self {
        self.phases.push(spec);
        self
    }

    /// Require a draft field before `Confirm` is accepted.
    pub fn require(mut self, field: DraftField) -> Self {
        self.required_fields.push(field);
        self
    }

    /// Register a continuous control driving a track.
    pub fn control(mut self, name: impl Into<String>, track: TrackId) -> Self {
        self.controls.push((name.into(), track));
        self
    }

    /// Navigate to `route` after a confirmed close.
    pub fn navigate_on_confirm(mut self, route: impl Into<String>) -> Self {
        self.confirm_route = Some(route.into());
        self
    }

    /// Look up a phase definition.
    pub fn get(&self, id: PhaseId) -> Option<&PhaseSpec> {
        self.phases.iter().find(|phase| phase.id == id)
    }

    /// The fallback target used when a bridge call fails while `busy` is
    /// held: the busy phase's declared fallback, else the phase the call was
    /// requested from.
    pub(crate) fn fallback_for(&self, busy: PhaseId, origin: PhaseId) -> PhaseId {
        self.get(busy).and_then(|spec| spec.fallback).unwrap_or(origin)
    }

    /// Validate structural integrity of the definition.
    pub fn validate(&self) -> Result<()> {
        let exists = |id: PhaseId| self.get(id).is_some();

        if !exists(self.initial) {
            return Err(FlowError::UnknownPhase(self.initial));
        }
        let closing = self
            .get(self.closing)
            .ok_or(FlowError::UnknownPhase(self.closing))?;
        if !closing.terminal {
            return Err(FlowError::InvalidDefinition(format!(
                "closing phase `{}` is not terminal",
                self.closing
            )));
        }

        for (index, phase) in self.phases.iter().enumerate() {
            if self.phases[..index].iter().any(|other| other.id == phase.id) {
                return Err(FlowError::InvalidDefinition(format!(
                    "duplicate phase `{}`",
                    phase.id
                )));
            }

            for &target in &phase.transitions {
                if !exists(target) {
                    return Err(FlowError::UnknownPhase(target));
                }
            }

            if phase.terminal {
                if !phase.transitions.is_empty()
                    || phase.auto_advance.is_some()
                    || phase.advance_on_settle.is_some()
                {
                    return Err(FlowError::InvalidDefinition(format!(
                        "terminal phase `{}` declares outgoing transitions",
                        phase.id
                    )));
                }
                continue;
            }

            if let Some(auto) = phase.auto_advance {
                self.check_plain_target(phase, auto.to)?;
            }
            if let Some(target) = phase.advance_on_settle {
                self.check_plain_target(phase, target)?;
            }
            if let Some(fallback) = phase.fallback {
                if !exists(fallback) {
                    return Err(FlowError::UnknownPhase(fallback));
                }
            }

            for (_, action) in &phase.bindings {
                match action {
                    BindingAction::Goto(target) => self.check_plain_target(phase, *target)?,
                    BindingAction::PickMedia { busy, applied } => {
                        self.check_plain_target(phase, *busy)?;
                        self.check_busy_exits(phase, *busy, Some(*applied))?;
                    }
                    BindingAction::Persist { busy } => {
                        self.check_plain_target(phase, *busy)?;
                        self.check_busy_exits(phase, *busy, None)?;
                    }
                    BindingAction::ToggleFlag { .. } => {}
                }
            }
        }
        Ok(())
    }

    /// A transition target must exist, be non-terminal, and be listed in the
    /// origin phase's allowed transitions.
    fn check_plain_target(&self, origin: &PhaseSpec, target: PhaseId) -> Result<()> {
        let spec = self.get(target).ok_or(FlowError::UnknownPhase(target))?;
        if spec.terminal {
            return Err(FlowError::InvalidDefinition(format!(
                "`{}` targets terminal phase `{}`; terminal phases are reached only by closing the session",
                origin.id, target
            )));
        }
        if !origin.transitions.contains(&target) {
            return Err(FlowError::InvalidTransition { from: origin.id, to: target });
        }
        Ok(())
    }

    /// A busy phase must be able to reach its success target and its
    /// fallback, or the session would strand there.
    fn check_busy_exits(
        &self,
        origin: &PhaseSpec,
        busy: PhaseId,
        applied: Option<PhaseId>,
    ) -> Result<()> {
        let busy_spec = self.get(busy).ok_or(FlowError::UnknownPhase(busy))?;
        if let Some(applied) = applied {
            self.check_plain_target(busy_spec, applied)?;
        }
        let fallback = self.fallback_for(busy, origin.id);
        self.check_plain_target(busy_spec, fallback)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: PhaseId = PhaseId::new("a");
    const B: PhaseId = PhaseId::new("b");
    const BUSY: PhaseId = PhaseId::new("busy");
    const END: PhaseId = PhaseId::new("end");

    fn minimal() -> FlowConfig {
        FlowConfig::new("test", A, END)
            .phase(PhaseSpec::new(A).goes_to(&[B]))
            .phase(PhaseSpec::new(B))
            .phase(PhaseSpec::new(END).terminal())
    }

    #[test]
    fn test_minimal_flow_validates() {
        minimal().validate().unwrap();
    }

    #[test]
    fn test_unknown_transition_target_rejected() {
        let config = FlowConfig::new("test", A, END)
            .phase(PhaseSpec::new(A).goes_to(&[PhaseId::new("ghost")]))
            .phase(PhaseSpec::new(END).terminal());

        assert!(matches!(config.validate(), Err(FlowError::UnknownPhase(_))));
    }

    #[test]
    fn test_closing_must_be_terminal() {
        let config = FlowConfig::new("test", A, B)
            .phase(PhaseSpec::new(A))
            .phase(PhaseSpec::new(B));

        assert!(matches!(config.validate(), Err(FlowError::InvalidDefinition(_))));
    }

    #[test]
    fn test_terminal_phase_cannot_transition_out() {
        let config = FlowConfig::new("test", A, END)
            .phase(PhaseSpec::new(A))
            .phase(PhaseSpec::new(END).terminal().goes_to(&[A]));

        assert!(matches!(config.validate(), Err(FlowError::InvalidDefinition(_))));
    }

    #[test]
    fn test_auto_advance_must_be_allowed_transition() {
        let config = FlowConfig::new("test", A, END)
            .phase(PhaseSpec::new(A).auto_advance(B, Duration::from_millis(100)))
            .phase(PhaseSpec::new(B))
            .phase(PhaseSpec::new(END).terminal());

        assert!(matches!(config.validate(), Err(FlowError::InvalidTransition { .. })));
    }

    #[test]
    fn test_busy_phase_must_reach_applied_and_fallback() {
        // BUSY can reach B (applied) but not A (the fallback origin).
        let config = FlowConfig::new("test", A, END)
            .phase(
                PhaseSpec::new(A)
                    .on(IntentKind::SelectCover, BindingAction::PickMedia { busy: BUSY, applied: B })
                    .goes_to(&[BUSY]),
            )
            .phase(PhaseSpec::new(BUSY).goes_to(&[B]))
            .phase(PhaseSpec::new(B))
            .phase(PhaseSpec::new(END).terminal());

        assert!(config.validate().is_err());

        let fixed = FlowConfig::new("test", A, END)
            .phase(
                PhaseSpec::new(A)
                    .on(IntentKind::SelectCover, BindingAction::PickMedia { busy: BUSY, applied: B })
                    .goes_to(&[BUSY]),
            )
            .phase(PhaseSpec::new(BUSY).goes_to(&[A, B]))
            .phase(PhaseSpec::new(B))
            .phase(PhaseSpec::new(END).terminal());

        fixed.validate().unwrap();
    }

    #[test]
    fn test_goto_terminal_rejected() {
        let config = FlowConfig::new("test", A, END)
            .phase(
                PhaseSpec::new(A)
                    .on(IntentKind::Open, BindingAction::Goto(END))
                    .goes_to(&[END]),
            )
            .phase(PhaseSpec::new(END).terminal());

        assert!(matches!(config.validate(), Err(FlowError::InvalidDefinition(_))));
    }
}
