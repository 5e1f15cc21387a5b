//! Normalized user and system requests.
//!
//! Intents decouple the phase machine from raw input events: the gesture
//! adapter (or the host directly) submits intents, and the controller
//! decides validity against the current phase.

use crate::draft::DraftField;
use crate::phase::{IntentKind, PhaseId};

/// A normalized request to change interaction state.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Open the interaction (leave the initial phase).
    Open,
    /// Trigger the current phase's primary selection action, e.g. tapping
    /// the cover placeholder.
    SelectCover,
    /// Confirm the interaction and persist its payload.
    Confirm,
    /// Dismiss the interaction.
    Cancel,
    /// Toggle a secondary mode, e.g. camera facing.
    ToggleSecondaryMode,
    /// Adjust a continuous control. Applied directly to its value track,
    /// clamped to `[0, 1]`, without a phase transition.
    AdjustContinuous {
        /// Name of the continuous control.
        control: String,
        /// New normalized value.
        value: f64,
    },
    /// A form field changed while the draft is editable.
    FormFieldChanged {
        /// The field that changed.
        field: DraftField,
        /// Raw new value as entered by the user.
        value: String,
    },
}

impl Intent {
    /// The bindable discriminant of this intent, if phases may bind it.
    /// `Cancel`, continuous adjustments, and form input are handled
    /// globally and are never bound per phase.
    pub(crate) fn kind(&self) -> Option<IntentKind> {
        match self {
            Intent::Open => Some(IntentKind::Open),
            Intent::SelectCover => Some(IntentKind::SelectCover),
            Intent::Confirm => Some(IntentKind::Confirm),
            Intent::ToggleSecondaryMode => Some(IntentKind::ToggleSecondaryMode),
            Intent::Cancel
            | Intent::AdjustContinuous { .. }
            | Intent::FormFieldChanged { .. } => None,
        }
    }
}

/// Why an intent was ignored rather than applied.
#[derive(Debug, Clone, PartialEq)]
pub enum IgnoreReason {
    /// The session is already closed.
    SessionClosed,
    /// The current phase neither binds the intent nor permits its effect.
    NotAllowed {
        /// Phase that rejected the intent.
        phase: PhaseId,
    },
    /// Required draft fields are missing; confirmation refused. The host
    /// shows validation feedback from this list.
    MissingFields(Vec<DraftField>),
    /// The field value could not be parsed (e.g. a malformed date).
    InvalidFieldValue {
        /// The field being set.
        field: DraftField,
        /// The rejected raw value.
        value: String,
    },
    /// The continuous control is not registered for this flow.
    UnknownControl(String),
    /// The continuous value was not a finite number.
    NonFinite,
    /// The session closed while a bridge call was pending; its result was
    /// discarded. An expected race, not a fault.
    Superseded,
}

/// Outcome of submitting an intent.
#[derive(Debug, Clone, PartialEq)]
pub enum IntentOutcome {
    /// The intent was applied.
    Applied,
    /// The intent was ignored; phase state is unchanged.
    Ignored(IgnoreReason),
}

impl IntentOutcome {
    /// Whether the intent was applied.
    pub fn is_applied(&self) -> bool {
        matches!(self, IntentOutcome::Applied)
    }
}
