//! Trailbook — the interaction core of a mobile travel journal.
//!
//! The host app renders screens; this workspace owns the behavior behind its
//! guided interactions: the phase state machine ([`flow`]), the animation
//! timelines driving visual properties ([`timeline`]), the gesture-to-intent
//! adapter ([`gesture`]), and the injected side-effect seams ([`bridge`]).
//! The [`flows`] module holds the app's concrete flow definitions — the
//! trip-creation modal and the camera capture interaction — with their UX
//! tuning exposed as configuration.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod flows;

pub use bridge::{
    Bridge, BridgeError, EntityId, HapticKind, JsonStore, MediaPick, MediaRef, NavTarget,
};
pub use flow::{
    DraftField, FlowConfig, FlowController, FlowObserver, IgnoreReason, Intent, IntentOutcome,
    NullObserver, PhaseId, SessionOutcome, SessionSnapshot, TripDraft,
};
pub use gesture::{GestureAdapter, GestureConfig, GestureEvent};
pub use timeline::{Easing, Keyframe, SpringConfig, TimelineSet, TrackId, Transition};
