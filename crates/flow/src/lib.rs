//! Phased interaction controller for Trailbook
//!
//! This crate owns the state machine behind the app's guided interactions:
//! named phases with entry animations, guarded transitions, timed and
//! settle-driven auto-advance, draft assembly across phases, and the bridge
//! interplay for media picking and persistence. It knows nothing about
//! rendering; hosts subscribe to [`FlowObserver`] events and bind tracks to
//! visual properties.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod controller;
pub mod draft;
pub mod error;
pub mod intent;
pub mod observer;
pub mod phase;
pub mod session;
pub mod test_utils;

pub use controller::FlowController;
pub use draft::{DraftField, DraftFieldError, TripDraft};
pub use error::{FlowError, Result};
pub use intent::{IgnoreReason, Intent, IntentOutcome};
pub use observer::{FlowObserver, NullObserver, SessionOutcome};
pub use phase::{
    AutoAdvance, BindingAction, EntryAction, FlowConfig, IntentKind, PhaseId, PhaseSpec,
};
pub use session::SessionSnapshot;
