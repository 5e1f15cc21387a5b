//! The trip-creation ("new book") modal flow.
//!
//! The user taps create, a book card springs in over a fading backdrop,
//! they pick a cover image, the cover lands with a bounce and the book holds
//! briefly before opening into the trip form; a confirmed save persists the
//! draft and navigates to the new trip. Drag-to-dismiss cancels from any
//! non-terminal phase.

use std::time::Duration;

use bridge::HapticKind;
use flow::{BindingAction, DraftField, EntryAction, FlowConfig, IntentKind, PhaseSpec};
use serde::{Deserialize, Serialize};
use timeline::{Easing, Keyframe, SpringConfig, TrackId, Transition};

/// Phase ids of the flow.
pub mod phases {
    use flow::PhaseId;

    /// Modal mounted, nothing visible yet.
    pub const INITIAL: PhaseId = PhaseId::new("initial");
    /// Entrance animation: backdrop fade plus book zoom.
    pub const ZOOMING: PhaseId = PhaseId::new("zooming");
    /// Waiting for the user to pick a cover image.
    pub const COVER_SELECTION: PhaseId = PhaseId::new("cover_selection");
    /// Media picker open, cover loading.
    pub const COVER_UPLOADING: PhaseId = PhaseId::new("cover_uploading");
    /// Cover landed; bounce, then hold before the book opens.
    pub const COVER_APPLIED: PhaseId = PhaseId::new("cover_applied");
    /// Book-opening reveal animation.
    pub const OPENING: PhaseId = PhaseId::new("opening");
    /// Trip form fields editable.
    pub const FORM_ENTRY: PhaseId = PhaseId::new("form_entry");
    /// Persist in flight.
    pub const SAVING: PhaseId = PhaseId::new("saving");
    /// Exit animation; session closed.
    pub const CLOSING: PhaseId = PhaseId::new("closing");
}

/// Track names the host binds to visual properties.
pub mod tracks {
    /// Backdrop opacity behind the modal.
    pub const BACKDROP: &str = "backdrop";
    /// Book card scale.
    pub const SCALE: &str = "scale";
    /// Cover bounce scale.
    pub const COVER_SCALE: &str = "cover_scale";
    /// Indeterminate sweep while the picker is open.
    pub const UPLOAD_PROGRESS: &str = "upload_progress";
    /// Book opening reveal progress.
    pub const BOOK_OPEN: &str = "book_open";
    /// Sweep while the save is pending.
    pub const SAVE_PROGRESS: &str = "save_progress";
}

/// UX tuning for the flow.
///
/// Every duration here is product tuning, not a structural invariant; hosts
/// may load this from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookCreationTuning {
    /// Backdrop fade-in duration.
    pub backdrop_fade: Duration,
    /// Entrance spring for the book scale.
    pub entrance_spring: SpringConfig,
    /// Bounce spring when the cover lands.
    pub cover_spring: SpringConfig,
    /// Hold on the applied cover before the book opens.
    pub cover_hold: Duration,
    /// First stage of the opening reveal (the lift).
    pub opening_lift: Duration,
    /// Second stage of the opening reveal.
    pub opening_reveal: Duration,
    /// Progress sweep while the picker is open.
    pub upload_sweep: Duration,
    /// Progress sweep while the save is pending.
    pub saving_sweep: Duration,
    /// Exit fade duration.
    pub exit_fade: Duration,
    /// Route pushed after a confirmed save.
    pub detail_route: String,
}

impl Default for BookCreationTuning {
    fn default() -> Self {
        Self {
            backdrop_fade: Duration::from_millis(300),
            entrance_spring: SpringConfig::DEFAULT,
            cover_spring: SpringConfig::BOUNCY,
            cover_hold: Duration::from_millis(2000),
            opening_lift: Duration::from_millis(350),
            opening_reveal: Duration::from_millis(450),
            upload_sweep: Duration::from_millis(800),
            saving_sweep: Duration::from_millis(600),
            exit_fade: Duration::from_millis(200),
            detail_route: "trip_detail".to_string(),
        }
    }
}

/// Build the flow definition.
pub fn flow(tuning: &BookCreationTuning) -> FlowConfig {
    use phases::*;

    FlowConfig::new("book_creation", INITIAL, CLOSING)
        .phase(
            PhaseSpec::new(INITIAL)
                .entry(vec![
                    EntryAction::Set { track: TrackId::new(tracks::BACKDROP), value: 0.0 },
                    EntryAction::Set { track: TrackId::new(tracks::SCALE), value: 0.3 },
                ])
                .on(IntentKind::Open, BindingAction::Goto(ZOOMING))
                .goes_to(&[ZOOMING]),
        )
        .phase(
            PhaseSpec::new(ZOOMING)
                .entry(vec![
                    // The backdrop keeps fading while later phases take over.
                    EntryAction::Animate {
                        track: TrackId::new(tracks::BACKDROP),
                        to: 1.0,
                        transition: Transition::new(tuning.backdrop_fade, Easing::EaseOutCubic),
                        carry_over: true,
                    },
                    EntryAction::Animate {
                        track: TrackId::new(tracks::SCALE),
                        to: 1.0,
                        transition: Transition::spring(tuning.entrance_spring),
                        carry_over: false,
                    },
                    EntryAction::Haptic(HapticKind::Light),
                ])
                .advance_on_settle(COVER_SELECTION)
                .goes_to(&[COVER_SELECTION]),
        )
        .phase(
            PhaseSpec::new(COVER_SELECTION)
                .on(
                    IntentKind::SelectCover,
                    BindingAction::PickMedia { busy: COVER_UPLOADING, applied: COVER_APPLIED },
                )
                .goes_to(&[COVER_UPLOADING]),
        )
        .phase(
            PhaseSpec::new(COVER_UPLOADING)
                .entry(vec![
                    EntryAction::Set { track: TrackId::new(tracks::UPLOAD_PROGRESS), value: 0.0 },
                    EntryAction::Animate {
                        track: TrackId::new(tracks::UPLOAD_PROGRESS),
                        to: 1.0,
                        transition: Transition::new(tuning.upload_sweep, Easing::Linear),
                        carry_over: false,
                    },
                ])
                .fallback(COVER_SELECTION)
                .goes_to(&[COVER_APPLIED, COVER_SELECTION]),
        )
        .phase(
            PhaseSpec::new(COVER_APPLIED)
                .entry(vec![
                    EntryAction::Set { track: TrackId::new(tracks::COVER_SCALE), value: 1.12 },
                    EntryAction::Animate {
                        track: TrackId::new(tracks::COVER_SCALE),
                        to: 1.0,
                        transition: Transition::spring(tuning.cover_spring),
                        carry_over: false,
                    },
                    EntryAction::Haptic(HapticKind::Success),
                ])
                .auto_advance(OPENING, tuning.cover_hold)
                .goes_to(&[OPENING]),
        )
        .phase(
            PhaseSpec::new(OPENING)
                .entry(vec![EntryAction::Sequence {
                    track: TrackId::new(tracks::BOOK_OPEN),
                    steps: vec![
                        Keyframe::new(0.6, Transition::new(tuning.opening_lift, Easing::EaseOutCubic)),
                        Keyframe::new(
                            1.0,
                            Transition::new(tuning.opening_reveal, Easing::EaseInOutCubic),
                        ),
                    ],
                    carry_over: false,
                }])
                .advance_on_settle(FORM_ENTRY)
                .goes_to(&[FORM_ENTRY]),
        )
        .phase(
            PhaseSpec::new(FORM_ENTRY)
                .accepts_input()
                .on(IntentKind::Confirm, BindingAction::Persist { busy: SAVING })
                .goes_to(&[SAVING]),
        )
        .phase(
            PhaseSpec::new(SAVING)
                .entry(vec![
                    EntryAction::Set { track: TrackId::new(tracks::SAVE_PROGRESS), value: 0.0 },
                    EntryAction::Animate {
                        track: TrackId::new(tracks::SAVE_PROGRESS),
                        to: 1.0,
                        transition: Transition::new(tuning.saving_sweep, Easing::Linear),
                        carry_over: false,
                    },
                ])
                .fallback(FORM_ENTRY)
                .goes_to(&[FORM_ENTRY]),
        )
        .phase(
            PhaseSpec::new(CLOSING)
                .terminal()
                .entry(vec![EntryAction::Animate {
                    track: TrackId::new(tracks::BACKDROP),
                    to: 0.0,
                    transition: Transition::new(tuning.exit_fade, Easing::EaseOutCubic),
                    carry_over: false,
                }]),
        )
        .require(DraftField::Title)
        .require(DraftField::Cover)
        .navigate_on_confirm(tuning.detail_route.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_definition_validates() {
        flow(&BookCreationTuning::default()).validate().unwrap();
    }

    #[test]
    fn test_tuning_loads_from_config() {
        let tuning: BookCreationTuning = serde_json::from_str(
            r#"{
                "cover_hold": { "secs": 1, "nanos": 0 },
                "detail_route": "journal_entry"
            }"#,
        )
        .unwrap();

        assert_eq!(tuning.cover_hold, Duration::from_secs(1));
        assert_eq!(tuning.detail_route, "journal_entry");
        // Unspecified fields keep their defaults.
        assert_eq!(tuning.backdrop_fade, Duration::from_millis(300));

        flow(&tuning).validate().unwrap();
    }
}
