//! The camera capture interaction.
//!
//! A viewfinder fades in; tap fires the shutter, running a flash up/down
//! sequence with a haptic before a brief review pop, then the viewfinder
//! returns. Double-tap flips the camera facing, pinch drives the zoom as a
//! continuous control outside the phase machine.

use std::time::Duration;

use bridge::HapticKind;
use flow::{BindingAction, EntryAction, FlowConfig, IntentKind, PhaseSpec};
use serde::{Deserialize, Serialize};
use timeline::{Easing, Keyframe, SpringConfig, TrackId, Transition};

/// Phase ids of the flow.
pub mod phases {
    use flow::PhaseId;

    /// Camera screen mounted, sensor warming up.
    pub const INITIAL: PhaseId = PhaseId::new("initial");
    /// Live preview, ready to capture.
    pub const VIEWFINDER: PhaseId = PhaseId::new("viewfinder");
    /// Shutter fired; flash sequence playing.
    pub const CAPTURING: PhaseId = PhaseId::new("capturing");
    /// Captured thumbnail pops in for a moment.
    pub const REVIEW: PhaseId = PhaseId::new("review");
    /// Exit animation; session closed.
    pub const CLOSING: PhaseId = PhaseId::new("closing");
}

/// Track names the host binds to visual properties.
pub mod tracks {
    /// Live preview opacity.
    pub const PREVIEW: &str = "preview_opacity";
    /// White flash overlay opacity.
    pub const FLASH: &str = "flash";
    /// Review thumbnail scale.
    pub const THUMB_SCALE: &str = "thumb_scale";
    /// Zoom level, driven by pinch.
    pub const ZOOM: &str = "zoom";
}

/// Draft flag toggled by double-tap.
pub const FRONT_FACING_FLAG: &str = "front_facing";

/// UX tuning for the flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraCaptureTuning {
    /// Preview fade-in duration.
    pub warmup_fade: Duration,
    /// Flash ramp-up duration.
    pub flash_in: Duration,
    /// Flash decay duration.
    pub flash_out: Duration,
    /// Review thumbnail pop spring.
    pub thumb_spring: SpringConfig,
    /// How long the review thumbnail stays up.
    pub review_hold: Duration,
    /// Preview fade-out on close.
    pub exit_fade: Duration,
}

impl Default for CameraCaptureTuning {
    fn default() -> Self {
        Self {
            warmup_fade: Duration::from_millis(250),
            flash_in: Duration::from_millis(60),
            flash_out: Duration::from_millis(180),
            thumb_spring: SpringConfig::SNAPPY,
            review_hold: Duration::from_millis(1200),
            exit_fade: Duration::from_millis(150),
        }
    }
}

/// Build the flow definition.
pub fn flow(tuning: &CameraCaptureTuning) -> FlowConfig {
    use phases::*;

    FlowConfig::new("camera_capture", INITIAL, CLOSING)
        .phase(
            PhaseSpec::new(INITIAL)
                .entry(vec![
                    EntryAction::Set { track: TrackId::new(tracks::PREVIEW), value: 0.0 },
                    EntryAction::Set { track: TrackId::new(tracks::FLASH), value: 0.0 },
                ])
                .on(IntentKind::Open, BindingAction::Goto(VIEWFINDER))
                .goes_to(&[VIEWFINDER]),
        )
        .phase(
            PhaseSpec::new(VIEWFINDER)
                .entry(vec![EntryAction::Animate {
                    track: TrackId::new(tracks::PREVIEW),
                    to: 1.0,
                    transition: Transition::new(tuning.warmup_fade, Easing::EaseOutCubic),
                    carry_over: false,
                }])
                .on(IntentKind::SelectCover, BindingAction::Goto(CAPTURING))
                .on(
                    IntentKind::ToggleSecondaryMode,
                    BindingAction::ToggleFlag {
                        flag: FRONT_FACING_FLAG,
                        haptic: Some(HapticKind::Light),
                    },
                )
                .goes_to(&[CAPTURING]),
        )
        .phase(
            PhaseSpec::new(CAPTURING)
                .entry(vec![
                    EntryAction::Haptic(HapticKind::Medium),
                    EntryAction::Sequence {
                        track: TrackId::new(tracks::FLASH),
                        steps: vec![
                            Keyframe::new(1.0, Transition::new(tuning.flash_in, Easing::Linear)),
                            Keyframe::new(
                                0.0,
                                Transition::new(tuning.flash_out, Easing::EaseOutCubic),
                            ),
                        ],
                        carry_over: false,
                    },
                ])
                .advance_on_settle(REVIEW)
                .goes_to(&[REVIEW]),
        )
        .phase(
            PhaseSpec::new(REVIEW)
                .entry(vec![
                    EntryAction::Set { track: TrackId::new(tracks::THUMB_SCALE), value: 0.6 },
                    EntryAction::Animate {
                        track: TrackId::new(tracks::THUMB_SCALE),
                        to: 1.0,
                        transition: Transition::spring(tuning.thumb_spring),
                        carry_over: false,
                    },
                ])
                .auto_advance(VIEWFINDER, tuning.review_hold)
                .goes_to(&[VIEWFINDER]),
        )
        .phase(
            PhaseSpec::new(CLOSING)
                .terminal()
                .entry(vec![EntryAction::Animate {
                    track: TrackId::new(tracks::PREVIEW),
                    to: 0.0,
                    transition: Transition::new(tuning.exit_fade, Easing::EaseOutCubic),
                    carry_over: false,
                }]),
        )
        .control("zoom", TrackId::new(tracks::ZOOM))
}
