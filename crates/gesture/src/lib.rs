//! Gesture-to-intent mapping for Trailbook
//!
//! Translates recognized gesture primitives (tap, pan, pinch, long-press)
//! into controller intents. Recognition tuning — thresholds, windows, scale
//! ranges — lives here and is host-configurable; phase semantics stay in the
//! controller, which decides whether an emitted intent is valid. The adapter
//! never touches timelines or phase state.

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::time::Duration;

use flow::Intent;
use serde::{Deserialize, Serialize};

/// Tunable recognition thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Accumulated pan displacement (logical px) beyond which a drag
    /// dismisses the interaction.
    pub dismiss_distance: f64,
    /// Pan velocity (logical px/s) beyond which a fling dismisses.
    pub dismiss_velocity: f64,
    /// Maximum gap between two taps that still forms a double-tap.
    pub double_tap_window: Duration,
    /// Pinch scale mapped to 0.0 of the continuous control.
    pub pinch_min_scale: f64,
    /// Pinch scale mapped to 1.0 of the continuous control.
    pub pinch_max_scale: f64,
    /// Continuous control driven by pinch.
    pub pinch_control: String,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            dismiss_distance: 120.0,
            dismiss_velocity: 800.0,
            double_tap_window: Duration::from_millis(250),
            pinch_min_scale: 1.0,
            pinch_max_scale: 3.0,
            pinch_control: "zoom".to_string(),
        }
    }
}

/// A recognized gesture primitive from the host input framework.
///
/// Timestamps are host-provided monotonic time, the same clock the
/// controller is ticked with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// Single tap.
    Tap {
        /// Event timestamp.
        at: Duration,
    },
    /// Long press. Recognized but unbound by default.
    LongPress {
        /// Event timestamp.
        at: Duration,
    },
    /// Pan update with incremental displacement and current velocity.
    Pan {
        /// Displacement since the previous pan event, x axis.
        dx: f64,
        /// Displacement since the previous pan event, y axis.
        dy: f64,
        /// Current gesture velocity in px/s.
        velocity: f64,
    },
    /// The pan gesture ended or was interrupted.
    PanEnded,
    /// Pinch update with the current cumulative scale factor.
    Pinch {
        /// Cumulative scale relative to gesture start.
        scale: f64,
    },
}

/// Translates raw gesture primitives into controller intents.
///
/// Owns recognition state (double-tap window, accumulated pan displacement)
/// but never phase state. A tap eagerly emits [`Intent::SelectCover`]; if a
/// second tap lands inside the double-tap window it emits
/// [`Intent::ToggleSecondaryMode`] instead — the controller's guards make
/// the eager first emission harmless in phases that do not bind it.
#[derive(Debug, Clone)]
pub struct GestureAdapter {
    config: GestureConfig,
    last_tap: Option<Duration>,
    pan_dx: f64,
    pan_dy: f64,
    dismissed_this_pan: bool,
}

impl GestureAdapter {
    /// Create an adapter with the given tuning.
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            last_tap: None,
            pan_dx: 0.0,
            pan_dy: 0.0,
            dismissed_this_pan: false,
        }
    }

    /// The active tuning.
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Map one gesture primitive to an intent, if any.
    pub fn map(&mut self, event: GestureEvent) -> Option<Intent> {
        match event {
            GestureEvent::Tap { at } => {
                if let Some(previous) = self.last_tap.take() {
                    if at.saturating_sub(previous) <= self.config.double_tap_window {
                        tracing::debug!("double tap");
                        return Some(Intent::ToggleSecondaryMode);
                    }
                }
                self.last_tap = Some(at);
                Some(Intent::SelectCover)
            }
            GestureEvent::LongPress { .. } => None,
            GestureEvent::Pan { dx, dy, velocity } => {
                self.pan_dx += dx;
                self.pan_dy += dy;
                if self.dismissed_this_pan {
                    return None;
                }
                let distance = (self.pan_dx * self.pan_dx + self.pan_dy * self.pan_dy).sqrt();
                if distance >= self.config.dismiss_distance
                    || velocity.abs() >= self.config.dismiss_velocity
                {
                    self.dismissed_this_pan = true;
                    tracing::debug!(distance, velocity, "pan crossed dismiss threshold");
                    return Some(Intent::Cancel);
                }
                None
            }
            GestureEvent::PanEnded => {
                self.pan_dx = 0.0;
                self.pan_dy = 0.0;
                self.dismissed_this_pan = false;
                None
            }
            GestureEvent::Pinch { scale } => {
                let span = self.config.pinch_max_scale - self.config.pinch_min_scale;
                if !scale.is_finite() || span <= 0.0 {
                    tracing::debug!(scale, "ignoring degenerate pinch");
                    return None;
                }
                let value = ((scale - self.config.pinch_min_scale) / span).clamp(0.0, 1.0);
                Some(Intent::AdjustContinuous {
                    control: self.config.pinch_control.clone(),
                    value,
                })
            }
        }
    }

    /// Drop all recognition state, e.g. when the interaction closes.
    pub fn reset(&mut self) {
        self.last_tap = None;
        self.pan_dx = 0.0;
        self.pan_dy = 0.0;
        self.dismissed_this_pan = false;
    }
}

impl Default for GestureAdapter {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_double_tap_toggles_secondary_mode() {
        let mut adapter = GestureAdapter::default();

        assert_eq!(adapter.map(GestureEvent::Tap { at: ms(1000) }), Some(Intent::SelectCover));
        assert_eq!(
            adapter.map(GestureEvent::Tap { at: ms(1150) }),
            Some(Intent::ToggleSecondaryMode)
        );
    }

    #[test]
    fn test_slow_taps_stay_single() {
        let mut adapter = GestureAdapter::default();

        assert_eq!(adapter.map(GestureEvent::Tap { at: ms(1000) }), Some(Intent::SelectCover));
        assert_eq!(adapter.map(GestureEvent::Tap { at: ms(1600) }), Some(Intent::SelectCover));
    }

    #[test]
    fn test_pan_distance_accumulates_to_dismiss() {
        let mut adapter = GestureAdapter::default();

        for _ in 0..5 {
            assert_eq!(
                adapter.map(GestureEvent::Pan { dx: 0.0, dy: 20.0, velocity: 50.0 }),
                None
            );
        }
        // Sixth update crosses the 120px default threshold.
        assert_eq!(
            adapter.map(GestureEvent::Pan { dx: 0.0, dy: 20.0, velocity: 50.0 }),
            Some(Intent::Cancel)
        );
        // Cancel fires once per pan gesture.
        assert_eq!(
            adapter.map(GestureEvent::Pan { dx: 0.0, dy: 20.0, velocity: 50.0 }),
            None
        );
    }

    #[test]
    fn test_fling_velocity_dismisses_immediately() {
        let mut adapter = GestureAdapter::default();

        assert_eq!(
            adapter.map(GestureEvent::Pan { dx: 2.0, dy: 5.0, velocity: 900.0 }),
            Some(Intent::Cancel)
        );
    }

    #[test]
    fn test_pan_end_resets_accumulation() {
        let mut adapter = GestureAdapter::default();

        adapter.map(GestureEvent::Pan { dx: 0.0, dy: 100.0, velocity: 50.0 });
        adapter.map(GestureEvent::PanEnded);

        // A fresh pan starts from zero displacement.
        assert_eq!(
            adapter.map(GestureEvent::Pan { dx: 0.0, dy: 100.0, velocity: 50.0 }),
            None
        );
    }

    #[test]
    fn test_pinch_normalizes_and_clamps() {
        let mut adapter = GestureAdapter::default();

        assert_eq!(
            adapter.map(GestureEvent::Pinch { scale: 2.0 }),
            Some(Intent::AdjustContinuous { control: "zoom".to_string(), value: 0.5 })
        );
        assert_eq!(
            adapter.map(GestureEvent::Pinch { scale: 9.0 }),
            Some(Intent::AdjustContinuous { control: "zoom".to_string(), value: 1.0 })
        );
        assert_eq!(
            adapter.map(GestureEvent::Pinch { scale: 0.2 }),
            Some(Intent::AdjustContinuous { control: "zoom".to_string(), value: 0.0 })
        );
    }

    #[test]
    fn test_degenerate_pinch_ignored() {
        let mut adapter = GestureAdapter::default();
        assert_eq!(adapter.map(GestureEvent::Pinch { scale: f64::NAN }), None);
    }

    #[test]
    fn test_long_press_unbound() {
        let mut adapter = GestureAdapter::default();
        assert_eq!(adapter.map(GestureEvent::LongPress { at: ms(500) }), None);
    }

    #[test]
    fn test_reset_clears_double_tap_window() {
        let mut adapter = GestureAdapter::default();

        adapter.map(GestureEvent::Tap { at: ms(1000) });
        adapter.reset();

        assert_eq!(adapter.map(GestureEvent::Tap { at: ms(1050) }), Some(Intent::SelectCover));
    }
}
