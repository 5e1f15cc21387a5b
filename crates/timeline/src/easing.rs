//! Easing curves for timed transitions.
//!
//! An easing function is a pure map from normalized progress in `[0, 1]` to
//! an interpolation factor. Non-spring curves stay within `[0, 1]`; spring
//! motion is integrated with real elapsed time instead (see [`crate::spring`])
//! and may overshoot.

use crate::spring::SpringConfig;
use serde::{Deserialize, Serialize};

/// Easing curve controlling the rate of change of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Constant speed.
    Linear,
    /// Starts slow, ends fast.
    EaseIn,
    /// Starts fast, ends slow.
    EaseOut,
    /// Cubic ease-out: fast start, long deceleration tail.
    EaseOutCubic,
    /// Cubic ease-in-out: slow start and finish, fast middle.
    EaseInOutCubic,
    /// Spring physics simulation (may overshoot the target).
    Spring(SpringConfig),
}

impl Easing {
    /// Evaluate the curve at normalized time `t`.
    ///
    /// `t` is clamped to `[0, 1]`. Springs are integrated separately with
    /// real elapsed time in [`SpringState::step`](crate::spring::SpringState::step);
    /// for them this returns `t` unchanged as a fallback.
    pub fn evaluate(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => t * (2.0 - t),
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::Spring(_) => t,
        }
    }

    /// Whether this curve is integrated as a spring rather than a timed curve.
    pub fn is_spring(self) -> bool {
        matches!(self, Easing::Spring(_))
    }
}

impl Default for Easing {
    fn default() -> Self {
        Easing::EaseOutCubic
    }
}

/// Linear interpolation between `from` and `to`.
///
/// `t = 0.0` returns `from`, `t = 1.0` returns `to`. `t` outside `[0, 1]`
/// extrapolates, which spring overshoot relies on.
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}
