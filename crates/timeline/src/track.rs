//! Animated value tracks.
//!
//! A track is one named scalar driven over time (opacity, scale, zoom).
//! At most one tween or sequence runs per track; starting a new one
//! supersedes whatever was in flight (last writer wins).

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::easing::{lerp, Easing};
use crate::spring::{SpringState, SETTLE_THRESHOLD};

/// Identifier of an animated value track (e.g. `"opacity"`, `"scale"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackId(String);

impl TrackId {
    /// Create a track id from a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The track name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Handle identifying one scheduled tween or sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(pub(crate) u64);

/// Lifecycle of a tween or sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineStatus {
    /// Scheduled but still inside its start delay.
    Pending,
    /// Interpolating toward the target.
    Running,
    /// Reached its final target exactly.
    Settled,
    /// Superseded or cancelled; its settle never fires.
    Cancelled,
}

/// How a tween moves from the current value to its target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Duration of the interpolation. Ignored for springs, which settle on
    /// their own physics.
    pub duration: Duration,
    /// Easing curve.
    pub easing: Easing,
    /// Delay before the interpolation starts.
    pub delay: Duration,
}

impl Transition {
    /// Create a transition with the given duration and easing.
    pub fn new(duration: Duration, easing: Easing) -> Self {
        Self { duration, easing, delay: Duration::ZERO }
    }

    /// Create a spring transition.
    pub fn spring(config: crate::spring::SpringConfig) -> Self {
        Self {
            // Springs settle on physics; the duration is unused.
            duration: Duration::from_millis(1000),
            easing: Easing::Spring(config),
            delay: Duration::ZERO,
        }
    }

    /// Set the delay before the transition starts.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl Default for Transition {
    fn default() -> Self {
        Self::new(Duration::from_millis(250), Easing::EaseOutCubic)
    }
}

/// One step of a sequenced animation on a track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Target value of this step.
    pub to: f64,
    /// Transition used to reach it.
    pub transition: Transition,
}

impl Keyframe {
    /// Create a keyframe.
    pub fn new(to: f64, transition: Transition) -> Self {
        Self { to, transition }
    }
}

/// One in-flight interpolation on a track.
#[derive(Debug, Clone)]
pub(crate) struct Tween {
    pub handle: HandleId,
    pub from: f64,
    pub to: f64,
    /// Timeline time at which the tween was armed.
    pub armed_at: Duration,
    pub transition: Transition,
    pub spring: Option<SpringState>,
}

impl Tween {
    fn status(&self, now: Duration) -> TimelineStatus {
        if now < self.armed_at + self.transition.delay {
            TimelineStatus::Pending
        } else {
            TimelineStatus::Running
        }
    }
}

/// What one track did during an advance.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TrackAdvance {
    /// An interpolation was active this tick.
    pub ticked: bool,
    /// The tween or sequence that reached its final target this tick.
    pub settled: Option<HandleId>,
}

/// One named animated value and its in-flight work.
#[derive(Debug, Clone)]
pub(crate) struct Track {
    pub current: f64,
    pub active: Option<Tween>,
    /// Remaining sequence steps; they share the active tween's handle.
    pub queued: VecDeque<Keyframe>,
}

impl Track {
    pub fn new(initial: f64) -> Self {
        Self { current: initial, active: None, queued: VecDeque::new() }
    }

    /// Immediately assign, superseding in-flight work. Returns the handle
    /// that was cancelled, if any.
    pub fn assign(&mut self, value: f64) -> Option<HandleId> {
        self.current = value;
        self.queued.clear();
        self.active.take().map(|tween| tween.handle)
    }

    /// Install a new tween (and optional queued steps), superseding in-flight
    /// work. Returns the handle that was cancelled, if any.
    pub fn begin(&mut self, tween: Tween, queued: VecDeque<Keyframe>) -> Option<HandleId> {
        let superseded = self.active.take().map(|prev| prev.handle);
        self.queued = queued;
        self.active = Some(tween);
        superseded
    }

    /// Cancel in-flight work without touching the current value.
    pub fn cancel(&mut self) -> Option<HandleId> {
        self.queued.clear();
        self.active.take().map(|tween| tween.handle)
    }

    pub fn status_of(&self, handle: HandleId, now: Duration) -> Option<TimelineStatus> {
        self.active
            .as_ref()
            .filter(|tween| tween.handle == handle)
            .map(|tween| tween.status(now))
    }

    /// Advance the track to `now`.
    pub fn advance(&mut self, now: Duration) -> TrackAdvance {
        let Some(tween) = self.active.as_mut() else {
            return TrackAdvance::default();
        };

        let start = tween.armed_at + tween.transition.delay;
        if now < start {
            return TrackAdvance { ticked: false, settled: None };
        }

        let elapsed = now - start;
        let finished = if let Some(spring) = tween.spring.as_mut() {
            let config = match tween.transition.easing {
                Easing::Spring(config) => config,
                // A spring state only exists for spring easings.
                _ => crate::spring::SpringConfig::DEFAULT,
            };
            let position = spring.step(elapsed.as_secs_f64(), &config);
            self.current = lerp(tween.from, tween.to, position);
            spring.is_settled(SETTLE_THRESHOLD)
        } else if tween.transition.duration.is_zero() || elapsed >= tween.transition.duration {
            true
        } else {
            let t = elapsed.as_secs_f64() / tween.transition.duration.as_secs_f64();
            self.current = lerp(tween.from, tween.to, tween.transition.easing.evaluate(t));
            false
        };

        if !finished {
            return TrackAdvance { ticked: true, settled: None };
        }

        // Snap exactly to the target; no floating residue.
        self.current = tween.to;
        let handle = tween.handle;
        let reached = tween.to;

        match self.queued.pop_front() {
            Some(step) => {
                self.active = Some(Tween {
                    handle,
                    from: reached,
                    to: step.to,
                    armed_at: now,
                    spring: step.transition.easing.is_spring().then(SpringState::new),
                    transition: step.transition,
                });
                TrackAdvance { ticked: true, settled: None }
            }
            None => {
                self.active = None;
                TrackAdvance { ticked: true, settled: Some(handle) }
            }
        }
    }
}
