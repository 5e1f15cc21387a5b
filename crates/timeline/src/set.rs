//! The timeline set: every animated value owned by one interaction session.
//!
//! Tracks are multiplexed over a single advancing clock. The host calls
//! [`TimelineSet::advance`] once per frame with elapsed time; the set steps
//! every in-flight tween and reports ticks and settles as events.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::time::Duration;

use crate::spring::SpringState;
use crate::track::{HandleId, Keyframe, TimelineStatus, Track, TrackId, Transition, Tween};

/// Observation emitted while advancing a timeline set.
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEvent {
    /// A running track produced a new value this tick.
    Tick {
        /// The track that moved.
        track: TrackId,
        /// Its value after the tick.
        value: f64,
    },
    /// A tween or sequence reached its final target.
    Settled {
        /// The track that settled.
        track: TrackId,
        /// The handle of the settled tween or sequence.
        handle: HandleId,
    },
}

/// A set of animated value tracks advancing on one clock.
///
/// Values default to `0.0` until assigned. Targets must be finite; a
/// non-finite target is rejected and its handle reports as cancelled.
#[derive(Debug, Clone, Default)]
pub struct TimelineSet {
    tracks: BTreeMap<TrackId, Track>,
    /// Terminal status of tweens that are no longer active.
    finished: HashMap<HandleId, TimelineStatus>,
    next_handle: u64,
    now: Duration,
}

impl TimelineSet {
    /// Create an empty set at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current timeline time, as of the last [`advance`](Self::advance).
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Current value of a track, if it exists.
    pub fn value(&self, track: &TrackId) -> Option<f64> {
        self.tracks.get(track).map(|t| t.current)
    }

    /// Status of a tween or sequence.
    pub fn status(&self, handle: HandleId) -> Option<TimelineStatus> {
        for track in self.tracks.values() {
            if let Some(status) = track.status_of(handle, self.now) {
                return Some(status);
            }
        }
        self.finished.get(&handle).copied()
    }

    /// Whether a tween or sequence has settled (not cancelled).
    pub fn is_settled(&self, handle: HandleId) -> bool {
        self.status(handle) == Some(TimelineStatus::Settled)
    }

    /// Whether any track has in-flight work.
    pub fn has_active(&self) -> bool {
        self.tracks.values().any(|t| t.active.is_some())
    }

    /// Immediately assign a track value, superseding any in-flight work on
    /// it. No settle is reported for the superseded work.
    pub fn set(&mut self, track: TrackId, value: f64) {
        if !value.is_finite() {
            tracing::warn!(%track, value, "rejecting non-finite track assignment");
            return;
        }
        let cancelled = self.entry(track).assign(value);
        self.record_cancelled(cancelled);
    }

    /// Begin interpolating a track toward `to`.
    ///
    /// Starting a new transition on a busy track cancels the previous one;
    /// the superseded handle never settles.
    pub fn animate_to(&mut self, track: TrackId, to: f64, transition: Transition) -> HandleId {
        let handle = self.allocate();
        if !to.is_finite() {
            tracing::warn!(%track, to, "rejecting non-finite animation target");
            self.finished.insert(handle, TimelineStatus::Cancelled);
            return handle;
        }
        let now = self.now;
        let entry = self.entry(track);
        let tween = Tween {
            handle,
            from: entry.current,
            to,
            armed_at: now,
            spring: transition.easing.is_spring().then(SpringState::new),
            transition,
        };
        let cancelled = entry.begin(tween, VecDeque::new());
        self.record_cancelled(cancelled);
        handle
    }

    /// Begin a spring settle toward `to`. Shorthand for
    /// [`animate_to`](Self::animate_to) with a spring transition.
    pub fn spring_to(
        &mut self,
        track: TrackId,
        to: f64,
        config: crate::spring::SpringConfig,
    ) -> HandleId {
        self.animate_to(track, to, Transition::spring(config))
    }

    /// Run `steps` strictly in order on a track, each waiting for the
    /// previous to settle. One settle is reported for the whole sequence;
    /// cancelling it cancels the running step and skips the rest.
    pub fn sequence(&mut self, track: TrackId, steps: Vec<Keyframe>) -> HandleId {
        let handle = self.allocate();
        let mut steps: VecDeque<Keyframe> = steps.into_iter().collect();
        if steps.iter().any(|step| !step.to.is_finite()) {
            tracing::warn!(%track, "rejecting sequence with non-finite target");
            self.finished.insert(handle, TimelineStatus::Cancelled);
            return handle;
        }
        let Some(first) = steps.pop_front() else {
            self.finished.insert(handle, TimelineStatus::Settled);
            return handle;
        };
        let now = self.now;
        let entry = self.entry(track);
        let tween = Tween {
            handle,
            from: entry.current,
            to: first.to,
            armed_at: now,
            spring: first.transition.easing.is_spring().then(SpringState::new),
            transition: first.transition,
        };
        let cancelled = entry.begin(tween, steps);
        self.record_cancelled(cancelled);
        handle
    }

    /// Cancel one tween or sequence. Its settle never fires; the track keeps
    /// whatever value it had reached.
    pub fn cancel(&mut self, handle: HandleId) {
        let mut cancelled = None;
        for track in self.tracks.values_mut() {
            if track.active.as_ref().is_some_and(|t| t.handle == handle) {
                cancelled = track.cancel();
                break;
            }
        }
        self.record_cancelled(cancelled);
    }

    /// Cancel whatever is in flight on a track.
    pub fn cancel_track(&mut self, track: &TrackId) {
        if let Some(track) = self.tracks.get_mut(track) {
            let cancelled = track.cancel();
            self.record_cancelled(cancelled);
        }
    }

    /// Cancel every in-flight tween and sequence.
    pub fn cancel_all(&mut self) {
        let cancelled: Vec<_> = self
            .tracks
            .values_mut()
            .filter_map(|track| track.cancel())
            .collect();
        for handle in cancelled {
            self.finished.insert(handle, TimelineStatus::Cancelled);
        }
    }

    /// Advance every track to `now` and report what moved.
    ///
    /// Time is monotonic: an earlier `now` than the last advance is ignored.
    pub fn advance(&mut self, now: Duration) -> Vec<TimelineEvent> {
        let now = now.max(self.now);
        self.now = now;

        let mut events = Vec::new();
        for (id, track) in &mut self.tracks {
            let step = track.advance(now);
            if step.ticked {
                events.push(TimelineEvent::Tick { track: id.clone(), value: track.current });
            }
            if let Some(handle) = step.settled {
                self.finished.insert(handle, TimelineStatus::Settled);
                events.push(TimelineEvent::Settled { track: id.clone(), handle });
            }
        }
        events
    }

    fn entry(&mut self, track: TrackId) -> &mut Track {
        self.tracks.entry(track).or_insert_with(|| Track::new(0.0))
    }

    fn allocate(&mut self) -> HandleId {
        let handle = HandleId(self.next_handle);
        self.next_handle += 1;
        handle
    }

    fn record_cancelled(&mut self, cancelled: Option<HandleId>) {
        if let Some(handle) = cancelled {
            tracing::debug!(?handle, "timeline superseded");
            self.finished.insert(handle, TimelineStatus::Cancelled);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;
    use crate::spring::SpringConfig;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn linear(duration_ms: u64) -> Transition {
        Transition::new(ms(duration_ms), Easing::Linear)
    }

    fn settles(events: &[TimelineEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, TimelineEvent::Settled { .. }))
            .count()
    }

    #[test]
    fn test_settle_is_exact() {
        let mut set = TimelineSet::new();
        let track = TrackId::new("opacity");
        let handle = set.animate_to(track.clone(), 10.0, linear(100));

        set.advance(ms(50));
        assert_eq!(set.value(&track), Some(5.0));

        let events = set.advance(ms(120));
        assert_eq!(set.value(&track), Some(10.0));
        assert_eq!(settles(&events), 1);
        assert!(set.is_settled(handle));
    }

    #[test]
    fn test_superseding_settles_once_at_second_target() {
        let mut set = TimelineSet::new();
        let track = TrackId::new("scale");
        let first = set.animate_to(track.clone(), 5.0, linear(100));
        set.advance(ms(40));

        let second = set.animate_to(track.clone(), 9.0, linear(100));
        assert_eq!(set.status(first), Some(TimelineStatus::Cancelled));

        let mut total_settles = 0;
        for t in (60..=200).step_by(20) {
            total_settles += settles(&set.advance(ms(t)));
        }

        assert_eq!(total_settles, 1);
        assert_eq!(set.value(&track), Some(9.0));
        assert!(set.is_settled(second));
    }

    #[test]
    fn test_cancelled_tween_never_settles() {
        let mut set = TimelineSet::new();
        let track = TrackId::new("opacity");
        let handle = set.animate_to(track.clone(), 1.0, linear(100));

        set.advance(ms(50));
        let frozen = set.value(&track);
        set.cancel(handle);

        let events = set.advance(ms(500));
        assert_eq!(settles(&events), 0);
        assert_eq!(set.status(handle), Some(TimelineStatus::Cancelled));
        assert_eq!(set.value(&track), frozen);
    }

    #[test]
    fn test_set_supersedes_without_settle() {
        let mut set = TimelineSet::new();
        let track = TrackId::new("zoom");
        set.animate_to(track.clone(), 1.0, linear(100));
        set.advance(ms(30));

        set.set(track.clone(), 0.25);
        assert_eq!(set.value(&track), Some(0.25));

        let events = set.advance(ms(500));
        assert_eq!(settles(&events), 0);
        assert_eq!(set.value(&track), Some(0.25));
    }

    #[test]
    fn test_sequence_runs_steps_in_order() {
        let mut set = TimelineSet::new();
        let track = TrackId::new("flash");
        let handle = set.sequence(
            track.clone(),
            vec![Keyframe::new(1.0, linear(100)), Keyframe::new(0.0, linear(100))],
        );

        set.advance(ms(50));
        assert_eq!(set.value(&track), Some(0.5));

        // First step settles, second arms from its exact target.
        set.advance(ms(100));
        assert_eq!(set.value(&track), Some(1.0));
        assert!(!set.is_settled(handle));

        set.advance(ms(150));
        assert_eq!(set.value(&track), Some(0.5));

        let events = set.advance(ms(220));
        assert_eq!(set.value(&track), Some(0.0));
        assert_eq!(settles(&events), 1);
        assert!(set.is_settled(handle));
    }

    #[test]
    fn test_cancelling_sequence_skips_remaining_steps() {
        let mut set = TimelineSet::new();
        let track = TrackId::new("flash");
        let handle = set.sequence(
            track.clone(),
            vec![Keyframe::new(1.0, linear(100)), Keyframe::new(0.0, linear(100))],
        );

        set.advance(ms(50));
        set.cancel(handle);

        let events = set.advance(ms(400));
        assert_eq!(settles(&events), 0);
        assert_eq!(set.value(&track), Some(0.5));
        assert_eq!(set.status(handle), Some(TimelineStatus::Cancelled));
    }

    #[test]
    fn test_empty_sequence_settles_immediately() {
        let mut set = TimelineSet::new();
        let handle = set.sequence(TrackId::new("noop"), Vec::new());
        assert!(set.is_settled(handle));
    }

    #[test]
    fn test_delay_holds_tween_pending() {
        let mut set = TimelineSet::new();
        let track = TrackId::new("opacity");
        let handle = set.animate_to(track.clone(), 1.0, linear(100).delay(ms(100)));

        set.advance(ms(50));
        assert_eq!(set.value(&track), Some(0.0));
        assert_eq!(set.status(handle), Some(TimelineStatus::Pending));

        set.advance(ms(150));
        assert_eq!(set.value(&track), Some(0.5));
        assert_eq!(set.status(handle), Some(TimelineStatus::Running));
    }

    #[test]
    fn test_spring_settles_exactly_on_target() {
        let mut set = TimelineSet::new();
        let track = TrackId::new("scale");
        let handle = set.animate_to(
            track.clone(),
            1.0,
            Transition::spring(SpringConfig::SNAPPY),
        );

        for i in 1..=600 {
            set.advance(ms(i * 16));
            if set.is_settled(handle) {
                break;
            }
        }

        assert!(set.is_settled(handle), "spring did not settle");
        assert_eq!(set.value(&track), Some(1.0));
    }

    #[test]
    fn test_time_never_goes_backwards() {
        let mut set = TimelineSet::new();
        let track = TrackId::new("opacity");
        set.animate_to(track.clone(), 1.0, linear(100));

        set.advance(ms(80));
        let at_eighty = set.value(&track);
        set.advance(ms(40));

        assert_eq!(set.value(&track), at_eighty);
    }

    #[test]
    fn test_non_finite_target_is_rejected() {
        let mut set = TimelineSet::new();
        let track = TrackId::new("opacity");
        set.set(track.clone(), 0.5);

        let handle = set.animate_to(track.clone(), f64::NAN, linear(100));
        assert_eq!(set.status(handle), Some(TimelineStatus::Cancelled));

        set.advance(ms(200));
        assert_eq!(set.value(&track), Some(0.5));
    }

    #[test]
    fn test_cancel_all_freezes_every_track() {
        let mut set = TimelineSet::new();
        let a = set.animate_to(TrackId::new("a"), 1.0, linear(100));
        let b = set.sequence(TrackId::new("b"), vec![Keyframe::new(1.0, linear(100))]);

        set.advance(ms(30));
        set.cancel_all();

        assert_eq!(set.status(a), Some(TimelineStatus::Cancelled));
        assert_eq!(set.status(b), Some(TimelineStatus::Cancelled));
        assert!(!set.has_active());
    }
}
