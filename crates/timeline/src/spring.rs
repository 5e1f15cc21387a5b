//! Spring physics for settle-style animation.
//!
//! Springs are integrated with real elapsed time rather than normalized
//! progress, so they keep oscillating until they naturally come to rest
//! regardless of any configured duration. Positions are normalized: 0.0 is
//! the start value, 1.0 the target, and overshoot goes past 1.0.

use serde::{Deserialize, Serialize};

/// How close position and velocity must be to the target before a spring
/// counts as settled.
pub const SETTLE_THRESHOLD: f64 = 1e-3;

/// Configuration for a spring animation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringConfig {
    /// Mass of the animated body.
    pub mass: f64,
    /// Spring stiffness.
    pub stiffness: f64,
    /// Damping coefficient.
    pub damping: f64,
}

impl SpringConfig {
    /// Default spring with pleasant overshoot.
    pub const DEFAULT: Self = Self { mass: 1.0, stiffness: 180.0, damping: 11.0 };

    /// Bouncy spring with pronounced overshoot, used for confirmations.
    pub const BOUNCY: Self = Self { mass: 1.0, stiffness: 200.0, damping: 10.0 };

    /// Snappy spring with quick response and little overshoot.
    pub const SNAPPY: Self = Self { mass: 1.0, stiffness: 250.0, damping: 14.0 };

    /// Gentle spring with subtle motion.
    pub const GENTLE: Self = Self { mass: 1.0, stiffness: 120.0, damping: 15.0 };
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Integration state for one running spring.
#[derive(Debug, Clone, PartialEq)]
pub struct SpringState {
    /// Current normalized position (0.0 start, 1.0 target, may overshoot).
    pub position: f64,
    /// Current velocity.
    pub velocity: f64,
    last_t: f64,
}

impl SpringState {
    /// Create a spring state resting at the start position.
    pub fn new() -> Self {
        Self { position: 0.0, velocity: 0.0, last_t: 0.0 }
    }

    /// Step the simulation to `elapsed_secs` since the spring started.
    ///
    /// Returns the new normalized position. Individual timesteps are capped
    /// so a dropped frame cannot destabilize the integration.
    pub fn step(&mut self, elapsed_secs: f64, config: &SpringConfig) -> f64 {
        let dt = (elapsed_secs - self.last_t).max(0.0);
        self.last_t = elapsed_secs;

        if dt < 1e-6 {
            return self.position;
        }

        // Cap the timestep for numerical stability (~30fps minimum).
        let capped_dt = dt.min(0.033);

        let displacement = self.position - 1.0;
        let spring_force = -config.stiffness * displacement;
        let damping_force = -config.damping * self.velocity;
        let acceleration = (spring_force + damping_force) / config.mass;

        // Semi-implicit Euler.
        self.velocity += acceleration * capped_dt;
        self.position += self.velocity * capped_dt;

        self.position
    }

    /// Whether the spring has effectively stopped at the target.
    pub fn is_settled(&self, threshold: f64) -> bool {
        (self.position - 1.0).abs() < threshold && self.velocity.abs() < threshold
    }
}

impl Default for SpringState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spring_reaches_target() {
        let mut state = SpringState::new();
        let config = SpringConfig::DEFAULT;

        let mut position = 0.0;
        for i in 0..240 {
            position = state.step(f64::from(i) / 60.0, &config);
        }

        assert!(
            (position - 1.0).abs() < 0.01,
            "spring should settle near target, got {position}"
        );
        assert!(state.is_settled(0.05));
    }

    #[test]
    fn test_bouncy_spring_overshoots() {
        let mut state = SpringState::new();
        let config = SpringConfig::BOUNCY;

        let mut max_position: f64 = 0.0;
        for i in 0..240 {
            let pos = state.step(f64::from(i) / 60.0, &config);
            max_position = max_position.max(pos);
        }

        assert!(max_position > 1.0, "bouncy spring should overshoot, max was {max_position}");
    }

    #[test]
    fn test_step_ignores_time_going_backwards() {
        let mut state = SpringState::new();
        let config = SpringConfig::SNAPPY;

        state.step(0.5, &config);
        let at_half = state.position;
        let rewound = state.step(0.25, &config);

        assert_eq!(rewound, at_half);
    }
}
