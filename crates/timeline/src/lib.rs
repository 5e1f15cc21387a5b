//! Timeline primitives for Trailbook
//!
//! This crate provides value-over-time animation tracks: immediate sets,
//! eased transitions, spring settling, and strictly ordered sequences.
//! It is clock-agnostic — callers feed elapsed time into
//! [`TimelineSet::advance`] and read values back; nothing here touches a
//! wall clock or a rendering surface.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod easing;
pub mod set;
pub mod spring;
pub mod track;

pub use easing::{lerp, Easing};
pub use set::{TimelineEvent, TimelineSet};
pub use spring::{SpringConfig, SpringState};
pub use track::{HandleId, Keyframe, TimelineStatus, TrackId, Transition};
