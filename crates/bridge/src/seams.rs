//! Injected side-effect seams.
//!
//! Every seam is asynchronous and fallible (except haptics, which are
//! fire-and-forget). Callers must tolerate arbitrary latency — a slow
//! `persist` holds the interaction in a visible busy phase, it never blocks
//! the machine — and must tolerate rejection.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{EntityId, HapticKind, MediaPick, NavTarget};

/// Bridge errors.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Persisting a record failed.
    #[error("persistence failed: {0}")]
    Persistence(String),

    /// The media library was unavailable or the pick failed.
    #[error("media pick failed: {0}")]
    Media(String),

    /// The host router rejected a navigation request.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// Filesystem error from a storage-backed implementation.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Writes the final interaction payload to durable storage.
///
/// The record's shape is the collaborator's concern; the controller hands
/// over whatever JSON the flow assembled.
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Persist `record` and return the identifier it was stored under.
    async fn persist(&self, record: serde_json::Value) -> Result<EntityId>;
}

/// Opens the host media picker.
#[async_trait]
pub trait MediaPicker: Send + Sync {
    /// Ask the user to pick a media asset.
    async fn pick_media(&self) -> Result<MediaPick>;
}

/// Emits haptic feedback. Implementations must not block.
pub trait Haptics: Send + Sync {
    /// Emit one haptic pulse.
    fn pulse(&self, kind: HapticKind);
}

/// Performs host navigation transitions.
#[async_trait]
pub trait Navigator: Send + Sync {
    /// Navigate to `target`.
    async fn navigate(&self, target: NavTarget) -> Result<()>;
}

/// Aggregate of all injected seams handed to the interaction controller.
#[derive(Clone)]
pub struct Bridge {
    /// Persistence seam.
    pub persistence: Arc<dyn Persistence>,
    /// Media picker seam.
    pub media: Arc<dyn MediaPicker>,
    /// Haptics seam.
    pub haptics: Arc<dyn Haptics>,
    /// Navigator seam.
    pub navigator: Arc<dyn Navigator>,
}

impl Bridge {
    /// Assemble a bridge from its four seams.
    pub fn new(
        persistence: Arc<dyn Persistence>,
        media: Arc<dyn MediaPicker>,
        haptics: Arc<dyn Haptics>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self { persistence, media, haptics, navigator }
    }
}
