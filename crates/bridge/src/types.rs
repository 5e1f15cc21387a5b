//! Types exchanged across the bridge seams.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reference to a media asset chosen through the host's picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    /// Host-side URI of the asset.
    pub uri: String,
    /// Pixel width, when the host knows it.
    pub width: Option<u32>,
    /// Pixel height, when the host knows it.
    pub height: Option<u32>,
    /// MIME type, when the host knows it.
    pub mime_type: Option<String>,
}

impl MediaRef {
    /// Create a media reference from a URI alone.
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into(), width: None, height: None, mime_type: None }
    }

    /// Set the pixel dimensions.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set the MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// Outcome of a media pick request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaPick {
    /// The user chose an asset.
    Selected(MediaRef),
    /// The user dismissed the picker without choosing. Not an error.
    Cancelled,
}

/// Identifier of a persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Kind of haptic feedback pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HapticKind {
    /// Subtle tick, e.g. an interaction opening.
    Light,
    /// Medium impact, e.g. a shutter firing.
    Medium,
    /// Strong impact.
    Heavy,
    /// Notification-style success pulse.
    Success,
    /// Notification-style warning pulse.
    Warning,
}

/// Navigation request handed to the host router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavTarget {
    /// Route name understood by the host.
    pub route: String,
    /// Route parameters.
    pub params: HashMap<String, String>,
}

impl NavTarget {
    /// Create a navigation target with no parameters.
    pub fn new(route: impl Into<String>) -> Self {
        Self { route: route.into(), params: HashMap::new() }
    }

    /// Add a route parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_ref_builder() {
        let media = MediaRef::new("file:///photos/cover.jpg")
            .with_dimensions(1920, 1080)
            .with_mime_type("image/jpeg");

        assert_eq!(media.uri, "file:///photos/cover.jpg");
        assert_eq!(media.width, Some(1920));
        assert_eq!(media.height, Some(1080));
        assert_eq!(media.mime_type.as_deref(), Some("image/jpeg"));
    }

    #[test]
    fn test_entity_ids_are_unique() {
        assert_ne!(EntityId::new(), EntityId::new());
    }

    #[test]
    fn test_nav_target_params() {
        let target = NavTarget::new("trip_detail").with_param("id", "abc");
        assert_eq!(target.route, "trip_detail");
        assert_eq!(target.params.get("id").map(String::as_str), Some("abc"));
    }
}
