//! In-memory fakes for exercising interaction flows without a host.
//!
//! Every seam has a recording fake; `FakePersistence` can additionally be
//! gated so tests control exactly when a pending persist resolves.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::seams::{Bridge, BridgeError, Haptics, MediaPicker, Navigator, Persistence, Result};
use crate::types::{EntityId, HapticKind, MediaPick, MediaRef, NavTarget};

/// Persistence fake that records every persisted payload.
#[derive(Default)]
pub struct FakePersistence {
    records: Mutex<Vec<(EntityId, serde_json::Value)>>,
    fail_with: Mutex<Option<String>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl FakePersistence {
    /// Create a fake that accepts everything immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything persisted so far.
    pub fn records(&self) -> Vec<(EntityId, serde_json::Value)> {
        self.records.lock().unwrap().clone()
    }

    /// Make subsequent persists fail with `message` (until cleared with
    /// [`succeed`](Self::succeed)).
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.fail_with.lock().unwrap() = Some(message.into());
    }

    /// Clear a previously configured failure.
    pub fn succeed(&self) {
        *self.fail_with.lock().unwrap() = None;
    }

    /// Gate subsequent persists: each call waits for one permit on the
    /// returned semaphore before resolving. Lets tests interleave a cancel
    /// with an in-flight persist.
    pub fn gate(&self) -> Arc<Semaphore> {
        let semaphore = Arc::new(Semaphore::new(0));
        *self.gate.lock().unwrap() = Some(Arc::clone(&semaphore));
        semaphore
    }
}

#[async_trait]
impl Persistence for FakePersistence {
    async fn persist(&self, record: serde_json::Value) -> Result<EntityId> {
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|_| BridgeError::Persistence("gate closed".to_string()))?;
            permit.forget();
        }

        if let Some(message) = self.fail_with.lock().unwrap().clone() {
            return Err(BridgeError::Persistence(message));
        }

        let id = EntityId::new();
        self.records.lock().unwrap().push((id, record));
        Ok(id)
    }
}

/// Media picker fake with a scriptable response queue.
///
/// With an empty queue it selects a fixed test asset.
#[derive(Default)]
pub struct FakeMediaPicker {
    responses: Mutex<VecDeque<Result<MediaPick>>>,
    picks: Mutex<usize>,
}

impl FakeMediaPicker {
    /// Create a fake that always selects a test asset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one pick outcome.
    pub fn respond_with(&self, pick: MediaPick) {
        self.responses.lock().unwrap().push_back(Ok(pick));
    }

    /// Queue one failure.
    pub fn fail_with(&self, message: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(BridgeError::Media(message.into())));
    }

    /// How many times the picker was opened.
    pub fn pick_count(&self) -> usize {
        *self.picks.lock().unwrap()
    }
}

#[async_trait]
impl MediaPicker for FakeMediaPicker {
    async fn pick_media(&self) -> Result<MediaPick> {
        *self.picks.lock().unwrap() += 1;
        match self.responses.lock().unwrap().pop_front() {
            Some(response) => response,
            None => Ok(MediaPick::Selected(
                MediaRef::new("file:///test/cover.jpg").with_mime_type("image/jpeg"),
            )),
        }
    }
}

/// Haptics fake that records every pulse.
#[derive(Default)]
pub struct FakeHaptics {
    pulses: Mutex<Vec<HapticKind>>,
}

impl FakeHaptics {
    /// Create a recording haptics fake.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every pulse emitted so far.
    pub fn pulses(&self) -> Vec<HapticKind> {
        self.pulses.lock().unwrap().clone()
    }
}

impl Haptics for FakeHaptics {
    fn pulse(&self, kind: HapticKind) {
        self.pulses.lock().unwrap().push(kind);
    }
}

/// Navigator fake that records every navigation request.
#[derive(Default)]
pub struct FakeNavigator {
    targets: Mutex<Vec<NavTarget>>,
}

impl FakeNavigator {
    /// Create a recording navigator fake.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every navigation request so far.
    pub fn targets(&self) -> Vec<NavTarget> {
        self.targets.lock().unwrap().clone()
    }
}

#[async_trait]
impl Navigator for FakeNavigator {
    async fn navigate(&self, target: NavTarget) -> Result<()> {
        self.targets.lock().unwrap().push(target);
        Ok(())
    }
}

/// All four fakes plus the [`Bridge`] that borrows them.
#[derive(Default)]
pub struct FakeBridge {
    /// Persistence fake.
    pub persistence: Arc<FakePersistence>,
    /// Media picker fake.
    pub media: Arc<FakeMediaPicker>,
    /// Haptics fake.
    pub haptics: Arc<FakeHaptics>,
    /// Navigator fake.
    pub navigator: Arc<FakeNavigator>,
}

impl FakeBridge {
    /// Create one fake per seam.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a [`Bridge`] sharing these fakes.
    pub fn bridge(&self) -> Bridge {
        Bridge::new(
            Arc::clone(&self.persistence) as Arc<dyn Persistence>,
            Arc::clone(&self.media) as Arc<dyn MediaPicker>,
            Arc::clone(&self.haptics) as Arc<dyn Haptics>,
            Arc::clone(&self.navigator) as Arc<dyn Navigator>,
        )
    }
}
