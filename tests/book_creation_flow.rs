//! End-to-end tests for the book-creation flow
//!
//! Runs the whole trip-creation interaction — entrance, cover pick, reveal,
//! form entry, save — against fake seams, plus the file-backed store.

use std::sync::Arc;
use std::time::Duration;

use bridge::test_utils::FakeBridge;
use bridge::{Bridge, JsonStore, MediaPick, Persistence};
use flow::test_utils::RecordingObserver;
use flow::{DraftField, FlowController, Intent, NullObserver, PhaseId, SessionOutcome};
use gesture::{GestureAdapter, GestureEvent};
use tempfile::TempDir;
use timeline::TrackId;
use trailbook::flows::book_creation::{self, phases, tracks, BookCreationTuning};

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

/// Tick in 16 ms frames until `phase` is reached or `deadline_ms` passes.
fn run_until(controller: &FlowController, phase: PhaseId, clock: &mut u64, deadline_ms: u64) {
    while *clock < deadline_ms {
        *clock += 16;
        controller.tick(ms(*clock));
        if controller.current_phase() == phase {
            return;
        }
    }
    panic!("never reached `{phase}`; stuck in `{}`", controller.current_phase());
}

/// Shorten the cover hold so tests spend less simulated time in it.
fn quick_tuning() -> BookCreationTuning {
    BookCreationTuning { cover_hold: ms(400), ..Default::default() }
}

#[tokio::test]
async fn test_full_creation_lifecycle() {
    let fakes = FakeBridge::new();
    let observer = Arc::new(RecordingObserver::new());
    let controller = FlowController::new(
        book_creation::flow(&quick_tuning()),
        fakes.bridge(),
        observer.clone(),
    )
    .unwrap();
    let mut clock = 0u64;

    assert_eq!(controller.current_phase(), phases::INITIAL);
    assert_eq!(controller.value(&TrackId::new(tracks::BACKDROP)), Some(0.0));

    controller.handle_intent(Intent::Open).await;
    assert_eq!(controller.current_phase(), phases::ZOOMING);

    // The entrance spring settles into cover selection.
    run_until(&controller, phases::COVER_SELECTION, &mut clock, 5_000);
    assert_eq!(controller.value(&TrackId::new(tracks::SCALE)), Some(1.0));
    assert_eq!(controller.value(&TrackId::new(tracks::BACKDROP)), Some(1.0));

    // Picking a cover walks through uploading into applied.
    controller.handle_intent(Intent::SelectCover).await;
    assert_eq!(controller.current_phase(), phases::COVER_APPLIED);
    assert!(controller.snapshot().draft.cover.is_some());

    // The hold elapses, the book opens, the form reveals.
    let opening_deadline = clock + 2_000;
    run_until(&controller, phases::OPENING, &mut clock, opening_deadline);
    let form_deadline = clock + 5_000;
    run_until(&controller, phases::FORM_ENTRY, &mut clock, form_deadline);
    assert_eq!(controller.value(&TrackId::new(tracks::BOOK_OPEN)), Some(1.0));

    for (field, value) in [
        (DraftField::Title, "Iceland Trip"),
        (DraftField::Description, "Two weeks on the ring road"),
        (DraftField::StartDate, "2026-07-01"),
        (DraftField::EndDate, "2026-07-14"),
    ] {
        let outcome = controller
            .handle_intent(Intent::FormFieldChanged { field, value: value.to_string() })
            .await;
        assert!(outcome.is_applied());
    }

    controller.handle_intent(Intent::Confirm).await;

    assert!(controller.is_closed());
    assert_eq!(controller.current_phase(), phases::CLOSING);

    let records = fakes.persistence.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].1["title"], "Iceland Trip");
    assert_eq!(records[0].1["start_date"], "2026-07-01");

    let closed = observer.closed();
    assert_eq!(closed.len(), 1);
    assert!(matches!(closed[0], SessionOutcome::Confirmed { .. }));

    let targets = fakes.navigator.targets();
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].route, "trip_detail");

    // Full phase trail, oldest first.
    assert_eq!(
        controller.snapshot().history,
        vec![
            phases::INITIAL,
            phases::ZOOMING,
            phases::COVER_SELECTION,
            phases::COVER_UPLOADING,
            phases::COVER_APPLIED,
            phases::OPENING,
            phases::FORM_ENTRY,
            phases::SAVING,
        ]
    );
}

#[tokio::test]
async fn test_drag_dismiss_cancels_exactly_once() {
    let fakes = FakeBridge::new();
    let observer = Arc::new(RecordingObserver::new());
    let controller = FlowController::new(
        book_creation::flow(&quick_tuning()),
        fakes.bridge(),
        observer.clone(),
    )
    .unwrap();
    let mut adapter = GestureAdapter::default();
    let mut clock = 0u64;

    controller.handle_intent(Intent::Open).await;
    run_until(&controller, phases::COVER_SELECTION, &mut clock, 5_000);
    controller.handle_intent(Intent::SelectCover).await;
    assert_eq!(controller.current_phase(), phases::COVER_APPLIED);

    // Drag down past the dismiss threshold before the hold elapses.
    let mut cancel = None;
    for _ in 0..8 {
        if let Some(intent) =
            adapter.map(GestureEvent::Pan { dx: 0.0, dy: 18.0, velocity: 120.0 })
        {
            cancel = Some(intent);
            break;
        }
    }
    let intent = cancel.expect("drag should cross the dismiss threshold");
    assert_eq!(intent, Intent::Cancel);
    controller.handle_intent(intent).await;

    assert!(controller.is_closed());
    assert_eq!(observer.closed(), vec![SessionOutcome::Cancelled]);
    assert!(fakes.persistence.records().is_empty());

    // The armed auto-advance timer must not fire after close.
    controller.tick(ms(clock + 10_000));
    assert_eq!(controller.current_phase(), phases::CLOSING);
    assert_eq!(observer.closed().len(), 1);
}

#[tokio::test]
async fn test_dismissed_picker_allows_retry() {
    let fakes = FakeBridge::new();
    let controller = FlowController::new(
        book_creation::flow(&quick_tuning()),
        fakes.bridge(),
        Arc::new(NullObserver),
    )
    .unwrap();
    let mut clock = 0u64;

    controller.handle_intent(Intent::Open).await;
    run_until(&controller, phases::COVER_SELECTION, &mut clock, 5_000);

    fakes.media.respond_with(MediaPick::Cancelled);
    controller.handle_intent(Intent::SelectCover).await;
    assert_eq!(controller.current_phase(), phases::COVER_SELECTION);
    assert!(controller.snapshot().draft.cover.is_none());

    // A second attempt picks the default fake asset.
    controller.handle_intent(Intent::SelectCover).await;
    assert_eq!(controller.current_phase(), phases::COVER_APPLIED);
    assert_eq!(fakes.media.pick_count(), 2);
}

#[tokio::test]
async fn test_confirmed_trip_lands_in_json_store() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("journal.json");

    let fakes = FakeBridge::new();
    let store = Arc::new(JsonStore::open(&path).await.unwrap());
    let persistence: Arc<dyn Persistence> = store.clone();
    let bridge = Bridge { persistence, ..fakes.bridge() };
    let controller =
        FlowController::new(book_creation::flow(&quick_tuning()), bridge, Arc::new(NullObserver))
            .unwrap();
    let mut clock = 0u64;

    controller.handle_intent(Intent::Open).await;
    run_until(&controller, phases::COVER_SELECTION, &mut clock, 5_000);
    controller.handle_intent(Intent::SelectCover).await;
    let opening_deadline = clock + 2_000;
    run_until(&controller, phases::OPENING, &mut clock, opening_deadline);
    let form_deadline = clock + 5_000;
    run_until(&controller, phases::FORM_ENTRY, &mut clock, form_deadline);

    controller
        .handle_intent(Intent::FormFieldChanged {
            field: DraftField::Title,
            value: "Dolomites".to_string(),
        })
        .await;
    controller.handle_intent(Intent::Confirm).await;

    assert!(controller.is_closed());
    assert_eq!(store.len().await, 1);

    // The record is durable across a reopen.
    let reopened = JsonStore::open(&path).await.unwrap();
    assert_eq!(reopened.len().await, 1);
}
