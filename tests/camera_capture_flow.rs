//! End-to-end tests for the camera capture flow
//!
//! Exercises the shutter/flash sequence, the review cycle, the facing
//! toggle, and pinch zoom as a continuous control.

use std::sync::Arc;
use std::time::Duration;

use bridge::test_utils::FakeBridge;
use bridge::HapticKind;
use flow::test_utils::RecordingObserver;
use flow::{FlowController, Intent, PhaseId, SessionOutcome};
use gesture::{GestureAdapter, GestureEvent};
use timeline::TrackId;
use trailbook::flows::camera_capture::{
    self, phases, tracks, CameraCaptureTuning, FRONT_FACING_FLAG,
};

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

fn camera() -> (FakeBridge, Arc<RecordingObserver>, FlowController) {
    let fakes = FakeBridge::new();
    let observer = Arc::new(RecordingObserver::new());
    let controller = FlowController::new(
        camera_capture::flow(&CameraCaptureTuning::default()),
        fakes.bridge(),
        observer.clone(),
    )
    .unwrap();
    (fakes, observer, controller)
}

#[tokio::test]
async fn test_shutter_flash_and_review_cycle() {
    let (fakes, _, controller) = camera();
    let mut clock = 0u64;

    controller.handle_intent(Intent::Open).await;
    assert_eq!(controller.current_phase(), phases::VIEWFINDER);

    // Let the preview warm up.
    clock = 300;
    controller.tick(ms(clock));
    assert_eq!(controller.value(&TrackId::new(tracks::PREVIEW)), Some(1.0));

    // Tap fires the shutter.
    let mut adapter = GestureAdapter::default();
    let tap = adapter.map(GestureEvent::Tap { at: ms(clock) }).unwrap();
    assert_eq!(tap, Intent::SelectCover);
    controller.handle_intent(tap).await;
    assert_eq!(controller.current_phase(), phases::CAPTURING);
    assert!(fakes.haptics.pulses().contains(&HapticKind::Medium));

    // Flash ramps up mid-sequence...
    clock += 40;
    controller.tick(ms(clock));
    let flash = controller.value(&TrackId::new(tracks::FLASH)).unwrap();
    assert!(flash > 0.0, "flash should be visible mid-sequence, got {flash}");

    // ...decays to zero, and the review thumbnail pops in.
    let review_deadline = clock + 2_000;
    run_until(&controller, phases::REVIEW, &mut clock, review_deadline);
    assert_eq!(controller.value(&TrackId::new(tracks::FLASH)), Some(0.0));

    // The review hold returns to the viewfinder for the next shot.
    let viewfinder_deadline = clock + 3_000;
    run_until(&controller, phases::VIEWFINDER, &mut clock, viewfinder_deadline);
    assert!(!controller.is_closed());
}

#[tokio::test]
async fn test_facing_toggle_and_pinch_zoom() {
    let (fakes, _, controller) = camera();

    controller.handle_intent(Intent::Open).await;

    controller.handle_intent(Intent::ToggleSecondaryMode).await;
    assert_eq!(
        controller.snapshot().draft.flags.get(FRONT_FACING_FLAG),
        Some(&true)
    );
    assert!(fakes.haptics.pulses().contains(&HapticKind::Light));

    // Pinch drives zoom without touching the phase machine.
    let mut adapter = GestureAdapter::default();
    let pinch = adapter.map(GestureEvent::Pinch { scale: 2.0 }).unwrap();
    controller.handle_intent(pinch).await;

    assert_eq!(controller.value(&TrackId::new(tracks::ZOOM)), Some(0.5));
    assert_eq!(controller.current_phase(), phases::VIEWFINDER);
}

#[tokio::test]
async fn test_cancel_closes_camera() {
    let (_, observer, controller) = camera();

    controller.handle_intent(Intent::Open).await;
    controller.handle_intent(Intent::Cancel).await;

    assert!(controller.is_closed());
    assert_eq!(controller.current_phase(), phases::CLOSING);
    assert_eq!(observer.closed(), vec![SessionOutcome::Cancelled]);

    // Intents after close are ignored.
    let outcome = controller.handle_intent(Intent::SelectCover).await;
    assert!(!outcome.is_applied());
}
