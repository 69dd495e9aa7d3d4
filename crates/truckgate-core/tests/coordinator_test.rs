#![allow(clippy::unwrap_used)]
// Session lifecycle scenarios against a scripted backend, on a paused clock.

mod common;

use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::time::{Instant, sleep};

use common::{Call, ScriptedBackend, Step, payload, settle};
use truckgate_core::{
    CoordinatorConfig, CoreError, GatePhase, SessionCoordinator, SessionPhase, StopOutcome,
};

const INTERVAL: Duration = Duration::from_millis(1000);
const GRACE: Duration = Duration::from_millis(1000);
const DWELL: Duration = Duration::from_millis(5000);

fn coordinator(backend: ScriptedBackend) -> SessionCoordinator<ScriptedBackend> {
    SessionCoordinator::new(backend, CoordinatorConfig::default()).unwrap()
}

// ── Start ───────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn start_waits_grace_before_detection() {
    let coord = coordinator(ScriptedBackend::new());
    let t0 = Instant::now();

    let session = coord.start_session(1).await.unwrap();

    assert_eq!(session.phase(), SessionPhase::Active);
    assert_eq!(session.camera_id(), Some(1));
    assert_eq!(
        coord.backend().lifecycle_calls(),
        vec![Call::StartCamera(1), Call::StartDetection]
    );
    let camera_at = coord.backend().time_of(&Call::StartCamera(1)).unwrap();
    let detection_at = coord.backend().time_of(&Call::StartDetection).unwrap();
    assert_eq!(camera_at, t0);
    assert_eq!(detection_at - camera_at, GRACE);
    assert_eq!(coord.gate_state().phase, GatePhase::Ready);
}

#[tokio::test(start_paused = true)]
async fn empty_tick_then_denied_then_reset() {
    let backend = ScriptedBackend::with_script([
        Step::Empty,
        Step::Result(payload("denied", "2024-05-01T10:00:02")),
    ]);
    let coord = coordinator(backend);
    coord.start_session(1).await.unwrap();
    let polling_from = Instant::now();

    sleep(INTERVAL + INTERVAL / 2).await;
    assert_eq!(coord.backend().count(&Call::FetchLatest), 1);
    assert_eq!(coord.gate_state().phase, GatePhase::Ready);

    sleep(INTERVAL).await;
    let state = coord.gate_state();
    assert_eq!(state.phase, GatePhase::Denied);
    assert_eq!(state.entered_at, polling_from + INTERVAL * 2);
    assert_eq!(state.reset_deadline, Some(polling_from + INTERVAL * 2 + DWELL));

    sleep(DWELL).await;
    assert_eq!(coord.gate_state().phase, GatePhase::Ready);
}

#[tokio::test(start_paused = true)]
async fn detections_are_broadcast_in_order() {
    let backend = ScriptedBackend::with_script([
        Step::Result(payload("open", "2024-05-01T10:00:01")),
        Step::Result(payload("denied", "2024-05-01T10:00:02")),
    ]);
    let coord = coordinator(backend);
    let mut rx = coord.detections();
    coord.start_session(0).await.unwrap();

    let first = rx.recv().await.unwrap();
    let second = rx.recv().await.unwrap();
    assert_eq!(first.gate_action.to_string(), "open");
    assert_eq!(second.gate_action.to_string(), "denied");
    assert_eq!(coord.poller_stats().dispatched, 2);
}

#[tokio::test(start_paused = true)]
async fn detection_start_failure_releases_camera() {
    let backend = ScriptedBackend::new();
    backend
        .fail_detection_start
        .store(true, std::sync::atomic::Ordering::SeqCst);
    let coord = coordinator(backend);

    let err = coord.start_session(1).await.unwrap_err();

    assert!(matches!(err, CoreError::DetectionStartFailed { .. }), "{err:?}");
    assert_eq!(
        coord.backend().lifecycle_calls(),
        vec![Call::StartCamera(1), Call::StartDetection, Call::StopCamera]
    );
    assert_eq!(coord.session().phase(), SessionPhase::Inactive);
    assert_eq!(coord.gate_state().phase, GatePhase::Ready);

    sleep(INTERVAL * 5).await;
    assert_eq!(coord.backend().count(&Call::FetchLatest), 0);
}

#[tokio::test(start_paused = true)]
async fn unknown_camera_never_starts_detection() {
    let coord = coordinator(ScriptedBackend::new());

    let err = coord.start_session(9).await.unwrap_err();

    assert!(matches!(err, CoreError::CameraNotFound { camera_id: 9 }));
    assert_eq!(coord.backend().lifecycle_calls(), vec![Call::StartCamera(9)]);
    assert_eq!(coord.session().phase(), SessionPhase::Inactive);
}

#[tokio::test(start_paused = true)]
async fn camera_start_failure_reverts_to_inactive() {
    let backend = ScriptedBackend::new();
    backend
        .fail_camera_start
        .store(true, std::sync::atomic::Ordering::SeqCst);
    let coord = coordinator(backend);

    let err = coord.start_session(1).await.unwrap_err();

    assert!(matches!(err, CoreError::ServiceFailure { .. }));
    assert_eq!(coord.session().phase(), SessionPhase::Inactive);
    assert!(!coord.backend().calls().contains(&Call::StartDetection));
}

#[tokio::test(start_paused = true)]
async fn second_start_rejected_while_active() {
    let coord = coordinator(ScriptedBackend::new());
    coord.start_session(1).await.unwrap();

    let err = coord.start_session(2).await.unwrap_err();

    assert!(matches!(err, CoreError::AlreadyActive { camera_id: 1 }));
    assert_eq!(coord.session().camera_id(), Some(1));
    assert_eq!(coord.session().phase(), SessionPhase::Active);
    assert_eq!(coord.backend().count(&Call::StartCamera(2)), 0);
}

#[tokio::test(start_paused = true)]
async fn overlapping_lifecycle_calls_are_rejected() {
    let coord = coordinator(ScriptedBackend::new());
    let starting = {
        let coord = coord.clone();
        tokio::spawn(async move { coord.start_session(1).await })
    };
    settle().await;

    // The first start is sleeping through the grace delay.
    assert_eq!(coord.gate_state().phase, GatePhase::Processing);
    assert!(matches!(
        coord.start_session(2).await,
        Err(CoreError::SessionBusy { .. })
    ));
    assert!(matches!(
        coord.stop_session().await,
        Err(CoreError::SessionBusy { .. })
    ));

    starting.await.unwrap().unwrap();
    assert_eq!(coord.backend().count(&Call::StartCamera(1)), 1);
    assert_eq!(coord.backend().count(&Call::StartCamera(2)), 0);
}

// ── Stop ────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn stop_reverses_start_order() {
    let coord = coordinator(ScriptedBackend::new());
    coord.start_session(1).await.unwrap();
    sleep(INTERVAL * 2 + INTERVAL / 2).await;

    let outcome = coord.stop_session().await.unwrap();

    assert_eq!(outcome, StopOutcome::Stopped);
    assert_eq!(
        coord.backend().lifecycle_calls(),
        vec![
            Call::StartCamera(1),
            Call::StartDetection,
            Call::StopDetection,
            Call::StopCamera
        ]
    );
    assert_eq!(coord.session().phase(), SessionPhase::Inactive);
    assert!(coord.session().stream().is_none());

    let fetches = coord.backend().count(&Call::FetchLatest);
    sleep(INTERVAL * 5).await;
    assert_eq!(coord.backend().count(&Call::FetchLatest), fetches);
}

#[tokio::test(start_paused = true)]
async fn stop_without_session_is_a_no_op() {
    let coord = coordinator(ScriptedBackend::new());

    assert_eq!(
        coord.stop_session().await.unwrap(),
        StopOutcome::AlreadyInactive
    );
    assert_eq!(
        coord.stop_session().await.unwrap(),
        StopOutcome::AlreadyInactive
    );
    assert!(coord.backend().calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn detection_stop_failure_is_not_propagated() {
    let backend = ScriptedBackend::new();
    backend
        .fail_detection_stop
        .store(true, std::sync::atomic::Ordering::SeqCst);
    let coord = coordinator(backend);
    coord.start_session(1).await.unwrap();

    assert_eq!(coord.stop_session().await.unwrap(), StopOutcome::Stopped);
    assert_eq!(coord.backend().count(&Call::StopCamera), 1);
    assert_eq!(coord.session().phase(), SessionPhase::Inactive);
}

#[tokio::test(start_paused = true)]
async fn camera_stop_failure_still_ends_session() {
    let backend = ScriptedBackend::new();
    backend
        .fail_camera_stop
        .store(true, std::sync::atomic::Ordering::SeqCst);
    let coord = coordinator(backend);
    coord.start_session(1).await.unwrap();

    let err = coord.stop_session().await.unwrap_err();

    assert!(matches!(err, CoreError::ServiceFailure { .. }));
    assert_eq!(coord.session().phase(), SessionPhase::Inactive);
    // A fresh session can be started afterwards.
    coord
        .backend()
        .fail_camera_stop
        .store(false, std::sync::atomic::Ordering::SeqCst);
    coord.start_session(2).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn in_flight_fetch_discarded_on_stop() {
    let backend = ScriptedBackend::with_script([Step::Slow(
        Duration::from_millis(2000),
        payload("open", "2024-05-01T10:00:01"),
    )]);
    let coord = coordinator(backend);
    let mut rx = coord.detections();
    coord.start_session(1).await.unwrap();

    // First fetch begins one interval in and is still outstanding.
    sleep(INTERVAL + INTERVAL / 2).await;
    assert_eq!(coord.backend().count(&Call::FetchLatest), 1);
    let before = coord.gate_state();

    coord.stop_session().await.unwrap();
    sleep(DWELL * 2).await;

    let after = coord.gate_state();
    assert_eq!(after.phase, GatePhase::Ready);
    assert!(after.last_result.is_none());
    assert!(after.reset_deadline.is_none());
    assert_eq!(before.last_result, after.last_result);
    assert_eq!(coord.poller_stats().dispatched, 0);
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn restart_after_stop_polls_again() {
    let backend = ScriptedBackend::new();
    let coord = coordinator(backend);
    coord.start_session(1).await.unwrap();
    coord.stop_session().await.unwrap();

    coord
        .backend()
        .push([Step::Result(payload("open", "2024-05-01T11:00:00"))]);
    coord.start_session(1).await.unwrap();
    sleep(INTERVAL + INTERVAL / 2).await;

    assert_eq!(coord.gate_state().phase, GatePhase::Success);
}

// ── Gate controls ───────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn operator_reset_clears_decision() {
    let backend =
        ScriptedBackend::with_script([Step::Result(payload("denied", "2024-05-01T10:00:01"))]);
    let coord = coordinator(backend);
    coord.start_session(1).await.unwrap();
    sleep(INTERVAL + INTERVAL / 2).await;
    assert_eq!(coord.gate_state().phase, GatePhase::Denied);

    coord.reset_gate();
    assert_eq!(coord.gate_state().phase, GatePhase::Ready);
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_session_and_pending_reset() {
    let backend =
        ScriptedBackend::with_script([Step::Result(payload("open", "2024-05-01T10:00:01"))]);
    let coord = coordinator(backend);
    coord.start_session(1).await.unwrap();
    sleep(INTERVAL + INTERVAL / 2).await;

    coord.shutdown().await.unwrap();

    assert_eq!(coord.session().phase(), SessionPhase::Inactive);
    assert_eq!(coord.backend().count(&Call::StopCamera), 1);
}

#[test]
fn zero_interval_config_rejected() {
    let config = CoordinatorConfig {
        poll_interval: Duration::ZERO,
        ..CoordinatorConfig::default()
    };
    assert!(matches!(
        SessionCoordinator::new(ScriptedBackend::new(), config),
        Err(CoreError::Config { .. })
    ));
}
