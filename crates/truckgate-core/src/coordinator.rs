// ── Session coordinator ──
//
// Orchestrates a full detection session: camera start, sensor grace,
// detection start, polling, and the orderly teardown of all three.
// Lifecycle calls are serialized by a non-blocking lock: an overlapping
// start or stop is answered with `SessionBusy` instead of queuing.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, broadcast};
use tracing::{info, warn};

use crate::backend::GateBackend;
use crate::camera::CameraSessionManager;
use crate::config::CoordinatorConfig;
use crate::error::CoreError;
use crate::gate::GateStateMachine;
use crate::model::{CameraInventory, CameraSession, DetectionResult, GateState};
use crate::plates::PlateRegistry;
use crate::poller::{DetectionPoller, DetectionSink, PollerStats};
use crate::stream::StateStream;

const DETECTION_CHANNEL_SIZE: usize = 64;

/// How a stop request was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    /// Nothing was running; no backend call was made.
    AlreadyInactive,
}

/// Feeds poller output into the gate and out to observers.
struct GateDispatch {
    gate: GateStateMachine,
    detections: broadcast::Sender<Arc<DetectionResult>>,
}

impl DetectionSink for GateDispatch {
    fn dispatch(&self, result: Arc<DetectionResult>) {
        self.gate.apply(Arc::clone(&result));
        // No subscribers is fine; the gate has already consumed it.
        let _ = self.detections.send(result);
    }
}

// ── SessionCoordinator ───────────────────────────────────────────

/// Cheaply cloneable facade over one gate's detection session.
pub struct SessionCoordinator<B: GateBackend> {
    inner: Arc<CoordinatorInner<B>>,
}

impl<B: GateBackend> Clone for SessionCoordinator<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct CoordinatorInner<B: GateBackend> {
    config: CoordinatorConfig,
    backend: Arc<B>,
    camera: CameraSessionManager<B>,
    poller: DetectionPoller<B>,
    gate: GateStateMachine,
    detections: broadcast::Sender<Arc<DetectionResult>>,
    lifecycle: Mutex<()>,
    detection_running: AtomicBool,
}

impl<B: GateBackend> SessionCoordinator<B> {
    pub fn new(backend: B, config: CoordinatorConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let backend = Arc::new(backend);
        let camera = CameraSessionManager::new(Arc::clone(&backend));
        let gate = GateStateMachine::new(config.reset_dwell);
        let (detections, _) = broadcast::channel(DETECTION_CHANNEL_SIZE);
        let sink = Arc::new(GateDispatch {
            gate: gate.clone(),
            detections: detections.clone(),
        });
        let poller = DetectionPoller::new(
            Arc::clone(&backend),
            camera.receiver(),
            sink,
            config.fetch_timeout,
        );

        Ok(Self {
            inner: Arc::new(CoordinatorInner {
                config,
                backend,
                camera,
                poller,
                gate,
                detections,
                lifecycle: Mutex::new(()),
                detection_running: AtomicBool::new(false),
            }),
        })
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    pub fn plates(&self) -> PlateRegistry<B> {
        PlateRegistry::new(Arc::clone(&self.inner.backend))
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Start a detection session on `camera_id`.
    ///
    /// Order: camera start, grace delay, detection start, polling. If
    /// detection cannot start the camera is released again and the
    /// session ends `Inactive`.
    pub async fn start_session(&self, camera_id: u32) -> Result<CameraSession, CoreError> {
        let Ok(_guard) = self.inner.lifecycle.try_lock() else {
            return Err(CoreError::SessionBusy {
                phase: self.inner.camera.current().phase(),
            });
        };
        self.inner.camera.ensure_can_start()?;

        self.inner.gate.set_busy(true);
        let result = self.start_locked(camera_id).await;
        self.inner.gate.set_busy(false);
        result
    }

    async fn start_locked(&self, camera_id: u32) -> Result<CameraSession, CoreError> {
        let session = self.inner.camera.start(camera_id).await?;

        tokio::time::sleep(self.inner.config.grace_delay).await;

        if let Err(e) = self.inner.backend.start_detection().await {
            warn!(camera_id, error = %e, "detection start failed, releasing camera");
            if let Err(stop_err) = self.inner.camera.stop().await {
                warn!(camera_id, error = %stop_err, "camera release after failed detection start");
            }
            return Err(match e {
                err @ CoreError::DetectionStartFailed { .. } => err,
                other => CoreError::DetectionStartFailed {
                    message: other.to_string(),
                },
            });
        }
        self.inner.detection_running.store(true, Ordering::SeqCst);

        self.inner
            .poller
            .start_polling(self.inner.config.poll_interval)
            .await;
        info!(camera_id, "detection session running");
        Ok(session)
    }

    /// Stop the running session. Idempotent: with nothing active this
    /// succeeds without contacting the backend.
    ///
    /// Order: polling, detection (best-effort), camera. The session is
    /// `Inactive` afterwards even if the camera release fails.
    pub async fn stop_session(&self) -> Result<StopOutcome, CoreError> {
        let Ok(_guard) = self.inner.lifecycle.try_lock() else {
            return Err(CoreError::SessionBusy {
                phase: self.inner.camera.current().phase(),
            });
        };
        if !self.inner.camera.current().is_active() {
            self.inner.poller.stop_polling().await;
            return Ok(StopOutcome::AlreadyInactive);
        }

        self.inner.gate.set_busy(true);
        let result = self.stop_locked().await;
        self.inner.gate.set_busy(false);
        result
    }

    async fn stop_locked(&self) -> Result<StopOutcome, CoreError> {
        self.inner.poller.stop_polling().await;

        if self.inner.detection_running.swap(false, Ordering::SeqCst) {
            if let Err(e) = self.inner.backend.stop_detection().await {
                warn!(error = %e, "detection stop failed, continuing with camera release");
            }
        }

        match self.inner.camera.stop().await {
            Ok(()) => {
                info!("detection session stopped");
                Ok(StopOutcome::Stopped)
            }
            Err(CoreError::NotActive) => Ok(StopOutcome::AlreadyInactive),
            Err(e) => Err(e),
        }
    }

    /// Stop everything and drop any pending gate reset.
    pub async fn shutdown(&self) -> Result<(), CoreError> {
        let outcome = self.stop_session().await;
        self.inner.gate.cancel_pending_reset();
        outcome.map(drop)
    }

    // ── Reads & observation ──────────────────────────────────────

    pub async fn list_cameras(&self) -> Result<CameraInventory, CoreError> {
        self.inner.camera.list_cameras().await
    }

    pub fn session(&self) -> CameraSession {
        self.inner.camera.current()
    }

    pub fn session_stream(&self) -> StateStream<CameraSession> {
        self.inner.camera.subscribe()
    }

    pub fn gate_state(&self) -> GateState {
        self.inner.gate.current()
    }

    pub fn gate_stream(&self) -> StateStream<GateState> {
        self.inner.gate.subscribe()
    }

    /// Every dispatched detection result, in order.
    pub fn detections(&self) -> broadcast::Receiver<Arc<DetectionResult>> {
        self.inner.detections.subscribe()
    }

    pub fn poller_stats(&self) -> PollerStats {
        self.inner.poller.stats()
    }

    /// Operator acknowledgement of the current gate decision.
    pub fn reset_gate(&self) {
        self.inner.gate.reset();
    }
}
