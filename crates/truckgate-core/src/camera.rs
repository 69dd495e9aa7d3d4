// ── Camera session manager ──
//
// Owns the single camera session. Phase checks and the claim of the
// `Starting`/`Stopping` phase happen in one `send_if_modified` call, so
// two callers can never both believe they own the transition.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::backend::GateBackend;
use crate::error::CoreError;
use crate::model::{CameraInventory, CameraSession, SessionPhase};
use crate::stream::StateStream;

pub struct CameraSessionManager<B> {
    backend: Arc<B>,
    session: watch::Sender<CameraSession>,
}

impl<B: GateBackend> CameraSessionManager<B> {
    pub fn new(backend: Arc<B>) -> Self {
        let (session, _) = watch::channel(CameraSession::inactive());
        Self { backend, session }
    }

    pub async fn list_cameras(&self) -> Result<CameraInventory, CoreError> {
        self.backend.list_cameras().await
    }

    pub fn current(&self) -> CameraSession {
        self.session.borrow().clone()
    }

    pub fn subscribe(&self) -> StateStream<CameraSession> {
        StateStream::new(self.session.subscribe())
    }

    pub(crate) fn receiver(&self) -> watch::Receiver<CameraSession> {
        self.session.subscribe()
    }

    /// Fail with the error a `start` would produce right now, without
    /// touching state or the backend.
    pub fn ensure_can_start(&self) -> Result<(), CoreError> {
        let session = self.session.borrow();
        start_rejection(&session).map_or(Ok(()), Err)
    }

    /// Open `camera_id` and bind it to the session.
    ///
    /// Rejected without any backend call unless the session is
    /// `Inactive`. On failure the session reverts to `Inactive`.
    pub async fn start(&self, camera_id: u32) -> Result<CameraSession, CoreError> {
        let mut rejection = None;
        self.session.send_if_modified(|s| {
            rejection = start_rejection(s);
            if rejection.is_some() {
                return false;
            }
            *s = CameraSession::starting(camera_id);
            true
        });
        if let Some(err) = rejection {
            return Err(err);
        }

        match self.backend.start_camera(camera_id).await {
            Ok(stream) => {
                let session = CameraSession::active(camera_id, stream);
                self.session.send_replace(session.clone());
                info!(camera_id, "camera session active");
                Ok(session)
            }
            Err(e) => {
                // Release anything the backend opened before failing.
                if matches!(e, CoreError::ServiceFailure { .. }) {
                    if let Err(stop_err) = self.backend.stop_camera().await {
                        warn!(camera_id, error = %stop_err, "cleanup after failed start also failed");
                    }
                }
                self.session.send_replace(CameraSession::inactive());
                warn!(camera_id, error = %e, "camera start failed");
                Err(e)
            }
        }
    }

    /// Release the active camera.
    ///
    /// The session ends `Inactive` even when the backend call fails; the
    /// error is still returned so the operator sees it.
    pub async fn stop(&self) -> Result<(), CoreError> {
        let mut rejection = None;
        let mut camera_id = None;
        self.session.send_if_modified(|s| match s.phase() {
            SessionPhase::Active => {
                camera_id = s.camera_id();
                *s = s.stopping();
                true
            }
            SessionPhase::Inactive => {
                rejection = Some(CoreError::NotActive);
                false
            }
            phase @ (SessionPhase::Starting | SessionPhase::Stopping) => {
                rejection = Some(CoreError::SessionBusy { phase });
                false
            }
        });
        if let Some(err) = rejection {
            return Err(err);
        }

        let result = self.backend.stop_camera().await;
        self.session.send_replace(CameraSession::inactive());
        match &result {
            Ok(()) => info!(camera_id, "camera session stopped"),
            Err(e) => warn!(camera_id, error = %e, "camera stop failed; session marked inactive"),
        }
        result
    }
}

fn start_rejection(session: &CameraSession) -> Option<CoreError> {
    match session.phase() {
        SessionPhase::Inactive => None,
        SessionPhase::Active => Some(CoreError::AlreadyActive {
            camera_id: session.camera_id().unwrap_or_default(),
        }),
        phase @ (SessionPhase::Starting | SessionPhase::Stopping) => {
            Some(CoreError::SessionBusy { phase })
        }
    }
}
