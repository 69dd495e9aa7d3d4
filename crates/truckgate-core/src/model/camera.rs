// ── Camera domain types ──

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// One capture device the backend can open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraDescriptor {
    pub id: u32,
    pub name: String,
    /// `"{width}x{height}"` as probed by the backend.
    pub resolution: String,
    pub fps: Option<u32>,
    /// The backend's currently selected camera (active or not).
    pub is_current: bool,
}

/// Result of enumerating cameras.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraInventory {
    pub cameras: Vec<CameraDescriptor>,
    /// Set only while the backend reports the camera as running.
    pub active_camera_id: Option<u32>,
}

impl CameraInventory {
    pub fn get(&self, id: u32) -> Option<&CameraDescriptor> {
        self.cameras.iter().find(|c| c.id == id)
    }
}

/// Lifecycle phase of the single camera session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Inactive,
    Starting,
    Active,
    Stopping,
}

impl SessionPhase {
    /// A start or stop is in flight.
    pub fn is_transitional(self) -> bool {
        matches!(self, Self::Starting | Self::Stopping)
    }
}

/// Opaque reference to the live MJPEG stream of an active camera.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamHandle(Url);

impl StreamHandle {
    pub fn new(url: Url) -> Self {
        Self(url)
    }

    pub fn url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Snapshot of the one camera session that exists system-wide.
///
/// `camera_id` and `stream` are present exactly when the phase says a
/// camera is bound; the constructors are the only way to build one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraSession {
    camera_id: Option<u32>,
    phase: SessionPhase,
    stream: Option<StreamHandle>,
}

impl CameraSession {
    pub fn inactive() -> Self {
        Self::default()
    }

    pub fn starting(camera_id: u32) -> Self {
        Self {
            camera_id: Some(camera_id),
            phase: SessionPhase::Starting,
            stream: None,
        }
    }

    pub fn active(camera_id: u32, stream: StreamHandle) -> Self {
        Self {
            camera_id: Some(camera_id),
            phase: SessionPhase::Active,
            stream: Some(stream),
        }
    }

    /// The same binding, marked as being torn down.
    pub fn stopping(&self) -> Self {
        Self {
            camera_id: self.camera_id,
            phase: SessionPhase::Stopping,
            stream: self.stream.clone(),
        }
    }

    pub fn camera_id(&self) -> Option<u32> {
        self.camera_id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn stream(&self) -> Option<&StreamHandle> {
        self.stream.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }
}
