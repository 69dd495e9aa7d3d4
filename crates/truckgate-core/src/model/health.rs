// ── Backend health ──

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentStatus {
    pub name: String,
    pub status: String,
}

impl ComponentStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self.status.as_str(), "ok" | "active")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraStatus {
    pub camera_id: Option<u32>,
    pub active: bool,
    pub detection_active: bool,
}

/// Aggregated `GET /api/health` answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendHealth {
    pub status: String,
    pub message: Option<String>,
    pub components: Vec<ComponentStatus>,
    pub camera: Option<CameraStatus>,
}

impl BackendHealth {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }

    /// Components reporting anything other than `ok`/`active`. An
    /// `inactive` camera is expected between sessions and not counted.
    pub fn degraded(&self) -> impl Iterator<Item = &ComponentStatus> {
        self.components
            .iter()
            .filter(|c| !c.is_ok() && !(c.name == "camera" && c.status == "inactive"))
    }
}
