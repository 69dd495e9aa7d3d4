// Wire types for the gate backend
//
// Field names follow the backend's snake_case JSON. Everything the backend
// may omit is `Option` or `#[serde(default)]`; semantic checks (confidence
// range, timestamp parsing, gate action mapping) happen in truckgate-core.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Generic envelopes ───────────────────────────────────────────────

/// `{success, message}` acknowledgement returned by mutating endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Ack {
    #[serde(default = "default_true")]
    pub success: bool,
    pub message: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Error body shapes: `{error, details}` or `{success: false, message}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
    pub message: Option<String>,
    pub details: Option<String>,
}

// ── Cameras ─────────────────────────────────────────────────────────

/// `GET /api/camera/list`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CameraListResponse {
    #[serde(default)]
    pub cameras: Vec<CameraInfo>,
    pub current_camera: Option<u32>,
    #[serde(default)]
    pub camera_active: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CameraInfo {
    pub id: u32,
    pub name: Option<String>,
    #[serde(default)]
    pub resolution: String,
    pub fps: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartCameraRequest {
    pub camera_id: u32,
}

/// `POST /api/camera/start`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StartCameraResponse {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
    pub camera_id: Option<u32>,
}

// ── Detection ───────────────────────────────────────────────────────

/// `GET /api/detection/latest`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LatestDetectionResponse {
    #[serde(default)]
    pub has_result: bool,
    pub result: Option<DetectionPayload>,
    pub message: Option<String>,
}

/// A raw detection result as produced by the detection service.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DetectionPayload {
    pub vehicle_detected: Option<bool>,
    pub vehicle_type: Option<String>,
    pub confidence: Option<f64>,
    pub plate_detected: Option<bool>,
    pub plate_text: Option<String>,
    pub gate_action: Option<String>,
    pub is_authorized: Option<bool>,
    pub access_granted: Option<bool>,
    pub message: Option<String>,
    /// ISO-8601; the stock backend emits naive local timestamps.
    pub timestamp: Option<String>,
    /// Monotonic token, when the backend provides one.
    pub sequence: Option<u64>,
}

// ── Plates ──────────────────────────────────────────────────────────

/// Plate record identifier. The whitelist store hands out either integer
/// or string (UUID) keys depending on how the table was created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Str(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

/// `GET /api/plates`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlatesResponse {
    #[serde(default)]
    pub plates: Vec<PlatePayload>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlatePayload {
    pub id: RecordId,
    pub plate_number: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlateNumberRequest<'a> {
    pub plate_number: &'a str,
}

/// `POST /api/check-plate`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckPlateResponse {
    pub plate_number: String,
    #[serde(default)]
    pub authorized: bool,
    pub gate_action: Option<String>,
    pub message: Option<String>,
}

// ── System ──────────────────────────────────────────────────────────

/// `GET /api/health`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: Option<String>,
    pub timestamp: Option<String>,
    #[serde(default)]
    pub components: HealthComponents,
    pub camera_info: Option<CameraStatusInfo>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HealthComponents {
    pub vehicle_detector: Option<String>,
    pub plate_reader: Option<String>,
    pub supabase_db: Option<String>,
    pub camera: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CameraStatusInfo {
    pub id: Option<u32>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub detection_active: bool,
}
