// ── API-to-domain type conversions ──
//
// Bridges raw `truckgate_api` response types into canonical
// `truckgate_core::model` types. Detection payloads get the strict
// treatment (range checks, timestamp parsing); inventory and plate
// listings fill sensible defaults for missing optional data.

use chrono::{DateTime, NaiveDateTime, Utc};
use url::Url;

use truckgate_api::models::{
    CameraListResponse, CheckPlateResponse, DetectionPayload, HealthResponse, PlatePayload,
};

use crate::error::CoreError;
use crate::model::{
    BackendHealth, CameraDescriptor, CameraInventory, CameraStatus, ComponentStatus,
    DetectionResult, GateAction, PlateCheck, PlateId, PlateRecord, StreamHandle,
};

// ── Helpers ────────────────────────────────────────────────────────

/// Parse a backend timestamp. RFC 3339 with an offset is taken as-is;
/// the stock backend emits naive ISO-8601, which is read as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, CoreError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|e| CoreError::Protocol {
            message: format!("unparseable timestamp '{raw}': {e}"),
        })
}

/// Confidence defaults to 0.0 when absent. Finite out-of-range values are
/// clamped and flagged; NaN and infinities are rejected.
pub fn normalize_confidence(raw: Option<f64>) -> Result<(f64, bool), CoreError> {
    let Some(value) = raw else {
        return Ok((0.0, false));
    };
    if !value.is_finite() {
        return Err(CoreError::Protocol {
            message: format!("confidence is not a finite number: {value}"),
        });
    }
    let clamped = value.clamp(0.0, 1.0);
    #[allow(clippy::float_cmp)]
    let was_clamped = clamped != value;
    Ok((clamped, was_clamped))
}

// ── Detection ──────────────────────────────────────────────────────

impl DetectionResult {
    /// Normalize a wire payload. `received_at` stands in for a missing
    /// backend timestamp.
    pub fn from_payload(
        payload: DetectionPayload,
        received_at: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        let (confidence, confidence_clamped) = normalize_confidence(payload.confidence)?;
        let observed_at = match payload.timestamp.as_deref() {
            Some(raw) => parse_timestamp(raw)?,
            None => received_at,
        };
        let plate_text = payload
            .plate_text
            .map(|p| p.trim().to_owned())
            .filter(|p| !p.is_empty());

        Ok(Self {
            vehicle_detected: payload.vehicle_detected.unwrap_or(true),
            vehicle_type: payload.vehicle_type,
            confidence,
            confidence_clamped,
            plate_detected: payload.plate_detected.unwrap_or(plate_text.is_some()),
            plate_text,
            gate_action: GateAction::from_wire(payload.gate_action.as_deref()),
            authorized: payload.is_authorized.or(payload.access_granted),
            message: payload.message,
            observed_at,
            sequence: payload.sequence,
        })
    }
}

// ── Cameras ────────────────────────────────────────────────────────

impl From<CameraListResponse> for CameraInventory {
    fn from(resp: CameraListResponse) -> Self {
        let current = resp.current_camera;
        let cameras = resp
            .cameras
            .into_iter()
            .map(|c| CameraDescriptor {
                name: c.name.unwrap_or_else(|| format!("Camera {}", c.id)),
                is_current: current == Some(c.id),
                id: c.id,
                resolution: c.resolution,
                fps: c.fps,
            })
            .collect();
        Self {
            cameras,
            active_camera_id: current.filter(|_| resp.camera_active),
        }
    }
}

impl From<Url> for StreamHandle {
    fn from(url: Url) -> Self {
        Self::new(url)
    }
}

// ── Plates ─────────────────────────────────────────────────────────

impl From<PlatePayload> for PlateRecord {
    fn from(p: PlatePayload) -> Self {
        Self {
            id: PlateId::new(p.id.to_string()),
            plate_number: p.plate_number,
            // Unparseable creation dates sort last rather than failing the listing.
            created_at: p.created_at.as_deref().and_then(|s| parse_timestamp(s).ok()),
        }
    }
}

impl From<CheckPlateResponse> for PlateCheck {
    fn from(r: CheckPlateResponse) -> Self {
        let authorized =
            r.authorized || GateAction::from_wire(r.gate_action.as_deref()) == GateAction::Open;
        Self {
            plate_number: r.plate_number,
            authorized,
            message: r.message,
        }
    }
}

// ── Health ─────────────────────────────────────────────────────────

impl From<HealthResponse> for BackendHealth {
    fn from(h: HealthResponse) -> Self {
        let c = h.components;
        let components = [
            ("vehicle_detector", c.vehicle_detector),
            ("plate_reader", c.plate_reader),
            ("whitelist_db", c.supabase_db),
            ("camera", c.camera),
        ]
        .into_iter()
        .filter_map(|(name, status)| {
            status.map(|status| ComponentStatus {
                name: name.to_owned(),
                status,
            })
        })
        .collect();

        Self {
            status: h.status,
            message: h.message,
            components,
            camera: h.camera_info.map(|info| CameraStatus {
                camera_id: info.id,
                active: info.active,
                detection_active: info.detection_active,
            }),
        }
    }
}
