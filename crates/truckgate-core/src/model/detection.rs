// ── Detection domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the detection service decided for a vehicle.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GateAction {
    Open,
    Denied,
    Closed,
    Unknown,
}

impl GateAction {
    /// Parse the wire value; anything unrecognized is `Unknown`.
    pub fn from_wire(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.trim().parse().ok())
            .unwrap_or(Self::Unknown)
    }
}

/// One normalized detection result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub vehicle_detected: bool,
    pub vehicle_type: Option<String>,
    /// Always within `[0.0, 1.0]`.
    pub confidence: f64,
    /// The backend sent a finite confidence outside `[0.0, 1.0]`.
    pub confidence_clamped: bool,
    pub plate_detected: bool,
    pub plate_text: Option<String>,
    pub gate_action: GateAction,
    pub authorized: Option<bool>,
    pub message: Option<String>,
    /// Backend timestamp, or receipt time when the backend omitted it.
    pub observed_at: DateTime<Utc>,
    pub sequence: Option<u64>,
}

impl DetectionResult {
    /// Strictly newer than `previous`: by sequence when both carry one,
    /// otherwise by observation time.
    pub fn supersedes(&self, previous: &Self) -> bool {
        match (self.sequence, previous.sequence) {
            (Some(ours), Some(theirs)) => ours > theirs,
            _ => self.observed_at > previous.observed_at,
        }
    }
}
