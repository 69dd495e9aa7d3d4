// ── Domain model ──
//
// Canonical types the coordinator reasons about. Wire shapes from
// truckgate-api are converted into these in `crate::convert`.

pub mod camera;
pub mod detection;
pub mod gate;
pub mod health;
pub mod plate;

// ── Re-exports ──────────────────────────────────────────────────────

pub use camera::{CameraDescriptor, CameraInventory, CameraSession, SessionPhase, StreamHandle};
pub use detection::{DetectionResult, GateAction};
pub use gate::{GatePhase, GateState};
pub use health::{BackendHealth, CameraStatus, ComponentStatus};
pub use plate::{PlateCheck, PlateId, PlateNumber, PlateRecord};
