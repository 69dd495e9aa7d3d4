#![allow(dead_code, clippy::unwrap_used)]
// Scripted in-memory backend shared by the core integration tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;
use url::Url;

use truckgate_api::models::{DetectionPayload, LatestDetectionResponse};
use truckgate_core::{
    BackendHealth, CameraDescriptor, CameraInventory, CoreError, DetectionResult, DetectionSink,
    GateBackend, PlateCheck, PlateId, PlateNumber, PlateRecord, StreamHandle,
};

// ── Call log ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListCameras,
    StartCamera(u32),
    StopCamera,
    StartDetection,
    StopDetection,
    FetchLatest,
    ListPlates,
    AddPlate(String),
    DeletePlate(String),
    CheckPlate(String),
    Health,
}

/// One scripted answer to `fetch_latest`.
#[derive(Debug, Clone)]
pub enum Step {
    Empty,
    Result(DetectionPayload),
    /// `has_result` without a body.
    Hollow,
    Fail,
    /// Answer after `delay`.
    Slow(Duration, DetectionPayload),
}

// ── ScriptedBackend ─────────────────────────────────────────────────

pub struct ScriptedBackend {
    cameras: Vec<u32>,
    calls: Mutex<Vec<(Call, Instant)>>,
    script: Mutex<VecDeque<Step>>,
    plates: Mutex<Vec<PlateRecord>>,
    next_plate_id: Mutex<u64>,
    pub fail_camera_start: AtomicBool,
    pub fail_detection_start: AtomicBool,
    pub fail_detection_stop: AtomicBool,
    pub fail_camera_stop: AtomicBool,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            cameras: vec![0, 1, 2],
            calls: Mutex::new(Vec::new()),
            script: Mutex::new(VecDeque::new()),
            plates: Mutex::new(Vec::new()),
            next_plate_id: Mutex::new(1),
            fail_camera_start: AtomicBool::new(false),
            fail_detection_start: AtomicBool::new(false),
            fail_detection_stop: AtomicBool::new(false),
            fail_camera_stop: AtomicBool::new(false),
        }
    }

    pub fn with_script(steps: impl IntoIterator<Item = Step>) -> Self {
        let backend = Self::new();
        backend.push(steps);
        backend
    }

    pub fn with_plates(plates: Vec<PlateRecord>) -> Self {
        let backend = Self::new();
        *backend.plates.lock().unwrap() = plates;
        backend
    }

    pub fn push(&self, steps: impl IntoIterator<Item = Step>) {
        self.script.lock().unwrap().extend(steps);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
    }

    /// Calls other than `FetchLatest`, which the poll loop makes on a timer.
    pub fn lifecycle_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| *c != Call::FetchLatest)
            .collect()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.lock().unwrap().iter().filter(|(c, _)| c == call).count()
    }

    pub fn time_of(&self, call: &Call) -> Option<Instant> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(c, _)| c == call)
            .map(|(_, at)| *at)
    }

    pub fn plates(&self) -> Vec<PlateRecord> {
        self.plates.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push((call, Instant::now()));
    }

    fn fails(flag: &AtomicBool, operation: &'static str) -> Result<(), CoreError> {
        if flag.load(Ordering::SeqCst) {
            Err(CoreError::ServiceFailure {
                operation,
                message: "scripted failure".into(),
            })
        } else {
            Ok(())
        }
    }
}

impl GateBackend for ScriptedBackend {
    async fn list_cameras(&self) -> Result<CameraInventory, CoreError> {
        self.record(Call::ListCameras);
        Ok(CameraInventory {
            cameras: self
                .cameras
                .iter()
                .map(|&id| CameraDescriptor {
                    id,
                    name: format!("Camera {id}"),
                    resolution: "640x480".into(),
                    fps: Some(30),
                    is_current: false,
                })
                .collect(),
            active_camera_id: None,
        })
    }

    async fn start_camera(&self, camera_id: u32) -> Result<StreamHandle, CoreError> {
        self.record(Call::StartCamera(camera_id));
        if !self.cameras.contains(&camera_id) {
            return Err(CoreError::CameraNotFound { camera_id });
        }
        Self::fails(&self.fail_camera_start, "start the camera")?;
        let url = Url::parse("http://gate.test/api/camera/stream").unwrap();
        Ok(StreamHandle::new(url))
    }

    async fn stop_camera(&self) -> Result<(), CoreError> {
        self.record(Call::StopCamera);
        Self::fails(&self.fail_camera_stop, "stop the camera")
    }

    async fn start_detection(&self) -> Result<(), CoreError> {
        self.record(Call::StartDetection);
        if self.fail_detection_start.load(Ordering::SeqCst) {
            return Err(CoreError::DetectionStartFailed {
                message: "model not loaded".into(),
            });
        }
        Ok(())
    }

    async fn stop_detection(&self) -> Result<(), CoreError> {
        self.record(Call::StopDetection);
        Self::fails(&self.fail_detection_stop, "stop detection")
    }

    async fn fetch_latest(&self) -> Result<LatestDetectionResponse, CoreError> {
        self.record(Call::FetchLatest);
        let step = self.script.lock().unwrap().pop_front().unwrap_or(Step::Empty);
        let payload = match step {
            Step::Empty => return Ok(latest(None, false)),
            Step::Hollow => return Ok(latest(None, true)),
            Step::Fail => {
                return Err(CoreError::ServiceUnavailable {
                    message: "connection refused".into(),
                });
            }
            Step::Result(payload) => payload,
            Step::Slow(delay, payload) => {
                tokio::time::sleep(delay).await;
                payload
            }
        };
        Ok(latest(Some(payload), true))
    }

    async fn list_plates(&self) -> Result<Vec<PlateRecord>, CoreError> {
        self.record(Call::ListPlates);
        Ok(self.plates())
    }

    async fn add_plate(&self, plate: &PlateNumber) -> Result<(), CoreError> {
        self.record(Call::AddPlate(plate.to_string()));
        let mut plates = self.plates.lock().unwrap();
        if plates.iter().any(|p| p.plate_number == plate.as_str()) {
            return Err(CoreError::DuplicatePlate {
                plate: plate.to_string(),
            });
        }
        let mut next = self.next_plate_id.lock().unwrap();
        plates.push(PlateRecord {
            id: PlateId::new(next.to_string()),
            plate_number: plate.to_string(),
            created_at: Some(Utc::now()),
        });
        *next += 1;
        Ok(())
    }

    async fn delete_plate(&self, id: &PlateId) -> Result<(), CoreError> {
        self.record(Call::DeletePlate(id.to_string()));
        let mut plates = self.plates.lock().unwrap();
        let before = plates.len();
        plates.retain(|p| &p.id != id);
        if plates.len() == before {
            return Err(CoreError::PlateNotFound { id: id.to_string() });
        }
        Ok(())
    }

    async fn check_plate(&self, plate: &PlateNumber) -> Result<PlateCheck, CoreError> {
        self.record(Call::CheckPlate(plate.to_string()));
        let authorized = self
            .plates
            .lock()
            .unwrap()
            .iter()
            .any(|p| p.plate_number == plate.as_str());
        Ok(PlateCheck {
            plate_number: plate.to_string(),
            authorized,
            message: None,
        })
    }

    async fn health(&self) -> Result<BackendHealth, CoreError> {
        self.record(Call::Health);
        Ok(BackendHealth {
            status: "healthy".into(),
            message: None,
            components: Vec::new(),
            camera: None,
        })
    }
}

fn latest(result: Option<DetectionPayload>, has_result: bool) -> LatestDetectionResponse {
    LatestDetectionResponse {
        has_result,
        result,
        message: None,
    }
}

// ── Payload builders ────────────────────────────────────────────────

pub fn payload(action: &str, timestamp: &str) -> DetectionPayload {
    DetectionPayload {
        vehicle_detected: Some(true),
        vehicle_type: Some("truck".into()),
        confidence: Some(0.91),
        plate_detected: Some(true),
        plate_text: Some("34ABC1234".into()),
        gate_action: Some(action.into()),
        timestamp: Some(timestamp.into()),
        ..DetectionPayload::default()
    }
}

pub fn sequenced(action: &str, timestamp: &str, sequence: u64) -> DetectionPayload {
    DetectionPayload {
        sequence: Some(sequence),
        ..payload(action, timestamp)
    }
}

pub fn plate_record(id: &str, number: &str, created_at: Option<&str>) -> PlateRecord {
    PlateRecord {
        id: PlateId::new(id),
        plate_number: number.into(),
        created_at: created_at.map(|s| s.parse::<DateTime<Utc>>().unwrap()),
    }
}

// ── Sink ────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct CollectingSink {
    seen: Mutex<Vec<Arc<DetectionResult>>>,
}

impl CollectingSink {
    pub fn seen(&self) -> Vec<Arc<DetectionResult>> {
        self.seen.lock().unwrap().clone()
    }
}

impl DetectionSink for CollectingSink {
    fn dispatch(&self, result: Arc<DetectionResult>) {
        self.seen.lock().unwrap().push(result);
    }
}

/// Let spawned tasks run without moving the paused clock.
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
