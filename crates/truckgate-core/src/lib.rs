//! Session coordination between `truckgate-api` and the operator CLI.
//!
//! This crate owns the temporal behaviour of a truck gate:
//!
//! - **[`SessionCoordinator`]**: facade over one gate. Starts a session
//!   (camera, grace delay, detection, polling), tears it down in reverse,
//!   and exposes observable session and gate state.
//!
//! - **[`CameraSessionManager`]**: the single camera session, guarded by
//!   a phase token so overlapping start/stop calls are rejected.
//!
//! - **[`DetectionPoller`]**: cancellable, generation-tagged poll loop
//!   that dispatches each new detection result exactly once.
//!
//! - **[`GateStateMachine`]**: Ready / Processing / Success / Denied with
//!   a single auto-reset timer.
//!
//! - **[`PlateRegistry`]**: validated whitelist CRUD.
//!
//! All backend access goes through the [`GateBackend`] trait;
//! [`HttpBackend`] is the REST implementation.

pub mod backend;
pub mod camera;
pub mod config;
pub mod convert;
pub mod coordinator;
pub mod error;
pub mod gate;
pub mod model;
pub mod plates;
pub mod poller;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::{GateBackend, HttpBackend};
pub use camera::CameraSessionManager;
pub use config::{BackendConfig, CoordinatorConfig, TlsVerification};
pub use coordinator::{SessionCoordinator, StopOutcome};
pub use error::{CoreError, ErrorKind};
pub use gate::GateStateMachine;
pub use plates::PlateRegistry;
pub use poller::{DetectionPoller, DetectionSink, PollerStats};
pub use stream::StateStream;

pub use model::{
    BackendHealth, CameraDescriptor, CameraInventory, CameraSession, DetectionResult, GateAction,
    GatePhase, GateState, PlateCheck, PlateId, PlateNumber, PlateRecord, SessionPhase,
    StreamHandle,
};
