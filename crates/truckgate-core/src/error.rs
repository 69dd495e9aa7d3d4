// ── Core error types ──
//
// Session-level errors from truckgate-core. Consumers never see HTTP
// status codes or JSON parse failures directly: the `From<truckgate_api::Error>`
// impl and the per-operation mapping in `backend` translate transport
// errors into the categories the coordinator reasons about.

use thiserror::Error;

use crate::model::SessionPhase;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── User errors ──────────────────────────────────────────────────
    #[error("Invalid plate '{input}': {reason}")]
    InvalidPlate { input: String, reason: String },

    #[error("A camera session is already active (camera {camera_id})")]
    AlreadyActive { camera_id: u32 },

    #[error("Camera session is busy ({phase}); try again once it settles")]
    SessionBusy { phase: SessionPhase },

    #[error("No camera session is active")]
    NotActive,

    #[error("Plate {plate} is already whitelisted")]
    DuplicatePlate { plate: String },

    #[error("Plate record not found: {id}")]
    PlateNotFound { id: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Session failures ─────────────────────────────────────────────
    #[error("Camera {camera_id} not found")]
    CameraNotFound { camera_id: u32 },

    #[error("Backend failed to {operation}: {message}")]
    ServiceFailure {
        operation: &'static str,
        message: String,
    },

    #[error("Detection could not be started: {message}")]
    DetectionStartFailed { message: String },

    // ── Transient failures ───────────────────────────────────────────
    #[error("Gate backend unavailable: {message}")]
    ServiceUnavailable { message: String },

    #[error("Gate backend timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Protocol errors ──────────────────────────────────────────────
    #[error("Malformed backend payload: {message}")]
    Protocol { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification used for logging and surfacing decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Caused by operator input; shown inline, never retried.
    User,
    /// Network hiccup or slow backend; the next tick may succeed.
    Transient,
    /// The session cannot continue as requested; surfaced to the operator.
    FatalSession,
    /// Unexpected payload shape; logged and discarded.
    Protocol,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPlate { .. }
            | Self::AlreadyActive { .. }
            | Self::SessionBusy { .. }
            | Self::NotActive
            | Self::DuplicatePlate { .. }
            | Self::PlateNotFound { .. }
            | Self::ValidationFailed { .. }
            | Self::Config { .. } => ErrorKind::User,
            Self::ServiceUnavailable { .. } | Self::Timeout { .. } => ErrorKind::Transient,
            Self::CameraNotFound { .. }
            | Self::ServiceFailure { .. }
            | Self::DetectionStartFailed { .. }
            | Self::Internal(_) => ErrorKind::FatalSession,
            Self::Protocol { .. } => ErrorKind::Protocol,
        }
    }

    /// Whether the operator should see this error. Transient and protocol
    /// errors during polling are only logged.
    pub fn is_reportable(&self) -> bool {
        matches!(self.kind(), ErrorKind::User | ErrorKind::FatalSession)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<truckgate_api::Error> for CoreError {
    fn from(err: truckgate_api::Error) -> Self {
        use truckgate_api::Error as ApiError;

        match err {
            ApiError::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            ApiError::Transport(ref e) if e.is_timeout() => CoreError::Timeout { timeout_secs: 0 },
            ApiError::Transport(e) => CoreError::ServiceUnavailable {
                message: e.to_string(),
            },
            ApiError::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            ApiError::Tls(message) | ApiError::Config(message) => CoreError::Config { message },
            ApiError::Api {
                status, message, ..
            } if status >= 500 => CoreError::ServiceUnavailable { message },
            ApiError::Api { message, .. } => CoreError::ValidationFailed { message },
            ApiError::Rejected { message } => CoreError::ServiceFailure {
                operation: "complete the request",
                message,
            },
            ApiError::Deserialization { message, .. } => CoreError::Protocol { message },
        }
    }
}
