//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use truckgate_config::ConfigError;
use truckgate_core::{CoreError, SessionPhase};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const SESSION: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the gate backend")]
    #[diagnostic(
        code(truckgate::connection_failed),
        help(
            "Check that the backend is running and reachable.\n\
             Reason: {reason}\n\
             Try: truckgate health --backend http://localhost:5001"
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(truckgate::timeout),
        help("Increase timeout with --timeout or check backend responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(truckgate::not_found),
        help("Run: truckgate {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{resource_type} '{identifier}' already exists")]
    #[diagnostic(code(truckgate::conflict))]
    Conflict {
        resource_type: String,
        identifier: String,
    },

    // ── Session ──────────────────────────────────────────────────────
    #[error("Camera {camera_id} already has an active session")]
    #[diagnostic(
        code(truckgate::session_active),
        help("Stop the running session first, or wait for it to finish.")
    )]
    SessionActive { camera_id: u32 },

    #[error("Camera session is {phase}")]
    #[diagnostic(
        code(truckgate::session_busy),
        help("Another start or stop is in progress; retry in a moment.")
    )]
    SessionBusy { phase: SessionPhase },

    #[error("No camera session is active")]
    #[diagnostic(code(truckgate::not_active))]
    NotActive,

    #[error("Detection could not be started: {message}")]
    #[diagnostic(
        code(truckgate::detection_failed),
        help("The camera was stopped again. Check the backend logs for the detector state.")
    )]
    DetectionFailed { message: String },

    #[error("Backend failed to {operation}: {message}")]
    #[diagnostic(code(truckgate::backend_failure))]
    BackendFailure { operation: String, message: String },

    #[error("Unexpected backend response: {message}")]
    #[diagnostic(
        code(truckgate::protocol),
        help("The backend may be a different version than this CLI expects.")
    )]
    Protocol { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(truckgate::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(truckgate::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: truckgate config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No gate backend configured")]
    #[diagnostic(
        code(truckgate::no_config),
        help(
            "Create a profile with: truckgate config init\n\
             Or pass --backend <url> (TRUCKGATE_BACKEND).\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(truckgate::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(truckgate::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(truckgate::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::SessionActive { .. }
            | Self::SessionBusy { .. }
            | Self::NotActive
            | Self::DetectionFailed { .. }
            | Self::BackendFailure { .. } => exit_code::SESSION,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::ProfileNotFound { .. }
            | Self::NoConfig { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ServiceUnavailable { message } => {
                CliError::ConnectionFailed { reason: message }
            }

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::CameraNotFound { camera_id } => CliError::NotFound {
                resource_type: "camera".into(),
                identifier: camera_id.to_string(),
                list_command: "cameras list".into(),
            },

            CoreError::PlateNotFound { id } => CliError::NotFound {
                resource_type: "plate".into(),
                identifier: id,
                list_command: "plates list".into(),
            },

            CoreError::DuplicatePlate { plate } => CliError::Conflict {
                resource_type: "plate".into(),
                identifier: plate,
            },

            CoreError::AlreadyActive { camera_id } => CliError::SessionActive { camera_id },
            CoreError::SessionBusy { phase } => CliError::SessionBusy { phase },
            CoreError::NotActive => CliError::NotActive,

            CoreError::DetectionStartFailed { message } => CliError::DetectionFailed { message },

            CoreError::ServiceFailure { operation, message } => CliError::BackendFailure {
                operation: operation.into(),
                message,
            },

            CoreError::InvalidPlate { input, reason } => CliError::Validation {
                field: "plate".into(),
                reason: format!("'{input}': {reason}"),
            },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Protocol { message } => CliError::Protocol { message },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: available_profiles(),
            },
            other => CliError::Config(other),
        }
    }
}

fn available_profiles() -> String {
    let cfg = truckgate_config::load_config_or_default();
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}
