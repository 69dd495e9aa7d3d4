use thiserror::Error;

/// Top-level error type for the `truckgate-api` crate.
///
/// Covers every failure mode of the gate backend's REST surface:
/// transport, structured error bodies, rejected operations, and payload
/// decoding. `truckgate-core` maps these into session-level errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Client-side configuration could not be turned into a request.
    #[error("Invalid client configuration: {0}")]
    Config(String),

    // ── Backend ─────────────────────────────────────────────────────
    /// Non-2xx response, parsed from the `{error, details}` or
    /// `{success: false, message}` body when one is present.
    #[error("Backend error (HTTP {status}): {message}")]
    Api {
        status: u16,
        message: String,
        details: Option<String>,
    },

    /// 2xx response carrying `success: false`.
    #[error("Operation rejected by backend: {message}")]
    Rejected { message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// HTTP status of the failed response, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns `true` if the backend reported a conflicting resource
    /// (HTTP 409, or a 400 whose message says the entry already exists).
    pub fn is_conflict(&self) -> bool {
        match self {
            Self::Api { status: 409, .. } => true,
            Self::Api {
                status: 400,
                message,
                ..
            }
            | Self::Rejected { message } => {
                // The stock backend words this in Turkish ("zaten mevcut").
                let lower = message.to_lowercase();
                lower.contains("already") || lower.contains("exist") || lower.contains("mevcut")
            }
            _ => false,
        }
    }

    /// Human-readable message without the transport prefix.
    pub fn message(&self) -> String {
        match self {
            Self::Api { message, .. } | Self::Rejected { message } => message.clone(),
            other => other.to_string(),
        }
    }
}
