// ── Gate domain types ──

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use super::detection::{DetectionResult, GateAction};

/// What the operator display shows.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GatePhase {
    #[default]
    Ready,
    Processing,
    Success,
    Denied,
}

impl GatePhase {
    /// Phases that revert to `Ready` after the dwell period.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Denied)
    }

    /// The phase a gate action drives the display to, if any.
    pub fn for_action(action: GateAction) -> Option<Self> {
        match action {
            GateAction::Open => Some(Self::Success),
            GateAction::Denied => Some(Self::Denied),
            GateAction::Closed | GateAction::Unknown => None,
        }
    }
}

/// Snapshot of the gate display state.
#[derive(Debug, Clone, PartialEq)]
pub struct GateState {
    pub phase: GatePhase,
    pub entered_at: Instant,
    /// When a terminal phase is due to revert; `None` otherwise.
    pub reset_deadline: Option<Instant>,
    pub last_result: Option<Arc<DetectionResult>>,
    pub last_result_at: Option<Instant>,
    /// Bumped on every phase change; a pending reset only fires if it
    /// still matches the revision it was scheduled for.
    pub revision: u64,
}

impl GateState {
    pub fn ready(now: Instant) -> Self {
        Self {
            phase: GatePhase::Ready,
            entered_at: now,
            reset_deadline: None,
            last_result: None,
            last_result_at: None,
            revision: 0,
        }
    }

    /// Move to `phase`, clearing any reset deadline.
    pub(crate) fn enter(&mut self, phase: GatePhase, now: Instant) {
        self.phase = phase;
        self.entered_at = now;
        self.reset_deadline = None;
        self.revision += 1;
    }
}
