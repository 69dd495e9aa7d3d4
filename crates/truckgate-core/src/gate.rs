// ── Gate state machine ──
//
// Drives the operator-facing gate display from detection results:
//
//   Ready ──open──▶ Success ──dwell──▶ Ready
//   Ready ──denied─▶ Denied ──dwell──▶ Ready
//   any ──busy──▶ Processing ──idle──▶ Ready
//
// State lives in a `watch` channel so every transition is a single
// atomic `send_modify` and observers always see a consistent snapshot.
// The reset token is swapped inside that same closure: the sender's lock
// orders state revisions and token replacement identically, so the live
// token always belongs to the latest revision. A timer that loses the
// race anyway is ignored because the revision it captured no longer
// matches.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use arc_swap::ArcSwapOption;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::model::{DetectionResult, GatePhase, GateState};
use crate::stream::StateStream;

/// Cheaply cloneable handle to the gate display state.
#[derive(Clone)]
pub struct GateStateMachine {
    inner: Arc<GateInner>,
}

struct GateInner {
    state: watch::Sender<GateState>,
    dwell: Duration,
    pending_reset: ArcSwapOption<CancellationToken>,
    resets_fired: AtomicU64,
}

impl GateStateMachine {
    pub fn new(dwell: Duration) -> Self {
        let (state, _) = watch::channel(GateState::ready(Instant::now()));
        Self {
            inner: Arc::new(GateInner {
                state,
                dwell,
                pending_reset: ArcSwapOption::empty(),
                resets_fired: AtomicU64::new(0),
            }),
        }
    }

    /// Current snapshot.
    pub fn current(&self) -> GateState {
        self.inner.state.borrow().clone()
    }

    pub fn phase(&self) -> GatePhase {
        self.inner.state.borrow().phase
    }

    pub fn subscribe(&self) -> StateStream<GateState> {
        StateStream::new(self.inner.state.subscribe())
    }

    /// Number of automatic reverts to `Ready` since creation.
    pub fn resets_fired(&self) -> u64 {
        self.inner.resets_fired.load(Ordering::Relaxed)
    }

    /// Apply one detection result and return the resulting phase.
    ///
    /// `open` and `denied` replace whatever phase was showing and restart
    /// the dwell timer. `closed` and unrecognized actions only record the
    /// result; the phase and any pending reset are left alone.
    pub fn apply(&self, result: Arc<DetectionResult>) -> GatePhase {
        let now = Instant::now();
        let Some(target) = GatePhase::for_action(result.gate_action) else {
            debug!(action = %result.gate_action, "non-actionable result, phase unchanged");
            let mut phase = GatePhase::Ready;
            self.inner.state.send_modify(|s| {
                s.last_result = Some(result);
                s.last_result_at = Some(now);
                phase = s.phase;
            });
            return phase;
        };

        let deadline = now + self.inner.dwell;
        let token = CancellationToken::new();
        let mut revision = 0;
        self.inner.state.send_modify(|s| {
            s.enter(target, now);
            s.reset_deadline = Some(deadline);
            s.last_result = Some(Arc::clone(&result));
            s.last_result_at = Some(now);
            revision = s.revision;
            self.inner.replace_pending(Some(token.clone()));
        });
        info!(
            phase = %target,
            plate = result.plate_text.as_deref().unwrap_or("-"),
            "gate decision"
        );
        self.spawn_reset(token, revision, deadline);
        target
    }

    /// Show `Processing` while a session start/stop is in flight, and
    /// return to `Ready` when it completes.
    pub fn set_busy(&self, busy: bool) {
        let now = Instant::now();
        if busy {
            self.inner.state.send_if_modified(|s| {
                self.inner.replace_pending(None);
                if s.phase == GatePhase::Processing {
                    return false;
                }
                s.enter(GatePhase::Processing, now);
                true
            });
        } else {
            self.inner.state.send_if_modified(|s| {
                if s.phase != GatePhase::Processing {
                    return false;
                }
                s.enter(GatePhase::Ready, now);
                true
            });
        }
    }

    /// Operator acknowledgement: return to `Ready` immediately.
    pub fn reset(&self) {
        let now = Instant::now();
        self.inner.state.send_if_modified(|s| {
            self.inner.replace_pending(None);
            if s.phase == GatePhase::Ready {
                return false;
            }
            s.enter(GatePhase::Ready, now);
            true
        });
    }

    /// Drop the pending reset timer without changing phase.
    pub fn cancel_pending_reset(&self) {
        self.inner.state.send_if_modified(|_| {
            self.inner.replace_pending(None);
            false
        });
    }

    fn spawn_reset(&self, token: CancellationToken, revision: u64, deadline: Instant) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => {}
                () = tokio::time::sleep_until(deadline) => inner.fire_reset(revision),
            }
        });
    }
}

impl GateInner {
    /// Install `next` as the live reset token and cancel the one it replaces.
    fn replace_pending(&self, next: Option<CancellationToken>) {
        if let Some(previous) = self.pending_reset.swap(next.map(Arc::new)) {
            previous.cancel();
        }
    }

    fn fire_reset(&self, revision: u64) {
        let now = Instant::now();
        let fired = self.state.send_if_modified(|s| {
            if s.revision != revision || !s.phase.is_terminal() {
                return false;
            }
            s.enter(GatePhase::Ready, now);
            true
        });
        if fired {
            self.resets_fired.fetch_add(1, Ordering::Relaxed);
            debug!("gate dwell elapsed, back to ready");
        }
    }
}
