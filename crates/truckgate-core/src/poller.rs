// ── Detection poller ──
//
// Periodically fetches the latest detection result and dispatches each
// genuinely new one exactly once. A start bumps the generation counter and
// spawns one poll task tagged with it; a stop bumps it again, cancels the
// task and joins it. Fetches that complete after the bump are discarded,
// so nothing is dispatched once `stop_polling` has returned.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use arc_swap::ArcSwapOption;
use chrono::Utc;
use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use truckgate_api::models::LatestDetectionResponse;

use crate::backend::GateBackend;
use crate::error::CoreError;
use crate::model::{CameraSession, DetectionResult};

/// Receives each new detection result.
pub trait DetectionSink: Send + Sync + 'static {
    fn dispatch(&self, result: Arc<DetectionResult>);
}

/// Counters since the poller was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PollerStats {
    pub ticks: u64,
    /// Ticks skipped because no camera session was active.
    pub skipped_inactive: u64,
    pub fetch_failures: u64,
    pub empty: u64,
    pub protocol_errors: u64,
    pub clamped_confidence: u64,
    pub stale_dropped: u64,
    pub dispatched: u64,
}

#[derive(Default)]
struct Counters {
    ticks: AtomicU64,
    skipped_inactive: AtomicU64,
    fetch_failures: AtomicU64,
    empty: AtomicU64,
    protocol_errors: AtomicU64,
    clamped_confidence: AtomicU64,
    stale_dropped: AtomicU64,
    dispatched: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> PollerStats {
        PollerStats {
            ticks: self.ticks.load(Ordering::Relaxed),
            skipped_inactive: self.skipped_inactive.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            empty: self.empty.load(Ordering::Relaxed),
            protocol_errors: self.protocol_errors.load(Ordering::Relaxed),
            clamped_confidence: self.clamped_confidence.load(Ordering::Relaxed),
            stale_dropped: self.stale_dropped.load(Ordering::Relaxed),
            dispatched: self.dispatched.load(Ordering::Relaxed),
        }
    }
}

struct PollTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct DetectionPoller<B> {
    inner: Arc<PollerInner<B>>,
}

struct PollerInner<B> {
    backend: Arc<B>,
    session: watch::Receiver<CameraSession>,
    sink: Arc<dyn DetectionSink>,
    fetch_timeout: Duration,
    generation: AtomicU64,
    task: Mutex<Option<PollTask>>,
    last_dispatched: ArcSwapOption<DetectionResult>,
    counters: Counters,
}

impl<B: GateBackend> DetectionPoller<B> {
    pub fn new(
        backend: Arc<B>,
        session: watch::Receiver<CameraSession>,
        sink: Arc<dyn DetectionSink>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(PollerInner {
                backend,
                session,
                sink,
                fetch_timeout,
                generation: AtomicU64::new(0),
                task: Mutex::new(None),
                last_dispatched: ArcSwapOption::empty(),
                counters: Counters::default(),
            }),
        }
    }

    /// Begin polling every `interval`. The first fetch happens one
    /// interval from now. A no-op if a poll loop is already running.
    pub async fn start_polling(&self, interval: Duration) {
        let mut slot = self.inner.task.lock().await;
        if slot.is_some() {
            debug!("poll loop already running");
            return;
        }
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poll_task(
            Arc::clone(&self.inner),
            interval,
            generation,
            cancel.clone(),
        ));
        debug!(generation, ?interval, "poll loop started");
        *slot = Some(PollTask { cancel, handle });
    }

    /// Stop polling. Once this returns, no further result is dispatched
    /// until the next `start_polling`.
    pub async fn stop_polling(&self) {
        let taken = self.inner.task.lock().await.take();
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = taken {
            task.cancel.cancel();
            if let Err(e) = task.handle.await {
                warn!(error = %e, "poll task ended abnormally");
            }
            debug!("poll loop stopped");
        }
    }

    pub async fn is_polling(&self) -> bool {
        self.inner.task.lock().await.is_some()
    }

    pub fn stats(&self) -> PollerStats {
        self.inner.counters.snapshot()
    }

    /// The most recent result handed to the sink.
    pub fn last_dispatched(&self) -> Option<Arc<DetectionResult>> {
        self.inner.last_dispatched.load_full()
    }
}

async fn poll_task<B: GateBackend>(
    inner: Arc<PollerInner<B>>,
    period: Duration,
    generation: u64,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                Counters::bump(&inner.counters.ticks);
                let active = inner.session.borrow().is_active();
                if !active {
                    Counters::bump(&inner.counters.skipped_inactive);
                    debug!("poll tick skipped, no active camera session");
                    continue;
                }

                let fetched = tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    r = tokio::time::timeout(inner.fetch_timeout, inner.backend.fetch_latest()) => r,
                };
                if inner.generation.load(Ordering::SeqCst) != generation {
                    debug!(generation, "discarding fetch from a superseded poll loop");
                    break;
                }

                match fetched {
                    Ok(Ok(latest)) => inner.handle_latest(latest),
                    Ok(Err(e)) => {
                        Counters::bump(&inner.counters.fetch_failures);
                        debug!(error = %e, kind = %e.kind(), "detection fetch failed");
                    }
                    Err(_) => {
                        Counters::bump(&inner.counters.fetch_failures);
                        debug!(timeout = ?inner.fetch_timeout, "detection fetch timed out");
                    }
                }
            }
        }
    }
}

impl<B> PollerInner<B> {
    fn handle_latest(&self, latest: LatestDetectionResponse) {
        if !latest.has_result {
            Counters::bump(&self.counters.empty);
            return;
        }
        let normalized = latest
            .result
            .ok_or_else(|| CoreError::Protocol {
                message: "has_result is set but result is missing".into(),
            })
            .and_then(|payload| DetectionResult::from_payload(payload, Utc::now()));
        let result = match normalized {
            Ok(result) => result,
            Err(e) => {
                Counters::bump(&self.counters.protocol_errors);
                warn!(error = %e, "discarding malformed detection result");
                return;
            }
        };

        if result.confidence_clamped {
            Counters::bump(&self.counters.clamped_confidence);
            warn!(
                confidence = result.confidence,
                "detection confidence out of range, clamped"
            );
        }

        if let Some(previous) = self.last_dispatched.load().as_deref() {
            if !result.supersedes(previous) {
                Counters::bump(&self.counters.stale_dropped);
                debug!(observed_at = %result.observed_at, "result not newer than last dispatched");
                return;
            }
        }

        let result = Arc::new(result);
        self.last_dispatched.store(Some(Arc::clone(&result)));
        Counters::bump(&self.counters.dispatched);
        self.sink.dispatch(result);
    }
}
