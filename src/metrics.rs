//! Lightweight runtime metrics aggregation for the render service

use crate::payload::ContentKind;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};
use tokio::time::{self, MissedTickBehavior};
use tracing::info;

static METRICS: OnceLock<Arc<MetricsInner>> = OnceLock::new();

/// Enable periodic metrics emission with the provided interval in seconds.
pub fn enable(interval_secs: u64) {
    let interval = interval_secs.max(5);
    let inner = Arc::clone(METRICS.get_or_init(|| Arc::new(MetricsInner::new(interval))));
    inner.update_interval(interval);
    inner.ensure_task();
}

/// Record the outcome of a render attempt for aggregation.
pub fn record(duration: Duration, success: bool, kind: ContentKind) {
    if let Some(inner) = METRICS.get() {
        inner.record(duration, success, kind);
    }
}

struct MetricsInner {
    state: Mutex<MetricsState>,
    interval_secs: AtomicU64,
    task_spawned: AtomicBool,
}

impl MetricsInner {
    fn new(interval_secs: u64) -> Self {
        Self {
            state: Mutex::new(MetricsState::new()),
            interval_secs: AtomicU64::new(interval_secs.max(5)),
            task_spawned: AtomicBool::new(false),
        }
    }

    fn update_interval(&self, interval_secs: u64) {
        self.interval_secs
            .store(interval_secs.max(5), Ordering::Relaxed);
    }

    fn ensure_task(self: &Arc<Self>) {
        if self
            .task_spawned
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            let runner = Arc::clone(self);
            tokio::spawn(async move {
                runner.run().await;
            });
        }
    }

    fn record(&self, duration: Duration, success: bool, kind: ContentKind) {
        let mut state = self.state.lock().expect("metrics mutex poisoned");
        state.total_renders += 1;
        if success {
            state.successes += 1;
            state.success_duration += duration;
        } else {
            state.failures += 1;
        }

        let entry = state.per_kind.entry(kind).or_insert_with(KindCounters::default);
        if success {
            entry.successes += 1;
        } else {
            entry.failures += 1;
        }
    }

    async fn run(self: Arc<Self>) {
        let mut current_secs = self.interval_secs.load(Ordering::Relaxed).max(5);
        loop {
            let mut ticker = time::interval(Duration::from_secs(current_secs));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // Align the ticker so the first report happens after a full interval
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let snapshot = self.snapshot_and_reset();
                log_snapshot(&snapshot);

                let next_secs = self.interval_secs.load(Ordering::Relaxed).max(5);
                if next_secs != current_secs {
                    current_secs = next_secs;
                    break;
                }
            }
        }
    }

    fn snapshot_and_reset(&self) -> Snapshot {
        let mut state = self.state.lock().expect("metrics mutex poisoned");
        state.snapshot_and_reset()
    }
}

struct MetricsState {
    total_renders: u64,
    successes: u64,
    failures: u64,
    success_duration: Duration,
    per_kind: HashMap<ContentKind, KindCounters>,
    last_reset: Instant,
}

impl MetricsState {
    fn new() -> Self {
        Self {
            total_renders: 0,
            successes: 0,
            failures: 0,
            success_duration: Duration::ZERO,
            per_kind: HashMap::new(),
            last_reset: Instant::now(),
        }
    }

    fn snapshot_and_reset(&mut self) -> Snapshot {
        let snapshot = Snapshot {
            total_renders: self.total_renders,
            successes: self.successes,
            failures: self.failures,
            success_duration: self.success_duration,
            elapsed: self.last_reset.elapsed(),
            per_kind: self.per_kind.drain().collect(),
        };

        self.total_renders = 0;
        self.successes = 0;
        self.failures = 0;
        self.success_duration = Duration::ZERO;
        self.last_reset = Instant::now();

        snapshot
    }
}

#[derive(Default)]
struct KindCounters {
    successes: u64,
    failures: u64,
}

struct Snapshot {
    total_renders: u64,
    successes: u64,
    failures: u64,
    success_duration: Duration,
    elapsed: Duration,
    per_kind: Vec<(ContentKind, KindCounters)>,
}

fn log_snapshot(snapshot: &Snapshot) {
    if snapshot.total_renders == 0 {
        return;
    }

    let avg_ms = if snapshot.successes == 0 {
        0.0
    } else {
        snapshot.success_duration.as_secs_f64() * 1_000.0 / snapshot.successes as f64
    };

    info!(
        target: "qrstudio::metrics",
        interval_secs = snapshot.elapsed.as_secs(),
        total_renders = snapshot.total_renders,
        success_count = snapshot.successes,
        failure_count = snapshot.failures,
        avg_latency_ms = avg_ms,
        "Render metrics window"
    );

    if !snapshot.per_kind.is_empty() {
        let breakdown = snapshot
            .per_kind
            .iter()
            .map(|(kind, counters)| {
                if counters.failures > 0 {
                    format!("{}: {} ok / {} err", kind, counters.successes, counters.failures)
                } else {
                    format!("{}: {} ok", kind, counters.successes)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        info!(target: "qrstudio::metrics", breakdown, "Per-type metrics");
    }
}
