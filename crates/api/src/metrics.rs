use extract::{Recovery, Strategy};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

pub struct Metrics {
    // Counters
    total_requests: AtomicUsize,
    provider_failures: AtomicUsize,

    // Recoveries by winning strategy
    direct: AtomicUsize,
    cleaned: AtomicUsize,
    key_folded: AtomicUsize,
    lowercased: AtomicUsize,
    exhausted: AtomicUsize,

    // Timing (in microseconds)
    total_extract_time_us: AtomicU64,
    timed_extractions: AtomicUsize,

    total_entities_extracted: AtomicUsize,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            total_requests: AtomicUsize::new(0),
            provider_failures: AtomicUsize::new(0),
            direct: AtomicUsize::new(0),
            cleaned: AtomicUsize::new(0),
            key_folded: AtomicUsize::new(0),
            lowercased: AtomicUsize::new(0),
            exhausted: AtomicUsize::new(0),
            total_extract_time_us: AtomicU64::new(0),
            timed_extractions: AtomicUsize::new(0),
            total_entities_extracted: AtomicUsize::new(0),
        })
    }

    pub fn record_request(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_provider_failure(&self) {
        self.provider_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_recovery(&self, recovery: &Recovery) {
        let counter = match recovery.strategy {
            Some(Strategy::Direct) => &self.direct,
            Some(Strategy::Cleaned) => &self.cleaned,
            Some(Strategy::KeyFolded) => &self.key_folded,
            Some(Strategy::Lowercased) => &self.lowercased,
            None => &self.exhausted,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.total_entities_extracted
            .fetch_add(recovery.result.entity_count(), Ordering::Relaxed);
    }

    pub fn record_extract(&self, duration: Duration) {
        self.total_extract_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.timed_extractions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            provider_failures: self.provider_failures.load(Ordering::Relaxed),
            recoveries: StrategyCounts {
                direct: self.direct.load(Ordering::Relaxed),
                cleaned: self.cleaned.load(Ordering::Relaxed),
                key_folded: self.key_folded.load(Ordering::Relaxed),
                lowercased: self.lowercased.load(Ordering::Relaxed),
                exhausted: self.exhausted.load(Ordering::Relaxed),
            },
            avg_extract_time_ms: self.avg_time_ms(&self.total_extract_time_us, &self.timed_extractions),
            total_entities_extracted: self.total_entities_extracted.load(Ordering::Relaxed),
        }
    }

    fn avg_time_ms(&self, total_us: &AtomicU64, count: &AtomicUsize) -> f64 {
        let total = total_us.load(Ordering::Relaxed) as f64;
        let cnt = count.load(Ordering::Relaxed) as f64;
        if cnt > 0.0 {
            total / cnt / 1000.0 // Convert to ms
        } else {
            0.0
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StrategyCounts {
    pub direct: usize,
    pub cleaned: usize,
    pub key_folded: usize,
    pub lowercased: usize,
    pub exhausted: usize,
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: usize,
    pub provider_failures: usize,
    pub recoveries: StrategyCounts,
    pub avg_extract_time_ms: f64,
    pub total_entities_extracted: usize,
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
