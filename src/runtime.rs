//! Concrete [`RuntimeSampler`] for the performance governor: reads the
//! process's resident set size directly from `/proc/self/status`,
//! mirroring the container-aware `/sys/fs/cgroup` file reads used
//! elsewhere in the retrieved pack for sizing runtime resources from
//! Linux pseudo-filesystems rather than a heavier profiling crate.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use sidecar_governor::{RuntimeSampler, RuntimeStats};

/// Samples process memory from `/proc/self/status` and in-flight request
/// count from a shared counter updated by the HTTP layer's
/// `track_inflight` middleware.
pub struct ProcessRuntimeSampler {
    inflight: Arc<AtomicU32>,
    worker_count: u32,
}

impl ProcessRuntimeSampler {
    pub fn new(inflight: Arc<AtomicU32>) -> Self {
        let worker_count = std::thread::available_parallelism()
            .map(|n| n.get() as u32)
            .unwrap_or(1);
        Self { inflight, worker_count }
    }
}

impl RuntimeSampler for ProcessRuntimeSampler {
    fn sample(&self) -> RuntimeStats {
        RuntimeStats {
            memory_usage_mb: read_rss_mb().unwrap_or(0.0),
            worker_count: self.worker_count,
            active_connections: self.inflight.load(Ordering::Relaxed),
            queued_requests: self.inflight.load(Ordering::Relaxed),
        }
    }
}

fn read_rss_mb() -> Option<f64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    for line in status.lines() {
        if let Some(rest) = line.strip_prefix("VmRSS:") {
            let kb: f64 = rest.trim().trim_end_matches("kB").trim().parse().ok()?;
            return Some(kb / 1024.0);
        }
    }
    None
}
