//! Runtime sampling and the governor's metric snapshot.

/// Raw runtime counters, as read from the process/allocator/scheduler.
/// Platform-specific; the governor only ever sees the numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeStats {
    pub memory_usage_mb: f64,
    pub worker_count: u32,
    pub active_connections: u32,
    pub queued_requests: u32,
}

/// Source of [`RuntimeStats`]. Implemented once per deployment target
/// (allocator stats, a Tokio runtime handle, a test double) and handed
/// to the governor at construction.
pub trait RuntimeSampler: Send + Sync {
    fn sample(&self) -> RuntimeStats;
}

/// The governor's derived view of the runtime at the last sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerformanceMetrics {
    pub memory_usage_mb: f64,
    pub memory_pressure: f64,
    pub worker_count: u32,
    pub active_connections: u32,
    pub queued_requests: u32,
}

impl PerformanceMetrics {
    pub fn from_sample(sample: RuntimeStats, memory_limit_mb: f64) -> Self {
        let memory_pressure = if memory_limit_mb > 0.0 {
            sample.memory_usage_mb / memory_limit_mb
        } else {
            0.0
        };
        Self {
            memory_usage_mb: sample.memory_usage_mb,
            memory_pressure,
            worker_count: sample.worker_count,
            active_connections: sample.active_connections,
            queued_requests: sample.queued_requests,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressure_is_usage_over_limit() {
        let metrics = PerformanceMetrics::from_sample(
            RuntimeStats {
                memory_usage_mb: 256.0,
                ..RuntimeStats::default()
            },
            512.0,
        );
        assert_eq!(metrics.memory_pressure, 0.5);
    }

    #[test]
    fn zero_limit_does_not_divide_by_zero() {
        let metrics = PerformanceMetrics::from_sample(
            RuntimeStats {
                memory_usage_mb: 100.0,
                ..RuntimeStats::default()
            },
            0.0,
        );
        assert_eq!(metrics.memory_pressure, 0.0);
    }
}
