//! Tunable limits for the rate limiter.

use std::collections::HashMap;
use std::time::Duration;

/// Per-endpoint override: requests-per-minute, burst, and the HTTP methods
/// it applies to (empty ⇒ all methods).
#[derive(Debug, Clone)]
pub struct EndpointLimit {
    pub rpm: u32,
    pub burst: u32,
    pub methods: Vec<String>,
}

impl EndpointLimit {
    pub fn new(rpm: u32, burst: u32) -> Self {
        Self {
            rpm,
            burst,
            methods: Vec::new(),
        }
    }

    pub fn with_methods(mut self, methods: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.methods = methods.into_iter().map(Into::into).collect();
        self
    }

    fn allows(&self, method: &str) -> bool {
        self.methods.is_empty() || self.methods.iter().any(|m| m.eq_ignore_ascii_case(method))
    }
}

/// Configuration for [`RateLimiter`](crate::RateLimiter).
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    pub default_rate_limit: u32,
    pub default_burst_limit: u32,
    pub cleanup_interval: Duration,
    pub client_ttl: Duration,
    pub max_clients: usize,
    pub endpoint_limits: HashMap<String, EndpointLimit>,
    pub global_requests_per_second: u32,
    pub global_burst_limit: u32,
    pub burst_window: Duration,
    pub burst_threshold: usize,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            default_rate_limit: 60,
            default_burst_limit: 10,
            cleanup_interval: Duration::from_secs(5 * 60),
            client_ttl: Duration::from_secs(30 * 60),
            max_clients: 10_000,
            endpoint_limits: HashMap::new(),
            global_requests_per_second: 0,
            global_burst_limit: 0,
            burst_window: Duration::from_secs(60),
            burst_threshold: 30,
        }
    }
}

impl RateLimiterConfig {
    pub fn endpoint_limit_for(&self, endpoint: &str, method: &str) -> Option<&EndpointLimit> {
        self.endpoint_limits
            .get(endpoint)
            .filter(|limit| limit.allows(method))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_limit_empty_methods_allows_any() {
        let limit = EndpointLimit::new(10, 5);
        assert!(limit.allows("GET"));
        assert!(limit.allows("DELETE"));
    }

    #[test]
    fn endpoint_limit_restricted_methods() {
        let limit = EndpointLimit::new(10, 5).with_methods(["GET", "HEAD"]);
        assert!(limit.allows("get"));
        assert!(!limit.allows("POST"));
    }

    #[test]
    fn config_lookup_respects_method_filter() {
        let mut config = RateLimiterConfig::default();
        config.endpoint_limits.insert(
            "GET:/api/v1/sessions".to_string(),
            EndpointLimit::new(30, 5).with_methods(["GET"]),
        );
        assert!(config
            .endpoint_limit_for("GET:/api/v1/sessions", "GET")
            .is_some());
        assert!(config
            .endpoint_limit_for("GET:/api/v1/sessions", "POST")
            .is_none());
    }
}
