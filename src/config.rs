//! Configuration loading: built-in defaults, `config/default.toml`, then
//! environment variables prefixed `SIDECAR_`, mirroring the layered
//! sources / sensible defaults convention of a `config`-crate-based
//! service.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use sidecar_ratelimiter::{EndpointLimit, RateLimiterConfig};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid endpoint limit for {endpoint:?}: {reason}")]
    InvalidEndpointLimit { endpoint: String, reason: String },
}

/// A single `EndpointLimits` entry, as deserialized from TOML/env.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointLimitConfig {
    pub rpm: u32,
    pub burst: u32,
    #[serde(default)]
    pub methods: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimiterSettings {
    pub default_rate_limit: u32,
    pub default_burst_limit: u32,
    pub cleanup_interval_secs: u64,
    pub client_ttl_secs: u64,
    pub max_clients: usize,
    #[serde(default)]
    pub endpoint_limits: HashMap<String, EndpointLimitConfig>,
    pub global_requests_per_second: u32,
    pub global_burst_limit: u32,
    pub burst_window_secs: u64,
    pub burst_threshold: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernorSettings {
    pub metrics_interval_secs: u64,
    pub optimization_interval_secs: u64,
    pub memory_watchdog_interval_secs: u64,
    pub memory_limit_mb: f64,
    pub gc_target_percent: u8,
    pub base_limit: u32,
    pub burst_limit: u32,
    pub adaptive_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    pub max_size: usize,
    pub default_ttl_secs: u64,
}

/// Top-level configuration for the sidecar binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub rate_limiter: RateLimiterSettings,
    pub governor: GovernorSettings,
    pub cache: CacheSettings,
}

impl Config {
    /// Loads layered configuration: built-in defaults, then the file at
    /// `config_path` (defaulting to `config/default.toml`) if present,
    /// then `SIDECAR_`-prefixed environment variables (double-underscore
    /// separated, e.g. `SIDECAR_SERVER__PORT=9000`). The CLI's
    /// `--config` flag is the highest-priority source after env vars.
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let file_name = config_path.unwrap_or("config/default");
        let builder = config::Config::builder()
            .add_source(config::Config::try_from(&Self::defaults())?)
            .add_source(config::File::with_name(file_name).required(false))
            .add_source(
                config::Environment::with_prefix("SIDECAR")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        let parsed: Self = config.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    fn defaults() -> Self {
        Self {
            server: ServerConfig {
                bind: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                path: "sidecar.db".to_string(),
            },
            rate_limiter: RateLimiterSettings {
                default_rate_limit: 60,
                default_burst_limit: 10,
                cleanup_interval_secs: 5 * 60,
                client_ttl_secs: 30 * 60,
                max_clients: 10_000,
                endpoint_limits: HashMap::new(),
                global_requests_per_second: 0,
                global_burst_limit: 0,
                burst_window_secs: 60,
                burst_threshold: 30,
            },
            governor: GovernorSettings {
                metrics_interval_secs: 10,
                optimization_interval_secs: 60,
                memory_watchdog_interval_secs: 30,
                memory_limit_mb: 512.0,
                gc_target_percent: 100,
                base_limit: 30,
                burst_limit: 300,
                adaptive_enabled: true,
            },
            cache: CacheSettings {
                max_size: 1000,
                default_ttl_secs: 60 * 60,
            },
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (endpoint, limit) in &self.rate_limiter.endpoint_limits {
            if limit.burst == 0 {
                return Err(ConfigError::InvalidEndpointLimit {
                    endpoint: endpoint.clone(),
                    reason: "burst must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn rate_limiter_config(&self) -> RateLimiterConfig {
        let endpoint_limits = self
            .rate_limiter
            .endpoint_limits
            .iter()
            .map(|(endpoint, limit)| {
                let mut entry = EndpointLimit::new(limit.rpm, limit.burst);
                if !limit.methods.is_empty() {
                    entry = entry.with_methods(limit.methods.clone());
                }
                (endpoint.clone(), entry)
            })
            .collect();

        RateLimiterConfig {
            default_rate_limit: self.rate_limiter.default_rate_limit,
            default_burst_limit: self.rate_limiter.default_burst_limit,
            cleanup_interval: Duration::from_secs(self.rate_limiter.cleanup_interval_secs),
            client_ttl: Duration::from_secs(self.rate_limiter.client_ttl_secs),
            max_clients: self.rate_limiter.max_clients,
            endpoint_limits,
            global_requests_per_second: self.rate_limiter.global_requests_per_second,
            global_burst_limit: self.rate_limiter.global_burst_limit,
            burst_window: Duration::from_secs(self.rate_limiter.burst_window_secs),
            burst_threshold: self.rate_limiter.burst_threshold,
        }
    }

    pub fn governor_config(&self) -> sidecar_governor::GovernorConfig {
        sidecar_governor::GovernorConfig {
            metrics_interval: Duration::from_secs(self.governor.metrics_interval_secs),
            optimization_interval: Duration::from_secs(self.governor.optimization_interval_secs),
            memory_watchdog_interval: Duration::from_secs(self.governor.memory_watchdog_interval_secs),
            memory_limit_mb: self.governor.memory_limit_mb,
            gc_target_percent: self.governor.gc_target_percent,
            base_limit: self.governor.base_limit,
            burst_limit: self.governor.burst_limit,
            adaptive_enabled: self.governor.adaptive_enabled,
        }
    }

    pub fn cache_config(&self) -> sidecar_cache::CacheConfig {
        sidecar_cache::CacheConfig {
            max_size: self.cache.max_size,
            default_ttl: Duration::from_secs(self.cache.default_ttl_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate_cleanly() {
        let config = Config::defaults();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_burst_endpoint_limit_fails_validation() {
        let mut config = Config::defaults();
        config.rate_limiter.endpoint_limits.insert(
            "POST:/x".to_string(),
            EndpointLimitConfig {
                rpm: 6,
                burst: 0,
                methods: vec!["POST".to_string()],
            },
        );
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidEndpointLimit { .. })
        ));
    }

    #[test]
    fn rate_limiter_config_translates_endpoint_limits() {
        let mut config = Config::defaults();
        config.rate_limiter.endpoint_limits.insert(
            "POST:/x".to_string(),
            EndpointLimitConfig {
                rpm: 6,
                burst: 2,
                methods: vec!["POST".to_string()],
            },
        );
        let rl_config = config.rate_limiter_config();
        let limit = rl_config.endpoint_limit_for("POST:/x", "POST");
        assert!(limit.is_some());
        assert!(rl_config.endpoint_limit_for("POST:/x", "GET").is_none());
    }
}
