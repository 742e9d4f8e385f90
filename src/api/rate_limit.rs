//! Global request rate limiting for the search route.

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;

use crate::config::RateLimitSettings;
use crate::error::{Error, Result};

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub requests_per_second: NonZeroU32,
    pub burst: NonZeroU32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: NonZeroU32::new(20).unwrap_or(NonZeroU32::MIN),
            burst: NonZeroU32::new(40).unwrap_or(NonZeroU32::MIN),
        }
    }
}

impl RateLimitConfig {
    /// Build from settings; `None` when limiting is disabled.
    pub fn from_settings(settings: &RateLimitSettings) -> Option<Self> {
        if !settings.enabled {
            return None;
        }
        Some(Self {
            requests_per_second: NonZeroU32::new(settings.requests_per_second)
                .unwrap_or(NonZeroU32::MIN),
            burst: NonZeroU32::new(settings.burst).unwrap_or(NonZeroU32::MIN),
        })
    }
}

/// Token-bucket limiter shared by all search requests.
pub struct RateLimitService {
    limiter: DefaultDirectRateLimiter,
}

impl RateLimitService {
    pub fn new(config: RateLimitConfig) -> Self {
        let quota = Quota::per_second(config.requests_per_second).allow_burst(config.burst);
        Self {
            limiter: RateLimiter::direct(quota),
        }
    }

    /// Consume one token or fail with [`Error::RateLimited`].
    pub fn check(&self) -> Result<()> {
        self.limiter
            .check()
            .map_err(|_| Error::RateLimited("search quota exhausted, retry shortly".into()))
    }
}
