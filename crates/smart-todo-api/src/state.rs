use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::{Quota, RateLimiter};

use smart_todo_db::Database;
use smart_todo_inference::AiClient;

use crate::config::RateLimitConfig;

/// Global rate limiter type (direct quota, no per-client bucketing).
pub type GlobalRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub ai: AiClient,
    /// None when rate limiting is disabled.
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,
}

impl AppState {
    pub fn new(db: Database, ai: AiClient, rate_limit: RateLimitConfig) -> Self {
        Self {
            db,
            ai,
            rate_limiter: build_rate_limiter(rate_limit),
        }
    }
}

/// Token bucket allowing `requests` per `period_secs`. Zero values disable
/// the limiter rather than failing startup.
pub fn build_rate_limiter(config: RateLimitConfig) -> Option<Arc<GlobalRateLimiter>> {
    if !config.enabled {
        return None;
    }
    let burst = NonZeroU32::new(u32::try_from(config.requests).unwrap_or(u32::MAX))?;
    let quota = Quota::with_period(Duration::from_secs(config.period_secs))?.allow_burst(burst);
    Some(Arc::new(RateLimiter::direct(quota)))
}
