use std::time::Duration;

use jiff::Timestamp;

use crate::config::DEFAULT_EXPIRY_DELTA_SECS;

use super::AccessTokenState;

/// When to renew: `expiry_delta` before the token really expires.
#[derive(Clone, Debug)]
pub struct RefreshPolicy {
    pub expiry_delta: Duration,
}

impl RefreshPolicy {
    pub fn new(expiry_delta: Duration) -> Self {
        Self { expiry_delta }
    }

    /// How long to sleep before the next refresh; zero means refresh now.
    pub fn delay_until_refresh(&self, state: &AccessTokenState, now: Timestamp) -> Duration {
        let remaining = state.seconds_until_expired(now);
        let delta = i64::try_from(self.expiry_delta.as_secs()).unwrap_or(i64::MAX);
        if remaining <= delta {
            Duration::ZERO
        } else {
            Duration::from_secs((remaining - delta) as u64)
        }
    }
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_EXPIRY_DELTA_SECS))
    }
}
