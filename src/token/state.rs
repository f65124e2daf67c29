use jiff::{SignedDuration, Timestamp};

use crate::errors::Error;

/// Access token together with its absolute expiry. Published and read as one value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessTokenState {
    token: String,
    expires_at: Timestamp,
}

impl AccessTokenState {
    pub fn new(token: String, expires_at: Timestamp) -> Self {
        Self { token, expires_at }
    }

    /// Builds a state expiring `expires_in_secs` after `issued_at`.
    pub fn issued(token: String, issued_at: Timestamp, expires_in_secs: i64) -> Result<Self, Error> {
        let expires_at = issued_at
            .checked_add(SignedDuration::from_secs(expires_in_secs))
            .map_err(|e| Error::TokenFetch(format!("invalid expires_in {}: {}", expires_in_secs, e)))?;
        Ok(Self::new(token, expires_at))
    }

    /// Raw token value suitable for the access token header.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    /// Expiry as seconds since the Unix epoch.
    pub fn expires_at_unix(&self) -> i64 {
        self.expires_at.as_second()
    }

    /// Whole seconds left until expiry; negative once expired.
    pub fn seconds_until_expired(&self, now: Timestamp) -> i64 {
        self.expires_at.as_second() - now.as_second()
    }
}
