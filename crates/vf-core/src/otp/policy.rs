use std::ops::RangeInclusive;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CODE_LENGTH_RANGE: RangeInclusive<usize> = 4..=10;
pub const TTL_SECS_RANGE: RangeInclusive<i64> = 1..=86_400;
pub const LOCKOUT_SECS_RANGE: RangeInclusive<i64> = 0..=7 * 86_400;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("otp {field} = {value} is outside {allowed}")]
pub struct InvalidOtpPolicy {
    pub field: &'static str,
    pub value: String,
    pub allowed: String,
}

/// Uniform one-time code policy, applied to every channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpPolicy {
    /// Number of digits in a code.
    pub code_length: usize,
    /// Lifetime of a challenge in seconds.
    pub ttl_secs: i64,
    /// Verify calls allowed per challenge.
    pub max_attempts: u32,
    /// Cooldown on new codes after a challenge runs out of attempts. 0 disables it.
    pub lockout_secs: i64,
}

impl Default for OtpPolicy {
    fn default() -> Self {
        Self {
            code_length: 6,
            ttl_secs: 300,
            max_attempts: 5,
            lockout_secs: 15 * 60,
        }
    }
}

impl OtpPolicy {
    /// Rejects values that would make codes unusable or overflow timestamps.
    pub fn validate(&self) -> Result<(), InvalidOtpPolicy> {
        fn outside<T: std::fmt::Display>(field: &'static str, value: T, allowed: String) -> InvalidOtpPolicy {
            InvalidOtpPolicy {
                field,
                value: value.to_string(),
                allowed,
            }
        }

        if !CODE_LENGTH_RANGE.contains(&self.code_length) {
            return Err(outside("code_length", self.code_length, format!("{CODE_LENGTH_RANGE:?}")));
        }
        if !TTL_SECS_RANGE.contains(&self.ttl_secs) {
            return Err(outside("ttl_secs", self.ttl_secs, format!("{TTL_SECS_RANGE:?}")));
        }
        if self.max_attempts == 0 {
            return Err(outside("max_attempts", self.max_attempts, "1..".to_string()));
        }
        if !LOCKOUT_SECS_RANGE.contains(&self.lockout_secs) {
            return Err(outside("lockout_secs", self.lockout_secs, format!("{LOCKOUT_SECS_RANGE:?}")));
        }
        Ok(())
    }

    /// Challenge lifetime, clamped to [`TTL_SECS_RANGE`].
    pub fn ttl(&self) -> Duration {
        Duration::seconds(self.ttl_secs.clamp(*TTL_SECS_RANGE.start(), *TTL_SECS_RANGE.end()))
    }

    /// Cooldown, clamped to [`LOCKOUT_SECS_RANGE`].
    pub fn lockout(&self) -> Duration {
        Duration::seconds(
            self.lockout_secs
                .clamp(*LOCKOUT_SECS_RANGE.start(), *LOCKOUT_SECS_RANGE.end()),
        )
    }
}
