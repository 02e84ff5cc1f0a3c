use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::code::codes_match;
use super::{ChallengeKey, OtpChannel, OtpError, OtpPolicy};

/// An issued one-time code for one `(identifier, channel)` pair.
///
/// Usable only while `now < expires_at` and `attempts < max_attempts`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpChallenge {
    identifier: String,
    channel: OtpChannel,
    code: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    attempts: u32,
    max_attempts: u32,
}

impl OtpChallenge {
    pub fn new(key: ChallengeKey, code: String, policy: &OtpPolicy, now: DateTime<Utc>) -> Self {
        Self {
            identifier: key.identifier,
            channel: key.channel,
            code,
            issued_at: now,
            expires_at: now + policy.ttl(),
            attempts: 0,
            max_attempts: policy.max_attempts,
        }
    }

    pub fn key(&self) -> ChallengeKey {
        ChallengeKey::new(self.identifier.clone(), self.channel)
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn channel(&self) -> OtpChannel {
        self.channel
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired(now) && !self.is_exhausted()
    }

    /// Seconds until expiry, floored at zero.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }

    /// Checks a submitted code. Every call counts as an attempt; once attempts are
    /// used up the outcome is `TooManyAttempts` whatever the code.
    pub fn verify(&mut self, submitted: &str, now: DateTime<Utc>) -> Result<(), OtpError> {
        let prior = self.attempts;
        self.attempts = self.attempts.saturating_add(1);

        if prior >= self.max_attempts {
            return Err(OtpError::TooManyAttempts);
        }
        if self.is_expired(now) {
            return Err(OtpError::ExpiredCode);
        }
        if !codes_match(&self.code, submitted) {
            return Err(OtpError::InvalidCode);
        }
        Ok(())
    }
}

// The code never shows up in logs.
impl std::fmt::Debug for OtpChallenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtpChallenge")
            .field("identifier", &self.identifier)
            .field("channel", &self.channel)
            .field("code", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .field("attempts", &self.attempts)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}
