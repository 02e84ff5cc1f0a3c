//! Active challenge bookkeeping.
//!
//! The ledger is the pure core of the OTP channel: it holds at most one active
//! challenge per `(identifier, channel)` and the cooldowns imposed after a
//! challenge runs out of attempts. Time is always passed in.
//!
//! An expired challenge is retired rather than forgotten: the code leaves
//! memory but later verifies keep reporting why it stopped working, for up to
//! [`RETIRED_RETENTION_SECS`]. Every issue and verify prunes elapsed cooldowns,
//! expired challenges and stale retirements, so keys that never come back do
//! not accumulate.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use super::{ChallengeKey, OtpChallenge, OtpError, OtpPolicy};

/// How long a retired challenge keeps reporting its reason before it is forgotten.
pub const RETIRED_RETENTION_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Clone)]
struct Retired {
    reason: OtpError,
    at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct OtpLedger {
    policy: OtpPolicy,
    active: HashMap<ChallengeKey, OtpChallenge>,
    lockouts: HashMap<ChallengeKey, DateTime<Utc>>,
    retired: HashMap<ChallengeKey, Retired>,
}

impl OtpLedger {
    pub fn new(policy: OtpPolicy) -> Self {
        Self {
            policy,
            active: HashMap::new(),
            lockouts: HashMap::new(),
            retired: HashMap::new(),
        }
    }

    pub fn policy(&self) -> &OtpPolicy {
        &self.policy
    }

    /// Records a freshly generated challenge, replacing any prior one for the key.
    pub fn issue(
        &mut self,
        key: ChallengeKey,
        code: String,
        now: DateTime<Utc>,
    ) -> Result<OtpChallenge, OtpError> {
        self.prune(now);
        if let Some(retry_after_secs) = self.lockout_remaining(&key, now) {
            return Err(OtpError::CooldownActive { retry_after_secs });
        }
        self.lockouts.remove(&key);
        self.retired.remove(&key);

        let challenge = OtpChallenge::new(key.clone(), code, &self.policy, now);
        self.active.insert(key, challenge.clone());
        Ok(challenge)
    }

    /// Verifies against the active challenge. Success consumes it; exhausting the
    /// attempts starts the cooldown.
    pub fn verify(
        &mut self,
        key: &ChallengeKey,
        submitted: &str,
        now: DateTime<Utc>,
    ) -> Result<(), OtpError> {
        self.prune(now);
        let Some(challenge) = self.active.get_mut(key) else {
            return Err(self
                .retired
                .get(key)
                .map(|retired| retired.reason.clone())
                .unwrap_or(OtpError::InvalidCode));
        };

        let result = challenge.verify(submitted, now);
        let exhausted = challenge.is_exhausted();

        match result {
            Ok(()) => {
                self.active.remove(key);
            }
            Err(_) if exhausted => {
                if self.policy.lockout_secs > 0 && !self.lockouts.contains_key(key) {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(key = %key, lockout_secs = self.policy.lockout_secs, "otp attempts exhausted");
                    self.lockouts.insert(key.clone(), now + self.policy.lockout());
                }
            }
            Err(_) => {}
        }
        result
    }

    pub fn active(&self, key: &ChallengeKey) -> Option<&OtpChallenge> {
        self.active.get(key)
    }

    pub fn cancel(&mut self, key: &ChallengeKey) -> Option<OtpChallenge> {
        self.retired.remove(key);
        self.active.remove(key)
    }

    /// Retires the challenge for `key` if it has expired by `now`. A challenge
    /// re-issued after the countdown started is left alone.
    pub fn expire(&mut self, key: &ChallengeKey, now: DateTime<Utc>) -> bool {
        match self.active.get(key) {
            Some(challenge) if challenge.is_expired(now) => {
                let reason = if challenge.is_exhausted() {
                    OtpError::TooManyAttempts
                } else {
                    OtpError::ExpiredCode
                };
                self.active.remove(key);
                self.retired.insert(key.clone(), Retired { reason, at: now });
                true
            }
            _ => false,
        }
    }

    fn prune(&mut self, now: DateTime<Utc>) {
        self.lockouts.retain(|_, until| *until > now);

        let expired: Vec<ChallengeKey> = self
            .active
            .iter()
            .filter(|(_, challenge)| challenge.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in expired {
            self.expire(&key, now);
        }

        let horizon = now - Duration::seconds(RETIRED_RETENTION_SECS);
        self.retired.retain(|_, retired| retired.at > horizon);
    }

    /// Whole seconds (rounded up) until a new code may be issued, if locked.
    pub fn lockout_remaining(&self, key: &ChallengeKey, now: DateTime<Utc>) -> Option<i64> {
        let until = self.lockouts.get(key)?;
        if *until <= now {
            return None;
        }
        let millis = (*until - now).num_milliseconds();
        Some((millis + 999) / 1000)
    }
}
