//! One-time code issuance and verification.
//!
//! Wraps the pure [`OtpLedger`] with code generation, delivery and the
//! per-challenge expiry countdown.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, warn, Instrument};
use vf_core::otp::{
    code::generate_numeric_code, ChallengeKey, OtpChallenge, OtpChannel, OtpError, OtpLedger,
    OtpPolicy, RegistrationMethod,
};
use vf_core::ports::{ClockPort, OtpDeliveryPort, TimerPort};

pub struct OtpService {
    ledger: Arc<Mutex<OtpLedger>>,
    delivery: Arc<dyn OtpDeliveryPort>,
    timer: Arc<Mutex<dyn TimerPort>>,
    clock: Arc<dyn ClockPort>,
}

impl OtpService {
    pub fn new(
        policy: OtpPolicy,
        delivery: Arc<dyn OtpDeliveryPort>,
        timer: Arc<Mutex<dyn TimerPort>>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            ledger: Arc::new(Mutex::new(OtpLedger::new(policy))),
            delivery,
            timer,
            clock,
        }
    }

    pub async fn policy(&self) -> OtpPolicy {
        self.ledger.lock().await.policy().clone()
    }

    /// Issues a code, inferring the registration method from the identifier.
    pub async fn issue(
        &self,
        identifier: &str,
        channel: OtpChannel,
    ) -> Result<OtpChallenge, OtpError> {
        let method = RegistrationMethod::for_identifier(identifier)
            .ok_or_else(|| OtpError::InvalidIdentifier(identifier.to_string()))?;
        self.issue_for(method, identifier, channel).await
    }

    /// Issues a fresh code for `identifier`, invalidating any prior one for
    /// the same channel, and delivers it.
    pub async fn issue_for(
        &self,
        method: RegistrationMethod,
        identifier: &str,
        channel: OtpChannel,
    ) -> Result<OtpChallenge, OtpError> {
        if !method.allows(channel) {
            return Err(OtpError::ChannelNotAllowed { channel, method });
        }
        let key = ChallengeKey::new(method.normalize(identifier), channel);

        let span = info_span!("usecase.otp.issue", key = %key);
        async {
            let (challenge, ttl_secs) = {
                let mut ledger = self.ledger.lock().await;
                let code = generate_numeric_code(ledger.policy().code_length);
                let challenge = ledger.issue(key.clone(), code, self.clock.now())?;
                (challenge, ledger.policy().ttl_secs.max(0) as u64)
            };

            if let Err(err) = self.timer.lock().await.start(&key, ttl_secs).await {
                warn!(error = %err, "expiry timer not started, expiry is still enforced on verify");
            }

            if let Err(err) = self
                .delivery
                .deliver(&key.identifier, channel, challenge.code())
                .await
            {
                self.discard_undelivered(&key, &challenge).await;
                warn!(error = %err, "one-time code delivery failed");
                return Err(OtpError::DeliveryFailed(format!("{err:#}")));
            }

            info!(expires_at = %challenge.expires_at(), "one-time code issued");
            Ok(challenge)
        }
        .instrument(span)
        .await
    }

    /// Resend is a fresh issue; the previous code stops working.
    pub async fn resend(
        &self,
        identifier: &str,
        channel: OtpChannel,
    ) -> Result<OtpChallenge, OtpError> {
        self.issue(identifier, channel).await
    }

    pub async fn verify(
        &self,
        identifier: &str,
        channel: OtpChannel,
        code: &str,
    ) -> Result<(), OtpError> {
        let key = self.key_for(identifier, channel)?;

        let span = info_span!("usecase.otp.verify", key = %key);
        async {
            let result = {
                let mut ledger = self.ledger.lock().await;
                ledger.verify(&key, code, self.clock.now())
            };

            match &result {
                Ok(()) => {
                    self.stop_timer(&key).await;
                    info!("one-time code verified");
                }
                Err(err) => debug!(error = %err, "one-time code rejected"),
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Withdraws the active challenge, if any.
    pub async fn cancel(&self, identifier: &str, channel: OtpChannel) -> Result<bool, OtpError> {
        let key = self.key_for(identifier, channel)?;
        let cancelled = self.ledger.lock().await.cancel(&key).is_some();
        self.stop_timer(&key).await;
        Ok(cancelled)
    }

    pub async fn active(
        &self,
        identifier: &str,
        channel: OtpChannel,
    ) -> Result<Option<OtpChallenge>, OtpError> {
        let key = self.key_for(identifier, channel)?;
        Ok(self.ledger.lock().await.active(&key).cloned())
    }

    /// Retires the challenge for `key` if its lifetime has passed.
    pub async fn expire(&self, key: &ChallengeKey) -> bool {
        let expired = self.ledger.lock().await.expire(key, self.clock.now());
        if expired {
            debug!(key = %key, "one-time code expired");
        }
        expired
    }

    /// Consumes expiry notifications from the timer until the sender closes.
    pub fn spawn_expiry_listener(
        self: &Arc<Self>,
        mut expired: mpsc::UnboundedReceiver<ChallengeKey>,
    ) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(key) = expired.recv().await {
                service.expire(&key).await;
            }
        })
    }

    fn key_for(&self, identifier: &str, channel: OtpChannel) -> Result<ChallengeKey, OtpError> {
        let method = RegistrationMethod::for_identifier(identifier)
            .ok_or_else(|| OtpError::InvalidIdentifier(identifier.to_string()))?;
        Ok(ChallengeKey::new(method.normalize(identifier), channel))
    }

    async fn stop_timer(&self, key: &ChallengeKey) {
        if let Err(err) = self.timer.lock().await.stop(key).await {
            warn!(key = %key, error = %err, "failed to stop expiry timer");
        }
    }

    /// Drops a challenge whose code never reached the user, unless a newer
    /// issue already replaced it.
    async fn discard_undelivered(&self, key: &ChallengeKey, challenge: &OtpChallenge) {
        let mut ledger = self.ledger.lock().await;
        let still_current = ledger.active(key).is_some_and(|active| {
            active.issued_at() == challenge.issued_at() && active.code() == challenge.code()
        });
        if still_current {
            ledger.cancel(key);
            drop(ledger);
            self.stop_timer(key).await;
        }
    }
}
