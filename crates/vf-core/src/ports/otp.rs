use async_trait::async_trait;

use crate::otp::{ChallengeKey, OtpChannel};

/// Outbound transport for one-time codes (email / SMS / voice gateway).
#[async_trait]
pub trait OtpDeliveryPort: Send + Sync {
    async fn deliver(&self, identifier: &str, channel: OtpChannel, code: &str)
        -> anyhow::Result<()>;
}

/// Per-challenge expiry countdown. Starting a timer for a key replaces the
/// running one.
#[async_trait]
pub trait TimerPort: Send {
    async fn start(&mut self, key: &ChallengeKey, ttl_secs: u64) -> anyhow::Result<()>;
    async fn stop(&mut self, key: &ChallengeKey) -> anyhow::Result<()>;
}
