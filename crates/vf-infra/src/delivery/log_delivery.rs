use async_trait::async_trait;
use tracing::info;
use vf_core::otp::OtpChannel;
use vf_core::ports::OtpDeliveryPort;

/// Development transport that writes the delivery to the log instead of a
/// gateway. The code itself is only emitted at `trace` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOtpDelivery;

#[async_trait]
impl OtpDeliveryPort for LogOtpDelivery {
    async fn deliver(
        &self,
        identifier: &str,
        channel: OtpChannel,
        code: &str,
    ) -> anyhow::Result<()> {
        info!(identifier, channel = %channel, "one-time code dispatched");
        tracing::trace!(identifier, code, "one-time code value");
        Ok(())
    }
}
