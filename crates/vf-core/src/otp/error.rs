use thiserror::Error;

use super::{OtpChannel, RegistrationMethod};

/// Typed outcomes of issuing and verifying one-time codes.
///
/// `ExpiredCode`, `InvalidCode` and `TooManyAttempts` are user-recoverable via resend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OtpError {
    #[error("verification code has expired")]
    ExpiredCode,

    #[error("verification code is invalid")]
    InvalidCode,

    #[error("too many verification attempts")]
    TooManyAttempts,

    #[error("new codes are locked for another {retry_after_secs}s")]
    CooldownActive { retry_after_secs: i64 },

    #[error("channel {channel} is not available for {method} registration")]
    ChannelNotAllowed {
        channel: OtpChannel,
        method: RegistrationMethod,
    },

    #[error("identifier is neither an email address nor a phone number: {0}")]
    InvalidIdentifier(String),

    #[error("code delivery failed: {0}")]
    DeliveryFailed(String),
}
