use serde::{Deserialize, Serialize};

use crate::onboarding::validator::{is_valid_email, is_valid_phone};

/// Delivery channel of a one-time code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpChannel {
    Email,
    Sms,
    Voice,
}

impl OtpChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpChannel::Email => "email",
            OtpChannel::Sms => "sms",
            OtpChannel::Voice => "voice",
        }
    }
}

impl std::fmt::Display for OtpChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the user registered. Constrains which channels may carry a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationMethod {
    Email,
    Phone,
}

impl RegistrationMethod {
    pub fn allowed_channels(&self) -> &'static [OtpChannel] {
        match self {
            RegistrationMethod::Email => &[OtpChannel::Email],
            RegistrationMethod::Phone => &[OtpChannel::Sms, OtpChannel::Voice],
        }
    }

    pub fn allows(&self, channel: OtpChannel) -> bool {
        self.allowed_channels().contains(&channel)
    }

    /// Infers the registration method from the shape of the identifier.
    pub fn for_identifier(identifier: &str) -> Option<Self> {
        if is_valid_email(identifier) {
            Some(RegistrationMethod::Email)
        } else if is_valid_phone(identifier) {
            Some(RegistrationMethod::Phone)
        } else {
            None
        }
    }

    /// Canonical form used for challenge keys: lowercase emails, phone numbers
    /// without separators.
    pub fn normalize(&self, identifier: &str) -> String {
        let trimmed = identifier.trim();
        match self {
            RegistrationMethod::Email => trimmed.to_lowercase(),
            RegistrationMethod::Phone => trimmed
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '+')
                .collect(),
        }
    }
}

impl std::fmt::Display for RegistrationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrationMethod::Email => f.write_str("email"),
            RegistrationMethod::Phone => f.write_str("phone"),
        }
    }
}

/// `(identifier, channel)` pair owning at most one active challenge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChallengeKey {
    pub identifier: String,
    pub channel: OtpChannel,
}

impl ChallengeKey {
    pub fn new(identifier: impl Into<String>, channel: OtpChannel) -> Self {
        Self {
            identifier: identifier.into(),
            channel,
        }
    }
}

impl std::fmt::Display for ChallengeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.channel, self.identifier)
    }
}
