//! One-time code domain.
//!
//! Codes confirm control of an email address or phone number. The policy is
//! uniform across channels; see [`OtpPolicy`].

mod challenge;
mod channel;
pub mod code;
mod error;
mod ledger;
mod policy;

pub use challenge::OtpChallenge;
pub use channel::{ChallengeKey, OtpChannel, RegistrationMethod};
pub use error::OtpError;
pub use ledger::OtpLedger;
pub use policy::{InvalidOtpPolicy, OtpPolicy};
