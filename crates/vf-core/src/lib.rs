//! # vf-core
//!
//! Core domain models and business logic for verifyflow.
//!
//! This crate contains pure business logic without any infrastructure dependencies:
//! step sequencing and validation, onboarding sessions, one-time code challenges,
//! compliance documents and verification tiers, plus the ports implemented by
//! the infrastructure layer.

pub mod config;
pub mod ids;
pub mod onboarding;
pub mod otp;
pub mod ports;
pub mod verification;

// Re-export commonly used types at the crate root
pub use config::AppConfig;
pub use ids::{DocumentId, ReviewerId, UserId};
pub use onboarding::{
    AccountType, FlowType, OnboardingSession, Step, StepId, StepSequencer, StepValidator,
    ValidationErrorCode, ValidationErrors,
};
pub use otp::{OtpChallenge, OtpChannel, OtpError, OtpLedger, OtpPolicy, RegistrationMethod};
pub use verification::{
    Document, DocumentStatus, DocumentType, LevelStatus, TierCatalog, VerificationLevel,
};
