//! Use cases
//!
//! UI → OnboardingOrchestrator → (StepSequencer, SessionPersister)
//! UI → OtpService → (OtpLedger, TimerPort, OtpDeliveryPort)
//! Admin UI → DocumentReviewQueue → TierGate::recompute

pub mod onboarding;
pub mod otp;
pub mod verification;

pub use onboarding::{
    AdvanceOutcome, OnboardingError, OnboardingOrchestrator, PersistenceStatus, SessionPersister,
};
pub use otp::OtpService;
pub use verification::{DocumentReviewQueue, TierGate};
