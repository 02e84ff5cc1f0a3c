//! verifyflow application layer
//!
//! Use cases that drive the onboarding, one-time code and document review
//! workflows through the ports declared in `vf-core`.

pub mod usecases;

pub use usecases::{
    AdvanceOutcome, DocumentReviewQueue, OnboardingError, OnboardingOrchestrator, OtpService,
    PersistenceStatus, SessionPersister, TierGate,
};
