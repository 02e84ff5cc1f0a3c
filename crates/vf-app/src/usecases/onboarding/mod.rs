//! Onboarding use cases.
//!
//! This module exposes the onboarding orchestrator and its session persister.

mod context;
pub mod orchestrator;
pub mod persister;

pub use orchestrator::{AdvanceOutcome, OnboardingError, OnboardingOrchestrator};
pub use persister::{PersistenceStatus, SessionPersister, DEFAULT_SAVE_DEBOUNCE};
