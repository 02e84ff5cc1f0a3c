//! Onboarding domain models
//!
//! This module defines the step-based onboarding flow shared by registration,
//! seller onboarding and vendor KYC: the declarative step list, per-step field
//! validation and the resumable session that moves through it.

mod account;
mod session;
pub mod sequencer;
mod step;
pub mod validator;

pub use account::{AccountType, FlowType, UnknownVariant};
pub use sequencer::{StepProgress, StepSequencer, STEP_RULES};
pub use session::{FieldData, OnboardingSession};
pub use step::{AccountPredicate, Step, StepId};
pub use validator::{FieldRule, StepValidator, ValidationErrorCode, ValidationErrors};
