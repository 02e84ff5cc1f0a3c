//! Port interfaces for the application layer
//!
//! Ports define the contract between the application logic (use cases)
//! and infrastructure implementations. The storage medium and the code
//! delivery transport are only reachable through these traits.

mod clock;
pub mod documents;
pub mod otp;
pub mod progress;

pub use clock::ClockPort;
pub use documents::{DocumentMutation, DocumentRepositoryPort};
pub use otp::{OtpDeliveryPort, TimerPort};
pub use progress::{ProgressKey, ProgressStoreError, ProgressStorePort};
