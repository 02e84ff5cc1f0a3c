//! Document review and verification tier use cases.

pub mod review_queue;
pub mod tier_gate;

pub use review_queue::DocumentReviewQueue;
pub use tier_gate::TierGate;
