//! One-time code use cases.

pub mod service;

pub use service::OtpService;
