//! verifyflow bootstrap
//!
//! Configuration loading, tracing setup and dependency wiring for the
//! progressive verification workflow engine.

pub mod bootstrap;

pub use bootstrap::{create_runtime, load_config, AppRuntime};
