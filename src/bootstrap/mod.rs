pub mod config;
pub mod runtime;
pub mod tracing;
pub mod wiring;

pub use config::{load_config, resolve_config_path};
pub use runtime::{create_runtime, AppRuntime, ProgressReport};
pub use wiring::{resolve_settings, wire_dependencies, AppDeps, ResolvedSettings};
