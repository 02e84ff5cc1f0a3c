//! Tracing configuration for verifyflow
//!
//! Installs the global `tracing-subscriber` registry: an `EnvFilter`
//! (honours `RUST_LOG`), a stdout `fmt` layer and, when a log directory is
//! configured, a daily-rolling file layer through `tracing-appender`.

use std::{fs, io, path::Path, sync::OnceLock};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, fmt::writer::BoxMakeWriter, prelude::*, registry};

pub const LOG_FILE_PREFIX: &str = "verifyflow.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Check if running in development environment
fn is_development() -> bool {
    cfg!(debug_assertions)
}

/// Build the default filter directives for tracing
///
/// - **Development**: debug for everything
/// - **Production**: info, with the workspace crates kept at info as well
fn build_filter_directives(is_dev: bool) -> Vec<String> {
    let level = if is_dev { "debug" } else { "info" };
    let mut directives = vec![level.to_string()];
    directives.extend(
        ["vf_core", "vf_app", "vf_infra", "verifyflow_lib"]
            .iter()
            .map(|target| format!("{target}={level}")),
    );
    directives
}

/// Initialize the tracing subscriber
///
/// Call once, before any use case runs. `log_dir` enables the file layer;
/// if the directory cannot be created, logging falls back to stdout only.
///
/// ## Errors
///
/// Returns `Err` if a subscriber is already registered.
pub fn init_tracing_subscriber(log_dir: Option<&Path>) -> anyhow::Result<()> {
    let is_dev = is_development();

    let filter_directives = build_filter_directives(is_dev);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter_directives.join(",")));

    let stdout_writer: BoxMakeWriter = BoxMakeWriter::new(io::stdout);
    let file_writer = match log_dir.map(build_file_writer).transpose() {
        Ok(writer) => writer,
        Err(err) => {
            eprintln!("Failed to initialize file logging, falling back to stdout: {err}");
            None
        }
    };

    // "2026-01-15 10:30:45.123 INFO [file.rs:42] [target] message"
    let stdout_layer = fmt::layer()
        .with_timer(fmt::time::ChronoUtc::new(
            "%Y-%m-%d %H:%M:%S%.3f".to_string(),
        ))
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_ansi(cfg!(not(test)))
        .with_writer(stdout_writer);

    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .with_timer(fmt::time::ChronoUtc::new(
                "%Y-%m-%d %H:%M:%S%.3f".to_string(),
            ))
            .with_level(true)
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_ansi(false)
            .with_writer(writer)
    });

    let subscriber = registry().with(env_filter).with(stdout_layer);

    if let Some(layer) = file_layer {
        subscriber.with(layer).try_init()?;
    } else {
        subscriber.try_init()?;
    }

    Ok(())
}

fn build_file_writer(log_dir: &Path) -> anyhow::Result<NonBlocking> {
    fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    LOG_GUARD
        .set(guard)
        .map_err(|_| anyhow::anyhow!("Tracing log guard already initialized"))?;

    Ok(non_blocking)
}
