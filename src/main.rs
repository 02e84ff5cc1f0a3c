use std::process::ExitCode;

use anyhow::Context;
use tracing::error;
use verifyflow_lib::bootstrap::{self, tracing::init_tracing_subscriber};
use vf_core::config::AppConfig;
use vf_core::ids::UserId;
use vf_core::onboarding::FlowType;

const USAGE: &str = "usage: verifyflow <user-id> [registration|seller-onboarding|vendor-kyc]";

fn main() -> ExitCode {
    let config = match bootstrap::resolve_config_path() {
        Some(path) => match bootstrap::load_config(&path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("{err:#}");
                return ExitCode::FAILURE;
            }
        },
        None => AppConfig::empty(),
    };

    let log_dir = (!config.log_dir.as_os_str().is_empty()).then(|| config.log_dir.clone());
    if let Err(err) = init_tracing_subscriber(log_dir.as_deref()) {
        eprintln!("Failed to initialize tracing: {err}");
    }

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %format!("{err:#}"), "verifyflow failed");
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: AppConfig) -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let user_id = args.next().map(UserId::from).context(USAGE)?;
    let flow_type = match args.next() {
        Some(flow) => flow.parse::<FlowType>()?,
        None => FlowType::Registration,
    };

    let rt = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    rt.block_on(async {
        let runtime = bootstrap::create_runtime(&config)?;
        let report = runtime.progress_report(&user_id, flow_type).await?;
        match report {
            Some(report) => println!("{}", serde_json::to_string_pretty(&report)?),
            None => println!("no saved {flow_type} progress for {user_id}"),
        }
        runtime.shutdown();
        Ok::<(), anyhow::Error>(())
    })
}
