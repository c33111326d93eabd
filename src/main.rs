use anyhow::{Context, Result};
use clap::Parser;
use octoheat::cli::Args;
use octoheat::config::{AppConfig, ENV_FILE, load_env_file};
use octoheat::controller::{self, BedController};
use octoheat::logging::init_logging;
use octoheat::octoprint::ReqwestTransport;
use octoheat::schedule::SystemClock;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    // Must run before clap reads the environment
    let env_loaded = load_env_file(Path::new(ENV_FILE))?;
    let args = Args::parse();

    let mut app_config =
        AppConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply_logging_overrides(&mut app_config.logging);
    app_config.validate()?;

    init_logging(&app_config.logging)?;
    info!("Octoheat {} starting", env!("APP_VERSION"));
    if env_loaded {
        info!("Loaded environment from {}", ENV_FILE);
    }

    // CLI and environment take precedence over the file
    let settings = app_config
        .printer_settings()
        .overlay(args.printer_settings());

    let transport = Arc::new(ReqwestTransport::new()?);
    let bed_controller =
        BedController::new(transport, Arc::new(SystemClock)).with_dry_run(args.dry_run);

    let result = bed_controller.run(&settings).await;
    Ok(ExitCode::from(controller::finish(&result)))
}
