use crate::config::{API_KEY_VAR, ENDPOINT_VAR, LoggingConfig, PrinterSettings, TARGET_VAR};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "octoheat")]
#[command(version = env!("APP_VERSION"))]
#[command(about = "Warm the print bed during work hours and switch it off afterwards")]
pub struct Args {
    /// OctoPrint base URL, e.g. http://octopi.local
    #[arg(env = ENDPOINT_VAR)]
    pub server: Option<String>,

    /// OctoPrint API key
    #[arg(env = API_KEY_VAR, hide_env_values = true)]
    pub key: Option<String>,

    /// Bed temperature to heat to during work hours (°C)
    #[arg(env = TARGET_VAR)]
    pub target: Option<String>,

    /// YAML configuration file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Override the configured log level
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Evaluate the printer state but do not send any command
    #[arg(long)]
    pub dry_run: bool,
}

impl Args {
    /// Printer values given on the command line or through the environment
    pub fn printer_settings(&self) -> PrinterSettings {
        PrinterSettings {
            endpoint: self.server.clone(),
            api_key: self.key.clone(),
            target: self.target.clone(),
            ..Default::default()
        }
    }

    /// Apply logging flags on top of the file configuration
    pub fn apply_logging_overrides(&self, logging: &mut LoggingConfig) {
        if let Some(level) = &self.log_level {
            logging.level = level.clone();
        }
        if self.json_logs {
            logging.json_format = true;
        }
    }
}
