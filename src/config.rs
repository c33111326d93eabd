//! Configuration management for Octoheat
//!
//! Printer connection values come from three places: an optional YAML file,
//! the process environment and CLI positionals. Each source yields a
//! [`PrinterSettings`] with every field optional; sources are overlaid and the
//! result is resolved into an immutable [`PrinterConfig`] right before the
//! first API call.

use crate::error::{OctoheatError, Result};
use crate::schedule::WorkHours;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use url::Url;

/// Environment variable / field name for the printer base URL
pub const ENDPOINT_VAR: &str = "OCTO_ENDPOINT";

/// Environment variable / field name for the API key
pub const API_KEY_VAR: &str = "API_KEY";

/// Environment variable / field name for the heating target
pub const TARGET_VAR: &str = "TARGET";

/// Highest bed temperature we are willing to request, in °C
pub const MAX_BED_TEMPERATURE: f64 = 150.0;

/// Dotenv file read from the working directory at startup
pub const ENV_FILE: &str = ".env";

/// Default locations searched when no config file is given explicitly
const DEFAULT_PATHS: [&str; 2] = ["octoheat.yaml", "/etc/octoheat/config.yaml"];

/// Load printer variables from a dotenv file into the process environment.
///
/// Variables already set in the environment keep their values. Returns
/// `false` when the file does not exist.
pub fn load_env_file(path: &Path) -> Result<bool> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(OctoheatError::config(format!(
            "Failed to load {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Printer connection and heating target
    pub printer: PrinterSection,

    /// Hours during which the bed is kept warm
    pub work_hours: WorkHours,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Printer section of the configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterSection {
    /// Base URL of the OctoPrint server, e.g. `http://octopi.local`
    pub endpoint: Option<String>,

    /// OctoPrint API key
    pub api_key: Option<String>,

    /// Bed temperature to heat to during work hours, in °C
    pub target_temperature: Option<f64>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Optional log file path; console only when unset
    pub file: Option<String>,

    /// Number of rotated log files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            file: None,
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from `explicit` or the first default location found.
    ///
    /// An explicit path must exist; default locations are optional and fall
    /// back to [`AppConfig::default`].
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path).map_err(|e| {
                OctoheatError::config(format!("Failed to load {}: {}", path.display(), e))
            });
        }

        for path in &DEFAULT_PATHS {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        Ok(AppConfig::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate the parts of the file that do not depend on other sources
    pub fn validate(&self) -> Result<()> {
        validate_work_hours(&self.work_hours)?;

        if let Some(t) = self.printer.target_temperature {
            validate_target(t)?;
        }

        crate::logging::parse_log_level(&self.logging.level)?;

        Ok(())
    }

    /// Printer values contributed by the file
    pub fn printer_settings(&self) -> PrinterSettings {
        PrinterSettings {
            endpoint: self.printer.endpoint.clone(),
            api_key: self.printer.api_key.clone(),
            target: self.printer.target_temperature.map(|t| t.to_string()),
            work_hours: self.work_hours,
        }
    }
}

/// Unresolved printer configuration; any field may still be missing
#[derive(Clone, Default, PartialEq)]
pub struct PrinterSettings {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    /// Raw target as supplied; parsed during resolution
    pub target: Option<String>,
    pub work_hours: WorkHours,
}

impl PrinterSettings {
    /// Overlay `higher` on top of `self`; values present in `higher` win.
    ///
    /// Work hours only come from the file, so they are kept from `self`.
    pub fn overlay(self, higher: PrinterSettings) -> Self {
        Self {
            endpoint: higher.endpoint.or(self.endpoint),
            api_key: higher.api_key.or(self.api_key),
            target: higher.target.or(self.target),
            work_hours: self.work_hours,
        }
    }

    /// Resolve into a fully populated [`PrinterConfig`].
    ///
    /// Fields are checked in the order TARGET, OCTO_ENDPOINT, API_KEY; blank
    /// values count as missing.
    pub fn resolve(&self) -> Result<PrinterConfig> {
        let target = present(&self.target, TARGET_VAR)?;
        let endpoint = present(&self.endpoint, ENDPOINT_VAR)?;
        let api_key = present(&self.api_key, API_KEY_VAR)?;

        let target_temperature: f64 = target.parse().map_err(|_| {
            OctoheatError::validation(TARGET_VAR.to_string(), format!("not a number: {}", target))
        })?;
        validate_target(target_temperature)?;

        let url = Url::parse(endpoint)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(OctoheatError::validation(
                ENDPOINT_VAR.to_string(),
                format!("unsupported scheme: {}", url.scheme()),
            ));
        }

        validate_work_hours(&self.work_hours)?;

        Ok(PrinterConfig {
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            target_temperature,
            work_hours: self.work_hours,
        })
    }
}

impl fmt::Debug for PrinterSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrinterSettings")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("target", &self.target)
            .field("work_hours", &self.work_hours)
            .finish()
    }
}

/// Resolved printer configuration, immutable for the rest of the run
#[derive(Clone, PartialEq)]
pub struct PrinterConfig {
    /// Base URL of the OctoPrint server
    pub endpoint: String,

    /// Value sent as `X-Api-Key`
    pub api_key: String,

    /// Bed temperature to request during work hours
    pub target_temperature: f64,

    /// Heating window
    pub work_hours: WorkHours,
}

impl fmt::Debug for PrinterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrinterConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("target_temperature", &self.target_temperature)
            .field("work_hours", &self.work_hours)
            .finish()
    }
}

fn present<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(OctoheatError::configuration_missing(field)),
    }
}

fn validate_target(target: f64) -> Result<()> {
    if !target.is_finite() || !(0.0..=MAX_BED_TEMPERATURE).contains(&target) {
        return Err(OctoheatError::validation(
            TARGET_VAR.to_string(),
            format!("must be between 0 and {}", MAX_BED_TEMPERATURE),
        ));
    }
    Ok(())
}

fn validate_work_hours(hours: &WorkHours) -> Result<()> {
    if hours.start_hour > 23 || hours.end_hour > 23 {
        return Err(OctoheatError::validation(
            "work_hours",
            "hours must be within 0-23",
        ));
    }
    if hours.start_hour > hours.end_hour {
        return Err(OctoheatError::validation(
            "work_hours",
            "start_hour must not be after end_hour",
        ));
    }
    Ok(())
}
