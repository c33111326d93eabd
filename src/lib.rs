//! # Octoheat - print bed warmer for OctoPrint
//!
//! Keeps a 3D printer's bed warm during work hours and switches it off
//! outside them. Each invocation performs one decision pass and exits; run it
//! from cron or a systemd timer.
//!
//! ## Architecture
//!
//! - `config`: YAML file, environment and CLI sources resolved into one
//!   printer configuration
//! - `logging`: Structured logging and tracing
//! - `octoprint`: HTTP client wrapper, response validation and API operations
//! - `schedule`: Work-hours time policy
//! - `controller`: The decision pipeline
//! - `cli`: Command line arguments

pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod octoprint;
pub mod schedule;

// Re-export commonly used types
pub use config::{AppConfig, PrinterConfig, PrinterSettings};
pub use controller::{BedController, Decision, Outcome};
pub use error::{OctoheatError, Result};
