//! The four printer operations the controller needs.
//!
//! Each one is a request through [`OctoPrintClient`] followed by a pure parse
//! of the decoded payload. The parsers are public so they can be exercised
//! without a transport.

use crate::error::{OctoheatError, Result};
use crate::octoprint::client::OctoPrintClient;
use crate::octoprint::types::{BedCommand, BedState, JobInfo, VersionInfo};
use crate::octoprint::validate::{require_f64, require_key};
use serde_json::Value;

pub const VERSION_PATH: &str = "/version";
pub const JOB_PATH: &str = "/job";
pub const BED_PATH: &str = "/printer/bed";

/// Status OctoPrint answers an accepted bed command with
const NO_CONTENT: u16 = 204;

/// Whether a `/version` payload names a supported API.
///
/// Never fails: an absent or non-numeric `api` is simply unsupported.
pub fn parse_version_supported(data: &Value) -> bool {
    VersionInfo::from_payload(data).is_some_and(|v| v.is_supported())
}

/// Parse a `/job` payload.
///
/// OctoPrint reports the state at the top level; a `state` nested inside
/// `job` is accepted as a fallback.
pub fn parse_job_info(data: Value) -> Result<JobInfo> {
    require_key(&data, "job")?;

    let state = data
        .get("state")
        .and_then(Value::as_str)
        .or_else(|| data["job"].get("state").and_then(Value::as_str))
        .unwrap_or_default()
        .to_string();

    Ok(JobInfo { state, raw: data })
}

/// Parse a `/printer/bed` payload
pub fn parse_bed_state(data: &Value) -> Result<BedState> {
    require_key(data, "bed")?;
    let bed = &data["bed"];
    require_key(bed, "actual")?;
    require_key(bed, "target")?;

    // Both keys exist; a non-numeric value is reported with the full payload
    let actual = require_f64(bed, "actual").map_err(|_| OctoheatError::invalid_response(data))?;
    let target = require_f64(bed, "target").map_err(|_| OctoheatError::invalid_response(data))?;

    Ok(BedState { actual, target })
}

impl OctoPrintClient {
    /// Whether the printer speaks a supported API version
    pub async fn check_version(&self) -> Result<bool> {
        let data = self.get_json(VERSION_PATH).await?;
        Ok(parse_version_supported(&data))
    }

    /// Fetch the current job
    pub async fn get_job_info(&self) -> Result<JobInfo> {
        let data = self.get_json(JOB_PATH).await?;
        parse_job_info(data)
    }

    /// Fetch actual and target bed temperature
    pub async fn get_bed_state(&self) -> Result<BedState> {
        let data = self.get_json(BED_PATH).await?;
        parse_bed_state(&data)
    }

    /// Set the bed target temperature; `0` turns heating off.
    ///
    /// Returns whether the printer accepted the command.
    pub async fn heat_bed(&self, target: f64) -> Result<bool> {
        let body = serde_json::to_value(BedCommand::target(target))?;
        let response = self.request(BED_PATH, Some(body)).await?;
        Ok(response.status == NO_CONTENT)
    }
}
