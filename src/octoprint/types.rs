use serde::Serialize;
use serde_json::Value;

/// Oldest API version we talk to
pub const MIN_API_VERSION: f64 = 0.1;

/// Job state in which the printer is idle and safe to command
pub const OPERATIONAL: &str = "Operational";

/// Reported API version
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VersionInfo {
    pub api: f64,
}

impl VersionInfo {
    /// Read `api` from a `/version` payload.
    ///
    /// Accepts JSON numbers and numeric strings; anything else yields `None`.
    pub fn from_payload(data: &Value) -> Option<Self> {
        let api = match data.get("api")? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        api.is_finite().then_some(Self { api })
    }

    pub fn is_supported(&self) -> bool {
        self.api >= MIN_API_VERSION
    }
}

/// Current job information; only `state` is interpreted
#[derive(Debug, Clone, PartialEq)]
pub struct JobInfo {
    pub state: String,
    pub raw: Value,
}

impl JobInfo {
    pub fn is_operational(&self) -> bool {
        self.state == OPERATIONAL
    }
}

/// Print bed temperatures in °C
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BedState {
    pub actual: f64,
    pub target: f64,
}

impl BedState {
    /// Whether the bed has no heating setpoint
    pub fn is_off(&self) -> bool {
        self.target == 0.0
    }
}

/// Body of a `POST /api/printer/bed` target command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BedCommand {
    pub command: &'static str,
    #[serde(serialize_with = "serialize_temperature")]
    pub target: f64,
}

impl BedCommand {
    pub fn target(target: f64) -> Self {
        Self {
            command: "target",
            target,
        }
    }
}

// Whole-degree targets go out as integers
fn serialize_temperature<S: serde::Serializer>(t: &f64, s: S) -> Result<S::Ok, S::Error> {
    if t.fract() == 0.0 && t.abs() < 1e15 {
        s.serialize_i64(*t as i64)
    } else {
        s.serialize_f64(*t)
    }
}
