//! OctoPrint REST API access
//!
//! - `transport`: the wire seam ([`Transport`]) and its reqwest implementation
//! - `client`: URL building and the `X-Api-Key` header
//! - `validate`: required-key checks on decoded payloads
//! - `api`: version, job, bed state and bed target operations

pub mod api;
pub mod client;
pub mod transport;
pub mod types;
pub mod validate;

pub use client::{OctoPrintClient, join_segments};
pub use transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};
pub use types::{BedCommand, BedState, JobInfo, VersionInfo};
