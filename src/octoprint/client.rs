use crate::config::PrinterConfig;
use crate::error::Result;
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use crate::octoprint::transport::{ApiRequest, ApiResponse, Transport};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;

/// Append one path segment to `base` with exactly one `/` between them.
///
/// Leading and trailing slashes on either side are ignored, so joining is
/// idempotent with respect to how callers spell their paths.
pub fn join_segments(base: &str, segment: &str) -> String {
    let base = base.trim_end_matches('/');
    let segment = segment.trim_matches('/');
    if segment.is_empty() {
        return base.to_string();
    }
    format!("{}/{}", base, segment)
}

/// OctoPrint REST client bound to one printer
pub struct OctoPrintClient {
    api_base: String,
    api_key: String,
    transport: Arc<dyn Transport>,
    logger: StructuredLogger,
}

impl OctoPrintClient {
    pub fn new(config: &PrinterConfig, transport: Arc<dyn Transport>) -> Self {
        let logger = get_logger_with_context(
            LogContext::new("octoprint").with_field("endpoint", config.endpoint.clone()),
        );
        Self {
            api_base: join_segments(&config.endpoint, "api"),
            api_key: config.api_key.clone(),
            transport,
            logger,
        }
    }

    /// Absolute URL for a path below `{endpoint}/api`
    pub fn url(&self, path: &str) -> String {
        join_segments(&self.api_base, path)
    }

    /// GET `path`, or POST `body` as JSON to it when a body is given
    pub async fn request(&self, path: &str, body: Option<Value>) -> Result<ApiResponse> {
        let method = if body.is_some() {
            Method::POST
        } else {
            Method::GET
        };
        let url = self.url(path);
        self.logger.debug(&format!("{} {}", method, url));

        let response = self
            .transport
            .send(ApiRequest {
                method,
                url,
                api_key: self.api_key.clone(),
                body,
            })
            .await?;

        self.logger
            .trace(&format!("{} answered {}", path, response.status));
        Ok(response)
    }

    /// GET `path` and decode the body as JSON
    pub async fn get_json(&self, path: &str) -> Result<Value> {
        self.request(path, None).await?.json()
    }
}
