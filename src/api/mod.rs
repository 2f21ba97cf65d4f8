//! HTTP transport for the remote cost-analysis service.
//!
//! The service exposes two fixed endpoints, each taking a multipart upload
//! with a single `file` part and answering with a JSON object:
//!
//! - `POST {base}/predict-cost`: cost forecast and optimization opportunities
//! - `POST {base}/detect-waste`: idle periods and waste recommendations
//!
//! Requests go through the synchronous `ureq` client. There are no retries;
//! a timeout only applies when one is configured.

pub mod multipart;

use std::fmt;
use std::time::Duration;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::schema::ApiConfig;
use crate::controller::SelectedFile;

/// Default base URL of the hosted analysis service.
pub const DEFAULT_BASE_URL: &str = "https://cloudcost-optimizer-api.onrender.com";

/// Message used when a failed response carries no body.
pub const REQUEST_FAILED: &str = "Request failed";

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// One of the two remote analysis operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    PredictCost,
    DetectWaste,
}

impl Endpoint {
    /// Path segment appended to the base URL.
    pub fn path(self) -> &'static str {
        match self {
            Self::PredictCost => "predict-cost",
            Self::DetectWaste => "detect-waste",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure of a single upload.
///
/// Every variant displays as its bare message so callers can surface it to
/// the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The service answered with a non-2xx status.
    #[error("{0}")]
    Request(String),
    /// The request never produced a response (DNS, connect, I/O).
    #[error("{0}")]
    Network(String),
    /// The response body was not a JSON object.
    #[error("{0}")]
    Parse(String),
}

impl ApiError {
    /// Build a request error from a response body, falling back to
    /// [`REQUEST_FAILED`] when the body is empty.
    pub fn from_body(body: String) -> Self {
        if body.is_empty() {
            Self::Request(REQUEST_FAILED.to_string())
        } else {
            Self::Request(body)
        }
    }
}

// ---------------------------------------------------------------------------
// Service seam
// ---------------------------------------------------------------------------

/// Anything that can turn an uploaded CSV into an analysis payload.
///
/// [`ApiClient`] is the production implementation; the controller only
/// depends on this trait.
pub trait AnalysisService {
    fn analyze(&self, endpoint: Endpoint, file: &SelectedFile) -> Result<Map<String, Value>, ApiError>;
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Synchronous client for the analysis service.
#[derive(Debug, Clone)]
pub struct ApiClient {
    agent: ureq::Agent,
    base_url: String,
}

impl ApiClient {
    /// Build a client for `base_url`. `timeout` of `None` waits indefinitely.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            agent: builder.build(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build a client from the resolved `[api]` config section.
    pub fn from_config(config: &ApiConfig) -> Self {
        let timeout = (config.timeout_ms > 0).then(|| Duration::from_millis(config.timeout_ms));
        Self::new(&config.base_url, timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an endpoint.
    pub fn endpoint_url(&self, endpoint: Endpoint) -> String {
        format!("{}/{}", self.base_url, endpoint.path())
    }

    /// Upload `file` as the `file` part of a multipart form and parse the
    /// JSON object that comes back.
    pub fn post_csv(
        &self,
        endpoint: Endpoint,
        file: &SelectedFile,
    ) -> Result<Map<String, Value>, ApiError> {
        let body = multipart::encode_file("file", file.name(), "text/csv", file.contents());

        let result = self
            .agent
            .post(&self.endpoint_url(endpoint))
            .set("Content-Type", &body.content_type)
            .send_bytes(&body.bytes);

        match result {
            Ok(resp) => {
                let status = resp.status();
                let text = resp
                    .into_string()
                    .map_err(|e| ApiError::Network(e.to_string()))?;
                if !(200..300).contains(&status) {
                    return Err(ApiError::from_body(text));
                }
                parse_object(&text)
            }
            Err(ureq::Error::Status(_, resp)) => {
                let text = resp.into_string().unwrap_or_default();
                Err(ApiError::from_body(text))
            }
            Err(ureq::Error::Transport(transport)) => Err(ApiError::Network(transport.to_string())),
        }
    }
}

impl AnalysisService for ApiClient {
    fn analyze(&self, endpoint: Endpoint, file: &SelectedFile) -> Result<Map<String, Value>, ApiError> {
        self.post_csv(endpoint, file)
    }
}

/// Parse a response body into a JSON object.
fn parse_object(text: &str) -> Result<Map<String, Value>, ApiError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::Parse(
            "expected a JSON object in the response body".to_string(),
        )),
        Err(e) => Err(ApiError::Parse(e.to_string())),
    }
}
