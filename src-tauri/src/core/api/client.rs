//! Gateway HTTP Client
//!
//! reqwest-based implementation of [`MaskingProvider`] against the demo's
//! API gateway. Pure request/response: any retry behavior belongs to the
//! caller (the poll workflow retries implicitly on its next tick).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::{JobSnapshot, MaskingProvider, ProcessAck, ProcessVideoRequest, UploadTicket};
use crate::core::{CoreError, CoreResult};

// =============================================================================
// Constants
// =============================================================================

/// Default gateway base URL
pub const DEFAULT_GATEWAY_URL: &str = "https://talking-head-gateway-50v0hkfc.uc.gateway.dev";

/// Environment variable overriding the gateway base URL
pub const GATEWAY_URL_ENV: &str = "MASKVIEW_API_GATEWAY_URL";

/// Overall HTTP request timeout
const HTTP_TIMEOUT: Duration = Duration::from_secs(180);

// =============================================================================
// Error body
// =============================================================================

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    error: Option<String>,
}

// =============================================================================
// GatewayClient
// =============================================================================

/// HTTP client for the masking gateway
pub struct GatewayClient {
    client: reqwest::Client,
    base_url: String,
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GatewayClient {
    /// Creates a client against the default gateway
    pub fn new() -> CoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| CoreError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: DEFAULT_GATEWAY_URL.to_string(),
        })
    }

    /// Creates a client, honoring the `MASKVIEW_API_GATEWAY_URL` override
    pub fn from_env() -> CoreResult<Self> {
        let base_url = std::env::var(GATEWAY_URL_ENV)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string());

        Ok(Self::new()?.with_base_url(base_url))
    }

    /// Set a custom base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the upload-URL endpoint
    fn upload_url_endpoint(&self) -> String {
        format!("{}/get-upload-url", self.base_url)
    }

    /// Build the processing endpoint
    fn process_endpoint(&self) -> String {
        format!("{}/process-video", self.base_url)
    }

    /// Build the job-status endpoint (query string added per request)
    fn status_endpoint(&self) -> String {
        format!("{}/get-job-status", self.base_url)
    }

    /// Parse a non-2xx response body into an error, preferring the gateway's
    /// own `{"error": ...}` message over the raw status.
    fn parse_api_error(status: StatusCode, body: &str) -> CoreError {
        if let Ok(err_resp) = serde_json::from_str::<ApiErrorResponse>(body) {
            if let Some(message) = err_resp.error {
                return CoreError::Upstream(format!("Gateway error ({}): {}", status, message));
            }
        }

        let truncated: String = body.chars().take(500).collect();
        if truncated.is_empty() {
            CoreError::Upstream(format!("Gateway error: {}", status))
        } else {
            CoreError::Upstream(format!("Gateway error ({}): {}", status, truncated))
        }
    }
}

#[async_trait]
impl MaskingProvider for GatewayClient {
    fn name(&self) -> &str {
        "gateway"
    }

    async fn get_upload_url(&self) -> CoreResult<UploadTicket> {
        let resp = self
            .client
            .get(self.upload_url_endpoint())
            .header(header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| CoreError::Internal(format!("Network error: {}", e)))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Self::parse_api_error(status, &body));
        }

        let ticket: UploadTicket = serde_json::from_str(&body)
            .map_err(|e| CoreError::Internal(format!("Failed to parse upload ticket: {}", e)))?;

        debug!(file_id = %ticket.file_id, "Obtained signed upload URL");
        Ok(ticket)
    }

    async fn upload_bytes(
        &self,
        upload_url: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> CoreResult<()> {
        let resp = self
            .client
            .put(upload_url)
            .header(header::CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| CoreError::Internal(format!("Network error: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::Upstream(format!(
                "Failed to upload to cloud storage: {}",
                status
            )));
        }

        Ok(())
    }

    async fn start_processing(
        &self,
        file_id: &str,
        configuration: &str,
    ) -> CoreResult<ProcessAck> {
        let request = ProcessVideoRequest {
            object_path: format!("{}.mp4", file_id),
            configuration: configuration.to_string(),
        };

        let resp = self
            .client
            .post(self.process_endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| CoreError::Internal(format!("Network error: {}", e)))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Self::parse_api_error(status, &body));
        }

        let ack: ProcessAck = serde_json::from_str(&body)
            .map_err(|e| CoreError::Internal(format!("Failed to parse process response: {}", e)))?;

        debug!(job_id = %ack.job_id, "Processing started");
        Ok(ack)
    }

    async fn job_status(&self, job_id: &str) -> CoreResult<JobSnapshot> {
        let resp = self
            .client
            .get(self.status_endpoint())
            .query(&[("job_id", job_id)])
            .header(header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| CoreError::Internal(format!("Network error: {}", e)))?;

        let status = resp.status();

        if status == StatusCode::NOT_FOUND {
            return Err(CoreError::NotFound(format!("Job not found: {}", job_id)));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Self::parse_api_error(status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| CoreError::Internal(format!("Failed to parse job status: {}", e)))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let client = GatewayClient::new().unwrap();
        assert_eq!(
            client.upload_url_endpoint(),
            format!("{}/get-upload-url", DEFAULT_GATEWAY_URL)
        );
        assert_eq!(
            client.process_endpoint(),
            format!("{}/process-video", DEFAULT_GATEWAY_URL)
        );
        assert_eq!(
            client.status_endpoint(),
            format!("{}/get-job-status", DEFAULT_GATEWAY_URL)
        );
    }

    #[test]
    fn test_custom_base_url_trims_trailing_slash() {
        let client = GatewayClient::new()
            .unwrap()
            .with_base_url("https://custom.gateway.dev/");
        assert_eq!(
            client.upload_url_endpoint(),
            "https://custom.gateway.dev/get-upload-url"
        );
    }

    #[test]
    fn test_from_env_override_and_default() {
        // Single test for both cases; parallel tests must not race on the var.
        std::env::remove_var(GATEWAY_URL_ENV);
        let client = GatewayClient::from_env().unwrap();
        assert_eq!(client.base_url(), DEFAULT_GATEWAY_URL);

        std::env::set_var(GATEWAY_URL_ENV, "https://staging.gateway.dev");
        let client = GatewayClient::from_env().unwrap();
        assert_eq!(client.base_url(), "https://staging.gateway.dev");
        std::env::remove_var(GATEWAY_URL_ENV);
    }

    #[test]
    fn test_parse_api_error_structured() {
        let body = r#"{"error":"No upload slots available"}"#;
        let err = GatewayClient::parse_api_error(StatusCode::SERVICE_UNAVAILABLE, body);
        match err {
            CoreError::Upstream(msg) => {
                assert!(msg.contains("No upload slots available"));
                assert!(msg.contains("503"));
            }
            other => panic!("Expected Upstream, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_api_error_unstructured() {
        let err =
            GatewayClient::parse_api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
        match err {
            CoreError::Upstream(msg) => assert!(msg.contains("Internal Server Error")),
            other => panic!("Expected Upstream, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_api_error_empty_body_uses_status() {
        let err = GatewayClient::parse_api_error(StatusCode::BAD_GATEWAY, "");
        match err {
            CoreError::Upstream(msg) => assert!(msg.contains("502")),
            other => panic!("Expected Upstream, got {:?}", other),
        }
    }
}
