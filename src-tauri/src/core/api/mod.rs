//! Gateway API Surface
//!
//! The backend is reached through an HTTP API gateway exposing four calls:
//! issue a signed upload URL, accept a direct PUT of the file bytes, start a
//! processing job, and report job status. `MaskingProvider` is the seam the
//! upload orchestrator and poll workflow are written against; `GatewayClient`
//! is the real HTTP implementation and `MockMaskingProvider` a scripted
//! stand-in for tests.

mod client;
mod mock;

pub use client::*;
pub use mock::*;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{CoreResult, FileId, JobId, TimeSec};

/// Configuration string sent with a processing request when the caller does
/// not pick one. Opaque to the client; interpreted by the backend.
pub const DEFAULT_CONFIGURATION: &str = "default";

// =============================================================================
// Wire Types
// =============================================================================

/// Response of `GET /get-upload-url`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadTicket {
    /// Time-limited, pre-authorized URL for a direct client-to-storage PUT
    pub upload_url: String,
    /// Identifier the backend will use to locate the stored object
    pub file_id: FileId,
    /// Expiry timestamp of the signed URL, as reported by the gateway
    pub expires_at: String,
}

impl UploadTicket {
    /// Parses the ticket expiry, if the gateway sent a well-formed timestamp
    pub fn expires_at_time(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::parse_from_rfc3339(&self.expires_at)
            .ok()
            .map(|t| t.with_timezone(&chrono::Utc))
    }
}

/// Request body of `POST /process-video`
#[derive(Debug, Serialize)]
pub struct ProcessVideoRequest {
    /// Storage object path, `<file_id>.mp4`
    #[serde(rename = "objectPath")]
    pub object_path: String,
    pub configuration: String,
}

/// Response of `POST /process-video`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessAck {
    pub job_id: JobId,
    #[serde(default)]
    pub message: Option<String>,
}

/// Raw job status strings used by the gateway
pub mod job_status {
    pub const QUEUED: &str = "queued";
    pub const PROCESSING: &str = "processing";
    pub const COMPLETED: &str = "completed";
    pub const FAILED: &str = "failed";
}

/// Result payload attached to a job snapshot once processing has produced
/// output. The backend stores `segments` as encoded text, not an array.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobResultData {
    #[serde(default)]
    pub object_path: Option<String>,
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub configuration: Option<String>,
    #[serde(default)]
    pub processing_type: Option<String>,
    /// Encoded segment list, e.g. `"[[1.0,5.0],[10.0,12.5]]"`
    #[serde(default)]
    pub segments: Option<String>,
    #[serde(default)]
    pub segment_count: Option<u32>,
}

/// Legacy direct segment entry some older job records carry
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LegacySegment {
    pub start: TimeSec,
    pub end: TimeSec,
}

/// Response of `GET /get-job-status` — a read-only, eventually-consistent
/// snapshot of a backend-owned job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub job_id: JobId,
    /// Raw status string; see [`job_status`] for the known values
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub data: Option<JobResultData>,
    #[serde(default)]
    pub error_message: Option<String>,
    /// Legacy field kept for backward compatibility with older job records
    #[serde(default)]
    pub segments: Option<Vec<LegacySegment>>,
}

impl JobSnapshot {
    /// Builds a minimal snapshot with the given status (test/mock helper)
    pub fn with_status(job_id: impl Into<JobId>, status: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: status.into(),
            timestamp: None,
            updated_at: None,
            data: None,
            error_message: None,
            segments: None,
        }
    }

    /// Attaches an encoded segment payload to the snapshot's result data
    pub fn with_segments_payload(mut self, payload: impl Into<String>) -> Self {
        self.data.get_or_insert_with(JobResultData::default).segments = Some(payload.into());
        self
    }

    /// Attaches a backend error message
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}

// =============================================================================
// Provider Trait
// =============================================================================

/// The four gateway operations, behind a trait so the workflow and the
/// uploader can run against a scripted mock in tests.
///
/// All operations are pure request/response; there are no retries here.
/// Transient-failure tolerance lives in the poll workflow, which simply
/// tries again on its next tick.
#[async_trait]
pub trait MaskingProvider: Send + Sync {
    /// Provider identifier for logs
    fn name(&self) -> &str;

    /// Obtains a signed upload URL and the file id of the future object
    async fn get_upload_url(&self) -> CoreResult<UploadTicket>;

    /// PUTs the raw file bytes to a previously issued signed URL
    async fn upload_bytes(
        &self,
        upload_url: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> CoreResult<()>;

    /// Asks the backend to start processing an uploaded object
    async fn start_processing(&self, file_id: &str, configuration: &str)
        -> CoreResult<ProcessAck>;

    /// Fetches the current snapshot of a job
    async fn job_status(&self, job_id: &str) -> CoreResult<JobSnapshot>;
}

// =============================================================================
// Tests
// =============================================================================
