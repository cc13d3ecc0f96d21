//! Tauri Event Emission Module
//!
//! Broadcasts workflow progress to the frontend via Tauri's event system.
//! The frontend never polls the backend directly; it reacts to these events
//! and to command return values.

use serde::{Deserialize, Serialize};
use specta::Type;
use tauri::{AppHandle, Emitter};

use crate::core::segments::Segment;
use crate::core::upload::UploadStage;
use crate::core::JobId;

// =============================================================================
// Event Types
// =============================================================================

/// Event names used for frontend communication
pub mod event_names {
    /// Upload stage changed
    pub const UPLOAD_PROGRESS: &str = "upload:progress";
    /// Non-terminal job status update
    pub const JOB_STATUS: &str = "job:status";
    /// Job completed, segments available
    pub const JOB_COMPLETED: &str = "job:completed";
    /// Job failed or timed out
    pub const JOB_FAILED: &str = "job:failed";
    /// Workflow returned to idle
    pub const WORKFLOW_RESET: &str = "workflow:reset";
}

// =============================================================================
// Event Payloads
// =============================================================================

/// Upload stage event payload
#[derive(Clone, Debug, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase")]
pub struct UploadProgressEvent {
    pub stage: UploadStage,
    /// Human-readable stage description
    pub message: String,
}

impl From<UploadStage> for UploadProgressEvent {
    fn from(stage: UploadStage) -> Self {
        Self {
            message: stage.to_string(),
            stage,
        }
    }
}

/// Non-terminal job status payload
#[derive(Clone, Debug, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusEvent {
    pub job_id: JobId,
    pub status_message: String,
}

/// Completed job payload
#[derive(Clone, Debug, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase")]
pub struct JobCompletedEvent {
    pub job_id: JobId,
    pub segments: Vec<Segment>,
}

/// Failed or timed-out job payload
#[derive(Clone, Debug, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase")]
pub struct JobFailedEvent {
    pub job_id: Option<JobId>,
    pub error: String,
}

// =============================================================================
// Emission Helpers
// =============================================================================

/// Emits an event, logging instead of failing if the frontend is gone
pub fn emit_event<P: Serialize + Clone>(app: &AppHandle, name: &str, payload: P) {
    if let Err(e) = app.emit(name, payload) {
        tracing::warn!("Failed to emit {}: {}", name, e);
    }
}
