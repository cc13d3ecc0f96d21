//! Processing Workflow Types
//!
//! The client-side view of a remote masking job: an explicit state machine
//! over submit + poll. All durable job state lives in the backend; this
//! module only models the eventually-consistent snapshot the client holds.

mod workflow;

pub use workflow::*;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use specta::Type;

use crate::core::segments::Segment;
use crate::core::JobId;

// =============================================================================
// Configuration
// =============================================================================

/// Fixed poll interval between status requests
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3_000);

/// Deadline after which a still-running workflow is declared timed out
pub const DEFAULT_POLL_DEADLINE: Duration = Duration::from_millis(600_000);

/// Timing knobs for the poll workflow. Production uses the defaults; tests
/// shrink them.
#[derive(Debug, Clone, Copy)]
pub struct WorkflowConfig {
    pub poll_interval: Duration,
    pub poll_deadline: Duration,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_deadline: DEFAULT_POLL_DEADLINE,
        }
    }
}

// =============================================================================
// Workflow State
// =============================================================================

/// The processing workflow as a single tagged value.
///
/// Every transition goes through [`MaskingWorkflow`]; inconsistent
/// combinations (a job id without a run, results without completion) are
/// unrepresentable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Type)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WorkflowState {
    /// Nothing in flight
    Idle,
    /// Submission request sent, job id not yet known
    Submitting { file_id: String },
    /// Job submitted; status polled on a fixed interval
    Polling { job_id: JobId, status_message: String },
    /// Terminal: the backend finished and segments were decoded
    Completed { job_id: JobId, segments: Vec<Segment> },
    /// Terminal: the backend reported failure
    Failed { job_id: Option<JobId>, error: String },
    /// Terminal: no terminal status arrived before the deadline
    TimedOut { job_id: JobId },
}

impl WorkflowState {
    /// Whether the workflow has reached a sticky terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkflowState::Completed { .. }
                | WorkflowState::Failed { .. }
                | WorkflowState::TimedOut { .. }
        )
    }

    /// Whether a new submission is accepted from this state
    pub fn can_submit(&self) -> bool {
        matches!(self, WorkflowState::Idle) || self.is_terminal()
    }

    /// The job id of the current run, if one has been assigned
    pub fn job_id(&self) -> Option<&JobId> {
        match self {
            WorkflowState::Polling { job_id, .. }
            | WorkflowState::Completed { job_id, .. }
            | WorkflowState::TimedOut { job_id } => Some(job_id),
            WorkflowState::Failed { job_id, .. } => job_id.as_ref(),
            _ => None,
        }
    }

    /// Decoded segments of a completed run
    pub fn segments(&self) -> Option<&[Segment]> {
        match self {
            WorkflowState::Completed { segments, .. } => Some(segments),
            _ => None,
        }
    }

    /// Short human-readable status line for the view layer
    pub fn status_message(&self) -> String {
        match self {
            WorkflowState::Idle => "Idle".to_string(),
            WorkflowState::Submitting { .. } => {
                "Submitting video for processing...".to_string()
            }
            WorkflowState::Polling { status_message, .. } => status_message.clone(),
            WorkflowState::Completed { .. } => "Processed successfully.".to_string(),
            WorkflowState::Failed { error, .. } => format!("Processing failed: {}", error),
            WorkflowState::TimedOut { .. } => {
                "Processing is taking longer than expected. Please check back later.".to_string()
            }
        }
    }
}

impl Default for WorkflowState {
    fn default() -> Self {
        WorkflowState::Idle
    }
}

// =============================================================================
// Tests
// =============================================================================
