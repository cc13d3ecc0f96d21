//! Command request/response payloads shared with the frontend.

use serde::{Deserialize, Serialize};
use specta::Type;

use crate::core::masking::WorkflowState;
use crate::core::segments::{Segment, SegmentSelection};

/// Workflow state plus its display string, returned by workflow commands
#[derive(Debug, Clone, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowReport {
    pub state: WorkflowState,
    pub status_message: String,
}

impl From<WorkflowState> for WorkflowReport {
    fn from(state: WorkflowState) -> Self {
        Self {
            status_message: state.status_message(),
            state,
        }
    }
}

/// Current playback selection plus the resolved active segment
#[derive(Debug, Clone, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase")]
pub struct SelectionReport {
    pub selection: SegmentSelection,
    pub active_segment: Option<Segment>,
}
