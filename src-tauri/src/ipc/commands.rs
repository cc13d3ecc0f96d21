//! Tauri IPC Commands
//!
//! Defines all commands exposed to the frontend via Tauri's invoke system.
//! Errors cross the IPC boundary as display strings (`to_ipc_error`).

use std::path::PathBuf;
use std::time::Duration;

use tauri::{AppHandle, Manager, State};

use crate::core::files::{example_videos, FileItem};
use crate::core::masking::WorkflowState;
use crate::core::segments::PlayerIntent;
use crate::core::upload::{UploadRequest, UploadResult};
use crate::core::{CoreError, JobId};
use crate::AppState;

use super::{
    emit_event, event_names, JobCompletedEvent, JobFailedEvent, JobStatusEvent,
    SelectionReport, UploadProgressEvent, WorkflowReport,
};

/// How often the event watcher samples the workflow state
const WATCH_INTERVAL: Duration = Duration::from_millis(250);

// =============================================================================
// Library Commands
// =============================================================================

/// Lists the bundled example videos
#[tauri::command]
#[specta::specta]
pub async fn list_example_videos() -> Result<Vec<FileItem>, String> {
    Ok(example_videos())
}

/// Makes a bundled example video the current one.
///
/// Abandons any running workflow and clears the playback selection; example
/// videos play locally and are never submitted for processing.
#[tauri::command]
#[specta::specta]
pub async fn select_example_video(
    name: String,
    state: State<'_, AppState>,
) -> Result<FileItem, String> {
    let item = example_videos()
        .into_iter()
        .find(|f| f.name == name)
        .ok_or_else(|| {
            CoreError::NotFound(format!("Unknown example video: {}", name)).to_ipc_error()
        })?;

    state.session.workflow.reset().await;
    *state.current_file_id.lock().await = None;
    *state.selection.lock().await = Default::default();
    *state.current_file.lock().await = Some(item.clone());

    Ok(item)
}

/// Gets the descriptor of the video the player currently shows
#[tauri::command]
#[specta::specta]
pub async fn get_current_file(state: State<'_, AppState>) -> Result<Option<FileItem>, String> {
    Ok(state.current_file.lock().await.clone())
}

// =============================================================================
// Upload Commands
// =============================================================================

/// Uploads in-memory video bytes, emitting `upload:progress` per stage.
///
/// `local_blob_url` is the frontend's object URL for the picked file; it is
/// kept on the current-file descriptor so the player can show the video
/// without a round trip through storage.
#[tauri::command]
#[specta::specta]
pub async fn upload_video(
    file_name: String,
    bytes: Vec<u8>,
    local_blob_url: String,
    app: AppHandle,
    state: State<'_, AppState>,
) -> Result<UploadResult, String> {
    let result = state
        .session
        .uploader
        .upload(UploadRequest::new(&file_name, bytes), |stage| {
            emit_event(
                &app,
                event_names::UPLOAD_PROGRESS,
                UploadProgressEvent::from(stage),
            );
        })
        .await
        .map_err(|e| e.to_ipc_error())?;

    state.session.workflow.reset().await;
    *state.selection.lock().await = Default::default();
    *state.current_file.lock().await = Some(FileItem::uploaded(&file_name, &local_blob_url));
    *state.current_file_id.lock().await = Some(result.file_id.clone());

    Ok(result)
}

/// Uploads a video from a filesystem path (native file dialogs)
#[tauri::command]
#[specta::specta]
pub async fn upload_video_from_path(
    path: String,
    app: AppHandle,
    state: State<'_, AppState>,
) -> Result<UploadResult, String> {
    let path = PathBuf::from(path);
    let item = FileItem::uploaded_from_path(&path).map_err(|e| e.to_ipc_error())?;

    let result = state
        .session
        .uploader
        .upload_path(&path, |stage| {
            emit_event(
                &app,
                event_names::UPLOAD_PROGRESS,
                UploadProgressEvent::from(stage),
            );
        })
        .await
        .map_err(|e| e.to_ipc_error())?;

    state.session.workflow.reset().await;
    *state.selection.lock().await = Default::default();
    *state.current_file.lock().await = Some(item);
    *state.current_file_id.lock().await = Some(result.file_id.clone());

    Ok(result)
}

// =============================================================================
// Workflow Commands
// =============================================================================

/// Submits the last uploaded video for processing and starts event emission
#[tauri::command]
#[specta::specta]
pub async fn start_masking(
    configuration: Option<String>,
    app: AppHandle,
    state: State<'_, AppState>,
) -> Result<JobId, String> {
    let file_id = state
        .current_file_id
        .lock()
        .await
        .clone()
        .ok_or_else(|| {
            CoreError::ValidationError("Upload a video before starting processing".to_string())
                .to_ipc_error()
        })?;

    let configuration =
        configuration.unwrap_or_else(|| crate::core::api::DEFAULT_CONFIGURATION.to_string());

    let job_id = state
        .session
        .workflow
        .submit(&file_id, &configuration)
        .await
        .map_err(|e| e.to_ipc_error())?;

    // Mirror workflow transitions onto the event channel until terminal.
    let watcher_app = app.clone();
    tauri::async_runtime::spawn(async move {
        watch_workflow(watcher_app).await;
    });

    Ok(job_id)
}

/// Gets the current workflow state
#[tauri::command]
#[specta::specta]
pub async fn get_workflow_state(state: State<'_, AppState>) -> Result<WorkflowReport, String> {
    Ok(WorkflowReport::from(state.session.workflow.state().await))
}

/// Abandons the current run and returns the workflow to idle
#[tauri::command]
#[specta::specta]
pub async fn reset_workflow(
    app: AppHandle,
    state: State<'_, AppState>,
) -> Result<WorkflowReport, String> {
    state.session.workflow.reset().await;
    *state.selection.lock().await = Default::default();
    emit_event(&app, event_names::WORKFLOW_RESET, ());

    Ok(WorkflowReport::from(state.session.workflow.state().await))
}

/// Samples the workflow and forwards transitions as events.
///
/// Exits when the run reaches a terminal state or is reset.
async fn watch_workflow(app: AppHandle) {
    let mut last_message = String::new();

    loop {
        tokio::time::sleep(WATCH_INTERVAL).await;

        let current = {
            let state: State<'_, AppState> = app.state();
            state.session.workflow.state().await
        };

        match current {
            WorkflowState::Idle => {
                emit_event(&app, event_names::WORKFLOW_RESET, ());
                break;
            }
            WorkflowState::Submitting { .. } => {}
            WorkflowState::Polling {
                ref job_id,
                ref status_message,
            } => {
                if *status_message != last_message {
                    last_message = status_message.clone();
                    emit_event(
                        &app,
                        event_names::JOB_STATUS,
                        JobStatusEvent {
                            job_id: job_id.clone(),
                            status_message: status_message.clone(),
                        },
                    );
                }
            }
            WorkflowState::Completed { job_id, segments } => {
                emit_event(
                    &app,
                    event_names::JOB_COMPLETED,
                    JobCompletedEvent { job_id, segments },
                );
                break;
            }
            WorkflowState::Failed { job_id, error } => {
                emit_event(&app, event_names::JOB_FAILED, JobFailedEvent { job_id, error });
                break;
            }
            WorkflowState::TimedOut { job_id } => {
                let error = WorkflowState::TimedOut {
                    job_id: job_id.clone(),
                }
                .status_message();
                emit_event(
                    &app,
                    event_names::JOB_FAILED,
                    JobFailedEvent {
                        job_id: Some(job_id),
                        error,
                    },
                );
                break;
            }
        }
    }
}

// =============================================================================
// Player Commands
// =============================================================================

/// Applies a discrete player intent to the playback selection
#[tauri::command]
#[specta::specta]
pub async fn player_intent(
    intent: PlayerIntent,
    state: State<'_, AppState>,
) -> Result<SelectionReport, String> {
    let workflow_state = state.session.workflow.state().await;
    let segments = workflow_state.segments().unwrap_or(&[]);

    let mut selection = state.selection.lock().await;
    selection.apply(intent, segments);

    Ok(SelectionReport {
        selection: *selection,
        active_segment: selection.active_segment(segments).copied(),
    })
}

/// Gets the current playback selection
#[tauri::command]
#[specta::specta]
pub async fn get_selection(state: State<'_, AppState>) -> Result<SelectionReport, String> {
    let workflow_state = state.session.workflow.state().await;
    let segments = workflow_state.segments().unwrap_or(&[]);
    let selection = state.selection.lock().await;

    Ok(SelectionReport {
        selection: *selection,
        active_segment: selection.active_segment(segments).copied(),
    })
}
