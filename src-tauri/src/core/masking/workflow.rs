//! Poll Workflow Engine
//!
//! Drives a submitted job to a terminal state: submit once, then poll the
//! provider on a fixed interval until the backend reports `completed` or
//! `failed`, or the deadline passes. Transport errors during polling are
//! logged and retried on the next tick; only a terminal report or the
//! deadline stops the loop.
//!
//! Every state write is guarded by a generation counter bumped on `reset`,
//! so in-flight responses from an abandoned run can never resurrect it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};

use super::{WorkflowConfig, WorkflowState};
use crate::core::api::{job_status, MaskingProvider};
use crate::core::segments::segments_from_snapshot;
use crate::core::{CoreError, CoreResult, JobId};

/// Status line shown right after submission succeeds
const SUBMITTED_MESSAGE: &str = "Processing video - this may take a few minutes...";

/// Status line for an ordinary `processing` report
const PROCESSING_MESSAGE: &str = "Processing video...";

struct WorkflowInner {
    state: RwLock<WorkflowState>,
    /// Bumped on every reset and submission; stale tasks compare and bail
    generation: AtomicU64,
}

/// Submit-and-poll engine over a [`MaskingProvider`]
pub struct MaskingWorkflow {
    provider: Arc<dyn MaskingProvider>,
    config: WorkflowConfig,
    inner: Arc<WorkflowInner>,
    poll_task: Mutex<Option<JoinHandle<()>>>,
}

impl MaskingWorkflow {
    pub fn new(provider: Arc<dyn MaskingProvider>) -> Self {
        Self::with_config(provider, WorkflowConfig::default())
    }

    pub fn with_config(provider: Arc<dyn MaskingProvider>, config: WorkflowConfig) -> Self {
        Self {
            provider,
            config,
            inner: Arc::new(WorkflowInner {
                state: RwLock::new(WorkflowState::Idle),
                generation: AtomicU64::new(0),
            }),
            poll_task: Mutex::new(None),
        }
    }

    /// Current state snapshot
    pub async fn state(&self) -> WorkflowState {
        self.inner.state.read().await.clone()
    }

    /// Current human-readable status line
    pub async fn status_message(&self) -> String {
        self.inner.state.read().await.status_message()
    }

    /// Submits an uploaded file for processing and starts the poll loop.
    ///
    /// Only accepted from `Idle` or a terminal state. On submission failure
    /// the workflow reverts to `Idle` and the error is returned.
    pub async fn submit(&self, file_id: &str, configuration: &str) -> CoreResult<JobId> {
        let generation = {
            let mut state = self.inner.state.write().await;
            if !state.can_submit() {
                return Err(CoreError::ValidationError(
                    "A processing job is already in progress".to_string(),
                ));
            }
            *state = WorkflowState::Submitting {
                file_id: file_id.to_string(),
            };
            self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1
        };

        let ack = match self.provider.start_processing(file_id, configuration).await {
            Ok(ack) => ack,
            Err(e) => {
                let mut state = self.inner.state.write().await;
                if self.inner.generation.load(Ordering::SeqCst) == generation {
                    *state = WorkflowState::Idle;
                }
                return Err(e);
            }
        };

        {
            let mut state = self.inner.state.write().await;
            if self.inner.generation.load(Ordering::SeqCst) != generation {
                // Reset raced the submission; the new run owns the state.
                return Err(CoreError::ValidationError(
                    "Workflow was reset during submission".to_string(),
                ));
            }
            *state = WorkflowState::Polling {
                job_id: ack.job_id.clone(),
                status_message: SUBMITTED_MESSAGE.to_string(),
            };
        }

        info!(job_id = %ack.job_id, file_id = %file_id, "Processing job submitted");

        let handle = self.spawn_poll_loop(ack.job_id.clone(), generation);
        if let Ok(mut slot) = self.poll_task.lock() {
            if let Some(old) = slot.replace(handle) {
                old.abort();
            }
        }

        Ok(ack.job_id)
    }

    /// Abandons the current run and returns to `Idle`.
    ///
    /// Any in-flight status response from the abandoned run is discarded by
    /// the generation guard.
    pub async fn reset(&self) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut slot) = self.poll_task.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
        *self.inner.state.write().await = WorkflowState::Idle;
        info!("Workflow reset");
    }

    /// Waits until the workflow reaches a terminal state, or `limit` passes
    pub async fn wait_until_terminal(&self, limit: Duration) -> CoreResult<WorkflowState> {
        let deadline = Instant::now() + limit;
        loop {
            let state = self.state().await;
            if state.is_terminal() {
                return Ok(state);
            }
            if Instant::now() >= deadline {
                return Err(CoreError::Timeout(
                    "Workflow did not reach a terminal state in time".to_string(),
                ));
            }
            tokio::time::sleep(Duration::from_millis(10).min(self.config.poll_interval)).await;
        }
    }

    fn spawn_poll_loop(&self, job_id: JobId, generation: u64) -> JoinHandle<()> {
        let provider = Arc::clone(&self.provider);
        let inner = Arc::clone(&self.inner);
        let config = self.config;

        tokio::spawn(async move {
            let deadline = Instant::now() + config.poll_deadline;
            let mut ticker = tokio::time::interval(config.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; the first poll happens
            // one full interval after submission.
            ticker.tick().await;

            loop {
                ticker.tick().await;

                if inner.generation.load(Ordering::SeqCst) != generation {
                    break;
                }

                if Instant::now() >= deadline {
                    let mut state = inner.state.write().await;
                    if inner.generation.load(Ordering::SeqCst) == generation
                        && !state.is_terminal()
                    {
                        warn!(job_id = %job_id, "Polling deadline reached");
                        *state = WorkflowState::TimedOut {
                            job_id: job_id.clone(),
                        };
                    }
                    break;
                }

                let snapshot = match provider.job_status(&job_id).await {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        warn!(job_id = %job_id, "Status poll failed, retrying next tick: {}", e);
                        continue;
                    }
                };

                let mut state = inner.state.write().await;
                if inner.generation.load(Ordering::SeqCst) != generation {
                    // Stale response from before a reset.
                    break;
                }

                match snapshot.status.as_str() {
                    job_status::COMPLETED => {
                        let segments = segments_from_snapshot(&snapshot);
                        info!(
                            job_id = %job_id,
                            segments = segments.len(),
                            "Processing completed"
                        );
                        *state = WorkflowState::Completed {
                            job_id: job_id.clone(),
                            segments,
                        };
                        break;
                    }
                    job_status::FAILED => {
                        let error = snapshot
                            .error_message
                            .unwrap_or_else(|| "Processing failed. Please try again.".to_string());
                        warn!(job_id = %job_id, "Processing failed: {}", error);
                        *state = WorkflowState::Failed {
                            job_id: Some(job_id.clone()),
                            error,
                        };
                        break;
                    }
                    job_status::PROCESSING => {
                        *state = WorkflowState::Polling {
                            job_id: job_id.clone(),
                            status_message: PROCESSING_MESSAGE.to_string(),
                        };
                    }
                    other => {
                        // Unknown statuses are surfaced verbatim, not treated
                        // as terminal.
                        *state = WorkflowState::Polling {
                            job_id: job_id.clone(),
                            status_message: format!("Status: {}", other),
                        };
                    }
                }
            }
        })
    }
}

impl Drop for MaskingWorkflow {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.poll_task.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
