//! Scripted Mock Provider
//!
//! In-memory [`MaskingProvider`] used by workflow and uploader tests (and by
//! the CLI's dry-run mode). Call counters let tests assert that validation
//! failures never reach the network, and the status script drives the poll
//! workflow through arbitrary status sequences.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{job_status, JobSnapshot, MaskingProvider, ProcessAck, UploadTicket};
use crate::core::{CoreError, CoreResult};

/// One scripted answer to a `job_status` call
#[derive(Debug, Clone)]
pub enum StatusStep {
    /// Return this snapshot
    Snapshot(JobSnapshot),
    /// Fail the call with a transport-style error
    TransportError(String),
    /// Fail the call as if the gateway returned 404 for the job
    NotFound,
}

/// Scripted in-memory provider
pub struct MockMaskingProvider {
    file_id: String,
    job_id: String,
    fail_get_upload_url: Option<String>,
    fail_upload: Option<String>,
    fail_start: Option<String>,
    /// Status answers, consumed in order; the last step repeats forever
    script: Mutex<Vec<StatusStep>>,
    upload_url_calls: AtomicUsize,
    upload_calls: AtomicUsize,
    start_calls: AtomicUsize,
    status_calls: AtomicUsize,
}

impl MockMaskingProvider {
    /// Creates a mock that uploads successfully and reports `processing`
    pub fn new() -> Self {
        Self {
            file_id: "mock-file".to_string(),
            job_id: "mock-job".to_string(),
            fail_get_upload_url: None,
            fail_upload: None,
            fail_start: None,
            script: Mutex::new(Vec::new()),
            upload_url_calls: AtomicUsize::new(0),
            upload_calls: AtomicUsize::new(0),
            start_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
        }
    }

    /// Sets the file id returned with the upload ticket
    pub fn with_file_id(mut self, file_id: impl Into<String>) -> Self {
        self.file_id = file_id.into();
        self
    }

    /// Sets the job id returned on processing start
    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = job_id.into();
        self
    }

    /// Makes `get_upload_url` fail with an upstream error
    pub fn with_upload_url_failure(mut self, message: impl Into<String>) -> Self {
        self.fail_get_upload_url = Some(message.into());
        self
    }

    /// Makes `upload_bytes` fail with an upstream error
    pub fn with_upload_failure(mut self, message: impl Into<String>) -> Self {
        self.fail_upload = Some(message.into());
        self
    }

    /// Makes `start_processing` fail with an upstream error
    pub fn with_start_failure(mut self, message: impl Into<String>) -> Self {
        self.fail_start = Some(message.into());
        self
    }

    /// Appends a snapshot answer to the status script
    pub fn then_status(self, snapshot: JobSnapshot) -> Self {
        self.script.lock().unwrap().push(StatusStep::Snapshot(snapshot));
        self
    }

    /// Appends a transport failure to the status script
    pub fn then_transport_error(self, message: impl Into<String>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push(StatusStep::TransportError(message.into()));
        self
    }

    /// Appends a job-not-found answer to the status script
    pub fn then_not_found(self) -> Self {
        self.script.lock().unwrap().push(StatusStep::NotFound);
        self
    }

    pub fn upload_url_calls(&self) -> usize {
        self.upload_url_calls.load(Ordering::SeqCst)
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockMaskingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MaskingProvider for MockMaskingProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn get_upload_url(&self) -> CoreResult<UploadTicket> {
        self.upload_url_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.fail_get_upload_url {
            return Err(CoreError::Upstream(message.clone()));
        }

        Ok(UploadTicket {
            upload_url: format!("https://storage.mock/{}", self.file_id),
            file_id: self.file_id.clone(),
            expires_at: "2099-01-01T00:00:00Z".to_string(),
        })
    }

    async fn upload_bytes(
        &self,
        _upload_url: &str,
        _content_type: &str,
        _body: Vec<u8>,
    ) -> CoreResult<()> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.fail_upload {
            return Err(CoreError::Upstream(message.clone()));
        }

        Ok(())
    }

    async fn start_processing(
        &self,
        _file_id: &str,
        _configuration: &str,
    ) -> CoreResult<ProcessAck> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.fail_start {
            return Err(CoreError::Upstream(message.clone()));
        }

        Ok(ProcessAck {
            job_id: self.job_id.clone(),
            message: Some("Video processing started".to_string()),
        })
    }

    async fn job_status(&self, job_id: &str) -> CoreResult<JobSnapshot> {
        let call = self.status_calls.fetch_add(1, Ordering::SeqCst);

        let script = self.script.lock().unwrap();
        if script.is_empty() {
            return Ok(JobSnapshot::with_status(job_id, job_status::PROCESSING));
        }

        let step = script[call.min(script.len() - 1)].clone();
        match step {
            StatusStep::Snapshot(snapshot) => Ok(snapshot),
            StatusStep::TransportError(message) => Err(CoreError::Internal(message)),
            StatusStep::NotFound => Err(CoreError::NotFound(format!("Job not found: {}", job_id))),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_happy_path() {
        let mock = MockMaskingProvider::new().with_file_id("f-1").with_job_id("j-1");

        let ticket = mock.get_upload_url().await.unwrap();
        assert_eq!(ticket.file_id, "f-1");

        mock.upload_bytes(&ticket.upload_url, "video/mp4", vec![0u8; 4])
            .await
            .unwrap();

        let ack = mock.start_processing("f-1", "default").await.unwrap();
        assert_eq!(ack.job_id, "j-1");

        assert_eq!(mock.upload_url_calls(), 1);
        assert_eq!(mock.upload_calls(), 1);
        assert_eq!(mock.start_calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_script_repeats_last_step() {
        let mock = MockMaskingProvider::new()
            .then_status(JobSnapshot::with_status("j-1", job_status::QUEUED))
            .then_status(JobSnapshot::with_status("j-1", job_status::PROCESSING));

        assert_eq!(mock.job_status("j-1").await.unwrap().status, "queued");
        assert_eq!(mock.job_status("j-1").await.unwrap().status, "processing");
        // Exhausted script repeats the final answer.
        assert_eq!(mock.job_status("j-1").await.unwrap().status, "processing");
        assert_eq!(mock.status_calls(), 3);
    }

    #[tokio::test]
    async fn test_mock_empty_script_reports_processing() {
        let mock = MockMaskingProvider::new();
        assert_eq!(mock.job_status("j-1").await.unwrap().status, "processing");
    }

    #[tokio::test]
    async fn test_mock_not_found_step() {
        let mock = MockMaskingProvider::new()
            .then_not_found()
            .then_status(JobSnapshot::with_status("j-1", job_status::PROCESSING));

        let err = mock.job_status("j-1").await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
        assert!(err.to_string().contains("j-1"));

        assert_eq!(mock.job_status("j-1").await.unwrap().status, "processing");
    }

    #[tokio::test]
    async fn test_mock_failure_injection() {
        let mock = MockMaskingProvider::new().with_upload_failure("storage unavailable");
        assert!(mock.get_upload_url().await.is_ok());
        let err = mock
            .upload_bytes("https://storage.mock/x", "video/mp4", vec![])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("storage unavailable"));
    }
}
