//! MaskView CLI
//!
//! Headless client for the video-masking demo backend: upload a video, submit
//! it for processing, and poll the job to completion from the terminal. Uses
//! the same session and workflow types as the desktop app.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use maskview_lib::core::api::{
    job_status, GatewayClient, JobSnapshot, MaskingProvider, MockMaskingProvider,
    DEFAULT_CONFIGURATION,
};
use maskview_lib::core::files::example_videos;
use maskview_lib::core::masking::{MaskingWorkflow, WorkflowState};
use maskview_lib::core::segments::Segment;
use maskview_lib::MaskingSession;

#[derive(Parser)]
#[command(
    name = "maskview-cli",
    about = "Headless client for the video-masking demo backend",
    version
)]
struct Cli {
    /// Override the gateway base URL
    #[arg(long, global = true)]
    gateway_url: Option<String>,

    /// Use the in-memory mock provider instead of the real gateway
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the bundled example videos
    Examples,
    /// Upload a video and print its file id
    Upload {
        /// Path to a local video file
        path: PathBuf,
    },
    /// Submit an uploaded file for processing and poll to completion
    Process {
        /// File id returned by `upload`
        file_id: String,
        /// Masking configuration name
        #[arg(long, default_value = DEFAULT_CONFIGURATION)]
        configuration: String,
    },
    /// Query a job's status once and print the raw record
    Status {
        /// Job id returned by `process`
        job_id: String,
    },
    /// Upload a video and process it end to end
    Run {
        /// Path to a local video file
        path: PathBuf,
        /// Masking configuration name
        #[arg(long, default_value = DEFAULT_CONFIGURATION)]
        configuration: String,
    },
}

fn build_session(gateway_url: Option<&str>, dry_run: bool) -> Result<MaskingSession> {
    if dry_run {
        if gateway_url.is_some() {
            bail!("--gateway-url has no effect with --dry-run; pass one or the other");
        }
        let mock = MockMaskingProvider::new()
            .then_status(JobSnapshot::with_status("mock-job", job_status::PROCESSING))
            .then_status(
                JobSnapshot::with_status("mock-job", job_status::COMPLETED)
                    .with_segments_payload("[[1.0,5.0],[10.0,12.5]]"),
            );
        return Ok(MaskingSession::with_provider(Arc::new(mock)));
    }

    let client = match gateway_url {
        Some(url) => GatewayClient::new()?.with_base_url(url),
        None => GatewayClient::from_env()?,
    };
    Ok(MaskingSession::with_provider(Arc::new(client)))
}

/// Samples the workflow, printing each status change, until terminal
async fn poll_to_terminal(workflow: &MaskingWorkflow) -> WorkflowState {
    let mut last = String::new();
    loop {
        let state = workflow.state().await;
        let message = state.status_message();
        if message != last {
            println!("{}", message);
            last = message;
        }
        if state.is_terminal() {
            return state;
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
}

fn print_segments(segments: &[Segment]) {
    if segments.is_empty() {
        println!("No segments detected.");
        return;
    }
    println!("Detected {} segment(s):", segments.len());
    for (i, segment) in segments.iter().enumerate() {
        println!("  {}: {:.2}s - {:.2}s", i + 1, segment.start, segment.end);
    }
}

async fn upload(session: &MaskingSession, path: &PathBuf) -> Result<String> {
    let result = session
        .uploader
        .upload_path(path, |stage| println!("{}", stage))
        .await
        .with_context(|| format!("Failed to upload {}", path.display()))?;

    println!("File id: {}", result.file_id);
    Ok(result.file_id)
}

async fn process(session: &MaskingSession, file_id: &str, configuration: &str) -> Result<()> {
    let job_id = session
        .workflow
        .submit(file_id, configuration)
        .await
        .context("Failed to start processing")?;
    println!("Job id: {}", job_id);

    match poll_to_terminal(&session.workflow).await {
        WorkflowState::Completed { segments, .. } => {
            print_segments(&segments);
            Ok(())
        }
        WorkflowState::Failed { error, .. } => bail!("Processing failed: {}", error),
        WorkflowState::TimedOut { job_id } => {
            bail!("Job {} did not finish before the deadline", job_id)
        }
        other => bail!("Unexpected workflow state: {:?}", other),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let session = build_session(cli.gateway_url.as_deref(), cli.dry_run)?;

    match cli.command {
        Command::Examples => {
            for item in example_videos() {
                println!("{}", item.name);
            }
        }
        Command::Upload { path } => {
            upload(&session, &path).await?;
        }
        Command::Process {
            file_id,
            configuration,
        } => {
            process(&session, &file_id, &configuration).await?;
        }
        Command::Status { job_id } => {
            let snapshot = session.provider.job_status(&job_id).await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Command::Run {
            path,
            configuration,
        } => {
            let file_id = upload(&session, &path).await?;
            process(&session, &file_id, &configuration).await?;
        }
    }

    Ok(())
}
