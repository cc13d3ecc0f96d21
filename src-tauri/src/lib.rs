//! MaskView Core Library
//!
//! Demo client for a cloud video-masking service: upload a video, submit it
//! for processing, poll the job to completion, then play back the detected
//! segments. This library holds all the business logic; the Tauri shell and
//! the CLI are thin views over it.
//!
//! ## TypeScript Bindings
//!
//! All IPC types carry `specta::Type` and are exported to TypeScript via
//! tauri-specta (`cargo run --bin export_bindings --features gui`).

pub mod core;

#[cfg(feature = "gui")]
pub mod ipc;

use std::sync::Arc;

#[cfg(feature = "gui")]
use tokio::sync::Mutex;

use crate::core::api::{GatewayClient, MaskingProvider};
use crate::core::masking::MaskingWorkflow;
use crate::core::upload::VideoUploader;

#[cfg(feature = "gui")]
use crate::core::files::FileItem;
#[cfg(feature = "gui")]
use crate::core::segments::SegmentSelection;
#[cfg(feature = "gui")]
use crate::core::FileId;

// =============================================================================
// Session
// =============================================================================

/// One user-facing session against the masking gateway: a shared provider,
/// the uploader, and the poll workflow built on top of it.
pub struct MaskingSession {
    pub provider: Arc<dyn MaskingProvider>,
    pub uploader: VideoUploader,
    pub workflow: MaskingWorkflow,
}

impl std::fmt::Debug for MaskingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaskingSession")
            .field("provider", &self.provider.name())
            .finish_non_exhaustive()
    }
}

impl MaskingSession {
    /// Builds a session against the configured gateway
    pub fn connect() -> crate::core::CoreResult<Self> {
        let provider: Arc<dyn MaskingProvider> = Arc::new(GatewayClient::from_env()?);
        Ok(Self::with_provider(provider))
    }

    /// Builds a session over an arbitrary provider (tests, dry runs)
    pub fn with_provider(provider: Arc<dyn MaskingProvider>) -> Self {
        Self {
            uploader: VideoUploader::new(Arc::clone(&provider)),
            workflow: MaskingWorkflow::new(Arc::clone(&provider)),
            provider,
        }
    }
}

// =============================================================================
// Application State
// =============================================================================

/// Application state shared across all Tauri commands
#[cfg(feature = "gui")]
pub struct AppState {
    /// Gateway session (provider, uploader, poll workflow)
    pub session: MaskingSession,
    /// The video the player currently shows, if any
    pub current_file: Mutex<Option<FileItem>>,
    /// Backend handle of the last uploaded video; `None` for example videos
    pub current_file_id: Mutex<Option<FileId>>,
    /// Segment playback selection
    pub selection: Mutex<SegmentSelection>,
}

#[cfg(feature = "gui")]
impl AppState {
    pub fn new() -> crate::core::CoreResult<Self> {
        Ok(Self {
            session: MaskingSession::connect()?,
            current_file: Mutex::new(None),
            current_file_id: Mutex::new(None),
            selection: Mutex::new(SegmentSelection::new()),
        })
    }
}

// =============================================================================
// Tauri Application Entry Point
// =============================================================================
#[cfg(feature = "gui")]
mod tauri_app {
    use super::*;
    use std::sync::OnceLock;
    use tauri::Manager;

    static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

    fn init_logging(app: &tauri::AppHandle) {
        // Log to a daily file in the platform app log dir; stdout remains
        // available in dev.
        let log_dir = app
            .path()
            .app_log_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from(".logs"));

        let _ = std::fs::create_dir_all(&log_dir);

        let file_appender = tracing_appender::rolling::daily(&log_dir, "maskview.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let _ = LOG_GUARD.set(guard);

        use tracing_subscriber::prelude::*;

        let env_filter = tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::INFO.into());

        let stdout_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(cfg!(debug_assertions));

        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false);

        let subscriber = tracing_subscriber::registry()
            .with(env_filter)
            .with(stdout_layer)
            .with(file_layer);

        // Avoid panics if already initialized (tests, plugin reloads).
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    /// Collects all commands for tauri-specta type export.
    /// This is used by the bindings generator.
    #[macro_export]
    macro_rules! collect_commands {
        () => {
            tauri_specta::collect_commands![
                // Library commands
                $crate::ipc::list_example_videos,
                $crate::ipc::select_example_video,
                $crate::ipc::get_current_file,
                // Upload commands
                $crate::ipc::upload_video,
                $crate::ipc::upload_video_from_path,
                // Workflow commands
                $crate::ipc::start_masking,
                $crate::ipc::get_workflow_state,
                $crate::ipc::reset_workflow,
                // Player commands
                $crate::ipc::player_intent,
                $crate::ipc::get_selection,
            ]
        };
    }

    /// Initialize and run the Tauri application
    pub fn run() {
        let state = AppState::new().expect("failed to initialize gateway session");

        tauri::Builder::default()
            .manage(state)
            .setup(|app| {
                init_logging(app.handle());
                tracing::info!("MaskView starting...");
                Ok(())
            })
            .invoke_handler(tauri::generate_handler![
                // Library commands
                ipc::list_example_videos,
                ipc::select_example_video,
                ipc::get_current_file,
                // Upload commands
                ipc::upload_video,
                ipc::upload_video_from_path,
                // Workflow commands
                ipc::start_masking,
                ipc::get_workflow_state,
                ipc::reset_workflow,
                // Player commands
                ipc::player_intent,
                ipc::get_selection,
            ])
            .run(tauri::generate_context!())
            .expect("error while running tauri application");
    }
}

#[cfg(feature = "gui")]
pub use tauri_app::run;

// =============================================================================
// Tests
// =============================================================================
