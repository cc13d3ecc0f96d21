//! Maskview Core
//!
//! Headless client logic for the video-masking demo: file validation,
//! gateway API client, upload orchestration, the processing/poll workflow,
//! and segment handling. No GUI dependency.

pub mod api;
pub mod files;
pub mod masking;
pub mod segments;
pub mod upload;

// Re-export common types
mod types;
pub use types::*;

mod error;
pub use error::*;
