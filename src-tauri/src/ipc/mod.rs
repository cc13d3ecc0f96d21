//! IPC (Inter-Process Communication) Module
//!
//! Handles communication between the Tauri backend and the web frontend.
//! All Tauri commands and events are defined here.

mod commands;
mod events;
mod payloads;

pub use commands::*;
pub use events::*;
pub use payloads::*;
