//! Maskview Core Type Definitions
//!
//! Defines fundamental types used throughout the project.

// =============================================================================
// ID Types
// =============================================================================

/// Uploaded-object identifier assigned by the gateway when a signed upload
/// URL is issued. Opaque; the backend uses it to locate the stored object.
pub type FileId = String;

/// Processing job identifier assigned by the gateway
pub type JobId = String;

// =============================================================================
// Time Types
// =============================================================================

/// Time in seconds (floating point)
pub type TimeSec = f64;
