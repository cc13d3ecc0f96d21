//! File Representation & Validation
//!
//! Shared descriptor for selectable files (local examples and user uploads)
//! plus the synchronous pre-upload validation rules. Validation runs before
//! any network call so bad picks are rejected locally.

use serde::{Deserialize, Serialize};
use specta::Type;

use crate::core::{CoreError, CoreResult};

// =============================================================================
// Constants
// =============================================================================

/// Extensions accepted for video upload
pub const ALLOWED_VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "mov", "avi", "mkv", "webm"];

/// Maximum accepted upload size (500 MB)
pub const MAX_UPLOAD_BYTES: u64 = 500 * 1024 * 1024;

// =============================================================================
// File Kind & Origin
// =============================================================================

/// Coarse file classification used by the view layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Image,
    Pdf,
    Text,
    Video,
    Other,
}

impl FileKind {
    /// Infers the kind from a file name's extension
    pub fn from_name(name: &str) -> Self {
        match extension_of(name).as_deref() {
            Some("jpg") | Some("jpeg") | Some("png") | Some("gif") | Some("webp") => {
                FileKind::Image
            }
            Some("pdf") => FileKind::Pdf,
            Some("txt") | Some("md") => FileKind::Text,
            Some(ext) if ALLOWED_VIDEO_EXTENSIONS.contains(&ext) => FileKind::Video,
            _ => FileKind::Other,
        }
    }
}

/// Where a file came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
pub enum FileOrigin {
    /// Bundled example, addressed by a remote (or app-served) URL
    Local,
    /// User-provided file, addressed by a transient local blob URL
    Uploaded,
}

// =============================================================================
// FileItem
// =============================================================================

/// Descriptor of a selectable file.
///
/// Exactly one of `remote_url` / `local_blob_url` is meaningful depending on
/// `origin`; the constructors enforce that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase")]
pub struct FileItem {
    pub name: String,
    pub kind: FileKind,
    pub origin: FileOrigin,
    pub remote_url: Option<String>,
    pub local_blob_url: Option<String>,
}

impl FileItem {
    /// Creates a descriptor for a bundled example file
    pub fn example(name: impl Into<String>, remote_url: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind: FileKind::from_name(&name),
            name,
            origin: FileOrigin::Local,
            remote_url: Some(remote_url.into()),
            local_blob_url: None,
        }
    }

    /// Creates a descriptor for a user-provided file backed by a blob URL
    pub fn uploaded(name: impl Into<String>, local_blob_url: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind: FileKind::from_name(&name),
            name,
            origin: FileOrigin::Uploaded,
            remote_url: None,
            local_blob_url: Some(local_blob_url.into()),
        }
    }

    /// Creates a descriptor for a user-provided file picked by path.
    ///
    /// The path itself serves as the local media URL (native shells load it
    /// through the asset protocol).
    pub fn uploaded_from_path(path: &std::path::Path) -> CoreResult<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                CoreError::ValidationError(format!("Invalid file path: {}", path.display()))
            })?;
        Ok(Self::uploaded(name, path.to_string_lossy()))
    }

    /// The URL the player should load, per the origin invariant
    pub fn media_url(&self) -> Option<&str> {
        match self.origin {
            FileOrigin::Local => self.remote_url.as_deref(),
            FileOrigin::Uploaded => self.local_blob_url.as_deref(),
        }
    }

    pub fn is_video(&self) -> bool {
        self.kind == FileKind::Video
    }
}

/// Bundled example videos shown by the picker
pub fn example_videos() -> Vec<FileItem> {
    vec![
        FileItem::example("dog.mp4", "/dog.mp4"),
        FileItem::example("cups.mp4", "/cups.mp4"),
        FileItem::example("default_juggle.mp4", "/default_juggle.mp4"),
    ]
}

// =============================================================================
// Validation
// =============================================================================

fn extension_of(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Validates a candidate video upload. Runs locally, before any network call.
pub fn validate_video_file(name: &str, size_bytes: u64) -> CoreResult<()> {
    let ext = extension_of(name);
    let is_allowed = ext
        .as_deref()
        .map(|e| ALLOWED_VIDEO_EXTENSIONS.contains(&e))
        .unwrap_or(false);

    if !is_allowed {
        return Err(CoreError::ValidationError(format!(
            "'{}' is not a supported video file. Supported formats: {}",
            name,
            ALLOWED_VIDEO_EXTENSIONS.join(", ").to_uppercase()
        )));
    }

    if size_bytes >= MAX_UPLOAD_BYTES {
        return Err(CoreError::ValidationError(format!(
            "Video file '{}' exceeds the 500MB limit.",
            name
        )));
    }

    Ok(())
}

/// MIME type sent as the `Content-Type` of the signed-URL PUT
pub fn content_type_for(name: &str) -> &'static str {
    match extension_of(name).as_deref() {
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        Some("webm") => "video/webm",
        _ => "application/octet-stream",
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_name() {
        assert_eq!(FileKind::from_name("clip.mp4"), FileKind::Video);
        assert_eq!(FileKind::from_name("CLIP.MOV"), FileKind::Video);
        assert_eq!(FileKind::from_name("photo.jpeg"), FileKind::Image);
        assert_eq!(FileKind::from_name("paper.pdf"), FileKind::Pdf);
        assert_eq!(FileKind::from_name("notes.md"), FileKind::Text);
        assert_eq!(FileKind::from_name("archive.zip"), FileKind::Other);
        assert_eq!(FileKind::from_name("no_extension"), FileKind::Other);
    }

    #[test]
    fn test_file_item_url_invariant() {
        let example = FileItem::example("dog.mp4", "/dog.mp4");
        assert_eq!(example.origin, FileOrigin::Local);
        assert_eq!(example.media_url(), Some("/dog.mp4"));
        assert!(example.local_blob_url.is_none());

        let uploaded = FileItem::uploaded("clip.mp4", "blob:abc123");
        assert_eq!(uploaded.origin, FileOrigin::Uploaded);
        assert_eq!(uploaded.media_url(), Some("blob:abc123"));
        assert!(uploaded.remote_url.is_none());
    }

    #[test]
    fn test_file_item_from_path() {
        let item = FileItem::uploaded_from_path(std::path::Path::new("/videos/clip.mp4")).unwrap();
        assert_eq!(item.name, "clip.mp4");
        assert_eq!(item.origin, FileOrigin::Uploaded);
        assert_eq!(item.media_url(), Some("/videos/clip.mp4"));

        assert!(FileItem::uploaded_from_path(std::path::Path::new("/videos/..")).is_err());
    }

    #[test]
    fn test_example_videos_are_videos() {
        let examples = example_videos();
        assert_eq!(examples.len(), 3);
        assert!(examples.iter().all(|f| f.is_video()));
        assert!(examples.iter().all(|f| f.media_url().is_some()));
    }

    #[test]
    fn test_validate_accepts_allowed_extensions() {
        for ext in ALLOWED_VIDEO_EXTENSIONS {
            let name = format!("video.{}", ext);
            assert!(validate_video_file(&name, 1024).is_ok(), "{}", name);
        }
    }

    #[test]
    fn test_validate_rejects_unknown_extension() {
        let err = validate_video_file("document.pdf", 1024).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("not a supported video file"));

        assert!(validate_video_file("noextension", 1024).is_err());
        assert!(validate_video_file("trailingdot.", 1024).is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_file() {
        let err = validate_video_file("big.mp4", MAX_UPLOAD_BYTES).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("500MB"));

        assert!(validate_video_file("ok.mp4", MAX_UPLOAD_BYTES - 1).is_ok());
    }

    #[test]
    fn test_validate_size_checked_even_for_bad_extension() {
        // Extension check fires first; either way this must be a local error.
        let err = validate_video_file("big.iso", MAX_UPLOAD_BYTES * 2).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a.mp4"), "video/mp4");
        assert_eq!(content_type_for("a.MOV"), "video/quicktime");
        assert_eq!(content_type_for("a.webm"), "video/webm");
        assert_eq!(content_type_for("a.bin"), "application/octet-stream");
    }
}
