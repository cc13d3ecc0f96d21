//! Segment Decoding & Playback Selection
//!
//! Segments are `[start, end]` time ranges (seconds) the backend identified
//! in the processed video. The gateway serializes them as encoded text inside
//! the job record, so they must be decoded client-side before use.
//!
//! Playback selection is an explicit little state value fed by discrete
//! player intents instead of inferred from media-element events, so the
//! "one selected segment XOR full-video mode" invariant holds by
//! construction.

use serde::{Deserialize, Serialize};
use specta::Type;
use tracing::{debug, warn};

use crate::core::api::JobSnapshot;
use crate::core::{CoreError, CoreResult, TimeSec};

// =============================================================================
// Segment
// =============================================================================

/// A `[start, end]` time range within the processed video
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub start: TimeSec,
    pub end: TimeSec,
}

impl Segment {
    pub fn new(start: TimeSec, end: TimeSec) -> Self {
        Self { start, end }
    }

    /// Whether a playhead position lies inside this segment
    pub fn contains(&self, time: TimeSec) -> bool {
        time >= self.start && time <= self.end
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Legacy object form of a segment entry
#[derive(Debug, Deserialize)]
struct SegmentObject {
    start: TimeSec,
    end: TimeSec,
}

/// Decodes the backend's encoded segment payload.
///
/// Accepts the pair encoding (`[[1.0,5.0],[10.0,12.5]]`) and the legacy
/// object form (`[{"start":1.0,"end":5.0}]`). Malformed payloads are a
/// distinguished [`CoreError::SegmentDecode`].
pub fn decode_segments(raw: &str) -> CoreResult<Vec<Segment>> {
    if let Ok(pairs) = serde_json::from_str::<Vec<[TimeSec; 2]>>(raw) {
        return Ok(pairs
            .into_iter()
            .map(|[start, end]| Segment::new(start, end))
            .collect());
    }

    if let Ok(objects) = serde_json::from_str::<Vec<SegmentObject>>(raw) {
        return Ok(objects
            .into_iter()
            .map(|s| Segment::new(s.start, s.end))
            .collect());
    }

    let truncated: String = raw.chars().take(200).collect();
    Err(CoreError::SegmentDecode(format!(
        "Malformed segment payload: {}",
        truncated
    )))
}

/// Decodes a segment payload, degrading to an empty list on failure.
///
/// This is the policy the poll workflow uses for completed jobs: a backend
/// that produced a bad payload still counts as completed, with no segments.
pub fn decode_segments_lenient(raw: &str) -> Vec<Segment> {
    match decode_segments(raw) {
        Ok(segments) => segments,
        Err(e) => {
            warn!("Dropping undecodable segment payload: {}", e);
            Vec::new()
        }
    }
}

/// Extracts the segment list from a completed job snapshot.
///
/// Prefers the encoded `data.segments` text; falls back to the legacy
/// direct array; otherwise empty.
pub fn segments_from_snapshot(snapshot: &JobSnapshot) -> Vec<Segment> {
    if let Some(raw) = snapshot.data.as_ref().and_then(|d| d.segments.as_deref()) {
        return decode_segments_lenient(raw);
    }

    if let Some(legacy) = &snapshot.segments {
        debug!("Using legacy segment array from job {}", snapshot.job_id);
        return legacy
            .iter()
            .map(|s| Segment::new(s.start, s.end))
            .collect();
    }

    Vec::new()
}

// =============================================================================
// Playback Selection
// =============================================================================

/// Discrete player intent emitted by the view layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Type)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum PlayerIntent {
    /// A segment was picked from the list
    SegmentSelected(usize),
    /// The user scrubbed the playhead to an absolute position
    ManualSeek(TimeSec),
    /// "Play full video" was requested
    PlayFullVideo,
    /// Drop any playback constraint
    ClearSelection,
}

/// What the player is currently constrained to.
///
/// `selected` and `playing_full_video` are mutually exclusive; `apply`
/// preserves that.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase")]
pub struct SegmentSelection {
    pub selected: Option<usize>,
    pub playing_full_video: bool,
}

impl SegmentSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one intent into the selection, against the current segment list
    pub fn apply(&mut self, intent: PlayerIntent, segments: &[Segment]) {
        match intent {
            PlayerIntent::SegmentSelected(index) => {
                if index < segments.len() {
                    self.selected = Some(index);
                    self.playing_full_video = false;
                } else {
                    warn!(
                        "Ignoring selection of segment {} (only {} available)",
                        index,
                        segments.len()
                    );
                }
            }
            PlayerIntent::ManualSeek(time) => {
                // Scrubbing outside the active segment ends segment playback.
                let outside = self
                    .selected
                    .and_then(|i| segments.get(i))
                    .map(|s| !s.contains(time))
                    .unwrap_or(false);
                if outside {
                    self.selected = None;
                }
            }
            PlayerIntent::PlayFullVideo => {
                self.selected = None;
                self.playing_full_video = true;
            }
            PlayerIntent::ClearSelection => {
                self.selected = None;
                self.playing_full_video = false;
            }
        }
    }

    /// The segment the player is currently constrained to, if any
    pub fn active_segment<'a>(&self, segments: &'a [Segment]) -> Option<&'a Segment> {
        self.selected.and_then(|i| segments.get(i))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::api::{job_status, LegacySegment};

    #[test]
    fn test_decode_pair_encoding() {
        let segments = decode_segments("[[1.0,5.0],[10.0,12.5]]").unwrap();
        assert_eq!(
            segments,
            vec![Segment::new(1.0, 5.0), Segment::new(10.0, 12.5)]
        );
    }

    #[test]
    fn test_decode_integer_pairs() {
        let segments = decode_segments("[[1,5],[10,12]]").unwrap();
        assert_eq!(segments[0], Segment::new(1.0, 5.0));
    }

    #[test]
    fn test_decode_legacy_object_form() {
        let segments = decode_segments(r#"[{"start":2.0,"end":4.5}]"#).unwrap();
        assert_eq!(segments, vec![Segment::new(2.0, 4.5)]);
    }

    #[test]
    fn test_decode_empty_list() {
        assert!(decode_segments("[]").unwrap().is_empty());
    }

    #[test]
    fn test_decode_malformed_is_distinguished_error() {
        let err = decode_segments("not json at all").unwrap_err();
        assert!(matches!(err, CoreError::SegmentDecode(_)));

        let err = decode_segments(r#"{"segments": []}"#).unwrap_err();
        assert!(matches!(err, CoreError::SegmentDecode(_)));

        // Triples are not valid pairs.
        assert!(decode_segments("[[1.0,2.0,3.0]]").is_err());
    }

    #[test]
    fn test_decode_lenient_degrades_to_empty() {
        assert!(decode_segments_lenient("garbage").is_empty());
        assert_eq!(
            decode_segments_lenient("[[0.0,1.0]]"),
            vec![Segment::new(0.0, 1.0)]
        );
    }

    #[test]
    fn test_segments_from_snapshot_prefers_encoded_payload() {
        let snapshot = JobSnapshot::with_status("j-1", job_status::COMPLETED)
            .with_segments_payload("[[1.0,5.0],[10.0,12.5]]");
        let segments = segments_from_snapshot(&snapshot);
        assert_eq!(segments.len(), 2);
    }

    #[test]
    fn test_segments_from_snapshot_legacy_fallback() {
        let mut snapshot = JobSnapshot::with_status("j-1", job_status::COMPLETED);
        snapshot.segments = Some(vec![LegacySegment { start: 3.0, end: 6.0 }]);
        assert_eq!(
            segments_from_snapshot(&snapshot),
            vec![Segment::new(3.0, 6.0)]
        );
    }

    #[test]
    fn test_segments_from_snapshot_no_data() {
        let snapshot = JobSnapshot::with_status("j-1", job_status::COMPLETED);
        assert!(segments_from_snapshot(&snapshot).is_empty());
    }

    // =========================================================================
    // Selection Tests
    // =========================================================================

    fn demo_segments() -> Vec<Segment> {
        vec![Segment::new(1.0, 5.0), Segment::new(10.0, 12.5)]
    }

    #[test]
    fn test_select_segment() {
        let segments = demo_segments();
        let mut selection = SegmentSelection::new();

        selection.apply(PlayerIntent::SegmentSelected(1), &segments);
        assert_eq!(selection.selected, Some(1));
        assert!(!selection.playing_full_video);
        assert_eq!(
            selection.active_segment(&segments),
            Some(&Segment::new(10.0, 12.5))
        );
    }

    #[test]
    fn test_out_of_range_selection_ignored() {
        let segments = demo_segments();
        let mut selection = SegmentSelection::new();

        selection.apply(PlayerIntent::SegmentSelected(5), &segments);
        assert_eq!(selection.selected, None);
    }

    #[test]
    fn test_full_video_and_selection_are_exclusive() {
        let segments = demo_segments();
        let mut selection = SegmentSelection::new();

        selection.apply(PlayerIntent::SegmentSelected(0), &segments);
        selection.apply(PlayerIntent::PlayFullVideo, &segments);
        assert_eq!(selection.selected, None);
        assert!(selection.playing_full_video);

        selection.apply(PlayerIntent::SegmentSelected(0), &segments);
        assert_eq!(selection.selected, Some(0));
        assert!(!selection.playing_full_video);
    }

    #[test]
    fn test_manual_seek_outside_active_segment_clears_selection() {
        let segments = demo_segments();
        let mut selection = SegmentSelection::new();

        selection.apply(PlayerIntent::SegmentSelected(0), &segments);
        // Inside the segment: the constraint stays.
        selection.apply(PlayerIntent::ManualSeek(3.0), &segments);
        assert_eq!(selection.selected, Some(0));

        // Outside: the user took over.
        selection.apply(PlayerIntent::ManualSeek(8.0), &segments);
        assert_eq!(selection.selected, None);
        assert!(!selection.playing_full_video);
    }

    #[test]
    fn test_manual_seek_without_selection_is_noop() {
        let segments = demo_segments();
        let mut selection = SegmentSelection::new();
        selection.apply(PlayerIntent::ManualSeek(8.0), &segments);
        assert_eq!(selection, SegmentSelection::new());
    }

    #[test]
    fn test_clear_selection() {
        let segments = demo_segments();
        let mut selection = SegmentSelection::new();
        selection.apply(PlayerIntent::PlayFullVideo, &segments);
        selection.apply(PlayerIntent::ClearSelection, &segments);
        assert_eq!(selection, SegmentSelection::new());
    }

    #[test]
    fn test_intent_serialization() {
        let json = serde_json::to_string(&PlayerIntent::SegmentSelected(1)).unwrap();
        assert!(json.contains("\"type\":\"segmentSelected\""));

        let intent: PlayerIntent =
            serde_json::from_str(r#"{"type":"manualSeek","value":3.5}"#).unwrap();
        assert_eq!(intent, PlayerIntent::ManualSeek(3.5));
    }
}
