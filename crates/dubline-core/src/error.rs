//! Engine error types

use thiserror::Error;

use crate::types::{RegionOp, SegmentId};

/// Errors that can occur while driving the timeline engine
///
/// Most variants describe ordinary races between fast pointer input and
/// asynchronous confirmation and are swallowed by the engine. Only the
/// failures reported by the mutation sink reach the user, see
/// [`EngineError::is_user_facing`].
#[derive(Error, Debug)]
pub enum EngineError {
    /// A gesture was started while another one is live or unresolved
    #[error("Invalid state: {0}")]
    InvalidState(&'static str),

    /// A resize would leave the segment shorter than the floor
    #[error("Segment {segment_id} would be {duration_ms}ms long (minimum {min_ms}ms)")]
    BoundaryViolation {
        segment_id: SegmentId,
        duration_ms: i64,
        min_ms: i64,
    },

    /// The mutation sink rejected a segment edit or never answered
    #[error("Failed to update segment timing: {reason}")]
    CommitFailure { segment_id: SegmentId, reason: String },

    /// The mutation sink rejected an audio region operation
    #[error("Audio {op} failed: {reason}")]
    RegionOpFailure { op: RegionOp, reason: String },

    /// A clock operation was attempted before the audio finished loading
    #[error("Media not ready")]
    MediaNotReady,

    /// Segment id not present in the store
    #[error("Segment {0} not found")]
    UnknownSegment(SegmentId),

    /// Track label not present in the derived track set
    #[error("Track '{0}' not found")]
    UnknownTrack(String),

    /// A region operation was confirmed without a selection
    #[error("No region selected")]
    NoSelection,

    /// Zoom presets must be positive and finite
    #[error("Invalid zoom: {0} px/s")]
    InvalidZoom(f64),

    /// The segment/speaker data source failed
    #[error("Failed to load timeline data: {0}")]
    Load(String),
}

impl EngineError {
    /// Whether this error must be shown on the host's alert surface
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            EngineError::CommitFailure { .. } | EngineError::RegionOpFailure { .. }
        )
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_sink_failures_are_user_facing() {
        assert!(EngineError::CommitFailure {
            segment_id: 1,
            reason: "500".into()
        }
        .is_user_facing());
        assert!(EngineError::RegionOpFailure {
            op: RegionOp::Trim,
            reason: "busy".into()
        }
        .is_user_facing());
        assert!(!EngineError::MediaNotReady.is_user_facing());
        assert!(!EngineError::InvalidState("drag in progress").is_user_facing());
        assert!(!EngineError::BoundaryViolation {
            segment_id: 1,
            duration_ms: 10,
            min_ms: 100
        }
        .is_user_facing());
    }

    #[test]
    fn test_messages() {
        let err = EngineError::RegionOpFailure {
            op: RegionOp::Normalize,
            reason: "timeout".into(),
        };
        assert_eq!(err.to_string(), "Audio normalize failed: timeout");
    }
}
