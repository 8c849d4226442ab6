//! Shared data types for the timeline engine
//!
//! Field names follow the editor backend's JSON so segment lists can be
//! deserialized straight from the data source.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend identifier of a transcript segment
pub type SegmentId = i64;

/// A time-bounded unit of transcript/dub content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    /// Logical position within the transcript (ripple order)
    #[serde(default)]
    pub order_index: i64,
    #[serde(alias = "start_time_ms")]
    pub start_ms: i64,
    #[serde(alias = "end_time_ms")]
    pub end_ms: i64,
    /// Speaker track this segment belongs to, `None` when unassigned
    #[serde(default)]
    pub speaker_label: Option<String>,
    #[serde(default)]
    pub source_text: String,
    #[serde(default)]
    pub target_text: String,
}

impl Segment {
    pub fn bounds(&self) -> SegmentBounds {
        SegmentBounds {
            start_ms: self.start_ms,
            end_ms: self.end_ms,
        }
    }

    pub fn duration_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }

    /// Half-open containment test: `start <= time < end`
    pub fn contains(&self, time_ms: f64) -> bool {
        self.bounds().contains(time_ms)
    }
}

/// Start/end pair of a segment in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentBounds {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl SegmentBounds {
    pub fn new(start_ms: i64, end_ms: i64) -> Self {
        Self { start_ms, end_ms }
    }

    pub fn duration_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }

    pub fn contains(&self, time_ms: f64) -> bool {
        time_ms >= self.start_ms as f64 && time_ms < self.end_ms as f64
    }

    /// Both edges moved by the same amount
    pub fn shifted(&self, delta_ms: i64) -> Self {
        Self {
            start_ms: self.start_ms + delta_ms,
            end_ms: self.end_ms + delta_ms,
        }
    }
}

/// Which edge of a segment a resize handle belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Start,
    End,
}

/// Payload sent to the mutation sink when a segment edit is committed
///
/// Unset fields are left out of the serialized body so the backend only
/// touches what the gesture changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentEdit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_manual_stretch: Option<bool>,
}

impl SegmentEdit {
    /// Edit produced by dragging one edge of a segment
    pub fn manual_stretch(edge: Edge, bounds: SegmentBounds) -> Self {
        match edge {
            Edge::Start => Self {
                start_ms: Some(bounds.start_ms),
                end_ms: None,
                is_manual_stretch: Some(true),
            },
            Edge::End => Self {
                start_ms: None,
                end_ms: Some(bounds.end_ms),
                is_manual_stretch: Some(true),
            },
        }
    }
}

/// Speaker metadata from the data source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeakerMeta {
    pub speaker_label: String,
    #[serde(default)]
    pub voice_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
}

/// A selected time range on the waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRegion {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl TimeRegion {
    /// Build a region from two arbitrary points, ordering them
    pub fn between(a_ms: i64, b_ms: i64) -> Self {
        Self {
            start_ms: a_ms.min(b_ms),
            end_ms: a_ms.max(b_ms),
        }
    }

    pub fn duration_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }
}

/// Audio operations the backend can apply to a region of the dubbed track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionOp {
    Trim,
    Cut,
    Normalize,
    Silence,
}

impl RegionOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionOp::Trim => "trim",
            RegionOp::Cut => "cut",
            RegionOp::Normalize => "normalize",
            RegionOp::Silence => "silence",
        }
    }
}

impl fmt::Display for RegionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_accepts_backend_field_names() {
        let json = r#"{
            "id": 7,
            "order_index": 2,
            "start_time_ms": 1000,
            "end_time_ms": 2500,
            "speaker_label": "SPEAKER_01",
            "target_text": "Hola"
        }"#;
        let seg: Segment = serde_json::from_str(json).unwrap();
        assert_eq!(seg.bounds(), SegmentBounds::new(1000, 2500));
        assert_eq!(seg.speaker_label.as_deref(), Some("SPEAKER_01"));
        assert_eq!(seg.source_text, "");
    }

    #[test]
    fn test_contains_is_half_open() {
        let b = SegmentBounds::new(1000, 2000);
        assert!(b.contains(1000.0));
        assert!(b.contains(1999.9));
        assert!(!b.contains(2000.0));
        assert!(!b.contains(999.0));
    }

    #[test]
    fn test_manual_stretch_payload_omits_untouched_edge() {
        let edit = SegmentEdit::manual_stretch(Edge::End, SegmentBounds::new(1000, 2600));
        let json = serde_json::to_value(&edit).unwrap();
        assert_eq!(json, serde_json::json!({ "end_ms": 2600, "is_manual_stretch": true }));
    }

    #[test]
    fn test_region_between_orders_points() {
        let r = TimeRegion::between(8000, 5000);
        assert_eq!(r, TimeRegion { start_ms: 5000, end_ms: 8000 });
        assert_eq!(r.duration_ms(), 3000);
    }
}
