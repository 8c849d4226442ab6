//! Engine tunables

use serde::{Deserialize, Serialize};

/// Timeline engine configuration
///
/// Every field has a default, so a config file only needs the values it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Browsing zoom in pixels per second
    /// Default: 50.0
    pub default_zoom_px_per_sec: f64,

    /// Zoom used while scrubbing on the ruler
    /// Default: 150.0
    pub scrub_zoom_px_per_sec: f64,

    /// Shortest duration a resize may produce
    /// Default: 100 ms
    pub min_segment_ms: i64,

    /// Distance from a viewport edge at which scrubbing auto-scrolls
    /// Default: 50 px
    pub scrub_edge_threshold_px: f64,

    /// Auto-scroll speed while scrubbing near an edge
    /// Default: 15 px per frame
    pub scrub_scroll_px_per_frame: f64,

    /// Margin added to a preview's duration before its suspension expires
    /// Default: 50 ms
    pub preview_guard_ms: f64,

    /// How long a segment commit may stay unanswered before it is reverted
    /// Default: 10000 ms
    pub commit_timeout_ms: u64,

    /// Playhead distance from the right edge that triggers follow-scroll
    /// Default: 100 px
    pub follow_buffer_px: f64,

    /// Regions shorter than this on release are treated as clicks
    /// Default: 10 ms
    pub min_region_ms: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_zoom_px_per_sec: 50.0,
            scrub_zoom_px_per_sec: 150.0,
            min_segment_ms: 100,
            scrub_edge_threshold_px: 50.0,
            scrub_scroll_px_per_frame: 15.0,
            preview_guard_ms: 50.0,
            commit_timeout_ms: 10_000,
            follow_buffer_px: 100.0,
            min_region_ms: 10,
        }
    }
}
