//! Coordinate engine - time <-> pixel mapping, zoom presets, ruler ticks
//!
//! Every piece of horizontal layout (segment rectangles, the playhead, the
//! selection, hit testing) is derived from [`time_to_pixel`] and
//! [`pixel_to_time`]. Nothing else in the crate does its own pixel math.

use crate::error::{EngineError, EngineResult};

// =============================================================================
// Constants
// =============================================================================

/// Above this zoom the ruler switches to fine ticks
pub const FINE_TICK_ZOOM_THRESHOLD: f64 = 100.0;

/// Ticks per second when zoomed in past the threshold (0.2s step)
pub const FINE_TICKS_PER_SECOND: u64 = 5;

/// Ticks per second at browsing zoom (1s step)
pub const COARSE_TICKS_PER_SECOND: u64 = 1;

// =============================================================================
// Pure conversions
// =============================================================================

/// Content-space x for a time in seconds
pub fn time_to_pixel(time_secs: f64, px_per_sec: f64) -> f64 {
    time_secs * px_per_sec
}

/// Time in seconds under a viewport-relative x, clamped to `[0, duration]`
pub fn pixel_to_time(px: f64, scroll_offset_px: f64, px_per_sec: f64, duration_secs: f64) -> f64 {
    let time = (px + scroll_offset_px) / px_per_sec;
    time.clamp(0.0, duration_secs.max(0.0))
}

/// Millisecond variant of [`time_to_pixel`]
pub fn ms_to_pixel(time_ms: f64, px_per_sec: f64) -> f64 {
    time_to_pixel(time_ms / 1000.0, px_per_sec)
}

/// Millisecond variant of [`pixel_to_time`]
pub fn pixel_to_ms(px: f64, scroll_offset_px: f64, px_per_sec: f64, duration_ms: f64) -> f64 {
    pixel_to_time(px, scroll_offset_px, px_per_sec, duration_ms / 1000.0) * 1000.0
}

/// Width of the whole track area in pixels
pub fn total_width(duration_secs: f64, px_per_sec: f64) -> f64 {
    (duration_secs * px_per_sec).max(0.0)
}

/// Ruler tick spacing in seconds for a zoom level
pub fn tick_step(px_per_sec: f64) -> f64 {
    1.0 / ticks_per_second(px_per_sec) as f64
}

fn ticks_per_second(px_per_sec: f64) -> u64 {
    if px_per_sec > FINE_TICK_ZOOM_THRESHOLD {
        FINE_TICKS_PER_SECOND
    } else {
        COARSE_TICKS_PER_SECOND
    }
}

// =============================================================================
// Ruler ticks
// =============================================================================

/// One ruler tick mark
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub time_secs: f64,
    /// Content-space x
    pub x: f64,
    /// Integer second
    pub is_major: bool,
    /// `M:SS`, only on major ticks
    pub label: Option<String>,
}

/// Generate ruler ticks from 0 to `duration_secs` inclusive
///
/// Ticks are produced from an integer index so that accumulated float error
/// can never turn a whole second into a minor tick.
pub fn generate_ticks(duration_secs: f64, px_per_sec: f64) -> Vec<Tick> {
    if !(duration_secs > 0.0) || !(px_per_sec > 0.0) {
        return Vec::new();
    }

    let per_second = ticks_per_second(px_per_sec);
    let count = (duration_secs * per_second as f64 + 1e-9).floor() as u64;

    (0..=count)
        .map(|i| {
            let time_secs = i as f64 / per_second as f64;
            let is_major = i % per_second == 0;
            Tick {
                time_secs,
                x: time_to_pixel(time_secs, px_per_sec),
                is_major,
                label: is_major.then(|| format_ruler_time(time_secs)),
            }
        })
        .collect()
}

/// Format seconds as `M:SS` for ruler labels
///
/// ```
/// use dubline_core::coords::format_ruler_time;
/// assert_eq!(format_ruler_time(1.0), "0:01");
/// assert_eq!(format_ruler_time(65.4), "1:05");
/// ```
pub fn format_ruler_time(secs: f64) -> String {
    let total = secs.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

// =============================================================================
// Zoom state
// =============================================================================

/// Named zoom presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomPreset {
    /// Steady-state browsing
    Default,
    /// Temporary high resolution while scrubbing on the ruler
    Scrub,
}

/// Active zoom preset and the pixel density of each preset
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomState {
    default_px_per_sec: f64,
    scrub_px_per_sec: f64,
    active: ZoomPreset,
}

impl ZoomState {
    pub fn new(default_px_per_sec: f64, scrub_px_per_sec: f64) -> EngineResult<Self> {
        for zoom in [default_px_per_sec, scrub_px_per_sec] {
            if !(zoom.is_finite() && zoom > 0.0) {
                return Err(EngineError::InvalidZoom(zoom));
            }
        }
        Ok(Self {
            default_px_per_sec,
            scrub_px_per_sec,
            active: ZoomPreset::Default,
        })
    }

    /// Pixels per second of the active preset
    pub fn px_per_sec(&self) -> f64 {
        match self.active {
            ZoomPreset::Default => self.default_px_per_sec,
            ZoomPreset::Scrub => self.scrub_px_per_sec,
        }
    }

    pub fn preset(&self) -> ZoomPreset {
        self.active
    }

    pub fn enter_scrub(&mut self) {
        self.active = ZoomPreset::Scrub;
    }

    pub fn restore_default(&mut self) {
        self.active = ZoomPreset::Default;
    }
}

// =============================================================================
// Viewport
// =============================================================================

/// Horizontal scroll state of the track container
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub scroll_offset_px: f64,
    pub width_px: f64,
}

impl Viewport {
    pub fn new(width_px: f64) -> Self {
        Self {
            scroll_offset_px: 0.0,
            width_px: width_px.max(0.0),
        }
    }

    /// Largest scroll offset that still fills the viewport
    pub fn max_scroll(&self, total_width: f64) -> f64 {
        (total_width - self.width_px).max(0.0)
    }

    /// Set the scroll offset, clamped to the content
    pub fn scroll_to(&mut self, offset_px: f64, total_width: f64) {
        self.scroll_offset_px = offset_px.clamp(0.0, self.max_scroll(total_width));
    }

    pub fn scroll_by(&mut self, delta_px: f64, total_width: f64) {
        self.scroll_to(self.scroll_offset_px + delta_px, total_width);
    }

    /// Viewport-relative x for a content-space x
    pub fn to_viewport_x(&self, content_x: f64) -> f64 {
        content_x - self.scroll_offset_px
    }
}
