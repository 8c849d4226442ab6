//! Ruler scrubbing
//!
//! Pressing on the ruler switches to the scrub zoom and seeks to the time
//! under the pointer. Every animation frame afterwards re-seeks to the time
//! under the last known pointer position, scrolling the viewport when the
//! pointer rests near either edge, so holding still at an edge keeps moving.

use crate::coords::{pixel_to_ms, total_width, Viewport, ZoomState};

#[derive(Debug, Clone)]
pub struct ScrubController {
    /// Viewport-relative pointer x while scrubbing
    pointer_x: Option<f64>,
    edge_threshold_px: f64,
    scroll_px_per_frame: f64,
}

impl ScrubController {
    pub fn new(edge_threshold_px: f64, scroll_px_per_frame: f64) -> Self {
        Self {
            pointer_x: None,
            edge_threshold_px,
            scroll_px_per_frame,
        }
    }

    pub fn is_active(&self) -> bool {
        self.pointer_x.is_some()
    }

    /// Enter scrub zoom; returns the time to seek to
    pub fn begin(&mut self, pointer_x: f64, zoom: &mut ZoomState, viewport: &Viewport, duration_ms: f64) -> f64 {
        zoom.enter_scrub();
        self.pointer_x = Some(pointer_x);
        log::debug!("scrub: begin at x={:.1}", pointer_x);
        pixel_to_ms(pointer_x, viewport.scroll_offset_px, zoom.px_per_sec(), duration_ms)
    }

    pub fn pointer_moved(&mut self, pointer_x: f64) {
        if self.pointer_x.is_some() {
            self.pointer_x = Some(pointer_x);
        }
    }

    /// Per-frame step: edge auto-scroll, then the time under the pointer
    pub fn on_frame(&mut self, zoom: &ZoomState, viewport: &mut Viewport, duration_ms: f64) -> Option<f64> {
        let x = self.pointer_x?;
        let width = total_width(duration_ms / 1000.0, zoom.px_per_sec());

        // both edge zones must fit in the viewport
        if viewport.width_px > 2.0 * self.edge_threshold_px {
            if x > viewport.width_px - self.edge_threshold_px {
                viewport.scroll_by(self.scroll_px_per_frame, width);
            } else if x < self.edge_threshold_px {
                viewport.scroll_by(-self.scroll_px_per_frame, width);
            }
        }

        Some(pixel_to_ms(x, viewport.scroll_offset_px, zoom.px_per_sec(), duration_ms))
    }

    /// Leave scrub mode and restore the default zoom
    ///
    /// Returns whether a scrub was active.
    pub fn end(&mut self, zoom: &mut ZoomState) -> bool {
        zoom.restore_default();
        let was_active = self.pointer_x.take().is_some();
        if was_active {
            log::debug!("scrub: end");
        }
        was_active
    }
}
