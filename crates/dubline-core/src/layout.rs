//! Render/layout driver
//!
//! [`TimelineLayout::compute`] turns engine state into declarative geometry
//! in content space. [`render`] walks it back to front and emits
//! [`DrawCommand`]s in viewport space to any [`Renderer`], culling whatever
//! lies outside the viewport. No retained UI tree is assumed.
//!
//! Vertical layout, top to bottom: the ruler, the mixed (waveform) lane, then
//! one lane per speaker track.

use crate::coords::{generate_ticks, ms_to_pixel, total_width, Tick, Viewport};
use crate::edit::{PreviewRole, ResizeController, SegmentStore};
use crate::tracks::TrackSet;
use crate::types::{Edge, SegmentId, TimeRegion};

// =============================================================================
// Constants
// =============================================================================

pub const RULER_HEIGHT: f64 = 24.0;

pub const LANE_HEIGHT: f64 = 64.0;

/// Grab tolerance around a segment edge
pub const RESIZE_HANDLE_PX: f64 = 6.0;

/// Fraction of the viewport left of the playhead after a follow-scroll jump
pub const FOLLOW_TARGET_FRACTION: f64 = 0.2;

// =============================================================================
// Layout types
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct LaneLayout {
    pub label: String,
    pub display_name: String,
    pub y: f64,
    pub height: f64,
    pub muted: bool,
    pub soloed: bool,
    pub volume: f32,
    pub is_mixed: bool,
}

impl LaneLayout {
    fn contains_y(&self, y: f64) -> bool {
        y >= self.y && y < self.y + self.height
    }
}

/// A segment's rectangle in content space
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRect {
    pub segment_id: SegmentId,
    pub lane_index: usize,
    pub x: f64,
    pub width: f64,
    pub y: f64,
    pub height: f64,
    /// Alternates 0/1 along a lane
    pub color_index: usize,
    pub role: PreviewRole,
    pub text: String,
}

/// Inputs to [`TimelineLayout::compute`]
pub struct LayoutInput<'a> {
    pub store: &'a SegmentStore,
    pub tracks: &'a TrackSet,
    pub resize: &'a ResizeController,
    pub px_per_sec: f64,
    pub viewport: Viewport,
    pub duration_ms: f64,
    pub playhead_ms: f64,
    pub selection: Option<TimeRegion>,
}

/// What lies under a pointer position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Ruler,
    ResizeHandle { segment_id: SegmentId, edge: Edge },
    Segment(SegmentId),
    /// The mixed lane, where regions are selected
    Waveform,
    Empty,
}

/// Declarative geometry of the whole timeline
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineLayout {
    pub total_width: f64,
    pub height: f64,
    pub px_per_sec: f64,
    pub ticks: Vec<Tick>,
    pub lanes: Vec<LaneLayout>,
    pub segments: Vec<SegmentRect>,
    pub playhead_x: f64,
    /// Content-space `(x, width)` of the selected region
    pub selection: Option<(f64, f64)>,
    pub viewport: Viewport,
}

impl TimelineLayout {
    pub fn compute(input: &LayoutInput<'_>) -> Self {
        let zoom = input.px_per_sec;

        let lanes: Vec<LaneLayout> = input
            .tracks
            .tracks()
            .iter()
            .enumerate()
            .map(|(i, track)| LaneLayout {
                label: track.label.clone(),
                display_name: track.display_name.clone(),
                y: RULER_HEIGHT + i as f64 * LANE_HEIGHT,
                height: LANE_HEIGHT,
                muted: track.muted,
                soloed: track.soloed,
                volume: track.volume,
                is_mixed: track.is_mixed(),
            })
            .collect();

        let mut segments = Vec::new();
        for (lane_index, track) in input.tracks.tracks().iter().enumerate() {
            let lane = &lanes[lane_index];
            for (i, id) in track.segment_ids.iter().enumerate() {
                let Some(segment) = input.store.get(*id) else {
                    continue;
                };
                let (bounds, role) = input.resize.display_bounds(segment);
                segments.push(SegmentRect {
                    segment_id: segment.id,
                    lane_index,
                    x: ms_to_pixel(bounds.start_ms as f64, zoom),
                    width: ms_to_pixel(bounds.duration_ms() as f64, zoom),
                    y: lane.y + 4.0,
                    height: lane.height - 8.0,
                    color_index: i % 2,
                    role,
                    text: segment.target_text.clone(),
                });
            }
        }

        let selection = input.selection.map(|region| {
            (
                ms_to_pixel(region.start_ms as f64, zoom),
                ms_to_pixel(region.duration_ms() as f64, zoom),
            )
        });

        Self {
            total_width: total_width(input.duration_ms / 1000.0, zoom),
            height: RULER_HEIGHT + lanes.len() as f64 * LANE_HEIGHT,
            px_per_sec: zoom,
            ticks: generate_ticks(input.duration_ms / 1000.0, zoom),
            lanes,
            segments,
            playhead_x: ms_to_pixel(input.playhead_ms, zoom),
            selection,
            viewport: input.viewport,
        }
    }

    /// Hit test a viewport-relative position
    ///
    /// Within [`RESIZE_HANDLE_PX`] of a segment edge the nearest edge wins,
    /// the end edge on a tie.
    pub fn hit_test(&self, x: f64, y: f64) -> HitTarget {
        if y < 0.0 {
            return HitTarget::Empty;
        }
        if y < RULER_HEIGHT {
            return HitTarget::Ruler;
        }

        let Some((lane_index, lane)) = self.lanes.iter().enumerate().find(|(_, l)| l.contains_y(y)) else {
            return HitTarget::Empty;
        };
        if lane.is_mixed {
            return HitTarget::Waveform;
        }

        let content_x = x + self.viewport.scroll_offset_px;
        for rect in self.segments.iter().filter(|r| r.lane_index == lane_index) {
            let to_start = (content_x - rect.x).abs();
            let to_end = (content_x - (rect.x + rect.width)).abs();
            if to_start.min(to_end) <= RESIZE_HANDLE_PX {
                let edge = if to_end <= to_start { Edge::End } else { Edge::Start };
                return HitTarget::ResizeHandle {
                    segment_id: rect.segment_id,
                    edge,
                };
            }
            if content_x >= rect.x && content_x < rect.x + rect.width {
                return HitTarget::Segment(rect.segment_id);
            }
        }
        HitTarget::Empty
    }
}

// =============================================================================
// Drawing
// =============================================================================

/// One declarative draw instruction, in viewport coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        width: f64,
        height: f64,
    },
    Lane {
        index: usize,
        y: f64,
        height: f64,
        name: String,
        muted: bool,
        soloed: bool,
        is_mixed: bool,
    },
    Segment {
        segment_id: SegmentId,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color_index: usize,
        role: PreviewRole,
        text: String,
    },
    Tick {
        x: f64,
        is_major: bool,
        label: Option<String>,
    },
    Selection {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Playhead {
        x: f64,
        height: f64,
    },
}

/// Backend that paints draw commands
pub trait Renderer {
    fn draw(&mut self, command: DrawCommand);
}

fn visible(x: f64, width: f64, viewport: &Viewport) -> bool {
    x + width >= 0.0 && x <= viewport.width_px
}

/// Emit the layout back to front, skipping anything off screen
pub fn render<R: Renderer>(layout: &TimelineLayout, renderer: &mut R) {
    let viewport = &layout.viewport;

    renderer.draw(DrawCommand::Clear {
        width: viewport.width_px,
        height: layout.height,
    });

    for (index, lane) in layout.lanes.iter().enumerate() {
        renderer.draw(DrawCommand::Lane {
            index,
            y: lane.y,
            height: lane.height,
            name: lane.display_name.clone(),
            muted: lane.muted,
            soloed: lane.soloed,
            is_mixed: lane.is_mixed,
        });
    }

    for rect in &layout.segments {
        let x = viewport.to_viewport_x(rect.x);
        if !visible(x, rect.width, viewport) {
            continue;
        }
        renderer.draw(DrawCommand::Segment {
            segment_id: rect.segment_id,
            x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            color_index: rect.color_index,
            role: rect.role,
            text: rect.text.clone(),
        });
    }

    for tick in &layout.ticks {
        let x = viewport.to_viewport_x(tick.x);
        if !visible(x, 0.0, viewport) {
            continue;
        }
        renderer.draw(DrawCommand::Tick {
            x,
            is_major: tick.is_major,
            label: tick.label.clone(),
        });
    }

    if let Some((sel_x, sel_width)) = layout.selection {
        let x = viewport.to_viewport_x(sel_x);
        if visible(x, sel_width, viewport) {
            renderer.draw(DrawCommand::Selection {
                x,
                y: RULER_HEIGHT,
                width: sel_width,
                height: layout.height - RULER_HEIGHT,
            });
        }
    }

    let playhead_x = viewport.to_viewport_x(layout.playhead_x);
    if visible(playhead_x, 0.0, viewport) {
        renderer.draw(DrawCommand::Playhead {
            x: playhead_x,
            height: layout.height,
        });
    }
}

/// Playback follow-scroll
///
/// When the playhead passes `scroll + width - buffer_px`, jump so it sits at
/// [`FOLLOW_TARGET_FRACTION`] of the viewport. Returns whether it scrolled.
pub fn follow_playhead(playhead_x: f64, viewport: &mut Viewport, total_width: f64, buffer_px: f64) -> bool {
    if playhead_x <= viewport.scroll_offset_px + viewport.width_px - buffer_px {
        return false;
    }
    let before = viewport.scroll_offset_px;
    viewport.scroll_to(playhead_x - viewport.width_px * FOLLOW_TARGET_FRACTION, total_width);
    viewport.scroll_offset_px != before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::segment;
    use crate::types::Segment;

    #[derive(Default)]
    struct Recorder(Vec<DrawCommand>);

    impl Renderer for Recorder {
        fn draw(&mut self, command: DrawCommand) {
            self.0.push(command);
        }
    }

    fn fixture() -> (Vec<Segment>, TrackSet) {
        let segments = vec![
            segment(1, 0, 1000, 2000, Some("A")),
            segment(2, 1, 2500, 4000, Some("B")),
            segment(3, 2, 30_000, 31_000, Some("A")),
        ];
        let tracks = TrackSet::derive(&[], &segments);
        (segments, tracks)
    }

    fn layout_with(scroll: f64, selection: Option<TimeRegion>) -> TimelineLayout {
        let (segments, tracks) = fixture();
        let resize = ResizeController::new(100, 10_000);
        let mut viewport = Viewport::new(800.0);
        viewport.scroll_to(scroll, 6000.0);
        TimelineLayout::compute(&LayoutInput {
            store: &SegmentStore::new(segments),
            tracks: &tracks,
            resize: &resize,
            px_per_sec: 50.0,
            viewport,
            duration_ms: 120_000.0,
            playhead_ms: 3000.0,
            selection,
        })
    }

    #[test]
    fn test_compute_geometry() {
        let layout = layout_with(0.0, None);
        assert_eq!(layout.total_width, 6000.0);
        assert_eq!(layout.lanes.len(), 3);
        assert!(layout.lanes[0].is_mixed);
        assert_eq!(layout.height, RULER_HEIGHT + 3.0 * LANE_HEIGHT);
        assert_eq!(layout.playhead_x, 150.0);

        let first = &layout.segments[0];
        assert_eq!((first.x, first.width, first.lane_index), (50.0, 50.0, 1));
        let third = layout.segments.iter().find(|r| r.segment_id == 3).unwrap();
        assert_eq!(third.color_index, 1);
    }

    #[test]
    fn test_hit_test_regions() {
        let layout = layout_with(0.0, None);
        let lane_a = RULER_HEIGHT + LANE_HEIGHT + 10.0;

        assert_eq!(layout.hit_test(300.0, 5.0), HitTarget::Ruler);
        assert_eq!(layout.hit_test(300.0, RULER_HEIGHT + 5.0), HitTarget::Waveform);
        assert_eq!(
            layout.hit_test(98.0, lane_a),
            HitTarget::ResizeHandle { segment_id: 1, edge: Edge::End }
        );
        assert_eq!(
            layout.hit_test(47.0, lane_a),
            HitTarget::ResizeHandle { segment_id: 1, edge: Edge::Start }
        );
        assert_eq!(layout.hit_test(75.0, lane_a), HitTarget::Segment(1));
        assert_eq!(layout.hit_test(400.0, lane_a), HitTarget::Empty);
        assert_eq!(layout.hit_test(10.0, 10_000.0), HitTarget::Empty);
    }

    #[test]
    fn test_hit_test_accounts_for_scroll() {
        let layout = layout_with(1000.0, None);
        let lane_a = RULER_HEIGHT + LANE_HEIGHT + 10.0;
        // segment 3 spans 1500-1550 in content space
        assert_eq!(layout.hit_test(525.0, lane_a), HitTarget::Segment(3));
    }

    #[test]
    fn test_render_order_and_culling() {
        let layout = layout_with(0.0, Some(TimeRegion { start_ms: 5000, end_ms: 8000 }));
        let mut recorder = Recorder::default();
        render(&layout, &mut recorder);

        let commands = recorder.0;
        assert!(matches!(commands.first(), Some(DrawCommand::Clear { .. })));
        assert!(matches!(commands.last(), Some(DrawCommand::Playhead { x, .. }) if *x == 150.0));

        // segment 3 at 1500px is off screen
        let segment_ids: Vec<SegmentId> = commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Segment { segment_id, .. } => Some(*segment_id),
                _ => None,
            })
            .collect();
        assert_eq!(segment_ids, vec![1, 2]);

        let ticks = commands.iter().filter(|c| matches!(c, DrawCommand::Tick { .. })).count();
        assert_eq!(ticks, 17);

        assert!(commands.contains(&DrawCommand::Selection {
            x: 250.0,
            y: RULER_HEIGHT,
            width: 150.0,
            height: 3.0 * LANE_HEIGHT,
        }));
    }

    #[test]
    fn test_follow_playhead() {
        let mut vp = Viewport::new(1000.0);
        assert!(!follow_playhead(850.0, &mut vp, 6000.0, 100.0));
        assert!(follow_playhead(950.0, &mut vp, 6000.0, 100.0));
        assert_eq!(vp.scroll_offset_px, 750.0);

        // near the end the jump is clamped
        vp.scroll_to(4900.0, 6000.0);
        assert!(follow_playhead(5950.0, &mut vp, 6000.0, 100.0));
        assert_eq!(vp.scroll_offset_px, 5000.0);
    }
}
