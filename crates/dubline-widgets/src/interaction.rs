//! Canvas interactions and their dispatch into the engine

use dubline_core::collab::MutationSink;
use dubline_core::sync::MediaClock;
use dubline_core::TimelineEngine;

/// Pointer activity on the timeline canvas, in canvas-relative pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimelineInteraction {
    Pressed { x: f64, y: f64 },
    Moved { x: f64 },
    Released,
    /// Horizontal scroll request in pixels
    Scrolled { delta_px: f64 },
}

/// Feed one interaction into the engine
///
/// A press that lands while another gesture is live is ignored.
pub fn apply_interaction<V, A, S>(engine: &mut TimelineEngine<V, A, S>, interaction: TimelineInteraction)
where
    V: MediaClock,
    A: MediaClock,
    S: MutationSink,
{
    match interaction {
        TimelineInteraction::Pressed { x, y } => {
            if let Err(e) = engine.pointer_down(x, y) {
                log::debug!("apply_interaction: press ignored: {}", e);
            }
        }
        TimelineInteraction::Moved { x } => engine.pointer_move(x),
        TimelineInteraction::Released => engine.pointer_up(),
        TimelineInteraction::Scrolled { delta_px } => engine.scroll_by(delta_px),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dubline_core::collab::{reply_channel, Reply};
    use dubline_core::config::EngineConfig;
    use dubline_core::coords::ZoomPreset;
    use dubline_core::{Gesture, RegionOp, SegmentEdit, SegmentId, TimeRegion, TimelineEvent};

    struct StillClock;

    impl MediaClock for StillClock {
        fn is_ready(&self) -> bool {
            true
        }
        fn current_time_ms(&self) -> f64 {
            0.0
        }
        fn duration_ms(&self) -> f64 {
            60_000.0
        }
        fn set_time_ms(&mut self, _time_ms: f64) {}
        fn play(&mut self) {}
        fn pause(&mut self) {}
        fn is_playing(&self) -> bool {
            false
        }
        fn play_range(&mut self, _start_ms: f64, _end_ms: f64) {}
    }

    struct NullSink;

    impl MutationSink for NullSink {
        fn commit_segment_edit(&mut self, _segment_id: SegmentId, _edit: SegmentEdit) -> Reply {
            reply_channel().1
        }
        fn apply_region_op(&mut self, _video_id: &str, _op: RegionOp, _region: Option<TimeRegion>) -> Reply {
            reply_channel().1
        }
    }

    fn engine() -> TimelineEngine<StillClock, StillClock, NullSink> {
        let mut engine =
            TimelineEngine::new(EngineConfig::default(), "v", StillClock, StillClock, NullSink).unwrap();
        engine.set_viewport_width(500.0);
        engine
    }

    #[test]
    fn test_ruler_press_and_release() {
        let mut engine = engine();
        apply_interaction(&mut engine, TimelineInteraction::Pressed { x: 100.0, y: 5.0 });
        assert_eq!(engine.gesture(), Gesture::Scrubbing);
        assert_eq!(engine.zoom().preset(), ZoomPreset::Scrub);

        apply_interaction(&mut engine, TimelineInteraction::Released);
        assert_eq!(engine.gesture(), Gesture::Idle);
        assert_eq!(engine.zoom().preset(), ZoomPreset::Default);
    }

    #[test]
    fn test_waveform_drag_selects() {
        let mut engine = engine();
        apply_interaction(&mut engine, TimelineInteraction::Pressed { x: 50.0, y: 40.0 });
        apply_interaction(&mut engine, TimelineInteraction::Moved { x: 100.0 });
        apply_interaction(&mut engine, TimelineInteraction::Released);

        let region = TimeRegion { start_ms: 1000, end_ms: 2000 };
        assert_eq!(engine.drain_events(), vec![TimelineEvent::SelectionChanged(region)]);
    }

    #[test]
    fn test_scroll() {
        let mut engine = engine();
        apply_interaction(&mut engine, TimelineInteraction::Scrolled { delta_px: 120.0 });
        assert_eq!(engine.viewport().scroll_offset_px, 120.0);
    }
}
