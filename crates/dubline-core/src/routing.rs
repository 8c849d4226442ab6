//! Audio routing resolver
//!
//! Decides, per audio tick, whether the active player should be audible.
//! The decision is a pure function of a [`RoutingContext`] snapshot that the
//! engine rebuilds every tick, so a mute or solo toggle is heard on the very
//! next frame.

use std::collections::BTreeSet;

use crate::edit::SegmentStore;
use crate::tracks::{TrackSet, MIXED_TRACK_LABEL};
use crate::types::{Segment, SegmentBounds};

/// Intervals owned by one speaker track, in track order
#[derive(Debug, Clone, PartialEq)]
pub struct TrackIntervals {
    pub label: String,
    pub intervals: Vec<SegmentBounds>,
}

/// Snapshot of mute/solo state and track membership
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutingContext {
    pub soloed: BTreeSet<String>,
    pub muted: BTreeSet<String>,
    /// Speaker tracks only; the mixed track owns whatever they don't
    pub tracks: Vec<TrackIntervals>,
}

impl RoutingContext {
    pub fn from_tracks(tracks: &TrackSet, store: &SegmentStore) -> Self {
        let intervals = tracks
            .speaker_tracks()
            .map(|track| TrackIntervals {
                label: track.label.clone(),
                intervals: track
                    .segment_ids
                    .iter()
                    .filter_map(|id| store.get(*id))
                    .map(Segment::bounds)
                    .collect(),
            })
            .collect();

        Self {
            soloed: tracks.soloed_labels(),
            muted: tracks.muted_labels(),
            tracks: intervals,
        }
    }

    /// Label of the track owning `time_ms`
    ///
    /// First match in track order wins when segments on different tracks
    /// overlap. Instants no speaker segment covers belong to the mixed track.
    pub fn owner_at(&self, time_ms: f64) -> &str {
        self.tracks
            .iter()
            .find(|t| t.intervals.iter().any(|b| b.contains(time_ms)))
            .map(|t| t.label.as_str())
            .unwrap_or(MIXED_TRACK_LABEL)
    }
}

/// Output gain (0.0 or 1.0) for the active player at `time_ms`
pub fn resolve_gain(time_ms: f64, ctx: &RoutingContext) -> f32 {
    if !ctx.soloed.is_empty() {
        let audible = ctx
            .tracks
            .iter()
            .filter(|t| ctx.soloed.contains(&t.label))
            .any(|t| t.intervals.iter().any(|b| b.contains(time_ms)))
            || (ctx.soloed.contains(MIXED_TRACK_LABEL) && ctx.owner_at(time_ms) == MIXED_TRACK_LABEL);
        return if audible { 1.0 } else { 0.0 };
    }

    if ctx.muted.contains(ctx.owner_at(time_ms)) {
        0.0
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::segment;

    fn ctx() -> (TrackSet, SegmentStore) {
        let segments = vec![
            segment(1, 0, 0, 1000, Some("A")),
            segment(2, 1, 1000, 2000, Some("B")),
            segment(3, 2, 3000, 4000, Some("A")),
        ];
        (TrackSet::derive(&[], &segments), SegmentStore::new(segments))
    }

    #[test]
    fn test_no_state_is_always_audible() {
        let (tracks, segments) = ctx();
        let c = RoutingContext::from_tracks(&tracks, &segments);
        for t in [0.0, 999.0, 1500.0, 2500.0, 3999.0] {
            assert_eq!(resolve_gain(t, &c), 1.0);
        }
    }

    #[test]
    fn test_solo_is_exclusive_even_over_mute() {
        let (mut tracks, segments) = ctx();
        tracks.toggle_solo("A").unwrap();
        tracks.toggle_mute("A").unwrap();
        let c = RoutingContext::from_tracks(&tracks, &segments);

        assert_eq!(resolve_gain(500.0, &c), 1.0);
        assert_eq!(resolve_gain(3500.0, &c), 1.0);
        assert_eq!(resolve_gain(1500.0, &c), 0.0);
        assert_eq!(resolve_gain(2500.0, &c), 0.0);
    }

    #[test]
    fn test_mute_without_solo() {
        let (mut tracks, segments) = ctx();
        tracks.toggle_mute("B").unwrap();
        let c = RoutingContext::from_tracks(&tracks, &segments);

        assert_eq!(resolve_gain(1500.0, &c), 0.0);
        assert_eq!(resolve_gain(500.0, &c), 1.0);
        // gap belongs to the mixed track
        assert_eq!(resolve_gain(2500.0, &c), 1.0);
    }

    #[test]
    fn test_muted_mixed_track_silences_gaps() {
        let (mut tracks, segments) = ctx();
        tracks.toggle_mute(MIXED_TRACK_LABEL).unwrap();
        let c = RoutingContext::from_tracks(&tracks, &segments);

        assert_eq!(c.owner_at(2500.0), MIXED_TRACK_LABEL);
        assert_eq!(resolve_gain(2500.0, &c), 0.0);
        assert_eq!(resolve_gain(500.0, &c), 1.0);
    }

    #[test]
    fn test_soloed_mixed_track_plays_gaps_only() {
        let (mut tracks, segments) = ctx();
        tracks.toggle_solo(MIXED_TRACK_LABEL).unwrap();
        let c = RoutingContext::from_tracks(&tracks, &segments);

        assert_eq!(resolve_gain(2500.0, &c), 1.0);
        assert_eq!(resolve_gain(500.0, &c), 0.0);
    }

    #[test]
    fn test_boundaries_are_half_open() {
        let (mut tracks, segments) = ctx();
        tracks.toggle_mute("A").unwrap();
        let c = RoutingContext::from_tracks(&tracks, &segments);

        // 1000 is the end of A's first clip and the start of B's
        assert_eq!(c.owner_at(1000.0), "B");
        assert_eq!(resolve_gain(1000.0, &c), 1.0);
        assert_eq!(resolve_gain(999.0, &c), 0.0);
    }

    #[test]
    fn test_overlap_first_track_wins() {
        let segments = vec![
            segment(1, 0, 0, 2000, Some("A")),
            segment(2, 1, 1000, 3000, Some("B")),
        ];
        let mut tracks = TrackSet::derive(&[], &segments);
        tracks.toggle_mute("A").unwrap();
        let c = RoutingContext::from_tracks(&tracks, &SegmentStore::new(segments));

        assert_eq!(c.owner_at(1500.0), "A");
        assert_eq!(resolve_gain(1500.0, &c), 0.0);
    }

    #[test]
    fn test_toggle_takes_effect_on_next_snapshot() {
        let (mut tracks, segments) = ctx();
        let before = RoutingContext::from_tracks(&tracks, &segments);
        tracks.toggle_mute("A").unwrap();
        let after = RoutingContext::from_tracks(&tracks, &segments);

        assert_eq!(resolve_gain(500.0, &before), 1.0);
        assert_eq!(resolve_gain(500.0, &after), 0.0);
    }
}
