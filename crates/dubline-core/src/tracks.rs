//! Track derivation and per-track mute/solo/volume state
//!
//! Tracks are never persisted. They are rebuilt from the segment and speaker
//! lists whenever either changes, and the mixer state of each track is
//! carried over by label.

use std::collections::{BTreeSet, HashMap};

use crate::error::{EngineError, EngineResult};
use crate::types::{Segment, SegmentId, SpeakerMeta};

/// Reserved label of the implicit background track
pub const MIXED_TRACK_LABEL: &str = "__mixed__";

/// Display name of the background track
pub const MIXED_TRACK_NAME: &str = "Mixed Audio";

/// Initial volume of the background track
pub const MIXED_TRACK_VOLUME: f32 = 0.5;

/// Initial volume of a speaker track
pub const SPEAKER_TRACK_VOLUME: f32 = 1.0;

/// One lane of the timeline
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub label: String,
    pub display_name: String,
    /// Member segments in logical order (empty for the mixed track)
    pub segment_ids: Vec<SegmentId>,
    pub muted: bool,
    pub soloed: bool,
    /// Linear volume in `[0, 1]`
    pub volume: f32,
}

impl Track {
    fn mixed() -> Self {
        Self {
            label: MIXED_TRACK_LABEL.to_string(),
            display_name: MIXED_TRACK_NAME.to_string(),
            segment_ids: Vec::new(),
            muted: false,
            soloed: false,
            volume: MIXED_TRACK_VOLUME,
        }
    }

    fn speaker(label: &str, display_name: String) -> Self {
        Self {
            label: label.to_string(),
            display_name,
            segment_ids: Vec::new(),
            muted: false,
            soloed: false,
            volume: SPEAKER_TRACK_VOLUME,
        }
    }

    pub fn is_mixed(&self) -> bool {
        self.label == MIXED_TRACK_LABEL
    }
}

/// Mixer state kept across re-derivation
#[derive(Debug, Clone, Copy)]
struct MixerState {
    muted: bool,
    soloed: bool,
    volume: f32,
}

/// The derived track list, mixed track first
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSet {
    tracks: Vec<Track>,
}

impl Default for TrackSet {
    fn default() -> Self {
        Self {
            tracks: vec![Track::mixed()],
        }
    }
}

impl TrackSet {
    /// Derive tracks from speakers and segments with fresh mixer state
    ///
    /// Speaker lanes follow the speaker list order, then labels that only
    /// appear on segments in order of first appearance.
    pub fn derive(speakers: &[SpeakerMeta], segments: &[Segment]) -> Self {
        let mut set = Self::default();
        set.rebuild(speakers, segments, &HashMap::new());
        set
    }

    /// Rebuild lanes after the segment or speaker list changed, keeping
    /// mute/solo/volume for labels that still exist
    pub fn rederive(&mut self, speakers: &[SpeakerMeta], segments: &[Segment]) {
        let carried: HashMap<String, MixerState> = self
            .tracks
            .iter()
            .map(|t| {
                (
                    t.label.clone(),
                    MixerState {
                        muted: t.muted,
                        soloed: t.soloed,
                        volume: t.volume,
                    },
                )
            })
            .collect();
        self.rebuild(speakers, segments, &carried);
    }

    fn rebuild(
        &mut self,
        speakers: &[SpeakerMeta],
        segments: &[Segment],
        carried: &HashMap<String, MixerState>,
    ) {
        let mut ordered: Vec<&Segment> = segments.iter().collect();
        ordered.sort_by_key(|s| (s.order_index, s.start_ms));

        let mut labels: Vec<&str> = Vec::new();
        for speaker in speakers {
            if !labels.contains(&speaker.speaker_label.as_str()) {
                labels.push(&speaker.speaker_label);
            }
        }
        for seg in &ordered {
            if let Some(label) = seg.speaker_label.as_deref() {
                if !labels.contains(&label) {
                    labels.push(label);
                }
            }
        }

        let mut tracks = vec![Track::mixed()];
        for (i, label) in labels.iter().enumerate() {
            let display_name = speakers
                .iter()
                .find(|s| s.speaker_label == *label)
                .and_then(|s| s.voice_name.clone())
                .unwrap_or_else(|| format!("Speaker {}", i + 1));

            let mut track = Track::speaker(label, display_name);
            track.segment_ids = ordered
                .iter()
                .filter(|s| s.speaker_label.as_deref() == Some(*label))
                .map(|s| s.id)
                .collect();
            tracks.push(track);
        }

        for track in &mut tracks {
            if let Some(state) = carried.get(&track.label) {
                track.muted = state.muted;
                track.soloed = state.soloed;
                track.volume = state.volume;
            }
        }

        log::debug!(
            "TrackSet: derived {} speaker tracks from {} segments",
            tracks.len() - 1,
            segments.len()
        );
        self.tracks = tracks;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn speaker_tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter().filter(|t| !t.is_mixed())
    }

    pub fn mixed(&self) -> &Track {
        &self.tracks[0]
    }

    pub fn get(&self, label: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.label == label)
    }

    /// Track a segment belongs to, if any
    pub fn track_of(&self, segment_id: SegmentId) -> Option<&Track> {
        self.speaker_tracks()
            .find(|t| t.segment_ids.contains(&segment_id))
    }

    pub fn soloed_labels(&self) -> BTreeSet<String> {
        self.tracks
            .iter()
            .filter(|t| t.soloed)
            .map(|t| t.label.clone())
            .collect()
    }

    pub fn muted_labels(&self) -> BTreeSet<String> {
        self.tracks
            .iter()
            .filter(|t| t.muted)
            .map(|t| t.label.clone())
            .collect()
    }

    pub fn any_soloed(&self) -> bool {
        self.tracks.iter().any(|t| t.soloed)
    }

    // =========================================================================
    // Mixer state
    // =========================================================================

    fn get_mut(&mut self, label: &str) -> EngineResult<&mut Track> {
        self.tracks
            .iter_mut()
            .find(|t| t.label == label)
            .ok_or_else(|| EngineError::UnknownTrack(label.to_string()))
    }

    /// Flip a track's mute flag, returning the new value
    pub fn toggle_mute(&mut self, label: &str) -> EngineResult<bool> {
        let track = self.get_mut(label)?;
        track.muted = !track.muted;
        Ok(track.muted)
    }

    /// Flip a track's solo flag, returning the new value
    pub fn toggle_solo(&mut self, label: &str) -> EngineResult<bool> {
        let track = self.get_mut(label)?;
        track.soloed = !track.soloed;
        Ok(track.soloed)
    }

    pub fn set_muted(&mut self, label: &str, muted: bool) -> EngineResult<()> {
        self.get_mut(label)?.muted = muted;
        Ok(())
    }

    /// Solo exactly one track, clearing every other solo
    pub fn solo_exclusive(&mut self, label: &str) -> EngineResult<()> {
        self.get_mut(label)?;
        for track in &mut self.tracks {
            track.soloed = track.label == label;
        }
        Ok(())
    }

    pub fn clear_solos(&mut self) {
        for track in &mut self.tracks {
            track.soloed = false;
        }
    }

    /// Set a track's volume, clamped to `[0, 1]`
    pub fn set_volume(&mut self, label: &str, volume: f32) -> EngineResult<f32> {
        let track = self.get_mut(label)?;
        track.volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
        Ok(track.volume)
    }
}
