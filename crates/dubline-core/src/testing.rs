//! Test doubles shared by the module tests

use std::cell::RefCell;
use std::rc::Rc;

use crate::collab::{reply_channel, MutationSink, Reply, ReplySender, SegmentSource};
use crate::sync::MediaClock;
use crate::types::{RegionOp, Segment, SegmentEdit, SegmentId, SpeakerMeta, TimeRegion};

pub fn segment(id: SegmentId, order_index: i64, start_ms: i64, end_ms: i64, speaker: Option<&str>) -> Segment {
    Segment {
        id,
        order_index,
        start_ms,
        end_ms,
        speaker_label: speaker.map(str::to_string),
        source_text: String::new(),
        target_text: format!("segment {}", id),
    }
}

pub fn speaker(label: &str, voice_name: Option<&str>) -> SpeakerMeta {
    SpeakerMeta {
        speaker_label: label.to_string(),
        voice_name: voice_name.map(str::to_string),
        gender: None,
    }
}

// =============================================================================
// Media clock
// =============================================================================

/// Clock that records every call made on it
#[derive(Debug, Clone)]
pub struct FakeClock {
    pub ready: bool,
    pub time_ms: f64,
    pub duration_ms: f64,
    pub playing: bool,
    pub volume: f32,
    pub rate: f64,
    pub set_calls: Vec<f64>,
    pub ranges: Vec<(f64, f64)>,
}

impl FakeClock {
    pub fn new(duration_ms: f64) -> Self {
        Self {
            ready: true,
            time_ms: 0.0,
            duration_ms,
            playing: false,
            volume: 1.0,
            rate: 1.0,
            set_calls: Vec::new(),
            ranges: Vec::new(),
        }
    }

    pub fn loading(duration_ms: f64) -> Self {
        Self {
            ready: false,
            ..Self::new(duration_ms)
        }
    }
}

impl MediaClock for FakeClock {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn current_time_ms(&self) -> f64 {
        self.time_ms
    }

    fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    fn set_time_ms(&mut self, time_ms: f64) {
        self.time_ms = time_ms;
        self.set_calls.push(time_ms);
    }

    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn play_range(&mut self, start_ms: f64, end_ms: f64) {
        self.time_ms = start_ms;
        self.playing = true;
        self.ranges.push((start_ms, end_ms));
    }

    fn set_volume(&mut self, gain: f32) {
        self.volume = gain;
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.rate = rate;
    }
}

// =============================================================================
// Mutation sink
// =============================================================================

/// Calls received by a [`RecordingSink`], with their reply senders
#[derive(Default)]
pub struct SinkLog {
    pub commits: Vec<(SegmentId, SegmentEdit)>,
    pub region_ops: Vec<(String, RegionOp, Option<TimeRegion>)>,
    pub commit_replies: Vec<ReplySender>,
    pub region_replies: Vec<ReplySender>,
}

impl SinkLog {
    /// Answer the oldest outstanding commit
    pub fn resolve_commit(&mut self, result: Result<(), String>) {
        let tx = self.commit_replies.remove(0);
        let _ = tx.send(result);
    }

    pub fn resolve_region_op(&mut self, result: Result<(), String>) {
        let tx = self.region_replies.remove(0);
        let _ = tx.send(result);
    }
}

/// Sink whose replies the test resolves by hand
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub log: Rc<RefCell<SinkLog>>,
}

impl RecordingSink {
    pub fn new() -> (Self, Rc<RefCell<SinkLog>>) {
        let sink = Self::default();
        let log = sink.log.clone();
        (sink, log)
    }
}

impl MutationSink for RecordingSink {
    fn commit_segment_edit(&mut self, segment_id: SegmentId, edit: SegmentEdit) -> Reply {
        let (tx, rx) = reply_channel();
        let mut log = self.log.borrow_mut();
        log.commits.push((segment_id, edit));
        log.commit_replies.push(tx);
        rx
    }

    fn apply_region_op(&mut self, video_id: &str, op: RegionOp, region: Option<TimeRegion>) -> Reply {
        let (tx, rx) = reply_channel();
        let mut log = self.log.borrow_mut();
        log.region_ops.push((video_id.to_string(), op, region));
        log.region_replies.push(tx);
        rx
    }
}

// =============================================================================
// Data source
// =============================================================================

pub struct StaticSource {
    pub segments: Vec<Segment>,
    pub speakers: Vec<SpeakerMeta>,
    pub fail: bool,
}

impl SegmentSource for StaticSource {
    fn load_segments(&self, video_id: &str) -> anyhow::Result<Vec<Segment>> {
        if self.fail {
            anyhow::bail!("no segments for video {}", video_id);
        }
        Ok(self.segments.clone())
    }

    fn load_speakers(&self, _video_id: &str) -> anyhow::Result<Vec<SpeakerMeta>> {
        Ok(self.speakers.clone())
    }
}
