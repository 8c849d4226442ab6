//! Collaborator interfaces
//!
//! The engine loads its data through [`SegmentSource`] and pushes committed
//! edits through [`MutationSink`]. Mutations are request-reply: the sink
//! hands back a oneshot receiver and the engine polls it from its frame
//! tick, so nothing ever blocks the render loop.

use tokio::sync::oneshot;

use crate::types::{RegionOp, Segment, SegmentEdit, SegmentId, SpeakerMeta, TimeRegion};

/// Reply to a mutation: `Err` carries the backend's message
pub type Reply = oneshot::Receiver<Result<(), String>>;

/// Sending half of a [`Reply`]
pub type ReplySender = oneshot::Sender<Result<(), String>>;

/// Create a reply channel for a [`MutationSink`] implementation
pub fn reply_channel() -> (ReplySender, Reply) {
    oneshot::channel()
}

/// Segment/track data source
pub trait SegmentSource {
    fn load_segments(&self, video_id: &str) -> anyhow::Result<Vec<Segment>>;

    fn load_speakers(&self, video_id: &str) -> anyhow::Result<Vec<SpeakerMeta>>;
}

/// Upstream mutation interface
pub trait MutationSink {
    /// Persist new bounds for one segment
    fn commit_segment_edit(&mut self, segment_id: SegmentId, edit: SegmentEdit) -> Reply;

    /// Apply an audio operation to the dubbed track
    ///
    /// `region` is `None` for whole-file operations.
    fn apply_region_op(&mut self, video_id: &str, op: RegionOp, region: Option<TimeRegion>) -> Reply;
}

/// Playable media addressed by job id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUrls {
    /// Final dubbed video
    pub dubbed_video: String,
    /// Source video before dubbing
    pub original_video: String,
    /// Dubbed audio track shown on the waveform
    pub dubbed_audio: String,
}

impl MediaUrls {
    pub fn for_job(base_url: &str, job_id: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            dubbed_video: format!("{}/jobs/{}/download", base, job_id),
            original_video: format!("{}/jobs/{}/original", base, job_id),
            dubbed_audio: format!("{}/jobs/{}/dubbed-audio", base, job_id),
        }
    }
}
