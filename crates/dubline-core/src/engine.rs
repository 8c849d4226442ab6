//! Timeline engine facade
//!
//! [`TimelineEngine`] owns the synchronizer, the segment store, the derived
//! tracks, the zoom/viewport state and the three gesture controllers. It is
//! the only type a host talks to:
//!
//! - clock notifications: [`on_audio_tick`](TimelineEngine::on_audio_tick),
//!   [`on_video_tick`](TimelineEngine::on_video_tick),
//!   [`on_audio_ready`](TimelineEngine::on_audio_ready),
//!   [`on_preview_finished`](TimelineEngine::on_preview_finished)
//! - one [`on_frame`](TimelineEngine::on_frame) per event-loop turn
//! - pointer events in viewport coordinates
//! - transport and track commands
//!
//! Results flow back as [`TimelineEvent`]s drained with
//! [`drain_events`](TimelineEngine::drain_events), and as a
//! [`TimelineLayout`] to paint.
//!
//! Only one gesture can be live at a time. Sink failures become
//! [`TimelineEvent::Alert`]; every other error is an ordinary race between
//! input and asynchronous state and is logged at debug level.

use std::collections::VecDeque;

use crate::collab::{MutationSink, SegmentSource};
use crate::config::EngineConfig;
use crate::coords::{ms_to_pixel, pixel_to_ms, total_width, Viewport, ZoomState};
use crate::edit::{ResizeController, SegmentStore};
use crate::error::{EngineError, EngineResult};
use crate::layout::{follow_playhead, render, HitTarget, LayoutInput, Renderer, TimelineLayout};
use crate::routing::{resolve_gain, RoutingContext};
use crate::scrub::ScrubController;
use crate::selection::SelectionController;
use crate::sync::{MediaClock, SyncOutcome, Synchronizer};
use crate::tracks::{TrackSet, MIXED_TRACK_LABEL};
use crate::types::{Edge, RegionOp, Segment, SegmentBounds, SegmentId, SpeakerMeta, TimeRegion};

/// The pointer gesture currently in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Scrubbing,
    Selecting,
    Resizing,
}

/// Notifications for the host
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEvent {
    /// The playhead moved
    PlayheadTime(f64),
    /// The waveform region changed while dragging
    SelectionChanged(TimeRegion),
    SelectionCleared,
    /// The sink accepted new bounds for a segment
    SegmentCommitted {
        segment_id: SegmentId,
        bounds: SegmentBounds,
    },
    /// A region operation finished; the dubbed audio changed
    RegionOpCompleted { op: RegionOp },
    /// Segments should be reloaded from the data source
    ReloadRequested,
    /// Show on the host's alert surface
    Alert { title: String, message: String },
}

pub struct TimelineEngine<V: MediaClock, A: MediaClock, S: MutationSink> {
    config: EngineConfig,
    video_id: String,
    sync: Synchronizer<V, A>,
    sink: S,
    store: SegmentStore,
    speakers: Vec<SpeakerMeta>,
    tracks: TrackSet,
    zoom: ZoomState,
    viewport: Viewport,
    resize: ResizeController,
    scrub: ScrubController,
    selection: SelectionController,
    gesture: Gesture,
    events: VecDeque<TimelineEvent>,
    now_ms: f64,
}

impl<V: MediaClock, A: MediaClock, S: MutationSink> TimelineEngine<V, A, S> {
    pub fn new(config: EngineConfig, video_id: impl Into<String>, video: V, audio: A, sink: S) -> EngineResult<Self> {
        let zoom = ZoomState::new(config.default_zoom_px_per_sec, config.scrub_zoom_px_per_sec)?;
        let video_id = video_id.into();

        log::info!("TimelineEngine: created for video {}", video_id);
        Ok(Self {
            sync: Synchronizer::new(video, audio, config.preview_guard_ms),
            sink,
            store: SegmentStore::default(),
            speakers: Vec::new(),
            tracks: TrackSet::default(),
            zoom,
            viewport: Viewport::default(),
            resize: ResizeController::new(config.min_segment_ms, config.commit_timeout_ms),
            scrub: ScrubController::new(config.scrub_edge_threshold_px, config.scrub_scroll_px_per_frame),
            selection: SelectionController::new(config.min_region_ms),
            gesture: Gesture::Idle,
            events: VecDeque::new(),
            now_ms: 0.0,
            video_id,
            config,
        })
    }

    // =========================================================================
    // Data
    // =========================================================================

    /// Load segments and speakers from the data source
    pub fn load<Src: SegmentSource>(&mut self, source: &Src) -> EngineResult<()> {
        let segments = source
            .load_segments(&self.video_id)
            .map_err(|e| EngineError::Load(format!("{:#}", e)))?;
        let speakers = source
            .load_speakers(&self.video_id)
            .map_err(|e| EngineError::Load(format!("{:#}", e)))?;

        log::info!(
            "TimelineEngine: loaded {} segments, {} speakers",
            segments.len(),
            speakers.len()
        );
        self.speakers = speakers;
        self.replace_segments(segments);
        Ok(())
    }

    /// Swap in a reloaded segment list
    ///
    /// A live resize is cancelled since its segment may have moved. Track
    /// mixer state is kept by label.
    pub fn replace_segments(&mut self, segments: Vec<Segment>) {
        if self.resize.cancel() {
            self.gesture = Gesture::Idle;
        }
        self.store.replace(segments);
        self.tracks.rederive(&self.speakers, self.store.segments());
    }

    pub fn set_speakers(&mut self, speakers: Vec<SpeakerMeta>) {
        self.speakers = speakers;
        self.tracks.rederive(&self.speakers, self.store.segments());
    }

    // =========================================================================
    // Clock notifications
    // =========================================================================

    pub fn on_audio_ready(&mut self) {
        self.sync.mark_audio_ready();
    }

    /// Audio clock advanced: routing gain, sync, follow-scroll
    ///
    /// The gain is resolved on every tick, including ticks the sync guard
    /// suppresses.
    pub fn on_audio_tick(&mut self, time_ms: f64) {
        let ctx = RoutingContext::from_tracks(&self.tracks, &self.store);
        self.sync.set_output_gain(resolve_gain(time_ms, &ctx));

        let outcome = match self.sync.on_audio_time(time_ms) {
            Ok(outcome) => outcome,
            Err(e) => return self.surface(e),
        };
        if outcome == SyncOutcome::Suppressed {
            return;
        }

        if self.gesture != Gesture::Scrubbing {
            let px_per_sec = self.zoom.px_per_sec();
            let width = total_width(self.duration_ms() / 1000.0, px_per_sec);
            follow_playhead(
                ms_to_pixel(time_ms, px_per_sec),
                &mut self.viewport,
                width,
                self.config.follow_buffer_px,
            );
        }

        self.events.push_back(TimelineEvent::PlayheadTime(time_ms));
    }

    /// Video clock advanced
    pub fn on_video_tick(&mut self, time_ms: f64) {
        match self.sync.on_video_time(time_ms) {
            Ok(SyncOutcome::Suppressed) => {}
            Ok(_) => self.events.push_back(TimelineEvent::PlayheadTime(time_ms)),
            Err(e) => self.surface(e),
        }
    }

    /// A bounded preview reached its end
    pub fn on_preview_finished(&mut self) {
        self.sync.on_preview_finished();
    }

    /// Once per event-loop turn
    ///
    /// Clears the sync guard, drives the scrub loop and resolves
    /// outstanding commits and region operations.
    pub fn on_frame(&mut self, now_ms: f64) {
        self.now_ms = now_ms;
        self.sync.on_scheduler_tick(now_ms);

        if self.gesture == Gesture::Scrubbing {
            let duration = self.duration_ms();
            if let Some(target) = self.scrub.on_frame(&self.zoom, &mut self.viewport, duration) {
                self.seek(target);
            }
        }

        match self.resize.poll(&mut self.store, now_ms) {
            Some(Ok(committed)) => {
                self.events.push_back(TimelineEvent::SegmentCommitted {
                    segment_id: committed.segment_id,
                    bounds: committed.bounds,
                });
                self.events.push_back(TimelineEvent::ReloadRequested);
            }
            Some(Err(e)) => self.surface(e),
            None => {}
        }

        match self.selection.poll() {
            Some(Ok(op)) => self.events.push_back(TimelineEvent::RegionOpCompleted { op }),
            Some(Err(e)) => self.surface(e),
            None => {}
        }
    }

    // =========================================================================
    // Transport
    // =========================================================================

    /// Set the playhead (clicks, scrubbing, skips)
    pub fn seek(&mut self, time_ms: f64) {
        match self.sync.seek(time_ms) {
            Ok(t) => self.events.push_back(TimelineEvent::PlayheadTime(t)),
            Err(e) => self.surface(e),
        }
    }

    pub fn skip(&mut self, delta_ms: f64) {
        self.seek(self.sync.playhead_ms() + delta_ms);
    }

    pub fn play(&mut self) {
        if let Err(e) = self.sync.play() {
            self.surface(e);
        }
    }

    pub fn pause(&mut self) {
        if let Err(e) = self.sync.pause() {
            self.surface(e);
        }
    }

    pub fn toggle_play(&mut self) {
        if let Err(e) = self.sync.toggle_play() {
            self.surface(e);
        }
    }

    pub fn set_playback_rate(&mut self, rate: f64) {
        self.sync.set_playback_rate(rate);
    }

    /// Preview one segment without moving the video
    pub fn play_segment(&mut self, segment_id: SegmentId) -> EngineResult<()> {
        let bounds = self.store.bounds(segment_id)?;
        self.preview(bounds.start_ms as f64, bounds.end_ms as f64);
        Ok(())
    }

    /// Solo a speaker track and preview all of its clips
    pub fn play_track(&mut self, label: &str) -> EngineResult<()> {
        if label == MIXED_TRACK_LABEL {
            return self.play_mixed();
        }

        self.tracks.solo_exclusive(label)?;
        self.tracks.set_muted(label, false)?;

        let span = self.tracks.get(label).and_then(|track| {
            let bounds: Vec<SegmentBounds> = track
                .segment_ids
                .iter()
                .filter_map(|id| self.store.get(*id).map(Segment::bounds))
                .collect();
            let start = bounds.iter().map(|b| b.start_ms).min()?;
            let end = bounds.iter().map(|b| b.end_ms).max()?;
            Some((start, end))
        });

        match span {
            Some((start, end)) => self.preview(start as f64, end as f64),
            None => log::debug!("TimelineEngine: track {} has no segments to play", label),
        }
        Ok(())
    }

    /// Back to the full mix from the top
    pub fn play_mixed(&mut self) -> EngineResult<()> {
        self.tracks.clear_solos();
        self.tracks.set_muted(MIXED_TRACK_LABEL, false)?;
        self.seek(0.0);
        self.play();
        Ok(())
    }

    fn preview(&mut self, start_ms: f64, end_ms: f64) {
        match self.sync.begin_preview(start_ms, end_ms, self.now_ms) {
            Ok(_) => self.events.push_back(TimelineEvent::PlayheadTime(start_ms)),
            Err(e) => self.surface(e),
        }
    }

    // =========================================================================
    // Track state
    // =========================================================================

    pub fn toggle_mute(&mut self, label: &str) -> EngineResult<bool> {
        let muted = self.tracks.toggle_mute(label)?;
        log::debug!("TimelineEngine: {} muted={}", label, muted);
        Ok(muted)
    }

    pub fn toggle_solo(&mut self, label: &str) -> EngineResult<bool> {
        let soloed = self.tracks.toggle_solo(label)?;
        log::debug!("TimelineEngine: {} soloed={}", label, soloed);
        Ok(soloed)
    }

    pub fn set_track_volume(&mut self, label: &str, volume: f32) -> EngineResult<f32> {
        self.tracks.set_volume(label, volume)
    }

    // =========================================================================
    // Pointer input
    // =========================================================================

    fn ensure_idle(&self) -> EngineResult<()> {
        if self.gesture != Gesture::Idle {
            return Err(EngineError::InvalidState("gesture in progress"));
        }
        Ok(())
    }

    /// Pointer pressed at a viewport-relative position
    ///
    /// Starts whichever gesture owns the hit region and returns the target.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> EngineResult<HitTarget> {
        self.ensure_idle()?;

        let target = self.layout().hit_test(x, y);
        match target {
            HitTarget::Ruler => self.begin_scrub(x)?,
            HitTarget::ResizeHandle { segment_id, edge } => self.begin_resize(segment_id, edge, x)?,
            HitTarget::Waveform => self.begin_region(x)?,
            HitTarget::Segment(segment_id) => self.play_segment(segment_id)?,
            HitTarget::Empty => {}
        }
        Ok(target)
    }

    pub fn begin_scrub(&mut self, x: f64) -> EngineResult<()> {
        self.ensure_idle()?;
        let duration = self.duration_ms();
        let target = self.scrub.begin(x, &mut self.zoom, &self.viewport, duration);
        self.gesture = Gesture::Scrubbing;
        self.seek(target);
        Ok(())
    }

    pub fn begin_resize(&mut self, segment_id: SegmentId, edge: Edge, x: f64) -> EngineResult<()> {
        self.ensure_idle()?;
        self.resize.begin(
            &self.store,
            segment_id,
            edge,
            x + self.viewport.scroll_offset_px,
            self.zoom.px_per_sec(),
        )?;
        self.gesture = Gesture::Resizing;
        Ok(())
    }

    pub fn begin_region(&mut self, x: f64) -> EngineResult<()> {
        self.ensure_idle()?;
        let time = self.time_at(x);
        if self.selection.begin(time) {
            self.events.push_back(TimelineEvent::SelectionCleared);
        }
        self.gesture = Gesture::Selecting;
        Ok(())
    }

    pub fn pointer_move(&mut self, x: f64) {
        match self.gesture {
            Gesture::Idle => {}
            Gesture::Scrubbing => self.scrub.pointer_moved(x),
            Gesture::Resizing => {
                self.resize.update(x + self.viewport.scroll_offset_px);
            }
            Gesture::Selecting => {
                let time = self.time_at(x);
                let previous = self.selection.region();
                if let Some(region) = self.selection.update(time) {
                    if previous != Some(region) {
                        self.events.push_back(TimelineEvent::SelectionChanged(region));
                    }
                }
            }
        }
    }

    /// Pointer released anywhere
    pub fn pointer_up(&mut self) {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => {}
            Gesture::Scrubbing => {
                self.scrub.end(&mut self.zoom);
                self.clamp_scroll();
            }
            Gesture::Resizing => {
                if let Err(e) = self.resize.end(&mut self.store, &mut self.sink, self.now_ms) {
                    self.surface(e);
                }
            }
            Gesture::Selecting => {
                // moves already reported the region
                if self.selection.end().is_none() {
                    self.events.push_back(TimelineEvent::SelectionCleared);
                }
            }
        }
    }

    /// Abort the live gesture without committing anything
    pub fn pointer_cancel(&mut self) {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => {}
            Gesture::Scrubbing => {
                self.scrub.end(&mut self.zoom);
                self.clamp_scroll();
            }
            Gesture::Resizing => {
                self.resize.cancel();
            }
            Gesture::Selecting => {
                if self.selection.cancel() {
                    self.events.push_back(TimelineEvent::SelectionCleared);
                }
            }
        }
    }

    /// The owning view is going away
    pub fn teardown(&mut self) {
        self.pointer_cancel();
        self.zoom.restore_default();
        self.clamp_scroll();
        log::debug!("TimelineEngine: teardown");
    }

    /// Whether window-level pointer move/up events should be forwarded
    pub fn wants_pointer_capture(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    fn time_at(&self, x: f64) -> f64 {
        pixel_to_ms(x, self.viewport.scroll_offset_px, self.zoom.px_per_sec(), self.duration_ms())
    }

    // =========================================================================
    // Region operations
    // =========================================================================

    /// Apply an operation to the selected region
    pub fn confirm_region(&mut self, op: RegionOp) -> EngineResult<TimeRegion> {
        let region = self.selection.confirm(op, &mut self.sink, &self.video_id)?;
        self.events.push_back(TimelineEvent::SelectionCleared);
        Ok(region)
    }

    pub fn cancel_region(&mut self) {
        if self.gesture == Gesture::Selecting {
            return self.pointer_cancel();
        }
        if self.selection.clear() {
            self.events.push_back(TimelineEvent::SelectionCleared);
        }
    }

    pub fn normalize_all(&mut self) -> EngineResult<()> {
        self.selection.normalize_all(&mut self.sink, &self.video_id)
    }

    // =========================================================================
    // Layout
    // =========================================================================

    pub fn layout(&self) -> TimelineLayout {
        TimelineLayout::compute(&LayoutInput {
            store: &self.store,
            tracks: &self.tracks,
            resize: &self.resize,
            px_per_sec: self.zoom.px_per_sec(),
            viewport: self.viewport,
            duration_ms: self.duration_ms(),
            playhead_ms: self.sync.playhead_ms(),
            selection: self.selection.region(),
        })
    }

    pub fn render<R: Renderer>(&self, renderer: &mut R) {
        render(&self.layout(), renderer);
    }

    pub fn set_viewport_width(&mut self, width_px: f64) {
        self.viewport.width_px = width_px.max(0.0);
        self.clamp_scroll();
    }

    /// Pull the scroll offset back inside the content after a width or zoom change
    fn clamp_scroll(&mut self) {
        let width = self.content_width();
        self.viewport.scroll_to(self.viewport.scroll_offset_px, width);
    }

    /// User scroll of the track container
    pub fn scroll_by(&mut self, delta_px: f64) {
        let width = self.content_width();
        self.viewport.scroll_by(delta_px, width);
    }

    fn content_width(&self) -> f64 {
        total_width(self.duration_ms() / 1000.0, self.zoom.px_per_sec())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn drain_events(&mut self) -> Vec<TimelineEvent> {
        self.events.drain(..).collect()
    }

    /// Audio duration, or the end of the last segment before it is known
    pub fn duration_ms(&self) -> f64 {
        let duration = self.sync.duration_ms();
        if duration > 0.0 {
            duration
        } else {
            self.store.end_ms() as f64
        }
    }

    pub fn playhead_ms(&self) -> f64 {
        self.sync.playhead_ms()
    }

    /// Segment under the playhead, for transcript highlighting
    pub fn active_segment(&self) -> Option<&Segment> {
        self.store.active_at(self.sync.playhead_ms())
    }

    pub fn active_segment_at(&self, time_ms: f64) -> Option<&Segment> {
        self.store.active_at(time_ms)
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn segments(&self) -> &[Segment] {
        self.store.segments()
    }

    pub fn tracks(&self) -> &TrackSet {
        &self.tracks
    }

    pub fn zoom(&self) -> &ZoomState {
        &self.zoom
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn selection(&self) -> Option<TimeRegion> {
        self.selection.region()
    }

    pub fn synchronizer(&self) -> &Synchronizer<V, A> {
        &self.sync
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    /// Route an error: sink failures alert the user, the rest is dropped
    fn surface(&mut self, err: EngineError) {
        if err.is_user_facing() {
            log::warn!("TimelineEngine: {}", err);
            self.events.push_back(TimelineEvent::Alert {
                title: "Error".to_string(),
                message: err.to_string(),
            });
        } else {
            log::debug!("TimelineEngine: dropped: {}", err);
        }
    }
}
