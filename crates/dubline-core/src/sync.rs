//! Dual-clock synchronizer
//!
//! The video element and the audio player each run their own clock and each
//! reports "time advanced" on its own schedule. The synchronizer folds both
//! reports into one playhead and mirrors each into the other clock without
//! echoing it back.
//!
//! # State machine
//!
//! ```text
//!                 on_audio_time                on_video_time
//!   Idle ─────────────────────────> SyncingFromAudio    (video echo suppressed)
//!   Idle ─────────────────────────> SyncingFromVideo    (audio echo suppressed)
//!   any  ── on_scheduler_tick ────> Idle
//! ```
//!
//! A [`Suspension`] is layered on top while an isolated preview plays: the
//! audio clock keeps updating the playhead but nothing is pushed into the
//! video, and video reports are ignored. It ends when the preview reports
//! completion or when its deadline passes on a scheduler tick.

use crate::error::{EngineError, EngineResult};

/// An independently clocked media player
///
/// Implemented by the host over the real video element and audio player.
/// Times are in milliseconds.
pub trait MediaClock {
    /// Whether the media finished loading
    fn is_ready(&self) -> bool;

    fn current_time_ms(&self) -> f64;

    fn duration_ms(&self) -> f64;

    /// Move the clock without emitting a user seek
    fn set_time_ms(&mut self, time_ms: f64);

    fn play(&mut self);

    fn pause(&mut self);

    fn is_playing(&self) -> bool;

    /// Play `[start_ms, end_ms)` and stop
    fn play_range(&mut self, start_ms: f64, end_ms: f64);

    /// Output gain in `[0, 1]`
    fn set_volume(&mut self, _gain: f32) {}

    fn set_playback_rate(&mut self, _rate: f64) {}
}

/// Which clock is currently being mirrored into the other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    #[default]
    Idle,
    SyncingFromAudio,
    SyncingFromVideo,
}

/// An isolated preview in progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Suspension {
    /// Scheduler time at which the suspension expires on its own
    pub deadline_ms: f64,
}

/// What a clock report did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Playhead updated and pushed into the other clock
    Propagated,
    /// Playhead updated, other clock left alone (preview)
    Local,
    /// Report was an echo or arrived during a preview and was ignored
    Suppressed,
}

/// Keeps the video and audio clocks consistent with a single playhead
pub struct Synchronizer<V: MediaClock, A: MediaClock> {
    video: V,
    audio: A,
    state: SyncState,
    suspension: Option<Suspension>,
    playhead_ms: f64,
    audio_ready: bool,
    playback_rate: f64,
    guard_ms: f64,
}

impl<V: MediaClock, A: MediaClock> Synchronizer<V, A> {
    pub fn new(video: V, audio: A, guard_ms: f64) -> Self {
        let audio_ready = audio.is_ready();
        Self {
            video,
            audio,
            state: SyncState::Idle,
            suspension: None,
            playhead_ms: 0.0,
            audio_ready,
            playback_rate: 1.0,
            guard_ms,
        }
    }

    fn ensure_ready(&self) -> EngineResult<()> {
        if self.audio_ready {
            Ok(())
        } else {
            Err(EngineError::MediaNotReady)
        }
    }

    // =========================================================================
    // Clock reports
    // =========================================================================

    /// Audio clock advanced
    pub fn on_audio_time(&mut self, time_ms: f64) -> EngineResult<SyncOutcome> {
        self.ensure_ready()?;

        if self.state == SyncState::SyncingFromVideo {
            return Ok(SyncOutcome::Suppressed);
        }

        self.playhead_ms = time_ms;
        if self.suspension.is_some() {
            return Ok(SyncOutcome::Local);
        }

        self.state = SyncState::SyncingFromAudio;
        self.video.set_time_ms(time_ms);
        Ok(SyncOutcome::Propagated)
    }

    /// Video clock advanced
    pub fn on_video_time(&mut self, time_ms: f64) -> EngineResult<SyncOutcome> {
        self.ensure_ready()?;

        if self.state == SyncState::SyncingFromAudio || self.suspension.is_some() {
            return Ok(SyncOutcome::Suppressed);
        }

        self.playhead_ms = time_ms;
        self.state = SyncState::SyncingFromVideo;
        self.audio.set_time_ms(time_ms);
        Ok(SyncOutcome::Propagated)
    }

    /// The one "set time" entry point: clicks, scrubbing and skips
    ///
    /// Ends any preview suspension. Returns the clamped time.
    pub fn seek(&mut self, time_ms: f64) -> EngineResult<f64> {
        self.ensure_ready()?;

        let clamped = time_ms.clamp(0.0, self.duration_ms());
        if self.suspension.take().is_some() {
            log::debug!("Synchronizer: seek ended preview suspension");
        }

        self.audio.set_time_ms(clamped);
        self.playhead_ms = clamped;
        self.state = SyncState::SyncingFromAudio;
        self.video.set_time_ms(clamped);
        Ok(clamped)
    }

    /// Relative seek from the current playhead
    pub fn skip(&mut self, delta_ms: f64) -> EngineResult<f64> {
        self.seek(self.playhead_ms + delta_ms)
    }

    // =========================================================================
    // Transport
    // =========================================================================

    pub fn play(&mut self) -> EngineResult<()> {
        self.ensure_ready()?;
        self.audio.play();
        self.video.play();
        Ok(())
    }

    pub fn pause(&mut self) -> EngineResult<()> {
        self.ensure_ready()?;
        self.audio.pause();
        self.video.pause();
        Ok(())
    }

    /// Returns whether playback is running afterwards
    pub fn toggle_play(&mut self) -> EngineResult<bool> {
        if self.audio.is_playing() {
            self.pause()?;
            Ok(false)
        } else {
            self.play()?;
            Ok(true)
        }
    }

    /// Remembered and re-applied when the audio becomes ready
    pub fn set_playback_rate(&mut self, rate: f64) {
        self.playback_rate = rate;
        if self.audio_ready {
            self.audio.set_playback_rate(rate);
            self.video.set_playback_rate(rate);
        }
    }

    pub fn set_output_gain(&mut self, gain: f32) {
        self.audio.set_volume(gain);
    }

    // =========================================================================
    // Previews
    // =========================================================================

    /// Play `[start_ms, end_ms)` on the audio clock only
    ///
    /// The video stays where it is until the preview ends or the deadline
    /// `now + duration + guard` passes. Returns the deadline.
    pub fn begin_preview(&mut self, start_ms: f64, end_ms: f64, now_ms: f64) -> EngineResult<f64> {
        self.ensure_ready()?;

        let deadline_ms = now_ms + (end_ms - start_ms).max(0.0) + self.guard_ms;
        self.suspension = Some(Suspension { deadline_ms });
        self.playhead_ms = start_ms;
        self.audio.play_range(start_ms, end_ms);

        log::debug!(
            "Synchronizer: preview {:.0}-{:.0}ms, suspended until {:.0}",
            start_ms,
            end_ms,
            deadline_ms
        );
        Ok(deadline_ms)
    }

    /// The bounded preview playback ended
    pub fn on_preview_finished(&mut self) {
        if self.suspension.take().is_some() {
            log::debug!("Synchronizer: preview finished");
        }
    }

    // =========================================================================
    // Scheduling
    // =========================================================================

    /// Next-tick primitive, called once per event-loop turn
    pub fn on_scheduler_tick(&mut self, now_ms: f64) {
        self.state = SyncState::Idle;

        if let Some(suspension) = self.suspension {
            if now_ms >= suspension.deadline_ms {
                log::debug!("Synchronizer: preview suspension expired at {:.0}", now_ms);
                self.suspension = None;
            }
        }
    }

    /// The audio player finished loading
    pub fn mark_audio_ready(&mut self) {
        if self.audio_ready {
            return;
        }
        self.audio_ready = true;
        if self.playback_rate != 1.0 {
            self.audio.set_playback_rate(self.playback_rate);
            self.video.set_playback_rate(self.playback_rate);
        }
        log::info!("Synchronizer: audio ready");
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn playhead_ms(&self) -> f64 {
        self.playhead_ms
    }

    pub fn duration_ms(&self) -> f64 {
        self.audio.duration_ms().max(0.0)
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn suspension(&self) -> Option<Suspension> {
        self.suspension
    }

    pub fn is_suspended(&self) -> bool {
        self.suspension.is_some()
    }

    pub fn is_audio_ready(&self) -> bool {
        self.audio_ready
    }

    pub fn is_playing(&self) -> bool {
        self.audio.is_playing()
    }

    pub fn playback_rate(&self) -> f64 {
        self.playback_rate
    }

    pub fn video(&self) -> &V {
        &self.video
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeClock;

    fn sync() -> Synchronizer<FakeClock, FakeClock> {
        Synchronizer::new(FakeClock::new(120_000.0), FakeClock::new(120_000.0), 50.0)
    }

    #[test]
    fn test_audio_advance_propagates_once() {
        let mut s = sync();
        assert_eq!(s.on_audio_time(1000.0).unwrap(), SyncOutcome::Propagated);
        assert_eq!(s.state(), SyncState::SyncingFromAudio);
        assert_eq!(s.video().set_calls, vec![1000.0]);

        // the video echoes the time we just pushed into it
        assert_eq!(s.on_video_time(1000.0).unwrap(), SyncOutcome::Suppressed);
        assert!(s.audio().set_calls.is_empty());

        s.on_scheduler_tick(16.0);
        assert_eq!(s.state(), SyncState::Idle);
    }

    #[test]
    fn test_video_advance_is_symmetric() {
        let mut s = sync();
        assert_eq!(s.on_video_time(2500.0).unwrap(), SyncOutcome::Propagated);
        assert_eq!(s.audio().set_calls, vec![2500.0]);
        assert_eq!(s.on_audio_time(2500.0).unwrap(), SyncOutcome::Suppressed);
        assert!(s.video().set_calls.is_empty());
        assert_eq!(s.playhead_ms(), 2500.0);
    }

    #[test]
    fn test_not_ready_drops_calls() {
        let mut s = Synchronizer::new(
            FakeClock::new(10_000.0),
            FakeClock::loading(10_000.0),
            50.0,
        );
        assert!(matches!(s.on_audio_time(10.0), Err(EngineError::MediaNotReady)));
        assert!(matches!(s.on_video_time(10.0), Err(EngineError::MediaNotReady)));
        assert!(matches!(s.seek(10.0), Err(EngineError::MediaNotReady)));
        assert!(s.begin_preview(0.0, 100.0, 0.0).is_err());
        assert!(s.video().set_calls.is_empty());

        s.mark_audio_ready();
        assert!(s.on_audio_time(10.0).is_ok());
    }

    #[test]
    fn test_playback_rate_reapplied_on_ready() {
        let mut s = Synchronizer::new(FakeClock::new(1.0), FakeClock::loading(1.0), 50.0);
        s.set_playback_rate(1.5);
        assert_eq!(s.audio().rate, 1.0);
        s.mark_audio_ready();
        assert_eq!(s.audio().rate, 1.5);
        assert_eq!(s.video().rate, 1.5);
    }

    #[test]
    fn test_preview_suspends_video_until_finished() {
        let mut s = sync();
        s.begin_preview(5000.0, 6000.0, 100.0).unwrap();
        assert_eq!(s.audio().ranges, vec![(5000.0, 6000.0)]);
        assert_eq!(s.suspension().unwrap().deadline_ms, 1150.0);

        assert_eq!(s.on_audio_time(5200.0).unwrap(), SyncOutcome::Local);
        assert_eq!(s.playhead_ms(), 5200.0);
        assert_eq!(s.on_video_time(300.0).unwrap(), SyncOutcome::Suppressed);
        assert!(s.video().set_calls.is_empty());

        s.on_preview_finished();
        assert!(!s.is_suspended());
        assert_eq!(s.on_audio_time(6000.0).unwrap(), SyncOutcome::Propagated);
    }

    #[test]
    fn test_preview_suspension_times_out() {
        let mut s = sync();
        s.begin_preview(0.0, 1000.0, 0.0).unwrap();
        s.on_scheduler_tick(1049.0);
        assert!(s.is_suspended());
        s.on_scheduler_tick(1050.0);
        assert!(!s.is_suspended());
    }

    #[test]
    fn test_seek_clamps_and_pushes_both_clocks() {
        let mut s = sync();
        assert_eq!(s.seek(150_000.0).unwrap(), 120_000.0);
        assert_eq!(s.seek(-5.0).unwrap(), 0.0);
        assert_eq!(s.audio().set_calls, vec![120_000.0, 0.0]);
        assert_eq!(s.video().set_calls, vec![120_000.0, 0.0]);
    }

    #[test]
    fn test_seek_ignores_guard_and_ends_preview() {
        let mut s = sync();
        s.on_video_time(100.0).unwrap();
        s.begin_preview(0.0, 500.0, 0.0).unwrap();
        s.seek(4000.0).unwrap();
        assert!(!s.is_suspended());
        assert_eq!(s.video().set_calls, vec![4000.0]);
    }

    #[test]
    fn test_skip_is_relative() {
        let mut s = sync();
        s.seek(10_000.0).unwrap();
        assert_eq!(s.skip(-5000.0).unwrap(), 5000.0);
        assert_eq!(s.skip(-9000.0).unwrap(), 0.0);
    }

    #[test]
    fn test_toggle_play() {
        let mut s = sync();
        assert!(s.toggle_play().unwrap());
        assert!(s.audio().playing && s.video().playing);
        assert!(!s.toggle_play().unwrap());
        assert!(!s.is_playing());
    }
}
