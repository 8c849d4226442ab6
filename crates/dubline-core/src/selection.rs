//! Waveform region selection
//!
//! At most one region exists. Starting a new drag discards the previous
//! region immediately. The controller owns the region's lifecycle and hands
//! it to the mutation sink when an operation is confirmed; it never touches
//! audio itself.

use tokio::sync::oneshot::error::TryRecvError;

use crate::collab::{MutationSink, Reply};
use crate::error::{EngineError, EngineResult};
use crate::types::{RegionOp, TimeRegion};

/// A region operation waiting for the sink's reply
#[derive(Debug)]
struct PendingRegionOp {
    op: RegionOp,
    reply: Reply,
}

#[derive(Debug)]
pub struct SelectionController {
    region: Option<TimeRegion>,
    /// Time under the pointer when the drag started
    anchor_ms: Option<i64>,
    pending: Option<PendingRegionOp>,
    min_region_ms: i64,
}

impl SelectionController {
    pub fn new(min_region_ms: i64) -> Self {
        Self {
            region: None,
            anchor_ms: None,
            pending: None,
            min_region_ms,
        }
    }

    pub fn region(&self) -> Option<TimeRegion> {
        self.region
    }

    pub fn is_selecting(&self) -> bool {
        self.anchor_ms.is_some()
    }

    pub fn has_pending_op(&self) -> bool {
        self.pending.is_some()
    }

    // =========================================================================
    // Gesture
    // =========================================================================

    /// Start a drag; returns whether an existing region was discarded
    pub fn begin(&mut self, time_ms: f64) -> bool {
        let anchor = time_ms.round() as i64;
        let discarded = self.region.replace(TimeRegion::between(anchor, anchor)).is_some();
        self.anchor_ms = Some(anchor);
        log::debug!("selection: begin at {}ms (discarded previous: {})", anchor, discarded);
        discarded
    }

    pub fn update(&mut self, time_ms: f64) -> Option<TimeRegion> {
        let anchor = self.anchor_ms?;
        let region = TimeRegion::between(anchor, time_ms.round() as i64);
        self.region = Some(region);
        Some(region)
    }

    /// Finish the drag
    ///
    /// Returns the region, or `None` when it was too short to count and has
    /// been cleared.
    pub fn end(&mut self) -> Option<TimeRegion> {
        self.anchor_ms.take()?;
        match self.region {
            Some(region) if region.duration_ms() >= self.min_region_ms => {
                log::debug!("selection: region {}-{}ms", region.start_ms, region.end_ms);
                Some(region)
            }
            _ => {
                self.region = None;
                None
            }
        }
    }

    /// Abort a drag in progress, dropping its region
    pub fn cancel(&mut self) -> bool {
        if self.anchor_ms.take().is_some() {
            self.region = None;
            log::debug!("selection: drag cancelled");
            true
        } else {
            false
        }
    }

    /// Drop the region; returns whether one existed
    pub fn clear(&mut self) -> bool {
        self.anchor_ms = None;
        self.region.take().is_some()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    fn ensure_no_pending(&self) -> EngineResult<()> {
        if self.pending.is_some() {
            return Err(EngineError::InvalidState("region operation outstanding"));
        }
        Ok(())
    }

    /// Send the selected region to the sink and clear it
    pub fn confirm<S: MutationSink>(&mut self, op: RegionOp, sink: &mut S, video_id: &str) -> EngineResult<TimeRegion> {
        self.ensure_no_pending()?;
        if self.anchor_ms.is_some() {
            return Err(EngineError::InvalidState("region drag in progress"));
        }
        let region = self.region.take().ok_or(EngineError::NoSelection)?;

        log::info!(
            "selection: applying {} to {}-{}ms on video {}",
            op,
            region.start_ms,
            region.end_ms,
            video_id
        );
        let reply = sink.apply_region_op(video_id, op, Some(region));
        self.pending = Some(PendingRegionOp { op, reply });
        Ok(region)
    }

    /// Whole-file normalize, independent of any selection
    pub fn normalize_all<S: MutationSink>(&mut self, sink: &mut S, video_id: &str) -> EngineResult<()> {
        self.ensure_no_pending()?;

        log::info!("selection: normalizing whole track on video {}", video_id);
        let reply = sink.apply_region_op(video_id, RegionOp::Normalize, None);
        self.pending = Some(PendingRegionOp {
            op: RegionOp::Normalize,
            reply,
        });
        Ok(())
    }

    /// Check an outstanding operation; `None` while still waiting
    pub fn poll(&mut self) -> Option<EngineResult<RegionOp>> {
        let pending = self.pending.as_mut()?;

        let result = match pending.reply.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Closed) => Err("mutation sink dropped the reply".to_string()),
        };

        let op = self.pending.take()?.op;
        Some(match result {
            Ok(()) => {
                log::info!("selection: {} completed", op);
                Ok(op)
            }
            Err(reason) => {
                log::warn!("selection: {} failed: {}", op, reason);
                Err(EngineError::RegionOpFailure { op, reason })
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingSink;

    #[test]
    fn test_drag_produces_ordered_region() {
        let mut sel = SelectionController::new(10);
        assert!(!sel.begin(8000.4));
        sel.update(6500.0);
        assert_eq!(sel.update(5000.2), Some(TimeRegion { start_ms: 5000, end_ms: 8000 }));
        assert_eq!(sel.end(), Some(TimeRegion { start_ms: 5000, end_ms: 8000 }));
        assert!(!sel.is_selecting());
    }

    #[test]
    fn test_click_clears_region() {
        let mut sel = SelectionController::new(10);
        sel.begin(1000.0);
        sel.update(1004.0);
        assert_eq!(sel.end(), None);
        assert_eq!(sel.region(), None);
    }

    #[test]
    fn test_new_drag_discards_previous_region() {
        let (mut sink, log) = RecordingSink::new();
        let mut sel = SelectionController::new(10);

        sel.begin(5000.0);
        sel.update(8000.0);
        sel.end();

        assert!(sel.begin(9000.0));
        sel.update(9500.0);
        sel.end();

        sel.confirm(RegionOp::Cut, &mut sink, "vid").unwrap();
        let log = log.borrow();
        assert_eq!(log.region_ops.len(), 1);
        assert_eq!(log.region_ops[0].2, Some(TimeRegion { start_ms: 9000, end_ms: 9500 }));
    }

    #[test]
    fn test_confirm_calls_sink_once_and_clears() {
        let (mut sink, log) = RecordingSink::new();
        let mut sel = SelectionController::new(10);
        sel.begin(5000.0);
        sel.update(8000.0);
        sel.end();

        let region = sel.confirm(RegionOp::Trim, &mut sink, "42").unwrap();
        assert_eq!(region, TimeRegion { start_ms: 5000, end_ms: 8000 });
        assert_eq!(sel.region(), None);
        assert_eq!(
            log.borrow().region_ops,
            vec![("42".to_string(), RegionOp::Trim, Some(region))]
        );

        assert!(matches!(
            sel.confirm(RegionOp::Trim, &mut sink, "42"),
            Err(EngineError::InvalidState(_))
        ));
        assert_eq!(log.borrow().region_ops.len(), 1);
    }

    #[test]
    fn test_confirm_without_region() {
        let (mut sink, _log) = RecordingSink::new();
        let mut sel = SelectionController::new(10);
        assert!(matches!(
            sel.confirm(RegionOp::Silence, &mut sink, "1"),
            Err(EngineError::NoSelection)
        ));
    }

    #[test]
    fn test_confirm_during_drag_is_rejected() {
        let (mut sink, log) = RecordingSink::new();
        let mut sel = SelectionController::new(10);
        sel.begin(0.0);
        sel.update(500.0);
        assert!(sel.confirm(RegionOp::Trim, &mut sink, "1").is_err());
        assert!(log.borrow().region_ops.is_empty());
    }

    #[test]
    fn test_poll_resolution() {
        let (mut sink, log) = RecordingSink::new();
        let mut sel = SelectionController::new(10);

        sel.normalize_all(&mut sink, "7").unwrap();
        assert_eq!(log.borrow().region_ops[0], ("7".to_string(), RegionOp::Normalize, None));
        assert!(sel.poll().is_none());

        log.borrow_mut().resolve_region_op(Ok(()));
        assert_eq!(sel.poll().unwrap().unwrap(), RegionOp::Normalize);
        assert!(!sel.has_pending_op());

        sel.begin(0.0);
        sel.update(100.0);
        sel.end();
        sel.confirm(RegionOp::Silence, &mut sink, "7").unwrap();
        log.borrow_mut().resolve_region_op(Err("ffmpeg exited 1".into()));
        assert!(matches!(
            sel.poll(),
            Some(Err(EngineError::RegionOpFailure { op: RegionOp::Silence, .. }))
        ));
    }

    #[test]
    fn test_cancel_is_clean() {
        let mut sel = SelectionController::new(10);
        assert!(!sel.cancel());
        sel.begin(100.0);
        sel.update(900.0);
        assert!(sel.cancel());
        assert_eq!(sel.region(), None);
        assert_eq!(sel.end(), None);
    }
}
