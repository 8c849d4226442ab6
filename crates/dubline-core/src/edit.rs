//! Segment store and edge-resize controller
//!
//! A resize runs `Idle → Dragging → Committing → Idle`. Nothing leaves the
//! engine while dragging; the live delta only feeds the ripple preview. On
//! release the grabbed edge is committed through the [`MutationSink`] and the
//! new bounds are shown optimistically until the reply arrives. A rejected,
//! dropped or timed-out reply puts the pre-drag bounds back.

use std::collections::HashMap;

use tokio::sync::oneshot::error::TryRecvError;

use crate::collab::{MutationSink, Reply};
use crate::error::{EngineError, EngineResult};
use crate::types::{Edge, Segment, SegmentBounds, SegmentEdit, SegmentId};

// =============================================================================
// Segment store
// =============================================================================

/// The engine's view of the transcript segments, in logical order
#[derive(Debug, Clone, Default)]
pub struct SegmentStore {
    segments: Vec<Segment>,
    /// Position of each segment in `segments`
    index: HashMap<SegmentId, usize>,
}

impl SegmentStore {
    pub fn new(segments: Vec<Segment>) -> Self {
        let mut store = Self::default();
        store.replace(segments);
        store
    }

    /// Swap in a fresh segment list
    ///
    /// Segments with `end_ms <= start_ms` are dropped.
    pub fn replace(&mut self, segments: Vec<Segment>) {
        let total = segments.len();
        let mut segments: Vec<Segment> = segments
            .into_iter()
            .filter(|s| {
                let valid = s.end_ms > s.start_ms;
                if !valid {
                    log::warn!(
                        "SegmentStore: dropping segment {} with bounds {}-{}",
                        s.id,
                        s.start_ms,
                        s.end_ms
                    );
                }
                valid
            })
            .collect();
        segments.sort_by_key(|s| (s.order_index, s.start_ms));

        log::debug!("SegmentStore: holding {} of {} segments", segments.len(), total);
        self.index.clear();
        for (i, s) in segments.iter().enumerate() {
            self.index.entry(s.id).or_insert(i);
        }
        self.segments = segments;
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.index.get(&id).map(|&i| &self.segments[i])
    }

    pub fn bounds(&self, id: SegmentId) -> EngineResult<SegmentBounds> {
        self.get(id)
            .map(Segment::bounds)
            .ok_or(EngineError::UnknownSegment(id))
    }

    pub fn set_bounds(&mut self, id: SegmentId, bounds: SegmentBounds) -> EngineResult<()> {
        let i = *self.index.get(&id).ok_or(EngineError::UnknownSegment(id))?;
        let segment = &mut self.segments[i];
        segment.start_ms = bounds.start_ms;
        segment.end_ms = bounds.end_ms;
        Ok(())
    }

    /// First segment in logical order with `start <= time < end`
    pub fn active_at(&self, time_ms: f64) -> Option<&Segment> {
        self.segments.iter().find(|s| s.contains(time_ms))
    }

    /// Latest end time over all segments
    pub fn end_ms(&self) -> i64 {
        self.segments.iter().map(|s| s.end_ms).max().unwrap_or(0)
    }
}

// =============================================================================
// Drag state
// =============================================================================

/// A live edge drag
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub segment_id: SegmentId,
    pub edge: Edge,
    /// Content-space x where the handle was grabbed
    pub grab_origin_px: f64,
    pub original: SegmentBounds,
    pub order_index: i64,
    /// Zoom captured at grab time
    pub px_per_sec: f64,
    pub live_delta_ms: f64,
}

impl DragState {
    /// Bounds the segment would get if released now
    pub fn proposed_bounds(&self) -> SegmentBounds {
        let delta = self.live_delta_ms.round() as i64;
        match self.edge {
            Edge::Start => SegmentBounds::new((self.original.start_ms + delta).max(0), self.original.end_ms),
            Edge::End => SegmentBounds::new(self.original.start_ms, self.original.end_ms + delta),
        }
    }

    /// Whether `segment` sits after the dragged one and follows its end edge
    fn is_downstream(&self, segment: &Segment) -> bool {
        segment.id != self.segment_id
            && (segment.order_index > self.order_index
                || (segment.order_index == self.order_index && segment.start_ms >= self.original.end_ms))
    }
}

/// How a segment is drawn during a resize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewRole {
    Normal,
    /// The segment being dragged
    Dragging,
    /// Shifted by the ripple preview
    Rippled,
}

// =============================================================================
// Resize controller
// =============================================================================

/// A commit waiting for the sink's reply
#[derive(Debug)]
pub struct PendingCommit {
    pub segment_id: SegmentId,
    /// Last known-good bounds
    pub previous: SegmentBounds,
    pub committed: SegmentBounds,
    reply: Reply,
    issued_at_ms: f64,
}

#[derive(Debug, Default)]
pub enum ResizePhase {
    #[default]
    Idle,
    Dragging(DragState),
    Committing(PendingCommit),
}

/// Result of releasing a drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeOutcome {
    /// Released where it started, nothing sent
    Unchanged,
    /// Commit issued, new bounds shown optimistically
    Committing(SegmentBounds),
}

/// A commit the sink confirmed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommittedEdit {
    pub segment_id: SegmentId,
    pub bounds: SegmentBounds,
}

pub struct ResizeController {
    phase: ResizePhase,
    min_duration_ms: i64,
    commit_timeout_ms: u64,
}

impl ResizeController {
    pub fn new(min_duration_ms: i64, commit_timeout_ms: u64) -> Self {
        Self {
            phase: ResizePhase::Idle,
            min_duration_ms,
            commit_timeout_ms,
        }
    }

    pub fn phase(&self) -> &ResizePhase {
        &self.phase
    }

    pub fn drag(&self) -> Option<&DragState> {
        match &self.phase {
            ResizePhase::Dragging(drag) => Some(drag),
            _ => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, ResizePhase::Dragging(_))
    }

    pub fn is_committing(&self) -> bool {
        matches!(self.phase, ResizePhase::Committing(_))
    }

    /// Grab an edge of a segment
    pub fn begin(
        &mut self,
        store: &SegmentStore,
        segment_id: SegmentId,
        edge: Edge,
        pointer_x: f64,
        px_per_sec: f64,
    ) -> EngineResult<()> {
        match self.phase {
            ResizePhase::Dragging(_) => return Err(EngineError::InvalidState("resize already in progress")),
            ResizePhase::Committing(_) => return Err(EngineError::InvalidState("segment commit outstanding")),
            ResizePhase::Idle => {}
        }

        let segment = store.get(segment_id).ok_or(EngineError::UnknownSegment(segment_id))?;

        log::debug!("resize: begin segment {} {:?} edge at x={:.1}", segment_id, edge, pointer_x);
        self.phase = ResizePhase::Dragging(DragState {
            segment_id,
            edge,
            grab_origin_px: pointer_x,
            original: segment.bounds(),
            order_index: segment.order_index,
            px_per_sec,
            live_delta_ms: 0.0,
        });
        Ok(())
    }

    /// Track the pointer; returns the proposed bounds
    pub fn update(&mut self, pointer_x: f64) -> Option<SegmentBounds> {
        let ResizePhase::Dragging(drag) = &mut self.phase else {
            return None;
        };
        drag.live_delta_ms = (pointer_x - drag.grab_origin_px) / drag.px_per_sec * 1000.0;
        Some(drag.proposed_bounds())
    }

    /// Release the drag and commit the grabbed edge
    ///
    /// A result shorter than the minimum is discarded with
    /// [`EngineError::BoundaryViolation`] and the store is left untouched.
    pub fn end<S: MutationSink>(
        &mut self,
        store: &mut SegmentStore,
        sink: &mut S,
        now_ms: f64,
    ) -> EngineResult<ResizeOutcome> {
        let drag = match std::mem::take(&mut self.phase) {
            ResizePhase::Dragging(drag) => drag,
            other => {
                self.phase = other;
                return Err(EngineError::InvalidState("no resize in progress"));
            }
        };

        let bounds = drag.proposed_bounds();
        if bounds == drag.original {
            log::debug!("resize: segment {} released unchanged", drag.segment_id);
            return Ok(ResizeOutcome::Unchanged);
        }

        if bounds.duration_ms() < self.min_duration_ms {
            log::debug!(
                "resize: discarding segment {} at {}ms (minimum {}ms)",
                drag.segment_id,
                bounds.duration_ms(),
                self.min_duration_ms
            );
            return Err(EngineError::BoundaryViolation {
                segment_id: drag.segment_id,
                duration_ms: bounds.duration_ms(),
                min_ms: self.min_duration_ms,
            });
        }

        store.set_bounds(drag.segment_id, bounds)?;

        let edit = SegmentEdit::manual_stretch(drag.edge, bounds);
        log::info!(
            "resize: committing segment {} {:?} edge {}-{}",
            drag.segment_id,
            drag.edge,
            bounds.start_ms,
            bounds.end_ms
        );
        let reply = sink.commit_segment_edit(drag.segment_id, edit);

        self.phase = ResizePhase::Committing(PendingCommit {
            segment_id: drag.segment_id,
            previous: drag.original,
            committed: bounds,
            reply,
            issued_at_ms: now_ms,
        });
        Ok(ResizeOutcome::Committing(bounds))
    }

    /// Drop a live drag without committing
    ///
    /// An outstanding commit is left to resolve. Returns whether a drag was
    /// discarded.
    pub fn cancel(&mut self) -> bool {
        if let ResizePhase::Dragging(drag) = &self.phase {
            log::debug!("resize: cancelled drag on segment {}", drag.segment_id);
            self.phase = ResizePhase::Idle;
            true
        } else {
            false
        }
    }

    /// Check an outstanding commit
    ///
    /// Returns `None` while still waiting. On failure the store is reverted
    /// to the pre-drag bounds and [`EngineError::CommitFailure`] is returned.
    pub fn poll(&mut self, store: &mut SegmentStore, now_ms: f64) -> Option<EngineResult<CommittedEdit>> {
        let ResizePhase::Committing(pending) = &mut self.phase else {
            return None;
        };

        let result = match pending.reply.try_recv() {
            Ok(Ok(())) => Ok(()),
            Ok(Err(reason)) => Err(reason),
            Err(TryRecvError::Closed) => Err("mutation sink dropped the reply".to_string()),
            Err(TryRecvError::Empty) => {
                if now_ms - pending.issued_at_ms < self.commit_timeout_ms as f64 {
                    return None;
                }
                Err(format!("no response after {}ms", self.commit_timeout_ms))
            }
        };

        let ResizePhase::Committing(pending) = std::mem::take(&mut self.phase) else {
            return None;
        };

        match result {
            Ok(()) => {
                log::info!("resize: segment {} committed", pending.segment_id);
                Some(Ok(CommittedEdit {
                    segment_id: pending.segment_id,
                    bounds: pending.committed,
                }))
            }
            Err(reason) => {
                log::warn!(
                    "resize: commit of segment {} failed: {}, reverting",
                    pending.segment_id,
                    reason
                );
                if let Err(e) = store.set_bounds(pending.segment_id, pending.previous) {
                    log::warn!("resize: revert skipped: {}", e);
                }
                Some(Err(EngineError::CommitFailure {
                    segment_id: pending.segment_id,
                    reason,
                }))
            }
        }
    }

    /// Bounds to draw for `segment` and its role in the preview
    pub fn display_bounds(&self, segment: &Segment) -> (SegmentBounds, PreviewRole) {
        let Some(drag) = self.drag() else {
            return (segment.bounds(), PreviewRole::Normal);
        };

        if segment.id == drag.segment_id {
            return (drag.proposed_bounds(), PreviewRole::Dragging);
        }

        if drag.edge == Edge::End && drag.is_downstream(segment) {
            let delta = drag.proposed_bounds().end_ms - drag.original.end_ms;
            return (segment.bounds().shifted(delta), PreviewRole::Rippled);
        }

        (segment.bounds(), PreviewRole::Normal)
    }
}
