//! Dubline Core - Timeline engine for the dubbed-video editor
//!
//! Keeps a video clock, an audio clock and the transcript segments in
//! lockstep, resolves per-instant mute/solo routing, and handles direct
//! manipulation of segment boundaries (edge resize with ripple preview),
//! ruler scrubbing and waveform region selection.
//!
//! Everything is single-threaded and tick driven. The host forwards clock
//! notifications, pointer events and one `on_frame` call per event-loop turn
//! to [`TimelineEngine`], then drains [`TimelineEvent`]s and paints the
//! declarative [`layout::TimelineLayout`] through a [`layout::Renderer`].

pub mod collab;
pub mod config;
pub mod coords;
pub mod edit;
pub mod engine;
pub mod error;
pub mod layout;
pub mod routing;
pub mod scrub;
pub mod selection;
pub mod sync;
pub mod tracks;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{Gesture, TimelineEngine, TimelineEvent};
pub use error::{EngineError, EngineResult};
pub use types::*;
