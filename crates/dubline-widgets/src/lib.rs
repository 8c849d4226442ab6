//! Dubline Widgets - iced canvas backend for the timeline engine
//!
//! Follows the usual iced 0.14 split:
//!
//! - **View function**: [`timeline_view`] takes a computed
//!   [`TimelineLayout`](dubline_core::layout::TimelineLayout) and a callback,
//!   returns an `Element<Message>`
//! - **Canvas Program**: [`TimelineCanvas`] paints the layout through
//!   [`FrameRenderer`] and turns mouse events into [`TimelineInteraction`]s
//! - **Dispatch**: [`apply_interaction`] feeds an interaction back into a
//!   [`TimelineEngine`](dubline_core::TimelineEngine) from the app's update

pub mod backend;
pub mod canvas;
pub mod interaction;
pub mod theme;
pub mod view;

pub use backend::FrameRenderer;
pub use canvas::TimelineCanvas;
pub use interaction::{apply_interaction, TimelineInteraction};
pub use view::timeline_view;
