//! Timeline view function
//!
//! ```ignore
//! fn view(&self) -> Element<Message> {
//!     timeline_view(
//!         &self.timeline_layout,
//!         self.engine.wants_pointer_capture(),
//!         Message::Timeline,
//!     )
//! }
//!
//! // in update:
//! Message::Timeline(interaction) => apply_interaction(&mut self.engine, interaction),
//! ```

use dubline_core::layout::TimelineLayout;
use iced::widget::Canvas;
use iced::{Element, Length};

use crate::canvas::TimelineCanvas;
use crate::interaction::TimelineInteraction;

/// Create the timeline canvas element
///
/// The layout should be recomputed with `TimelineEngine::layout` whenever
/// the engine's state changes.
pub fn timeline_view<'a, Message>(
    layout: &'a TimelineLayout,
    capture: bool,
    on_interaction: impl Fn(TimelineInteraction) -> Message + 'a,
) -> Element<'a, Message>
where
    Message: Clone + 'a,
{
    Canvas::new(TimelineCanvas {
        layout,
        capture,
        on_interaction,
    })
    .width(Length::Fill)
    .height(Length::Fixed(layout.height as f32))
    .into()
}
