//! Canvas Program for the timeline
//!
//! Paints a precomputed [`TimelineLayout`] and translates mouse events into
//! [`TimelineInteraction`]s through a callback closure.
//!
//! Presses are only taken inside the canvas. While `capture` is set (the
//! engine has a live gesture) moves and releases are forwarded from anywhere
//! in the window, so a drag released outside the canvas still ends cleanly.

use dubline_core::layout::{render, HitTarget, TimelineLayout};
use iced::widget::canvas::{self, Event, Frame, Geometry, Program};
use iced::{mouse, Rectangle, Theme};

use crate::backend::FrameRenderer;
use crate::interaction::TimelineInteraction;

/// Pixels scrolled per wheel line
const SCROLL_LINE_PX: f64 = 40.0;

pub struct TimelineCanvas<'a, F> {
    pub layout: &'a TimelineLayout,
    /// Engine wants window-level move/release events
    pub capture: bool,
    pub on_interaction: F,
}

impl<Message, F> Program<Message> for TimelineCanvas<'_, F>
where
    Message: Clone,
    F: Fn(TimelineInteraction) -> Message,
{
    type State = ();

    fn update(
        &self,
        _state: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        let interaction = match event {
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let position = cursor.position_in(bounds)?;
                TimelineInteraction::Pressed {
                    x: position.x as f64,
                    y: position.y as f64,
                }
            }
            Event::Mouse(mouse::Event::CursorMoved { position }) if self.capture => {
                TimelineInteraction::Moved {
                    x: (position.x - bounds.x) as f64,
                }
            }
            Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) if self.capture => {
                TimelineInteraction::Released
            }
            Event::Mouse(mouse::Event::CursorLeft) if self.capture => TimelineInteraction::Released,
            Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                cursor.position_in(bounds)?;
                let delta_px = match delta {
                    mouse::ScrollDelta::Lines { x, y } => {
                        let lines = if *x != 0.0 { *x } else { *y };
                        -(lines as f64) * SCROLL_LINE_PX
                    }
                    mouse::ScrollDelta::Pixels { x, y } => {
                        let px = if *x != 0.0 { *x } else { *y };
                        -(px as f64)
                    }
                };
                TimelineInteraction::Scrolled { delta_px }
            }
            _ => return None,
        };

        Some(canvas::Action::publish((self.on_interaction)(interaction)))
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if self.capture {
            return mouse::Interaction::Grabbing;
        }
        let Some(position) = cursor.position_in(bounds) else {
            return mouse::Interaction::default();
        };
        match self.layout.hit_test(position.x as f64, position.y as f64) {
            HitTarget::ResizeHandle { .. } => mouse::Interaction::ResizingHorizontally,
            HitTarget::Ruler | HitTarget::Segment(_) => mouse::Interaction::Pointer,
            HitTarget::Waveform => mouse::Interaction::Crosshair,
            HitTarget::Empty => mouse::Interaction::default(),
        }
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &iced::Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        render(self.layout, &mut FrameRenderer::new(&mut frame));
        vec![frame.into_geometry()]
    }
}
