//! `Renderer` implementation over an iced canvas frame

use dubline_core::layout::{DrawCommand, Renderer, RULER_HEIGHT};
use iced::alignment::{Horizontal, Vertical};
use iced::widget::canvas::{Frame, Path, Stroke, Text};
use iced::{Color, Point, Size};

use crate::theme::{
    segment_color, BACKGROUND_COLOR, LABEL_COLOR, LANE_COLORS, MIXED_LANE_COLOR, MUTED_LABEL_COLOR,
    PLAYHEAD_COLOR, RULER_COLOR, SELECTION_COLOR, SOLO_COLOR, TICK_COLOR,
};

/// Segments narrower than this get no text
const MIN_TEXT_WIDTH: f32 = 24.0;

/// Rough glyph width used to clip segment text
const CHAR_WIDTH: f32 = 6.5;

/// Paints draw commands into a canvas frame
pub struct FrameRenderer<'a> {
    frame: &'a mut Frame,
    /// `(y, height, muted)` of every lane drawn so far
    lanes: Vec<(f64, f64, bool)>,
}

impl<'a> FrameRenderer<'a> {
    pub fn new(frame: &'a mut Frame) -> Self {
        Self {
            frame,
            lanes: Vec::new(),
        }
    }

    fn lane_muted(&self, y: f64) -> bool {
        self.lanes
            .iter()
            .find(|(lane_y, height, _)| y >= *lane_y && y < lane_y + height)
            .is_some_and(|(_, _, muted)| *muted)
    }
}

impl Renderer for FrameRenderer<'_> {
    fn draw(&mut self, command: DrawCommand) {
        match command {
            DrawCommand::Clear { width, height } => {
                self.lanes.clear();
                self.frame.fill_rectangle(
                    Point::ORIGIN,
                    Size::new(width as f32, height as f32),
                    BACKGROUND_COLOR,
                );
                self.frame.fill_rectangle(
                    Point::ORIGIN,
                    Size::new(width as f32, RULER_HEIGHT as f32),
                    RULER_COLOR,
                );
            }

            DrawCommand::Lane {
                index,
                y,
                height,
                name,
                muted,
                soloed,
                is_mixed,
            } => {
                self.lanes.push((y, height, muted));
                let background = if is_mixed {
                    MIXED_LANE_COLOR
                } else {
                    LANE_COLORS[index % LANE_COLORS.len()]
                };
                let width = self.frame.width();
                self.frame
                    .fill_rectangle(Point::new(0.0, y as f32), Size::new(width, height as f32), background);

                let color = if soloed {
                    SOLO_COLOR
                } else if muted {
                    MUTED_LABEL_COLOR
                } else {
                    LABEL_COLOR
                };
                self.frame.fill_text(Text {
                    content: name,
                    position: Point::new(6.0, y as f32 + 10.0),
                    size: 11.0.into(),
                    color,
                    align_x: Horizontal::Left.into(),
                    align_y: Vertical::Center.into(),
                    ..Text::default()
                });
            }

            DrawCommand::Segment {
                x,
                y,
                width,
                height,
                color_index,
                role,
                text,
                ..
            } => {
                let muted = self.lane_muted(y);
                let (x, y, width, height) = (x as f32, y as f32, width as f32, height as f32);
                self.frame.fill(
                    &Path::rectangle(Point::new(x, y), Size::new(width, height)),
                    segment_color(color_index, role, muted),
                );

                if width >= MIN_TEXT_WIDTH && !text.is_empty() {
                    let max_chars = ((width - 8.0) / CHAR_WIDTH).max(0.0) as usize;
                    let content: String = if text.chars().count() > max_chars {
                        text.chars().take(max_chars.saturating_sub(1)).chain(['…']).collect()
                    } else {
                        text
                    };
                    self.frame.fill_text(Text {
                        content,
                        position: Point::new(x + 4.0, y + height / 2.0),
                        size: 11.0.into(),
                        color: Color::WHITE,
                        align_x: Horizontal::Left.into(),
                        align_y: Vertical::Center.into(),
                        ..Text::default()
                    });
                }
            }

            DrawCommand::Tick { x, is_major, label } => {
                let x = x as f32;
                let ruler = RULER_HEIGHT as f32;
                let tick_height = if is_major { ruler * 0.5 } else { ruler * 0.25 };
                self.frame.stroke(
                    &Path::line(Point::new(x, ruler - tick_height), Point::new(x, ruler)),
                    Stroke::default().with_color(TICK_COLOR).with_width(1.0),
                );
                if let Some(label) = label {
                    self.frame.fill_text(Text {
                        content: label,
                        position: Point::new(x + 3.0, ruler * 0.3),
                        size: 10.0.into(),
                        color: LABEL_COLOR,
                        align_x: Horizontal::Left.into(),
                        align_y: Vertical::Center.into(),
                        ..Text::default()
                    });
                }
            }

            DrawCommand::Selection { x, y, width, height } => {
                self.frame.fill_rectangle(
                    Point::new(x as f32, y as f32),
                    Size::new(width as f32, height as f32),
                    SELECTION_COLOR,
                );
            }

            DrawCommand::Playhead { x, height } => {
                let x = x as f32;
                self.frame.stroke(
                    &Path::line(Point::new(x, 0.0), Point::new(x, height as f32)),
                    Stroke::default().with_color(PLAYHEAD_COLOR).with_width(2.0),
                );
            }
        }
    }
}
