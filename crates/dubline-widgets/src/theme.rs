//! Timeline colors

use dubline_core::edit::PreviewRole;
use iced::Color;

pub const BACKGROUND_COLOR: Color = Color::from_rgb(0.08, 0.08, 0.1);

pub const RULER_COLOR: Color = Color::from_rgb(0.12, 0.12, 0.15);

/// Alternating lane backgrounds
pub const LANE_COLORS: [Color; 2] = [
    Color::from_rgb(0.10, 0.10, 0.13),
    Color::from_rgb(0.13, 0.13, 0.16),
];

/// Mixed/waveform lane background
pub const MIXED_LANE_COLOR: Color = Color::from_rgb(0.09, 0.12, 0.14);

/// Alternating segment fills along a lane
pub const SEGMENT_COLORS: [Color; 2] = [
    Color::from_rgb(0.25, 0.55, 0.85),
    Color::from_rgb(0.35, 0.45, 0.80),
];

/// Segment being dragged
pub const DRAGGING_COLOR: Color = Color::from_rgb(0.95, 0.65, 0.2);

pub const TICK_COLOR: Color = Color::from_rgb(0.5, 0.5, 0.55);

pub const LABEL_COLOR: Color = Color::from_rgb(0.85, 0.85, 0.9);

pub const MUTED_LABEL_COLOR: Color = Color::from_rgb(0.45, 0.45, 0.5);

pub const SOLO_COLOR: Color = Color::from_rgb(1.0, 0.8, 0.2);

pub const SELECTION_COLOR: Color = Color::from_rgba(0.3, 0.7, 1.0, 0.25);

pub const PLAYHEAD_COLOR: Color = Color::from_rgb(1.0, 0.3, 0.3);

/// Fill for a segment rectangle
pub fn segment_color(color_index: usize, role: PreviewRole, muted: bool) -> Color {
    let base = match role {
        PreviewRole::Dragging => DRAGGING_COLOR,
        _ => SEGMENT_COLORS[color_index % SEGMENT_COLORS.len()],
    };
    let alpha = match (role, muted) {
        (_, true) => 0.35,
        (PreviewRole::Rippled, false) => 0.6,
        _ => 1.0,
    };
    Color { a: alpha, ..base }
}
