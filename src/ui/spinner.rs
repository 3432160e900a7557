//! Looping loading animation
//! Draws a rotating arc over a faint track while a fetch is in flight
use iced::widget::canvas::{self, path::Arc, Path, Stroke};
use iced::{Color, Point, Radians, Rectangle};
use std::f32::consts::{PI, TAU};

use crate::Message;

/// Spinner state: just the current rotation
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Spinner {
    /// Start angle of the arc in radians, always in [0, TAU)
    pub rotation: f32,
}

impl Spinner {
    /// Radians advanced per animation tick
    pub const STEP: f32 = 0.18;

    /// Advance one animation frame
    pub fn advance(&mut self) {
        self.rotation = (self.rotation + Self::STEP) % TAU;
    }
}

impl canvas::Program<Message> for Spinner {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &iced::Renderer,
        _theme: &iced::Theme,
        bounds: Rectangle,
        _cursor: iced::mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        let center = Point::new(bounds.width / 2.0, bounds.height / 2.0);
        let radius = bounds.width.min(bounds.height) * 0.15;
        let width = (radius * 0.2).max(2.0);

        if radius < 1.0 {
            return vec![frame.into_geometry()];
        }

        // Full circle track
        let track = Path::circle(center, radius);
        frame.stroke(
            &track,
            Stroke::default()
                .with_color(Color::from_rgba(1.0, 1.0, 1.0, 0.15))
                .with_width(width),
        );

        // Three quarters of a turn, rotating
        let arc = Path::new(|builder| {
            builder.arc(Arc {
                center,
                radius,
                start_angle: Radians(self.rotation),
                end_angle: Radians(self.rotation + 1.5 * PI),
            });
        });
        frame.stroke(
            &arc,
            Stroke::default()
                .with_color(Color::from_rgb(0.96, 0.65, 0.14))
                .with_width(width),
        );

        vec![frame.into_geometry()]
    }
}
