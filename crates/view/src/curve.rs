//! Learning curve chart

use glam::Vec2;

use crate::geometry::normalize;
use crate::surface::{Rect, Rgb, Surface};

const PADDING: f32 = 40.0;
const AXIS: Rgb = Rgb::hex(0x333333);
const SERIES: Rgb = Rgb::hex(0x667eea);
const PLACEHOLDER_FILL: Rgb = Rgb::hex(0xeeeeee);
const PLACEHOLDER_TEXT: Rgb = Rgb::hex(0x999999);

/// Pixel positions of `curve` on a chart of `size`.
///
/// x spans `[0, n-1]` over the plot width, y spans `[min, max]` over the plot
/// height with larger values higher up. A single sample sits on the y axis.
#[must_use]
pub fn plot_points(curve: &[f64], size: Vec2) -> Vec<Vec2> {
    let plot = size - Vec2::splat(PADDING * 2.0);
    let range = normalize(curve);
    let last = curve.len().saturating_sub(1).max(1) as f32;

    curve
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let x = PADDING + (i as f32 / last) * plot.x;
            let y = size.y - PADDING - ((value - range.min) / range.range) as f32 * plot.y;
            Vec2::new(x, y)
        })
        .collect()
}

/// Redraw the learning curve. Empty input leaves the surface untouched.
pub fn render_curve<S: Surface + ?Sized>(curve: &[f64], surface: &mut S) {
    if curve.is_empty() {
        return;
    }
    let size = surface.size();
    surface.clear();

    surface.draw_line(
        &[
            Vec2::new(PADDING, PADDING),
            Vec2::new(PADDING, size.y - PADDING),
            Vec2::new(size.x - PADDING, size.y - PADDING),
        ],
        1.0,
        AXIS,
    );
    surface.draw_line(&plot_points(curve, size), 2.0, SERIES);

    surface.draw_text("Iterations", Vec2::new(size.x / 2.0 - 30.0, size.y - 5.0), 12.0, AXIS);
    surface.draw_text("Value", Vec2::new(4.0, size.y / 2.0), 12.0, AXIS);
}

/// Grey panel shown before any training run.
pub fn render_curve_placeholder<S: Surface + ?Sized>(surface: &mut S) {
    let size = surface.size();
    surface.clear();
    surface.fill_rect(Rect::new(0.0, 0.0, size.x, size.y), PLACEHOLDER_FILL);
    surface.draw_text(
        "Train to see progress",
        Vec2::new(size.x * 0.25, size.y * 0.5),
        14.0,
        PLACEHOLDER_TEXT,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_fill_the_plot_area() {
        let points = plot_points(&[1.0, 2.0, 3.0], Vec2::new(480.0, 280.0));
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], Vec2::new(40.0, 240.0));
        assert_eq!(points[1], Vec2::new(240.0, 140.0));
        assert_eq!(points[2], Vec2::new(440.0, 40.0));
    }

    #[test]
    fn flat_curve_sits_on_the_x_axis() {
        let points = plot_points(&[5.0, 5.0], Vec2::new(480.0, 280.0));
        assert!(points.iter().all(|p| p.y == 240.0));
    }

    #[test]
    fn single_sample_is_finite() {
        let points = plot_points(&[2.0], Vec2::new(480.0, 280.0));
        assert_eq!(points, vec![Vec2::new(40.0, 240.0)]);
    }
}
