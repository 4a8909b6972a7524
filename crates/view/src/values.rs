//! Value function renderer
//!
//! Grid environments get a heat map indexed exactly like the environment
//! renderer. Other environments have no spatial encoding for an arbitrary
//! length array, so they get min/max/mean instead.

use glam::Vec2;

use crate::environment::{EnvironmentDescriptor, Layout};
use crate::geometry::{cell_rect, color_for, normalize};
use crate::surface::{Rect, Rgb, Surface};

const TEXT: Rgb = Rgb::hex(0x333333);
const PLACEHOLDER_FILL: Rgb = Rgb::hex(0xeeeeee);
const PLACEHOLDER_TEXT: Rgb = Rgb::hex(0x999999);
const GRID_LINE: Rgb = Rgb::hex(0xcccccc);

/// Min, max and mean of a value array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl ValueSummary {
    #[must_use]
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let range = normalize(values);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        Some(Self {
            min: range.min,
            max: range.max,
            mean,
        })
    }
}

/// Decimal places for the per-cell labels. Wide cliff grids get integers.
#[must_use]
pub fn label_precision(layout: &Layout) -> usize {
    match layout {
        Layout::CliffWalking(_) => 0,
        _ => 1,
    }
}

/// Redraw the value function for `descriptor`.
pub fn render_values<S: Surface + ?Sized>(
    values: &[f64],
    descriptor: &EnvironmentDescriptor,
    surface: &mut S,
) {
    if values.is_empty() {
        render_value_placeholder(surface);
        return;
    }
    surface.clear();

    let Some(shape) = descriptor.layout.grid_shape() else {
        draw_summary(values, surface);
        return;
    };

    if values.len() != shape.len() {
        tracing::warn!(
            values = values.len(),
            cells = shape.len(),
            "value array does not cover the grid, missing cells are left blank"
        );
    }

    let precision = label_precision(&descriptor.layout);
    let (px, inset) = if precision == 0 { (10.0, 2.0) } else { (12.0, 5.0) };
    let range = normalize(values);
    let cell = shape.cell_size(surface.size());

    for at in shape.cells() {
        let Some(value) = values.get(shape.index(at)).copied() else {
            continue;
        };
        let rect = cell_rect(at.row, at.col, cell.x, cell.y);
        surface.fill_rect(rect, color_for(value, range.min, range.range));
        surface.stroke_rect(rect, GRID_LINE);
        surface.draw_text(
            &format!("{value:.precision$}"),
            Vec2::new(rect.x + inset, rect.y + cell.y / 2.0),
            px,
            Rgb::BLACK,
        );
    }
}

fn draw_summary<S: Surface + ?Sized>(values: &[f64], surface: &mut S) {
    surface.draw_text("Value function visualization", Vec2::new(10.0, 30.0), 14.0, TEXT);
    surface.draw_text("not available for this env", Vec2::new(10.0, 50.0), 14.0, TEXT);

    let Some(summary) = ValueSummary::of(values) else {
        return;
    };
    let lines = [
        format!("Min: {:.2}", summary.min),
        format!("Max: {:.2}", summary.max),
        format!("Avg: {:.2}", summary.mean),
    ];
    for (i, line) in lines.iter().enumerate() {
        surface.draw_text(line, Vec2::new(10.0, 80.0 + 20.0 * i as f32), 14.0, TEXT);
    }
}

/// Grey panel shown before any training result exists.
pub fn render_value_placeholder<S: Surface + ?Sized>(surface: &mut S) {
    let size = surface.size();
    surface.clear();
    surface.fill_rect(Rect::new(0.0, 0.0, size.x, size.y), PLACEHOLDER_FILL);
    surface.draw_text(
        "Train to see value function",
        Vec2::new(size.x * 0.3, size.y * 0.5),
        14.0,
        PLACEHOLDER_TEXT,
    );
}
