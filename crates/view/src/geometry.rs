//! Grid geometry and value color mapping
//!
//! Pure helpers shared by the environment and value renderers. Both index
//! states the same way, `index = row * width + col`, through [`GridShape`].

use glam::Vec2;

use crate::environment::Cell;
use crate::surface::{Rect, Rgb};

/// Blue channel of the value color ramp.
const RAMP_BLUE: u8 = 100;

/// Dimensions of a row-major grid of states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    pub width: usize,
    pub height: usize,
}

impl GridShape {
    #[must_use]
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub const fn square(size: usize) -> Self {
        Self::new(size, size)
    }

    /// Number of states in the grid.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.width * self.height
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat state index of `cell`.
    #[must_use]
    pub const fn index(&self, cell: Cell) -> usize {
        cell.row * self.width + cell.col
    }

    #[must_use]
    pub const fn contains(&self, cell: Cell) -> bool {
        cell.row < self.height && cell.col < self.width
    }

    /// Every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.height).flat_map(move |row| (0..self.width).map(move |col| Cell::new(row, col)))
    }

    /// Pixel size of one cell when the grid fills `surface`.
    #[must_use]
    pub fn cell_size(&self, surface: Vec2) -> Vec2 {
        Vec2::new(
            surface.x / self.width.max(1) as f32,
            surface.y / self.height.max(1) as f32,
        )
    }
}

/// Rectangle covered by the cell at `(row, col)`.
#[must_use]
pub fn cell_rect(row: usize, col: usize, cell_w: f32, cell_h: f32) -> Rect {
    Rect::new(col as f32 * cell_w, row as f32 * cell_h, cell_w, cell_h)
}

/// Extent of a value array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
    /// `max - min`, or `1.0` when the values are flat.
    pub range: f64,
}

impl ValueRange {
    /// Position of `value` inside the range, clamped to `0.0..=1.0`.
    #[must_use]
    pub fn unit(&self, value: f64) -> f64 {
        ((value - self.min) / self.range).clamp(0.0, 1.0)
    }
}

/// Compute min, max and a division-safe range of `values`.
///
/// A flat (or empty) array gets a range of 1 so it maps to a single color
/// instead of dividing by zero.
#[must_use]
pub fn normalize(values: &[f64]) -> ValueRange {
    if values.is_empty() {
        return ValueRange {
            min: 0.0,
            max: 0.0,
            range: 1.0,
        };
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let spread = max - min;
    let range = if spread == 0.0 || !spread.is_finite() { 1.0 } else { spread };
    ValueRange { min, max, range }
}

/// Red to green ramp over the normalized value, blue fixed.
#[must_use]
pub fn color_for(value: f64, min: f64, range: f64) -> Rgb {
    let unit = ((value - min) / range).clamp(0.0, 1.0);
    let red = ((1.0 - unit) * 255.0).floor() as u8;
    let green = (unit * 255.0).floor() as u8;
    Rgb(red, green, RAMP_BLUE)
}
