//! Pixel surface backed by an `image` buffer
//!
//! Used by the command-line front end to write the environment, value and
//! chart panels out as PNG files. Shapes are rasterized by plotters'
//! [`BitMapBackend`] straight into the image buffer. Text uses a built-in 3x5
//! bitmap font scaled to the requested size, painted through the same backend;
//! the arrows and other non-ASCII glyphs fall back to a box.

use std::path::Path;

use glam::Vec2;
use image::{ImageFormat, Rgb as Pixel, RgbImage};
use plotters::style::{Color, RGBColor, ShapeStyle};
use plotters_backend::{BackendCoord, DrawingBackend, DrawingErrorKind};
use plotters_bitmap::{BitMapBackend, BitMapBackendError};
use thiserror::Error;

use crate::surface::{Rect, Rgb, Surface};

const GLYPH_ROWS: usize = 5;
const GLYPH_COLS: usize = 3;

type DrawResult = Result<(), DrawingErrorKind<BitMapBackendError>>;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),
}

pub struct RasterSurface {
    image: RgbImage,
    background: Rgb,
}

impl RasterSurface {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_background(width, height, Rgb::WHITE)
    }

    #[must_use]
    pub fn with_background(width: u32, height: u32, background: Rgb) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, to_pixel(background)),
            background,
        }
    }

    #[must_use]
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Color at `(x, y)`, `None` outside the image.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        self.image
            .get_pixel_checked(x, y)
            .map(|Pixel([r, g, b])| Rgb(*r, *g, *b))
    }

    /// Write the current contents as a PNG file.
    ///
    /// # Errors
    ///
    /// Propagates encoding and I/O failures from the `image` crate.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), RasterError> {
        self.image.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }

    /// Run `draw` against a bitmap backend over the image buffer.
    ///
    /// Backend errors are logged; the surface keeps whatever was drawn.
    fn paint<F>(&mut self, draw: F)
    where
        F: FnOnce(&mut BitMapBackend<'_>) -> DrawResult,
    {
        let size = self.image.dimensions();
        let mut backend = BitMapBackend::with_buffer(&mut self.image, size);
        if let Err(err) = draw(&mut backend).and_then(|()| backend.present()) {
            tracing::warn!(error = %err, "raster draw failed");
        }
    }
}

impl Surface for RasterSurface {
    fn size(&self) -> Vec2 {
        Vec2::new(self.image.width() as f32, self.image.height() as f32)
    }

    fn clear(&mut self) {
        let (w, h) = self.image.dimensions();
        let fill = solid(self.background);
        self.paint(|backend| {
            backend.draw_rect((0, 0), (w as i32 - 1, h as i32 - 1), &fill, true)
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        let Some((upper_left, bottom_right)) = corners(rect) else {
            return;
        };
        let fill = solid(color);
        self.paint(|backend| backend.draw_rect(upper_left, bottom_right, &fill, true));
    }

    fn stroke_rect(&mut self, rect: Rect, color: Rgb) {
        let Some((upper_left, bottom_right)) = corners(rect) else {
            return;
        };
        let stroke = outline(color, 1.0);
        self.paint(|backend| backend.draw_rect(upper_left, bottom_right, &stroke, false));
    }

    fn draw_text(&mut self, text: &str, at: Vec2, px: f32, color: Rgb) {
        let scale = (px / 7.0).round().max(1.0) as i32;
        let top = at.y.round() as i32 - GLYPH_ROWS as i32 * scale;
        let left = at.x.round() as i32;
        let fill = solid(color);
        self.paint(|backend| {
            for (i, ch) in text.chars().enumerate() {
                let origin = left + i as i32 * (GLYPH_COLS as i32 + 1) * scale;
                for (row, bits) in glyph_bits(ch).iter().enumerate() {
                    for col in 0..GLYPH_COLS {
                        if (bits >> (GLYPH_COLS - 1 - col)) & 1 == 1 {
                            let x = origin + col as i32 * scale;
                            let y = top + row as i32 * scale;
                            backend.draw_rect((x, y), (x + scale - 1, y + scale - 1), &fill, true)?;
                        }
                    }
                }
            }
            Ok(())
        });
    }

    fn draw_line(&mut self, points: &[Vec2], width: f32, color: Rgb) {
        if points.len() < 2 {
            return;
        }
        let stroke = outline(color, width);
        let path: Vec<BackendCoord> = points.iter().copied().map(coord).collect();
        self.paint(|backend| backend.draw_path(path, &stroke));
    }

    fn draw_arc(&mut self, center: Vec2, radius: f32, color: Rgb) {
        let fill = solid(color);
        let radius = radius.round().max(1.0) as u32;
        self.paint(|backend| backend.draw_circle(coord(center), radius, &fill, true));
    }
}

fn coord(point: Vec2) -> BackendCoord {
    (point.x.round() as i32, point.y.round() as i32)
}

/// Inclusive pixel corners of `rect`, `None` when it covers no pixel.
fn corners(rect: Rect) -> Option<(BackendCoord, BackendCoord)> {
    let (x0, y0) = coord(Vec2::new(rect.x, rect.y));
    let (x1, y1) = coord(Vec2::new(rect.x + rect.w, rect.y + rect.h));
    (x1 > x0 && y1 > y0).then_some(((x0, y0), (x1 - 1, y1 - 1)))
}

fn solid(color: Rgb) -> ShapeStyle {
    to_rgb(color).filled()
}

fn outline(color: Rgb, width: f32) -> ShapeStyle {
    to_rgb(color).stroke_width(width.round().max(1.0) as u32)
}

fn to_rgb(color: Rgb) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

fn to_pixel(color: Rgb) -> Pixel<u8> {
    Pixel([color.0, color.1, color.2])
}

/// Rows of a 3x5 glyph, most significant bit on the left.
fn glyph_bits(ch: char) -> [u8; GLYPH_ROWS] {
    match ch.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b110, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'Q' => [0b111, 0b101, 0b101, 0b111, 0b011],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        ' ' => [0b000; GLYPH_ROWS],
        _ => [0b111, 0b101, 0b101, 0b101, 0b111],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_rect_paints_inside_only() {
        let mut surface = RasterSurface::new(10, 10);
        surface.fill_rect(Rect::new(2.0, 2.0, 3.0, 3.0), Rgb(255, 0, 0));
        assert_eq!(surface.pixel(3, 3), Some(Rgb(255, 0, 0)));
        assert_eq!(surface.pixel(5, 5), Some(Rgb::WHITE));
        assert_eq!(surface.pixel(10, 10), None);
    }

    #[test]
    fn clear_restores_background() {
        let mut surface = RasterSurface::new(4, 4);
        surface.draw_arc(Vec2::new(2.0, 2.0), 2.0, Rgb::BLACK);
        assert_eq!(surface.pixel(2, 2), Some(Rgb::BLACK));
        surface.clear();
        assert_eq!(surface.pixel(2, 2), Some(Rgb::WHITE));
    }

    #[test]
    fn shapes_outside_the_image_are_clipped() {
        let mut surface = RasterSurface::new(4, 4);
        surface.fill_rect(Rect::new(-10.0, -10.0, 100.0, 100.0), Rgb::BLACK);
        surface.draw_line(&[Vec2::new(-5.0, -5.0), Vec2::new(20.0, 20.0)], 3.0, Rgb::BLACK);
        assert_eq!(surface.pixel(0, 0), Some(Rgb::BLACK));
    }

    #[test]
    fn stroke_rect_leaves_the_inside_empty() {
        let mut surface = RasterSurface::new(10, 10);
        surface.stroke_rect(Rect::new(1.0, 1.0, 6.0, 6.0), Rgb::BLACK);
        assert_eq!(surface.pixel(1, 1), Some(Rgb::BLACK));
        assert_eq!(surface.pixel(6, 3), Some(Rgb::BLACK));
        assert_eq!(surface.pixel(3, 3), Some(Rgb::WHITE));
        assert_eq!(surface.pixel(7, 7), Some(Rgb::WHITE));
    }

    #[test]
    fn wide_lines_cover_their_width() {
        let mut surface = RasterSurface::new(12, 12);
        surface.draw_line(&[Vec2::new(1.0, 5.0), Vec2::new(10.0, 5.0)], 3.0, Rgb::BLACK);
        assert_eq!(surface.pixel(5, 5), Some(Rgb::BLACK));
        assert_eq!(surface.pixel(5, 4), Some(Rgb::BLACK));
        assert_eq!(surface.pixel(5, 10), Some(Rgb::WHITE));
    }

    #[test]
    fn text_lands_above_the_baseline() {
        let mut surface = RasterSurface::new(20, 20);
        surface.draw_text("1", Vec2::new(0.0, 10.0), 7.0, Rgb::BLACK);
        assert_eq!(surface.pixel(1, 5), Some(Rgb::BLACK));
        assert_eq!(surface.pixel(1, 11), Some(Rgb::WHITE));
    }
}
