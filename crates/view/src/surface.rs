//! Drawing surface capability
//!
//! Every renderer in this crate draws through the [`Surface`] trait so the
//! layout logic can be exercised without a real display. Two implementations
//! ship with the crate: [`RecordingSurface`], which keeps a list of
//! [`DrawCommand`]s for assertions, and [`crate::raster::RasterSurface`],
//! which rasterizes into an RGB image that can be written out as PNG.

use glam::Vec2;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb::hex(0xffffff);
    pub const BLACK: Rgb = Rgb::hex(0x000000);

    /// Build a color from a `0xRRGGBB` literal.
    #[must_use]
    pub const fn hex(value: u32) -> Self {
        Self(
            ((value >> 16) & 0xff) as u8,
            ((value >> 8) & 0xff) as u8,
            (value & 0xff) as u8,
        )
    }
}

/// Axis-aligned rectangle in surface pixels, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.w
            && point.y >= self.y
            && point.y <= self.y + self.h
    }
}

/// Minimal set of drawing primitives the renderers rely on.
pub trait Surface {
    /// Width and height of the drawable area in pixels.
    fn size(&self) -> Vec2;

    /// Erase everything drawn so far.
    fn clear(&mut self);

    fn fill_rect(&mut self, rect: Rect, color: Rgb);

    /// One pixel outline of `rect`.
    fn stroke_rect(&mut self, rect: Rect, color: Rgb);

    /// Draw `text` with its baseline starting at `at`; `px` is the font size.
    fn draw_text(&mut self, text: &str, at: Vec2, px: f32, color: Rgb);

    /// Stroke a polyline through `points`.
    fn draw_line(&mut self, points: &[Vec2], width: f32, color: Rgb);

    /// Filled full circle.
    fn draw_arc(&mut self, center: Vec2, radius: f32, color: Rgb);
}

/// A single recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect { rect: Rect, color: Rgb },
    StrokeRect { rect: Rect, color: Rgb },
    Text { text: String, at: Vec2, px: f32, color: Rgb },
    Line { points: Vec<Vec2>, width: f32, color: Rgb },
    Arc { center: Vec2, radius: f32, color: Rgb },
}

/// Surface that records draw calls instead of producing pixels.
///
/// `clear` drops everything recorded so far, mirroring a cleared canvas: after
/// a redraw only the commands of the latest frame remain.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: f32,
    height: f32,
    commands: Vec<DrawCommand>,
    clears: usize,
}

impl RecordingSurface {
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
            clears: 0,
        }
    }

    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of times the surface has been cleared.
    #[must_use]
    pub fn clear_count(&self) -> usize {
        self.clears
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.commands.is_empty()
    }

    /// All text drawn since the last clear, in draw order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Centers of all circles drawn since the last clear.
    #[must_use]
    pub fn arc_centers(&self) -> Vec<Vec2> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Arc { center, .. } => Some(*center),
                _ => None,
            })
            .collect()
    }

    /// Filled rectangles drawn with `color`.
    #[must_use]
    pub fn filled_with(&self, color: Rgb) -> Vec<Rect> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::FillRect { rect, color: c } if *c == color => Some(*rect),
                _ => None,
            })
            .collect()
    }

    /// Polylines drawn since the last clear.
    #[must_use]
    pub fn lines(&self) -> Vec<&[Vec2]> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Line { points, .. } => Some(points.as_slice()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.clears += 1;
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Rgb) {
        self.commands.push(DrawCommand::StrokeRect { rect, color });
    }

    fn draw_text(&mut self, text: &str, at: Vec2, px: f32, color: Rgb) {
        self.commands.push(DrawCommand::Text {
            text: text.to_owned(),
            at,
            px,
            color,
        });
    }

    fn draw_line(&mut self, points: &[Vec2], width: f32, color: Rgb) {
        self.commands.push(DrawCommand::Line {
            points: points.to_vec(),
            width,
            color,
        });
    }

    fn draw_arc(&mut self, center: Vec2, radius: f32, color: Rgb) {
        self.commands.push(DrawCommand::Arc {
            center,
            radius,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_splits_channels() {
        assert_eq!(Rgb::hex(0x4caf50), Rgb(0x4c, 0xaf, 0x50));
    }

    #[test]
    fn clear_drops_recorded_commands() {
        let mut surface = RecordingSurface::new(100.0, 100.0);
        surface.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Rgb::WHITE);
        surface.draw_text("G", Vec2::new(1.0, 1.0), 12.0, Rgb::BLACK);
        assert_eq!(surface.commands().len(), 2);

        surface.clear();
        assert!(surface.is_blank());
        assert_eq!(surface.clear_count(), 1);
    }
}
