//! Environment renderer
//!
//! [`render_environment`] redraws the active environment from scratch on
//! every call. The drawing is a pure function of the descriptor: the static
//! layout comes from [`Layout`], the agent from the descriptor's state.

use glam::Vec2;

use crate::environment::{
    CartLayout, Cell, CliffLayout, EnvironmentDescriptor, GridLayout, HillLayout, Layout,
    StateValue,
};
use crate::geometry::{cell_rect, GridShape};
use crate::surface::{Rect, Rgb, Surface};

pub mod palette {
    use crate::surface::Rgb;

    pub const FLOOR: Rgb = Rgb::WHITE;
    pub const GRID_LINE: Rgb = Rgb::hex(0xcccccc);
    pub const OBSTACLE: Rgb = Rgb::hex(0x333333);
    pub const HOLE: Rgb = Rgb::hex(0x4a90d9);
    pub const GOAL: Rgb = Rgb::hex(0x4caf50);
    pub const START: Rgb = Rgb::hex(0x2196f3);
    pub const CLIFF: Rgb = Rgb::hex(0x8b4513);
    pub const AGENT: Rgb = Rgb::hex(0xf44336);
    pub const GLYPH: Rgb = Rgb::WHITE;
    pub const SKY: Rgb = Rgb::hex(0x87ceeb);
    pub const HILL: Rgb = Rgb::hex(0x228b22);
    pub const FLAG: Rgb = Rgb::hex(0xffd700);
    pub const BACKDROP: Rgb = Rgb::hex(0xf0f0f0);
    pub const GROUND: Rgb = Rgb::hex(0x8b4513);
    pub const CART: Rgb = Rgb::hex(0x333333);
    pub const POLE: Rgb = Rgb::hex(0xd2691e);
}

// Mountain car track, in world units.
const TRACK_MIN: f32 = -1.2;
const TRACK_SPAN: f32 = 1.8;
const GOAL_POSITION: f32 = 0.5;
const HILL_STEP_PX: usize = 5;
const CAR_SIZE: Vec2 = Vec2::new(20.0, 12.0);

// Cart pole geometry, in pixels.
const CART_SIZE: Vec2 = Vec2::new(50.0, 15.0);
const CART_PX_PER_BIN: f32 = 30.0;
const POLE_RAD_PER_BIN: f32 = 0.04;
const POLE_LENGTH: f32 = 80.0;
const POLE_WIDTH: f32 = 6.0;

/// Redraw the environment described by `descriptor`.
///
/// Nothing is drawn when no environment has been initialized yet. Without a
/// state only the layout is drawn.
pub fn render_environment<S: Surface + ?Sized>(
    descriptor: Option<&EnvironmentDescriptor>,
    surface: &mut S,
) {
    let Some(descriptor) = descriptor else {
        return;
    };
    surface.clear();

    let state = descriptor.state.as_ref();
    match &descriptor.layout {
        Layout::GridWorld(grid) | Layout::FrozenLake(grid) => draw_grid(grid, state, surface),
        Layout::CliffWalking(cliff) => draw_cliff(cliff, state, surface),
        Layout::MountainCar(hill) => draw_hill(*hill, state, surface),
        Layout::CartPole(cart) => draw_cart_pole(*cart, state, surface),
    }
}

/// Plain tiling shared by the grid and cliff worlds.
fn draw_tiles<S: Surface + ?Sized>(shape: GridShape, cell: Vec2, surface: &mut S) {
    for tile in shape.cells() {
        let rect = cell_rect(tile.row, tile.col, cell.x, cell.y);
        surface.fill_rect(rect, palette::FLOOR);
        surface.stroke_rect(rect, palette::GRID_LINE);
    }
}

fn paint_cell<S: Surface + ?Sized>(
    at: Cell,
    cell: Vec2,
    color: Rgb,
    glyph: Option<(&str, f32)>,
    surface: &mut S,
) {
    let rect = cell_rect(at.row, at.col, cell.x, cell.y);
    surface.fill_rect(rect, color);
    if let Some((text, px)) = glyph {
        let at = Vec2::new(rect.x + cell.x / 3.0, rect.y + cell.y / 1.5);
        surface.draw_text(text, at, px, palette::GLYPH);
    }
}

fn draw_agent<S: Surface + ?Sized>(
    shape: GridShape,
    cell: Vec2,
    state: Option<&StateValue>,
    surface: &mut S,
) {
    let Some(state) = state else {
        return;
    };
    match state.cell() {
        Some(agent) if shape.contains(agent) => {
            let rect = cell_rect(agent.row, agent.col, cell.x, cell.y);
            surface.draw_arc(rect.center(), cell.x / 3.0, palette::AGENT);
        }
        Some(agent) => {
            tracing::warn!(?agent, ?shape, "agent position outside the grid, skipping agent");
        }
        None => tracing::warn!(%state, "grid environment received a non-grid state"),
    }
}

fn draw_grid<S: Surface + ?Sized>(grid: &GridLayout, state: Option<&StateValue>, surface: &mut S) {
    let shape = GridShape::square(grid.size);
    let cell = shape.cell_size(surface.size());

    draw_tiles(shape, cell, surface);
    for obstacle in &grid.obstacles {
        paint_cell(*obstacle, cell, palette::OBSTACLE, None, surface);
    }
    for hole in &grid.holes {
        paint_cell(*hole, cell, palette::HOLE, Some(("H", 20.0)), surface);
    }
    if let Some(goal) = grid.goal {
        paint_cell(goal, cell, palette::GOAL, Some(("G", 20.0)), surface);
    }
    draw_agent(shape, cell, state, surface);
}

fn draw_cliff<S: Surface + ?Sized>(
    cliff: &CliffLayout,
    state: Option<&StateValue>,
    surface: &mut S,
) {
    let shape = GridShape::new(cliff.width, cliff.height);
    let cell = shape.cell_size(surface.size());

    draw_tiles(shape, cell, surface);
    for edge in &cliff.cliff {
        paint_cell(*edge, cell, palette::CLIFF, None, surface);
    }
    if let Some(start) = cliff.start {
        paint_cell(start, cell, palette::START, Some(("S", 12.0)), surface);
    }
    if let Some(goal) = cliff.goal {
        paint_cell(goal, cell, palette::GOAL, Some(("G", 12.0)), surface);
    }
    draw_agent(shape, cell, state, surface);
}

/// Height of the hill at track position `position` on a surface of `size`.
///
/// The sinusoid only stands in for the real mountain; nothing here is
/// simulated.
#[must_use]
pub fn hill_height(position: f32, size: Vec2) -> f32 {
    size.y - ((3.0 * position).sin() * 0.45 + 0.55) * size.y * 0.8
}

/// Horizontal pixel of track position `position`.
#[must_use]
pub fn track_x(position: f32, width: f32) -> f32 {
    (position - TRACK_MIN) / TRACK_SPAN * width
}

/// Track position of a discretized position bin.
///
/// `bins` comes from the layout, which derives it from the solver's state
/// count when one is reported. Bins past the last one land beyond the goal.
#[must_use]
pub fn bin_position(bin: i64, bins: u32) -> f32 {
    let last = bins.saturating_sub(1).max(1) as f32;
    TRACK_MIN + (bin as f32 / last) * TRACK_SPAN
}

fn draw_hill<S: Surface + ?Sized>(hill: HillLayout, state: Option<&StateValue>, surface: &mut S) {
    let size = surface.size();
    surface.fill_rect(Rect::new(0.0, 0.0, size.x, size.y), palette::SKY);

    // Fill under the curve in narrow columns, then trace the ridge.
    let mut ridge = Vec::new();
    for x in (0..=size.x as usize).step_by(HILL_STEP_PX) {
        let x = x as f32;
        let y = hill_height(TRACK_MIN + (x / size.x) * TRACK_SPAN, size);
        surface.fill_rect(
            Rect::new(x, y, HILL_STEP_PX as f32, size.y - y),
            palette::HILL,
        );
        ridge.push(Vec2::new(x, y));
    }
    surface.draw_line(&ridge, 2.0, palette::HILL);

    let goal_x = track_x(GOAL_POSITION, size.x);
    surface.draw_line(
        &[Vec2::new(goal_x, 0.0), Vec2::new(goal_x, size.y)],
        2.0,
        palette::FLAG,
    );

    let Some(state) = state else {
        return;
    };
    let Some(bin) = state.bin(0) else {
        tracing::warn!(%state, "mountain car received a state without a position bin");
        return;
    };
    let position = bin_position(bin, hill.position_bins);
    let car = Vec2::new(track_x(position, size.x), hill_height(position, size));
    surface.fill_rect(
        Rect::new(car.x - CAR_SIZE.x / 2.0, car.y - 8.0, CAR_SIZE.x, CAR_SIZE.y),
        palette::AGENT,
    );
}

/// Pole tip for a pole anchored at `base`, leaning `angle` radians from
/// vertical.
#[must_use]
pub fn pole_tip(base: Vec2, angle: f32) -> Vec2 {
    base + Vec2::new(angle.sin(), -angle.cos()) * POLE_LENGTH
}

fn draw_cart_pole<S: Surface + ?Sized>(
    cart: CartLayout,
    state: Option<&StateValue>,
    surface: &mut S,
) {
    let size = surface.size();
    surface.fill_rect(Rect::new(0.0, 0.0, size.x, size.y), palette::BACKDROP);
    surface.fill_rect(Rect::new(0.0, size.y * 0.8, size.x, size.y * 0.2), palette::GROUND);

    let Some(state) = state else {
        return;
    };
    let (Some(position), Some(angle)) = (state.bin(0), state.bin(2)) else {
        tracing::warn!(%state, "cart pole received a state without position and angle bins");
        return;
    };

    let base = Vec2::new(
        size.x / 2.0 + position.saturating_sub(cart.center_bin) as f32 * CART_PX_PER_BIN,
        size.y * 0.75,
    );
    surface.fill_rect(
        Rect::new(base.x - CART_SIZE.x / 2.0, base.y, CART_SIZE.x, CART_SIZE.y),
        palette::CART,
    );

    let angle = angle.saturating_sub(cart.center_bin) as f32 * POLE_RAD_PER_BIN;
    surface.draw_line(&[base, pole_tip(base, angle)], POLE_WIDTH, palette::POLE);
}
