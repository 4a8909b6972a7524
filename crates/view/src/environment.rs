//! Environment descriptors
//!
//! An [`EnvironmentDescriptor`] captures everything the renderers need to
//! know about the active environment: its static [`Layout`] and the agent's
//! current [`StateValue`]. Each layout variant only carries the fields that
//! make sense for that kind of world, so grid fields can never leak into a
//! continuous environment.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::GridShape;

/// Default side length of square grid worlds.
pub const DEFAULT_GRID_SIZE: usize = 5;
/// Default cliff walking dimensions.
pub const DEFAULT_CLIFF_WIDTH: usize = 12;
pub const DEFAULT_CLIFF_HEIGHT: usize = 4;
/// Position bins used to place the mountain car when the solver does not
/// report a state count.
pub const HILL_POSITION_BINS: u32 = 20;
/// Bin index of the centered cart and upright pole.
pub const CART_CENTER_BIN: i64 = 5;

/// The closed set of environments the sandbox can host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvKind {
    GridWorld,
    FrozenLake,
    CliffWalking,
    MountainCar,
    CartPole,
}

impl EnvKind {
    pub const ALL: [EnvKind; 5] = [
        EnvKind::GridWorld,
        EnvKind::FrozenLake,
        EnvKind::CliffWalking,
        EnvKind::MountainCar,
        EnvKind::CartPole,
    ];

    /// Name used on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            EnvKind::GridWorld => "gridworld",
            EnvKind::FrozenLake => "frozenlake",
            EnvKind::CliffWalking => "cliffwalking",
            EnvKind::MountainCar => "mountaincar",
            EnvKind::CartPole => "cartpole",
        }
    }

    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            EnvKind::GridWorld => "Navigate from start to goal in a grid. Avoid obstacles.",
            EnvKind::FrozenLake => "Walk across frozen lake to goal. Ice is slippery! Avoid holes.",
            EnvKind::CliffWalking => {
                "Walk along cliff edge to goal. Falling off cliff gives big penalty."
            }
            EnvKind::MountainCar => "Drive car up the hill. Build momentum to reach the top.",
            EnvKind::CartPole => "Balance a pole on a moving cart. Dont let it fall!",
        }
    }
}

impl fmt::Display for EnvKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown environment '{0}' (expected gridworld, frozenlake, cliffwalking, mountaincar or cartpole)")]
pub struct ParseEnvKindError(String);

impl FromStr for EnvKind {
    type Err = ParseEnvKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EnvKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseEnvKindError(s.to_owned()))
    }
}

/// Grid coordinate, `[row, col]` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<(usize, usize)> for Cell {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl From<Cell> for (usize, usize) {
    fn from(cell: Cell) -> Self {
        (cell.row, cell.col)
    }
}

/// Agent state as declared by the active environment kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateValue {
    /// Position in a grid world.
    Cell(Cell),
    /// Discretized continuous state. Index 0 is position-like, index 2 is
    /// angle-like for the cart pole.
    Bins(Vec<i64>),
}

impl StateValue {
    #[must_use]
    pub fn cell(&self) -> Option<Cell> {
        match self {
            StateValue::Cell(cell) => Some(*cell),
            StateValue::Bins(_) => None,
        }
    }

    #[must_use]
    pub fn bin(&self, index: usize) -> Option<i64> {
        match self {
            StateValue::Bins(bins) => bins.get(index).copied(),
            StateValue::Cell(_) => None,
        }
    }
}

impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateValue::Cell(cell) => write!(f, "[{},{}]", cell.row, cell.col),
            StateValue::Bins(bins) => {
                f.write_str("[")?;
                for (i, bin) in bins.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{bin}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// A raw state did not have the shape the environment declares.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StateShapeError {
    #[error("{kind} expects a [row, col] state, got {len} values")]
    NotACell { kind: EnvKind, len: usize },
    #[error("{kind} state contains a negative coordinate")]
    NegativeCoordinate { kind: EnvKind },
    #[error("{kind} expects at least {expected} bins, got {len}")]
    TooFewBins {
        kind: EnvKind,
        expected: usize,
        len: usize,
    },
}

/// Static layout of a square grid world or frozen lake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    pub size: usize,
    pub obstacles: Vec<Cell>,
    pub holes: Vec<Cell>,
    pub goal: Option<Cell>,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            size: DEFAULT_GRID_SIZE,
            obstacles: Vec::new(),
            holes: Vec::new(),
            goal: None,
        }
    }
}

/// Static layout of the cliff walking world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliffLayout {
    pub width: usize,
    pub height: usize,
    pub cliff: Vec<Cell>,
    pub start: Option<Cell>,
    pub goal: Option<Cell>,
}

impl Default for CliffLayout {
    fn default() -> Self {
        Self {
            width: DEFAULT_CLIFF_WIDTH,
            height: DEFAULT_CLIFF_HEIGHT,
            cliff: Vec::new(),
            start: None,
            goal: None,
        }
    }
}

/// Mountain car: the first state bin is mapped onto the hill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HillLayout {
    pub position_bins: u32,
}

impl Default for HillLayout {
    fn default() -> Self {
        Self {
            position_bins: HILL_POSITION_BINS,
        }
    }
}

impl HillLayout {
    /// Layout for a solver reporting `n_states` discrete states.
    ///
    /// The solver discretizes position and velocity into the same number of
    /// bins, so a square `n_states` gives the position bin count. Anything
    /// else falls back to [`HILL_POSITION_BINS`].
    #[must_use]
    pub fn from_state_count(n_states: Option<usize>) -> Self {
        let side = n_states.and_then(|n| {
            let side = (n as f64).sqrt().round() as usize;
            (side >= 2 && side * side == n).then_some(side)
        });
        match side.and_then(|side| u32::try_from(side).ok()) {
            Some(position_bins) => Self { position_bins },
            None => Self::default(),
        }
    }
}

/// Cart pole: bins are offsets from `center_bin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLayout {
    pub center_bin: i64,
}

impl Default for CartLayout {
    fn default() -> Self {
        Self {
            center_bin: CART_CENTER_BIN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    GridWorld(GridLayout),
    FrozenLake(GridLayout),
    CliffWalking(CliffLayout),
    MountainCar(HillLayout),
    CartPole(CartLayout),
}

impl Layout {
    #[must_use]
    pub const fn kind(&self) -> EnvKind {
        match self {
            Layout::GridWorld(_) => EnvKind::GridWorld,
            Layout::FrozenLake(_) => EnvKind::FrozenLake,
            Layout::CliffWalking(_) => EnvKind::CliffWalking,
            Layout::MountainCar(_) => EnvKind::MountainCar,
            Layout::CartPole(_) => EnvKind::CartPole,
        }
    }

    /// Grid the states are laid out on, if the environment has one.
    #[must_use]
    pub fn grid_shape(&self) -> Option<GridShape> {
        match self {
            Layout::GridWorld(grid) | Layout::FrozenLake(grid) => Some(GridShape::square(grid.size)),
            Layout::CliffWalking(cliff) => Some(GridShape::new(cliff.width, cliff.height)),
            Layout::MountainCar(_) | Layout::CartPole(_) => None,
        }
    }

    /// Interpret a raw integer state according to this layout.
    ///
    /// # Errors
    ///
    /// Returns [`StateShapeError`] when `raw` does not have the shape the
    /// environment declares.
    pub fn interpret_state(&self, raw: &[i64]) -> Result<StateValue, StateShapeError> {
        let kind = self.kind();
        match self {
            Layout::GridWorld(_) | Layout::FrozenLake(_) | Layout::CliffWalking(_) => {
                let [row, col] = raw else {
                    return Err(StateShapeError::NotACell {
                        kind,
                        len: raw.len(),
                    });
                };
                let row = usize::try_from(*row)
                    .map_err(|_| StateShapeError::NegativeCoordinate { kind })?;
                let col = usize::try_from(*col)
                    .map_err(|_| StateShapeError::NegativeCoordinate { kind })?;
                Ok(StateValue::Cell(Cell::new(row, col)))
            }
            Layout::MountainCar(_) => Self::bins(kind, raw, 1),
            Layout::CartPole(_) => Self::bins(kind, raw, 3),
        }
    }

    fn bins(kind: EnvKind, raw: &[i64], expected: usize) -> Result<StateValue, StateShapeError> {
        if raw.len() < expected {
            return Err(StateShapeError::TooFewBins {
                kind,
                expected,
                len: raw.len(),
            });
        }
        Ok(StateValue::Bins(raw.to_vec()))
    }
}

/// The active environment as seen by the renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentDescriptor {
    pub layout: Layout,
    pub state: Option<StateValue>,
    pub n_states: Option<usize>,
    pub n_actions: Option<usize>,
    pub action_names: Vec<String>,
}

impl EnvironmentDescriptor {
    #[must_use]
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            state: None,
            n_states: None,
            n_actions: None,
            action_names: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_state(mut self, state: StateValue) -> Self {
        self.state = Some(state);
        self
    }

    #[must_use]
    pub fn kind(&self) -> EnvKind {
        self.layout.kind()
    }
}
