//! Request and response bodies of the solver's JSON API
//!
//! Field names here are the wire contract. Responses are decoded leniently:
//! layout fields the solver omits fall back to the environment's defaults.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use view::environment::{CartLayout, CliffLayout, GridLayout, HillLayout};
use view::{
    Cell, EnvKind, EnvironmentDescriptor, Layout, LogEntry, StateShapeError, StateValue, Step,
    Trajectory, TrainingResult,
};

use crate::algorithm::{Algorithm, TrainParams};

/// A state as the solver sends it: a list of integers, or a bare integer for
/// one-dimensional states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawState {
    List(Vec<i64>),
    Scalar(i64),
}

impl RawState {
    #[must_use]
    pub fn values(&self) -> &[i64] {
        match self {
            RawState::List(values) => values,
            RawState::Scalar(value) => std::slice::from_ref(value),
        }
    }

    /// Interpret the raw state for the environment described by `layout`.
    ///
    /// # Errors
    ///
    /// See [`Layout::interpret_state`].
    pub fn interpret(&self, layout: &Layout) -> Result<StateValue, StateShapeError> {
        layout.interpret_state(self.values())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InitRequest {
    pub env: EnvKind,
    pub params: Map<String, Value>,
}

impl InitRequest {
    #[must_use]
    pub fn new(env: EnvKind) -> Self {
        Self {
            env,
            params: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InitResponse {
    pub state: Option<RawState>,
    pub grid_size: Option<usize>,
    pub grid_width: Option<usize>,
    pub grid_height: Option<usize>,
    #[serde(default)]
    pub obstacles: Vec<Cell>,
    #[serde(default)]
    pub holes: Vec<Cell>,
    #[serde(default)]
    pub cliff: Vec<Cell>,
    pub goal: Option<Cell>,
    pub start: Option<Cell>,
    pub n_states: Option<usize>,
    pub n_actions: Option<usize>,
    #[serde(default)]
    pub actions: Vec<String>,
}

impl InitResponse {
    /// Build the descriptor for `kind`, which the response itself does not name.
    ///
    /// # Errors
    ///
    /// Fails when the initial state does not have the shape `kind` declares.
    pub fn into_descriptor(self, kind: EnvKind) -> Result<EnvironmentDescriptor, StateShapeError> {
        let layout = match kind {
            EnvKind::GridWorld | EnvKind::FrozenLake => {
                let grid = GridLayout {
                    size: self.grid_size.unwrap_or(view::environment::DEFAULT_GRID_SIZE),
                    obstacles: self.obstacles,
                    holes: self.holes,
                    goal: self.goal,
                };
                if kind == EnvKind::GridWorld {
                    Layout::GridWorld(grid)
                } else {
                    Layout::FrozenLake(grid)
                }
            }
            EnvKind::CliffWalking => {
                let defaults = CliffLayout::default();
                Layout::CliffWalking(CliffLayout {
                    width: self.grid_width.unwrap_or(defaults.width),
                    height: self.grid_height.unwrap_or(defaults.height),
                    cliff: self.cliff,
                    start: self.start,
                    goal: self.goal,
                })
            }
            EnvKind::MountainCar => {
                Layout::MountainCar(HillLayout::from_state_count(self.n_states))
            }
            EnvKind::CartPole => Layout::CartPole(CartLayout::default()),
        };

        let state = self
            .state
            .as_ref()
            .map(|raw| raw.interpret(&layout))
            .transpose()?;

        Ok(EnvironmentDescriptor {
            layout,
            state,
            n_states: self.n_states,
            n_actions: self.n_actions,
            action_names: self.actions,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainRequest {
    pub algorithm: Algorithm,
    pub params: TrainParams,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TrainResponse {
    pub policy: Vec<u8>,
    pub values: Vec<f64>,
    /// Convergence history, one value per iteration or episode.
    #[serde(default)]
    pub history: Vec<f64>,
    pub q_values: Option<Vec<Vec<f64>>>,
    pub iterations: Option<u32>,
}

impl TrainResponse {
    /// Iterations the run took: reported by the solver or the history length.
    #[must_use]
    pub fn iteration_count(&self) -> usize {
        self.iterations
            .map_or(self.history.len(), |n| n as usize)
    }

    #[must_use]
    pub fn into_result(self) -> TrainingResult {
        TrainingResult {
            policy: self.policy,
            values: self.values,
            curve: self.history,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct StepRequest {
    pub action: u8,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StepResponse {
    pub state: RawState,
    pub reward: f64,
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResetResponse {
    pub state: RawState,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunEpisodeRequest<'a> {
    pub policy: &'a [u8],
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WireStep {
    pub state: RawState,
    pub action: u8,
    pub reward: f64,
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunEpisodeResponse {
    pub trajectory: Vec<WireStep>,
    pub total_reward: Option<f64>,
}

impl RunEpisodeResponse {
    /// # Errors
    ///
    /// Fails on the first step whose state does not fit `layout`.
    pub fn into_trajectory(self, layout: &Layout) -> Result<Trajectory, StateShapeError> {
        self.trajectory
            .into_iter()
            .map(|step| {
                Ok(Step {
                    state: step.state.interpret(layout)?,
                    action: step.action,
                    reward: step.reward,
                    done: step.done,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LogsResponse {
    #[serde(default)]
    pub logs: Vec<LogEntry>,
}
