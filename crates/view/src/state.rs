//! Application view-state
//!
//! [`ViewState`] holds the singleton data the renderers draw from. It is
//! only changed through the update methods below, each of which replaces a
//! whole field; the one exception is the agent state inside the environment
//! descriptor, which is updated in place on every step, reset and replayed
//! frame. Renderers only ever see shared references.

use crate::environment::{EnvironmentDescriptor, StateValue};

/// Live readout of the most recent transition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Readout {
    pub state: Option<String>,
    pub reward: Option<f64>,
    pub done: bool,
}

impl Readout {
    #[must_use]
    pub fn reward_text(&self) -> String {
        self.reward.map_or_else(|| "-".to_owned(), |r| format!("{r:.2}"))
    }

    #[must_use]
    pub fn state_text(&self) -> &str {
        self.state.as_deref().unwrap_or("-")
    }
}

/// Result of a training run as stored in the view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingResult {
    pub policy: Vec<u8>,
    pub values: Vec<f64>,
    pub curve: Vec<f64>,
}

#[derive(Debug, Default)]
pub struct ViewState {
    environment: Option<EnvironmentDescriptor>,
    values: Option<Vec<f64>>,
    policy: Option<Vec<u8>>,
    curve: Option<Vec<f64>>,
    readout: Readout,
}

impl ViewState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn environment(&self) -> Option<&EnvironmentDescriptor> {
        self.environment.as_ref()
    }

    #[must_use]
    pub fn values(&self) -> Option<&[f64]> {
        self.values.as_deref()
    }

    #[must_use]
    pub fn policy(&self) -> Option<&[u8]> {
        self.policy.as_deref()
    }

    #[must_use]
    pub fn curve(&self) -> Option<&[f64]> {
        self.curve.as_deref()
    }

    #[must_use]
    pub fn readout(&self) -> &Readout {
        &self.readout
    }

    /// Install a freshly initialized environment. Results trained against the
    /// previous environment no longer apply and are dropped.
    pub fn replace_environment(&mut self, descriptor: EnvironmentDescriptor) {
        self.readout = Readout {
            state: descriptor.state.as_ref().map(ToString::to_string),
            reward: None,
            done: false,
        };
        self.environment = Some(descriptor);
        self.values = None;
        self.policy = None;
        self.curve = None;
    }

    pub fn apply_training(&mut self, result: TrainingResult) {
        self.policy = Some(result.policy);
        self.values = Some(result.values);
        self.curve = Some(result.curve);
    }

    /// Move the agent. Ignored until an environment exists.
    pub fn set_agent_state(&mut self, state: StateValue) {
        let Some(environment) = self.environment.as_mut() else {
            return;
        };
        self.readout.state = Some(state.to_string());
        environment.state = Some(state);
    }

    pub fn apply_step(&mut self, state: StateValue, reward: f64, done: bool) {
        self.set_agent_state(state);
        self.readout.reward = Some(reward);
        self.readout.done = done;
    }

    pub fn apply_reset(&mut self, state: StateValue) {
        self.set_agent_state(state);
        self.readout.reward = None;
        self.readout.done = false;
    }
}
