//! Learning algorithms offered by the solver and their parameter presets

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convergence threshold sent with every training request.
pub const THETA: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    PolicyIteration,
    ValueIteration,
    MonteCarlo,
    Td,
    NStepTd,
    Sarsa,
    QLearning,
}

impl Algorithm {
    pub const ALL: [Algorithm; 7] = [
        Algorithm::PolicyIteration,
        Algorithm::ValueIteration,
        Algorithm::MonteCarlo,
        Algorithm::Td,
        Algorithm::NStepTd,
        Algorithm::Sarsa,
        Algorithm::QLearning,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Algorithm::PolicyIteration => "policy_iteration",
            Algorithm::ValueIteration => "value_iteration",
            Algorithm::MonteCarlo => "monte_carlo",
            Algorithm::Td => "td",
            Algorithm::NStepTd => "n_step_td",
            Algorithm::Sarsa => "sarsa",
            Algorithm::QLearning => "q_learning",
        }
    }

    /// Human readable name, `q_learning` becomes `q learning`.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.as_str().replace('_', " ")
    }

    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Algorithm::PolicyIteration => {
                "Iteratively evaluates current policy then improves it. Guaranteed to converge to optimal policy."
            }
            Algorithm::ValueIteration => {
                "Directly computes optimal value function by taking max over actions at each state."
            }
            Algorithm::MonteCarlo => {
                "Learns from complete episodes. Updates Q-values based on actual returns."
            }
            Algorithm::Td => "TD(0) - Updates value estimates after each step using bootstrapping.",
            Algorithm::NStepTd => {
                "N-step TD - Uses n-step returns for value updates. Trades off between MC and TD(0)."
            }
            Algorithm::Sarsa => {
                "On-policy TD control. Updates Q(s,a) using the action actually taken in next state."
            }
            Algorithm::QLearning => {
                "Off-policy TD control. Updates Q(s,a) using max action value in next state."
            }
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown algorithm '{0}'")]
pub struct ParseAlgorithmError(String);

impl FromStr for Algorithm {
    type Err = ParseAlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_");
        Algorithm::ALL
            .into_iter()
            .find(|algo| algo.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| ParseAlgorithmError(s.to_owned()))
    }
}

/// Hyperparameters of a training request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainParams {
    pub gamma: f64,
    pub alpha: f64,
    pub epsilon: f64,
    pub n_episodes: u32,
    pub n_step: u32,
    pub theta: f64,
}

impl TrainParams {
    /// Default parameters for `algorithm`.
    #[must_use]
    pub const fn preset(algorithm: Algorithm) -> Self {
        let (alpha, epsilon, n_episodes, n_step) = match algorithm {
            Algorithm::PolicyIteration | Algorithm::ValueIteration => (0.1, 0.1, 100, 3),
            Algorithm::MonteCarlo | Algorithm::Sarsa | Algorithm::QLearning => (0.1, 0.2, 1000, 3),
            Algorithm::Td => (0.5, 0.2, 1500, 3),
            Algorithm::NStepTd => (0.5, 0.2, 1500, 5),
        };
        Self {
            gamma: 0.99,
            alpha,
            epsilon,
            n_episodes,
            n_step,
            theta: THETA,
        }
    }
}

impl Default for TrainParams {
    fn default() -> Self {
        Self::preset(Algorithm::QLearning)
    }
}
