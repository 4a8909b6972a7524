use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use sandbox::client::{Algorithm, TrainParams};
use sandbox::config::{
    CanvasSizes, SandboxConfig, Timing, DEFAULT_CANVAS_PX, DEFAULT_OUT_DIR, DEFAULT_SERVER,
};
use sandbox::view::EnvKind;

#[derive(Parser, Debug)]
#[command(
    name = "sandbox",
    version,
    about = "Drive the RL sandbox solver and render what it learns"
)]
pub struct Cli {
    /// Base URL of the solver.
    #[arg(long, env = "SANDBOX_SERVER", default_value = DEFAULT_SERVER)]
    pub server: String,

    /// Directory for rendered canvases; each run gets a timestamped subdirectory.
    #[arg(long, default_value = DEFAULT_OUT_DIR)]
    pub out: PathBuf,

    /// Side of the environment and value canvases in pixels.
    #[arg(long, default_value_t = DEFAULT_CANVAS_PX)]
    pub size: u32,

    /// Pause between replayed steps, in milliseconds.
    #[arg(long, default_value_t = 200)]
    pub step_ms: u64,

    /// How long the replay readout stays up, in milliseconds.
    #[arg(long, default_value_t = 2000)]
    pub linger_ms: u64,

    /// Request timeout in seconds. Training large episode counts can be slow.
    #[arg(long, default_value_t = 120)]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize, train, run one episode and write every canvas to disk.
    Demo {
        #[arg(long, default_value = "gridworld")]
        env: EnvKind,
        #[arg(long, default_value = "q_learning")]
        algorithm: Algorithm,
        #[command(flatten)]
        params: ParamOverrides,
    },
    /// Read commands from stdin while polling the server log.
    Interactive {
        #[arg(long, default_value = "gridworld")]
        env: EnvKind,
    },
    /// Print the server event log once.
    Logs,
    /// List the learning algorithms with their default parameters.
    Algorithms,
    /// List the environments.
    Envs,
}

/// Overrides applied on top of an algorithm's preset.
#[derive(clap::Args, Debug, Default, Clone, Copy)]
pub struct ParamOverrides {
    #[arg(long)]
    pub episodes: Option<u32>,
    #[arg(long)]
    pub gamma: Option<f64>,
    #[arg(long)]
    pub alpha: Option<f64>,
    #[arg(long)]
    pub epsilon: Option<f64>,
    #[arg(long)]
    pub n_step: Option<u32>,
}

impl ParamOverrides {
    pub fn apply(self, algorithm: Algorithm) -> TrainParams {
        let mut params = TrainParams::preset(algorithm);
        if let Some(episodes) = self.episodes {
            params.n_episodes = episodes;
        }
        if let Some(gamma) = self.gamma {
            params.gamma = gamma;
        }
        if let Some(alpha) = self.alpha {
            params.alpha = alpha;
        }
        if let Some(epsilon) = self.epsilon {
            params.epsilon = epsilon;
        }
        if let Some(n_step) = self.n_step {
            params.n_step = n_step;
        }
        params
    }
}

impl Cli {
    pub fn config(&self) -> SandboxConfig {
        SandboxConfig {
            server: self.server.clone(),
            out_dir: self.out.clone(),
            canvas: CanvasSizes::square(self.size),
            timing: Timing {
                step_interval: Duration::from_millis(self.step_ms),
                linger: Duration::from_millis(self.linger_ms),
                request_timeout: Duration::from_secs(self.timeout_secs),
                ..Timing::default()
            },
            ..SandboxConfig::default()
        }
    }
}
