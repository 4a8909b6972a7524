use view::EnvKind;

use crate::error::ClientError;
use crate::wire::{
    InitResponse, LogsResponse, ResetResponse, RunEpisodeResponse, StepResponse, TrainRequest,
    TrainResponse,
};

/// The solver backend as seen by the front end.
///
/// [`crate::HttpClient`] talks to a running server; tests substitute canned
/// implementations.
#[allow(async_fn_in_trait)]
pub trait SandboxApi {
    async fn init_env(&self, env: EnvKind) -> Result<InitResponse, ClientError>;

    async fn train(&self, request: &TrainRequest) -> Result<TrainResponse, ClientError>;

    async fn step(&self, action: u8) -> Result<StepResponse, ClientError>;

    async fn reset(&self) -> Result<ResetResponse, ClientError>;

    /// Run one episode under `policy` on the server and return its trajectory.
    async fn run_episode(&self, policy: &[u8]) -> Result<RunEpisodeResponse, ClientError>;

    async fn logs(&self) -> Result<LogsResponse, ClientError>;
}
