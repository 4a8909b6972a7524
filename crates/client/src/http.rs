//! `reqwest` implementation of [`SandboxApi`]

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use view::EnvKind;

use crate::api::SandboxApi;
use crate::error::{decode, ClientError};
use crate::wire::{
    InitRequest, InitResponse, LogsResponse, ResetResponse, RunEpisodeRequest,
    RunEpisodeResponse, StepRequest, StepResponse, TrainRequest, TrainResponse,
};

pub struct HttpClient {
    http: Client,
    base_url: String,
}

impl HttpClient {
    /// Client for the solver at `base_url`, e.g. `http://127.0.0.1:5000`.
    ///
    /// # Errors
    ///
    /// Fails if the underlying HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Ok(Self { http, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, route: &str) -> String {
        format!("{}/api/{route}", self.base_url)
    }

    async fn post<B, T>(&self, route: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!(route, "POST");
        let resp = self.http.post(self.url(route)).json(body).send().await?;
        Self::read(route, resp).await
    }

    async fn get<T: DeserializeOwned>(&self, route: &str) -> Result<T, ClientError> {
        tracing::debug!(route, "GET");
        let resp = self.http.get(self.url(route)).send().await?;
        Self::read(route, resp).await
    }

    async fn read<T: DeserializeOwned>(route: &str, resp: Response) -> Result<T, ClientError> {
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            tracing::debug!(route, %status, "solver answered with an error status");
        }
        decode(status.as_u16(), &body)
    }
}

impl SandboxApi for HttpClient {
    async fn init_env(&self, env: EnvKind) -> Result<InitResponse, ClientError> {
        self.post("init_env", &InitRequest::new(env)).await
    }

    async fn train(&self, request: &TrainRequest) -> Result<TrainResponse, ClientError> {
        self.post("train", request).await
    }

    async fn step(&self, action: u8) -> Result<StepResponse, ClientError> {
        self.post("step", &StepRequest { action }).await
    }

    async fn reset(&self) -> Result<ResetResponse, ClientError> {
        self.post("reset", &json!({})).await
    }

    async fn run_episode(&self, policy: &[u8]) -> Result<RunEpisodeResponse, ClientError> {
        self.post("run_episode", &RunEpisodeRequest { policy }).await
    }

    async fn logs(&self) -> Result<LogsResponse, ClientError> {
        self.get("get_logs").await
    }
}
