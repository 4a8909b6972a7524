#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]
//! # Sandbox Client
//!
//! Talks to the solver backend that owns the environments and runs the
//! learning algorithms. [`SandboxApi`] is the seam the front end depends on;
//! [`HttpClient`] is its `reqwest` implementation.

pub mod algorithm;
pub mod api;
pub mod error;
pub mod http;
pub mod wire;

pub use algorithm::{Algorithm, ParseAlgorithmError, TrainParams};
pub use api::SandboxApi;
pub use error::{decode, ClientError};
pub use http::HttpClient;
pub use wire::{
    InitRequest, InitResponse, LogsResponse, RawState, ResetResponse, RunEpisodeRequest,
    RunEpisodeResponse, StepRequest, StepResponse, TrainRequest, TrainResponse, WireStep,
};
