#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap
)]
//! # Sandbox View
//!
//! Everything the RL sandbox shows on screen, independent of how it is shown.
//!
//! The solver backend owns the environments and the learning algorithms; this
//! crate turns what it sends back into pictures. Rendering targets the
//! [`Surface`] trait, so the same code draws into the PNG-backed
//! [`RasterSurface`] used by the command line and into the
//! [`RecordingSurface`] the tests inspect.
//!
//! ## Modules
//!
//! -   [`environment`]: the five environment kinds, their layouts and how a raw
//!     state vector maps onto them.
//! -   [`scene`]: draws an environment and its agent.
//! -   [`values`] and [`policy`]: the value heat-map and the arrow grid.
//! -   [`curve`]: the learning curve.
//! -   [`state`]: the [`ViewState`] the renderers read from.
//! -   [`player`]: replays a recorded trajectory at a fixed pace.
//! -   [`progress`] and [`log`]: training progress estimate and the event log
//!     panel.

pub mod action;
pub mod curve;
pub mod environment;
pub mod geometry;
pub mod log;
pub mod player;
pub mod policy;
pub mod progress;
pub mod raster;
pub mod scene;
pub mod state;
pub mod surface;
pub mod values;

pub use action::{action_label, policy_glyph, Action};
pub use curve::{render_curve, render_curve_placeholder};
pub use environment::{
    Cell, EnvKind, EnvironmentDescriptor, Layout, ParseEnvKindError, StateShapeError, StateValue,
};
pub use log::{format_log_entry, LogEntry, LogPanel};
pub use player::{
    PlaybackObserver, PlaybackSummary, PlaybackTiming, PlayerError, PlayerState, Step,
    StepReadout, Trajectory, TrajectoryPlayer,
};
pub use policy::{render_policy, PolicyView};
pub use progress::{HeuristicProgress, ProgressEstimate};
pub use raster::{RasterError, RasterSurface};
pub use scene::render_environment;
pub use state::{Readout, TrainingResult, ViewState};
pub use surface::{DrawCommand, RecordingSurface, Rect, Rgb, Surface};
pub use values::{render_value_placeholder, render_values};
