//! Trajectory playback
//!
//! [`TrajectoryPlayer`] replays an episode the solver already ran, one step at
//! a time: update the agent state, redraw the environment, report the step,
//! then sleep for the step interval. The player is either Idle or Playing;
//! a second `play` while Playing is refused, so at most one replay drives the
//! view at any moment.
//!
//! Pacing uses `tokio::time::sleep`, which suspends the task instead of
//! blocking the thread. Dropping the `play` future releases the player, and
//! [`TrajectoryPlayer::cancel`] stops a replay before its next step.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use thiserror::Error;

use crate::action::action_label;
use crate::environment::StateValue;
use crate::scene::render_environment;
use crate::state::ViewState;
use crate::surface::Surface;

/// One transition of a recorded episode.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub state: StateValue,
    pub action: u8,
    pub reward: f64,
    pub done: bool,
}

pub type Trajectory = Vec<Step>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackTiming {
    /// Pause after each rendered step.
    pub step_interval: Duration,
    /// How long the readout stays up after the last step.
    pub linger: Duration,
}

impl Default for PlaybackTiming {
    fn default() -> Self {
        Self {
            step_interval: Duration::from_millis(200),
            linger: Duration::from_millis(2000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Playing,
}

/// Per-step readout shown while a trajectory plays.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReadout {
    /// 1-based step number.
    pub index: usize,
    pub action: String,
    pub reward: f64,
    /// Sum of rewards up to and including this step.
    pub cumulative_reward: f64,
    pub done: bool,
    pub state: StateValue,
}

impl StepReadout {
    #[must_use]
    pub fn cumulative_text(&self) -> String {
        format!("{:.2}", self.cumulative_reward)
    }

    #[must_use]
    pub fn reward_text(&self) -> String {
        format!("{:.2}", self.reward)
    }
}

/// Receives playback frames as they are rendered.
pub trait PlaybackObserver<S: ?Sized> {
    /// Called after `frame` has been redrawn for `readout`.
    fn on_step(&mut self, readout: &StepReadout, frame: &S);

    /// Called when the transient readout should be hidden again.
    fn on_hide(&mut self) {}
}

impl<S: ?Sized> PlaybackObserver<S> for () {
    fn on_step(&mut self, _readout: &StepReadout, _frame: &S) {}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSummary {
    pub steps: usize,
    pub total_reward: f64,
    /// The last replayed step ended the episode.
    pub finished: bool,
    pub cancelled: bool,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PlayerError {
    #[error("a trajectory is already playing")]
    Busy,
}

/// Releases the playing flag however `play` exits.
struct PlayingGuard<'a>(&'a AtomicBool);

impl Drop for PlayingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Debug, Default)]
pub struct TrajectoryPlayer {
    timing: PlaybackTiming,
    playing: AtomicBool,
    cancelled: AtomicBool,
}

impl TrajectoryPlayer {
    #[must_use]
    pub fn new(timing: PlaybackTiming) -> Self {
        Self {
            timing,
            playing: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn timing(&self) -> PlaybackTiming {
        self.timing
    }

    #[must_use]
    pub fn state(&self) -> PlayerState {
        if self.is_playing() {
            PlayerState::Playing
        } else {
            PlayerState::Idle
        }
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    /// Stop the current replay before its next step. No effect when Idle.
    pub fn cancel(&self) {
        if self.is_playing() {
            self.cancelled.store(true, Ordering::Release);
        }
    }

    /// Replay `trajectory` into `view`, redrawing `surface` for every step.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::Busy`] without touching `view` or `surface` if
    /// another replay is in progress.
    pub async fn play<S, O>(
        &self,
        trajectory: Trajectory,
        view: &mut ViewState,
        surface: &mut S,
        observer: &mut O,
    ) -> Result<PlaybackSummary, PlayerError>
    where
        S: Surface + ?Sized,
        O: PlaybackObserver<S> + ?Sized,
    {
        if self
            .playing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("playback requested while another trajectory is playing");
            return Err(PlayerError::Busy);
        }
        let guard = PlayingGuard(&self.playing);
        self.cancelled.store(false, Ordering::Release);

        tracing::info!(steps = trajectory.len(), "playing trajectory");
        let mut summary = PlaybackSummary {
            steps: 0,
            total_reward: 0.0,
            finished: false,
            cancelled: false,
        };

        for (i, step) in trajectory.into_iter().enumerate() {
            if self.cancelled.swap(false, Ordering::AcqRel) {
                summary.cancelled = true;
                tracing::info!(step = i + 1, "playback cancelled");
                break;
            }

            summary.total_reward += step.reward;
            summary.steps += 1;
            summary.finished = step.done;

            let readout = StepReadout {
                index: i + 1,
                action: action_label(step.action),
                reward: step.reward,
                cumulative_reward: summary.total_reward,
                done: step.done,
                state: step.state.clone(),
            };

            view.apply_step(step.state, step.reward, step.done);
            render_environment(view.environment(), surface);
            tracing::debug!(
                step = readout.index,
                action = %readout.action,
                total = %readout.cumulative_text(),
                done = readout.done,
                "frame"
            );
            observer.on_step(&readout, surface);

            tokio::time::sleep(self.timing.step_interval).await;
        }

        drop(guard);
        tracing::info!(
            steps = summary.steps,
            total_reward = summary.total_reward,
            "playback finished"
        );

        if !summary.cancelled {
            tokio::time::sleep(self.timing.linger).await;
        }
        observer.on_hide();
        Ok(summary)
    }
}
