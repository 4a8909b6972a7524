//! # Sandbox Session
//!
//! [`Session`] is the front end's controller. It owns the view-state, the three
//! canvases and the trajectory player, sends requests through a
//! [`SandboxApi`] and re-renders whatever a response changed.
//!
//! Every operation checks its preconditions before touching the network, so a
//! refused command never produces a request. Failures leave the view-state as
//! it was: responses are applied only once they decoded and fit the active
//! environment.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use client::{Algorithm, ClientError, RawState, SandboxApi, TrainParams, TrainRequest};
use thiserror::Error;
use tokio::time::{Instant, MissedTickBehavior};
use view::{
    render_curve, render_curve_placeholder, render_environment, render_policy,
    render_value_placeholder, render_values, EnvKind, HeuristicProgress, LogPanel,
    PlaybackObserver, PlaybackSummary, PlayerError, PolicyView, ProgressEstimate,
    StateShapeError, StateValue, Surface, TrajectoryPlayer, ViewState,
};

use crate::config::Timing;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no environment initialized")]
    NotInitialized,
    #[error("train an agent first")]
    NotTrained,
    #[error("a trajectory is already playing")]
    PlaybackBusy,
    #[error("controls are locked while training")]
    ControlsLocked,
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl From<StateShapeError> for SessionError {
    fn from(err: StateShapeError) -> Self {
        SessionError::Client(ClientError::InvalidState(err))
    }
}

impl From<PlayerError> for SessionError {
    fn from(err: PlayerError) -> Self {
        match err {
            PlayerError::Busy => SessionError::PlaybackBusy,
        }
    }
}

/// The environment, value and chart canvases.
#[derive(Debug)]
pub struct Canvases<S> {
    pub environment: S,
    pub values: S,
    pub chart: S,
}

/// Shared flag disabling the training, run, reset and init controls.
#[derive(Debug, Clone, Default)]
pub struct ControlLock(Arc<AtomicBool>);

impl ControlLock {
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Lock the controls until the returned guard is dropped.
    #[must_use]
    pub fn try_lock(&self) -> Option<ControlGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ControlGuard(Arc::clone(&self.0)))
    }
}

#[derive(Debug)]
pub struct ControlGuard(Arc<AtomicBool>);

impl Drop for ControlGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrainingStatus {
    Idle,
    Training {
        algorithm: Algorithm,
        progress: ProgressEstimate,
    },
    Complete,
    Failed {
        reason: String,
    },
}

impl TrainingStatus {
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            TrainingStatus::Idle => String::new(),
            TrainingStatus::Training { algorithm, .. } => {
                format!("Training {}...", algorithm.display_name())
            }
            TrainingStatus::Complete => "Training Complete!".to_owned(),
            TrainingStatus::Failed { .. } => "Training Failed!".to_owned(),
        }
    }
}

/// Summary of the last completed training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingStats {
    pub elapsed: Duration,
    pub iterations: usize,
    /// Last value of the convergence history.
    pub convergence: Option<f64>,
    /// Mean of the last ten history values.
    pub avg_reward: Option<f64>,
}

impl TrainingStats {
    const AVERAGE_WINDOW: usize = 10;

    #[must_use]
    pub fn from_history(elapsed: Duration, iterations: usize, history: &[f64]) -> Self {
        let tail = &history[history.len().saturating_sub(Self::AVERAGE_WINDOW)..];
        let avg_reward =
            (!tail.is_empty()).then(|| tail.iter().sum::<f64>() / tail.len() as f64);
        Self {
            elapsed,
            iterations,
            convergence: history.last().copied(),
            avg_reward,
        }
    }

    #[must_use]
    pub fn elapsed_text(&self) -> String {
        format!("{:.2}s", self.elapsed.as_secs_f64())
    }

    #[must_use]
    pub fn convergence_text(&self) -> String {
        self.convergence
            .map_or_else(|| "-".to_owned(), |c| format!("{c:.4}"))
    }

    #[must_use]
    pub fn avg_reward_text(&self) -> String {
        self.avg_reward
            .map_or_else(|| "-".to_owned(), |r| format!("{r:.2}"))
    }
}

/// What a manual step did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub reward: f64,
    pub done: bool,
    /// The episode ended and the environment was reset afterwards.
    pub reset: bool,
}

pub struct Session<A, S> {
    api: A,
    view: ViewState,
    canvases: Canvases<S>,
    player: Arc<TrajectoryPlayer>,
    controls: ControlLock,
    status: TrainingStatus,
    stats: Option<TrainingStats>,
    policy_view: PolicyView,
    logs: LogPanel,
    timing: Timing,
    progress: HeuristicProgress,
}

impl<A, S> Session<A, S>
where
    A: SandboxApi,
    S: Surface,
{
    pub fn new(api: A, canvases: Canvases<S>, timing: Timing) -> Self {
        let mut session = Self {
            api,
            view: ViewState::new(),
            canvases,
            player: Arc::new(TrajectoryPlayer::new(timing.playback())),
            controls: ControlLock::default(),
            status: TrainingStatus::Idle,
            stats: None,
            policy_view: PolicyView::Placeholder,
            logs: LogPanel::default(),
            timing,
            progress: HeuristicProgress::default(),
        };
        session.draw_placeholders();
        session
    }

    #[must_use]
    pub fn with_progress(mut self, progress: HeuristicProgress) -> Self {
        self.progress = progress;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn canvases(&self) -> &Canvases<S> {
        &self.canvases
    }

    /// Handle on the player, e.g. to cancel a replay from another task.
    pub fn player(&self) -> Arc<TrajectoryPlayer> {
        Arc::clone(&self.player)
    }

    pub fn controls(&self) -> ControlLock {
        self.controls.clone()
    }

    pub fn status(&self) -> &TrainingStatus {
        &self.status
    }

    pub fn stats(&self) -> Option<&TrainingStats> {
        self.stats.as_ref()
    }

    pub fn policy_view(&self) -> &PolicyView {
        &self.policy_view
    }

    pub fn logs(&self) -> &LogPanel {
        &self.logs
    }

    fn draw_placeholders(&mut self) {
        render_value_placeholder(&mut self.canvases.values);
        render_curve_placeholder(&mut self.canvases.chart);
    }

    fn ensure_unlocked(&self) -> Result<(), SessionError> {
        if self.controls.is_locked() {
            return Err(SessionError::ControlsLocked);
        }
        Ok(())
    }

    fn interpret(&self, raw: &RawState) -> Result<StateValue, SessionError> {
        let environment = self.view.environment().ok_or(SessionError::NotInitialized)?;
        Ok(raw.interpret(&environment.layout)?)
    }

    /// Initialize `kind` on the server and show it.
    ///
    /// # Errors
    ///
    /// On any failure the previous environment and training results stay in
    /// place.
    pub async fn init(&mut self, kind: EnvKind) -> Result<(), SessionError> {
        self.ensure_unlocked()?;
        tracing::info!(env = %kind, "initializing environment");

        let response = self.api.init_env(kind).await?;
        let descriptor = response.into_descriptor(kind)?;

        tracing::info!(
            env = %kind,
            n_states = ?descriptor.n_states,
            n_actions = ?descriptor.n_actions,
            "environment ready"
        );
        self.view.replace_environment(descriptor);
        self.stats = None;
        self.status = TrainingStatus::Idle;
        self.policy_view = PolicyView::Placeholder;

        render_environment(self.view.environment(), &mut self.canvases.environment);
        self.draw_placeholders();
        Ok(())
    }

    /// Train `algorithm` on the active environment.
    ///
    /// `on_progress` receives the wall-clock estimate every tick while the
    /// request is in flight, then the final 100 % once it succeeds. The
    /// controls stay locked for the duration of the request.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotInitialized`] before any environment exists,
    /// [`SessionError::ControlsLocked`] while another run holds the controls,
    /// otherwise the client error of the request.
    pub async fn train<F>(
        &mut self,
        algorithm: Algorithm,
        params: TrainParams,
        mut on_progress: F,
    ) -> Result<TrainingStats, SessionError>
    where
        F: FnMut(&ProgressEstimate),
    {
        if self.view.environment().is_none() {
            return Err(SessionError::NotInitialized);
        }
        let _guard = self.controls.try_lock().ok_or(SessionError::ControlsLocked)?;

        tracing::info!(%algorithm, episodes = params.n_episodes, "training");
        self.status = TrainingStatus::Training {
            algorithm,
            progress: ProgressEstimate::start(),
        };

        let request = TrainRequest { algorithm, params };
        let started = Instant::now();
        let mut ticker = tokio::time::interval(self.timing.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // The ticker ends with the request, whichever way it settles.
        let outcome = {
            let call = self.api.train(&request);
            tokio::pin!(call);
            loop {
                tokio::select! {
                    biased;
                    result = &mut call => break result,
                    _ = ticker.tick() => {
                        let progress = self.progress.estimate(started.elapsed(), params.n_episodes);
                        self.status = TrainingStatus::Training { algorithm, progress };
                        on_progress(&progress);
                    }
                }
            }
        };

        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(%algorithm, error = %err, "training failed");
                self.status = TrainingStatus::Failed {
                    reason: err.to_string(),
                };
                return Err(err.into());
            }
        };

        let stats = TrainingStats::from_history(
            started.elapsed(),
            response.iteration_count(),
            &response.history,
        );
        on_progress(&ProgressEstimate::complete(params.n_episodes));
        tracing::info!(
            %algorithm,
            elapsed = %stats.elapsed_text(),
            iterations = stats.iterations,
            convergence = %stats.convergence_text(),
            "training complete"
        );

        self.view.apply_training(response.into_result());
        self.render_training();
        self.stats = Some(stats.clone());
        self.status = TrainingStatus::Complete;
        Ok(stats)
    }

    fn render_training(&mut self) {
        if let (Some(environment), Some(values)) = (self.view.environment(), self.view.values()) {
            render_values(values, environment, &mut self.canvases.values);
        }
        if let Some(curve) = self.view.curve() {
            render_curve(curve, &mut self.canvases.chart);
        }
        self.policy_view = render_policy(self.view.policy(), self.view.environment());
    }

    /// Take one manual action. An episode that reaches `done` is reset after
    /// the auto-reset delay.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotInitialized`] before any environment exists.
    pub async fn step(&mut self, action: u8) -> Result<StepOutcome, SessionError> {
        self.ensure_unlocked()?;
        if self.view.environment().is_none() {
            return Err(SessionError::NotInitialized);
        }

        let response = self.api.step(action).await?;
        let state = self.interpret(&response.state)?;
        tracing::debug!(action, %state, reward = response.reward, done = response.done, "step");

        self.view.apply_step(state, response.reward, response.done);
        render_environment(self.view.environment(), &mut self.canvases.environment);

        let mut outcome = StepOutcome {
            reward: response.reward,
            done: response.done,
            reset: false,
        };
        if response.done {
            tracing::info!("episode finished, resetting");
            tokio::time::sleep(self.timing.auto_reset_delay).await;
            self.reset().await?;
            outcome.reset = true;
        }
        Ok(outcome)
    }

    /// Put the agent back at its start state.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotInitialized`] before any environment exists.
    pub async fn reset(&mut self) -> Result<(), SessionError> {
        self.ensure_unlocked()?;
        if self.view.environment().is_none() {
            return Err(SessionError::NotInitialized);
        }

        let response = self.api.reset().await?;
        let state = self.interpret(&response.state)?;
        self.view.apply_reset(state);
        render_environment(self.view.environment(), &mut self.canvases.environment);
        Ok(())
    }

    /// Run an episode under the trained policy and replay it.
    ///
    /// # Errors
    ///
    /// Precondition errors are returned before any request:
    /// [`SessionError::NotInitialized`], [`SessionError::NotTrained`] and
    /// [`SessionError::PlaybackBusy`].
    pub async fn run_episode<O>(&mut self, observer: &mut O) -> Result<PlaybackSummary, SessionError>
    where
        O: PlaybackObserver<S> + ?Sized,
    {
        self.ensure_unlocked()?;
        if self.view.environment().is_none() {
            return Err(SessionError::NotInitialized);
        }
        let Some(policy) = self.view.policy() else {
            return Err(SessionError::NotTrained);
        };
        if self.player.is_playing() {
            return Err(SessionError::PlaybackBusy);
        }

        let response = self.api.run_episode(policy).await?;
        let reported = response.total_reward;
        let trajectory = {
            let environment = self.view.environment().ok_or(SessionError::NotInitialized)?;
            response.into_trajectory(&environment.layout)?
        };

        let summary = self
            .player
            .play(
                trajectory,
                &mut self.view,
                &mut self.canvases.environment,
                observer,
            )
            .await?;
        if let Some(total) = reported {
            if (total - summary.total_reward).abs() > 1e-6 && !summary.cancelled {
                tracing::warn!(
                    reported = total,
                    replayed = summary.total_reward,
                    "server total reward differs from the replayed sum"
                );
            }
        }
        Ok(summary)
    }

    /// Refresh the log panel from the server.
    ///
    /// # Errors
    ///
    /// Returns the client error; the panel keeps its previous lines.
    pub async fn poll_logs(&mut self) -> Result<&LogPanel, SessionError> {
        let response = self.api.logs().await?;
        self.logs.replace(&response.logs);
        Ok(&self.logs)
    }
}
